use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;
use std::fmt;

use serde_derive::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::detection::TrackId;
use crate::timeline::Timeline;

/// One purchasable item matched to a tracked object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Product {
    pub product_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub currency: Option<String>,
    pub image_url: String,
    pub buy_url: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub category: Option<String>,
    pub confidence: f32,
}

/// Product candidates for one track, ordered best match first.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrackProducts {
    pub category: String,
    pub products: Vec<Product>,
}

pub trait ProductSearch {
    type Error: fmt::Display;

    fn search(&self, category: &str, limit: usize) -> Result<Vec<Product>, Self::Error>;
}

/// In-memory catalog with a generic fallback for categories it does not
/// carry. Lookup is case-insensitive.
pub struct StaticCatalog {
    by_category: HashMap<String, Vec<Product>>,
}

fn entry(
    product_id: &str,
    title: &str,
    brand: &str,
    price: f64,
    category: &str,
    confidence: f32,
) -> Product {
    Product {
        product_id: product_id.into(),
        title: title.into(),
        brand: Some(brand.into()),
        price: Some(price),
        currency: Some("USD".into()),
        image_url: format!("https://picsum.photos/seed/{product_id}/400/400"),
        buy_url: format!(
            "https://www.google.com/search?tbm=shop&q={}",
            title.replace(' ', "+")
        ),
        category: Some(category.into()),
        confidence,
    }
}

impl StaticCatalog {
    pub fn new(by_category: HashMap<String, Vec<Product>>) -> Self {
        let by_category = by_category
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();
        Self { by_category }
    }

    /// A small demo inventory covering the categories the stock detector
    /// emits most often.
    pub fn with_defaults() -> Self {
        let mut m = HashMap::new();
        m.insert(
            "laptop".to_string(),
            vec![
                entry("lap-001", "UltraBook Pro 14", "Nordix", 1299.0, "laptop", 0.92),
                entry("lap-002", "AeroLight 13", "Vanta", 999.0, "laptop", 0.85),
            ],
        );
        m.insert(
            "headphones".to_string(),
            vec![
                entry("hp-001", "Studio Wireless ANC", "Tonal", 249.0, "headphones", 0.9),
                entry("hp-002", "ClipGo Buds", "Tonal", 89.0, "headphones", 0.8),
            ],
        );
        m.insert(
            "sneakers".to_string(),
            vec![
                entry("snk-001", "Court Classic White", "StrideLab", 95.0, "sneakers", 0.88),
                entry("snk-002", "Trail Runner GTX", "StrideLab", 140.0, "sneakers", 0.82),
            ],
        );
        m.insert(
            "hoodie".to_string(),
            vec![entry("hd-001", "Heavyweight Zip Hoodie", "UrbanWear", 75.0, "hoodie", 0.86)],
        );
        m.insert(
            "watch".to_string(),
            vec![entry("wt-001", "Field Watch 38mm", "Meridian", 180.0, "watch", 0.84)],
        );
        Self::new(m)
    }

    fn fallback(category: &str) -> Product {
        let slug: String = category
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect();
        Product {
            product_id: format!("gen-{slug}"),
            title: format!("Similar {category}"),
            brand: Some("Generic".into()),
            price: Some(50.0),
            currency: Some("USD".into()),
            image_url: format!("https://picsum.photos/seed/{slug}/400/400"),
            buy_url: format!(
                "https://www.google.com/search?tbm=shop&q={}",
                category.replace(' ', "+")
            ),
            category: Some(category.into()),
            confidence: 0.7,
        }
    }
}

impl ProductSearch for StaticCatalog {
    type Error = Infallible;

    fn search(&self, category: &str, limit: usize) -> Result<Vec<Product>, Infallible> {
        let needle = category.trim().to_ascii_lowercase();
        let mut products = match self.by_category.get(&needle) {
            Some(items) => items.clone(),
            None => vec![Self::fallback(category)],
        };
        products.truncate(limit);
        Ok(products)
    }
}

/// Resolve product candidates for every distinct track, once, after
/// tracking has finished. A failed lookup leaves that track with an
/// empty product list rather than failing the whole annotation pass.
pub fn annotate_tracks<S: ProductSearch>(
    timeline: &Timeline,
    search: &S,
    limit: usize,
) -> BTreeMap<TrackId, TrackProducts> {
    let mut annotated = BTreeMap::new();
    for (track_id, label) in timeline.distinct_tracks() {
        let products = match search.search(label, limit) {
            Ok(products) => products,
            Err(e) => {
                warn!(track_id, category = label, error = %e, "product search failed");
                Vec::new()
            }
        };
        debug!(track_id, category = label, candidates = products.len(), "annotated track");
        annotated.insert(
            track_id,
            TrackProducts {
                category: label.to_string(),
                products,
            },
        );
    }
    annotated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{Detection, TrackedDetection};
    use crate::rect::Rect;

    #[test]
    fn known_category_respects_limit() {
        let catalog = StaticCatalog::with_defaults();
        let products = catalog.search("laptop", 1).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].product_id, "lap-001");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let catalog = StaticCatalog::with_defaults();
        let products = catalog.search("LapTop", 5).unwrap();
        assert_eq!(products.len(), 2);
    }

    #[test]
    fn unknown_category_gets_generic_fallback() {
        let catalog = StaticCatalog::with_defaults();
        let products = catalog.search("garden gnome", 5).unwrap();
        assert_eq!(products.len(), 1);
        assert!(products[0].title.contains("garden gnome"));
        assert_eq!(products[0].brand.as_deref(), Some("Generic"));
    }

    #[test]
    fn annotate_covers_each_track_once() {
        let mut timeline = Timeline::new();
        let tracked = |id, label: &str| {
            TrackedDetection::from_detection(
                Detection::new(Rect::new(0.0, 0.0, 1.0, 1.0), label, 0.9),
                id,
            )
        };
        timeline.push_frame(0, vec![tracked(1, "laptop")]).unwrap();
        timeline
            .push_frame(500, vec![tracked(1, "laptop"), tracked(2, "watch")])
            .unwrap();

        let catalog = StaticCatalog::with_defaults();
        let annotated = annotate_tracks(&timeline, &catalog, 2);
        assert_eq!(annotated.len(), 2);
        assert_eq!(annotated[&1].category, "laptop");
        assert_eq!(annotated[&1].products.len(), 2);
        assert_eq!(annotated[&2].category, "watch");
    }

    #[test]
    fn product_optional_fields_round_trip() {
        let p = Product {
            product_id: "x".into(),
            title: "Bare".into(),
            brand: None,
            price: None,
            currency: None,
            image_url: "https://example.com/i.png".into(),
            buy_url: "https://example.com/b".into(),
            category: None,
            confidence: 0.5,
        };
        let json = serde_json::to_string(&p).unwrap();
        assert!(!json.contains("brand"));
        let back: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
