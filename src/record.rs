use std::collections::BTreeMap;
use std::io;

use serde_derive::{Deserialize, Serialize};

use crate::detection::TrackId;
use crate::error::Error;
use crate::product::TrackProducts;
use crate::timeline::Timeline;

/// Everything the playback side needs for one processed video: the
/// annotation timeline plus product candidates per track. Serializes to
/// JSON and loads back without loss.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrackingRecord {
    pub video_id: String,
    pub fps: f64,
    pub total_frames: u64,
    pub tracks_by_frame: Timeline,
    pub object_products: BTreeMap<TrackId, TrackProducts>,
}

impl TrackingRecord {
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_writer<W: io::Write>(&self, writer: W) -> Result<(), Error> {
        Ok(serde_json::to_writer(writer, self)?)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{Detection, TrackedDetection};
    use crate::product::Product;
    use crate::rect::Rect;

    fn sample_record() -> TrackingRecord {
        let mut timeline = Timeline::new();
        let tracked = TrackedDetection::from_detection(
            Detection::new(Rect::new(10.0, 20.0, 30.0, 40.0), "laptop", 0.97),
            1,
        );
        timeline.push_frame(0, vec![tracked]).unwrap();
        timeline.push_frame(500, vec![]).unwrap();

        let mut object_products = BTreeMap::new();
        object_products.insert(
            1,
            TrackProducts {
                category: "laptop".into(),
                products: vec![Product {
                    product_id: "lap-001".into(),
                    title: "UltraBook Pro 14".into(),
                    brand: Some("Nordix".into()),
                    price: Some(1299.0),
                    currency: Some("USD".into()),
                    image_url: "https://picsum.photos/seed/lap-001/400/400".into(),
                    buy_url: "https://example.com/buy".into(),
                    category: Some("laptop".into()),
                    confidence: 0.92,
                }],
            },
        );

        TrackingRecord {
            video_id: "vid-123".into(),
            fps: 30.0,
            total_frames: 900,
            tracks_by_frame: timeline,
            object_products,
        }
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let record = sample_record();
        let json = record.to_json().unwrap();
        let back = TrackingRecord::from_json(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn json_uses_expected_keys() {
        let json = sample_record().to_json().unwrap();
        for key in [
            r#""video_id""#,
            r#""fps""#,
            r#""total_frames""#,
            r#""tracks_by_frame""#,
            r#""object_products""#,
            r#""track_id""#,
            r#""class""#,
            r#""bbox""#,
        ] {
            assert!(json.contains(key), "missing key {key}");
        }
        // map keys are stringified timestamps and track ids
        assert!(json.contains(r#""0":[{"#));
        assert!(json.contains(r#""1":{"category""#));
    }

    #[test]
    fn writer_reader_round_trip() {
        let record = sample_record();
        let mut buf = Vec::new();
        record.to_writer(&mut buf).unwrap();
        let back = TrackingRecord::from_reader(buf.as_slice()).unwrap();
        assert_eq!(back, record);
    }
}
