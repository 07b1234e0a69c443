/// Overlay colors, RGB. Alpha is chosen per layer: translucent for mask
/// fills, opaque for outlines and label tags.
pub type Color = [u8; 3];

/// Used for any category missing from the table, so unmapped classes
/// still render.
pub const FALLBACK_COLOR: Color = [148, 163, 184];

pub const LABEL_TEXT_COLOR: Color = [255, 255, 255];

const TABLE: &[(&str, Color)] = &[
    ("laptop", [59, 130, 246]),
    ("keyboard", [96, 165, 250]),
    ("mouse", [147, 197, 253]),
    ("monitor", [14, 165, 233]),
    ("phone", [99, 102, 241]),
    ("smartphone", [99, 102, 241]),
    ("headphones", [168, 85, 247]),
    ("watch", [217, 70, 239]),
    ("backpack", [236, 72, 153]),
    ("handbag", [244, 114, 182]),
    ("sneakers", [239, 68, 68]),
    ("shoe", [248, 113, 113]),
    ("hoodie", [249, 115, 22]),
    ("jacket", [251, 146, 60]),
    ("t-shirt", [234, 179, 8]),
    ("jeans", [34, 197, 94]),
    ("hat", [16, 185, 129]),
    ("sunglasses", [20, 184, 166]),
    ("chair", [6, 182, 212]),
    ("couch", [34, 211, 238]),
    ("lamp", [250, 204, 21]),
    ("plant", [74, 222, 128]),
    ("bottle", [45, 212, 191]),
    ("cup", [94, 234, 212]),
    ("book", [163, 163, 163]),
];

/// Lookup is case-insensitive on the trimmed category string.
pub fn category_color(category: &str) -> Color {
    let needle = category.trim().to_ascii_lowercase();
    TABLE
        .iter()
        .find(|(name, _)| *name == needle)
        .map(|&(_, color)| color)
        .unwrap_or(FALLBACK_COLOR)
}
