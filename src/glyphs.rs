//! Built-in 5x7 bitmap glyphs for label tags.

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
/// Horizontal advance between glyph cells, in pixels.
pub const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;

/// Rows top to bottom; bit 4 is the leftmost column.
type Glyph = [u8; 7];

const A: Glyph = [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11];
const B: Glyph = [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E];
const C: Glyph = [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E];
const D: Glyph = [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E];
const E: Glyph = [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F];
const F: Glyph = [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10];
const G: Glyph = [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F];
const H: Glyph = [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11];
const I: Glyph = [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E];
const J: Glyph = [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C];
const K: Glyph = [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11];
const L: Glyph = [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F];
const M: Glyph = [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11];
const N: Glyph = [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11];
const O: Glyph = [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E];
const P: Glyph = [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10];
const Q: Glyph = [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D];
const R: Glyph = [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11];
const S: Glyph = [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E];
const T: Glyph = [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04];
const U: Glyph = [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E];
const V: Glyph = [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04];
const W: Glyph = [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A];
const X: Glyph = [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11];
const Y: Glyph = [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04];
const Z: Glyph = [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F];

const D0: Glyph = [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E];
const D1: Glyph = [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E];
const D2: Glyph = [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F];
const D3: Glyph = [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E];
const D4: Glyph = [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02];
const D5: Glyph = [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E];
const D6: Glyph = [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E];
const D7: Glyph = [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08];
const D8: Glyph = [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E];
const D9: Glyph = [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C];

const HYPHEN: Glyph = [0x00, 0x00, 0x00, 0x0E, 0x00, 0x00, 0x00];
const PERIOD: Glyph = [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C];
const AMPERSAND: Glyph = [0x0C, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0D];

/// Rows for `c`, case-folded to the uppercase face. `None` for anything
/// outside the face (including space); callers advance the pen and draw
/// nothing.
pub fn glyph(c: char) -> Option<&'static Glyph> {
    Some(match c.to_ascii_uppercase() {
        'A' => &A,
        'B' => &B,
        'C' => &C,
        'D' => &D,
        'E' => &E,
        'F' => &F,
        'G' => &G,
        'H' => &H,
        'I' => &I,
        'J' => &J,
        'K' => &K,
        'L' => &L,
        'M' => &M,
        'N' => &N,
        'O' => &O,
        'P' => &P,
        'Q' => &Q,
        'R' => &R,
        'S' => &S,
        'T' => &T,
        'U' => &U,
        'V' => &V,
        'W' => &W,
        'X' => &X,
        'Y' => &Y,
        'Z' => &Z,
        '0' => &D0,
        '1' => &D1,
        '2' => &D2,
        '3' => &D3,
        '4' => &D4,
        '5' => &D5,
        '6' => &D6,
        '7' => &D7,
        '8' => &D8,
        '9' => &D9,
        '-' => &HYPHEN,
        '.' => &PERIOD,
        '&' => &AMPERSAND,
        _ => return None,
    })
}

/// Pixel width of `text` rendered in the face, trailing advance trimmed.
pub fn text_width(text: &str) -> u32 {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        0
    } else {
        chars * GLYPH_ADVANCE - 1
    }
}
