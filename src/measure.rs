//! String measurement (spec §4.2).

use crate::font::FontMetrics;

/// Logical font id, wide enough for the music/small-variant bit used by
/// `char_width`'s size-substitution rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontId(pub u32);

/// First "small" font id; ids at or above this substitute the
/// corresponding non-small font and scale the size (spec §4.2 step 1).
pub const FONT_SMALL: u32 = 0x80;
pub const FONT_MUSIC: u32 = 1;

/// `smallcapsize` expressed in thousandths, matching the spec's own
/// thousandths convention for scale factors.
const SMALLCAPSIZE: i32 = 700;

#[derive(Debug, Clone, Copy)]
pub struct MeasureConfig {
    pub kerning_enabled: bool,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        MeasureConfig {
            kerning_enabled: true,
        }
    }
}

/// `char_width(c, prev_c, font, size, out_height) -> width_millipoints`
/// (spec §4.2).
pub fn char_width(
    c: u32,
    prev_c: u32,
    font_id: FontId,
    font: &FontMetrics,
    size: i32,
    config: &MeasureConfig,
) -> (i32, i32) {
    let (effective_font_is_music, effective_size) = if font_id.0 >= FONT_SMALL {
        if font_id.0 - FONT_SMALL == FONT_MUSIC {
            (true, (size * 900) / 1000)
        } else {
            (false, (size * SMALLCAPSIZE) / 1000)
        }
    } else {
        (font_id.0 == FONT_MUSIC, size)
    };
    let _ = effective_font_is_music;

    let mut width = font.width(c as usize).max(0);

    if prev_c != 0 && c < 0x10000 && prev_c < 0x10000 && config.kerning_enabled
        && let Some(k) = font.kerns.lookup(prev_c, c) {
            width += k;
        }

    let height = if let Some(heights) = &font.heights {
        if c < 256 {
            heights[c as usize] * effective_size / 1000
        } else {
            0
        }
    } else {
        0
    };

    (width * effective_size / 1000, height)
}

/// `string_width(s, fontinst, out_height) -> width` (spec §4.2): iterate
/// [`char_width`] over a run of code points in one font, summing width and
/// accumulating height.
pub fn string_width(
    codes: &[u32],
    font_id: FontId,
    font: &FontMetrics,
    size: i32,
    config: &MeasureConfig,
) -> (i32, i32) {
    let mut total_width = 0;
    let mut total_height = 0;
    let mut prev = 0u32;
    for &c in codes {
        let (w, h) = char_width(c, prev, font_id, font, size, config);
        total_width += w;
        total_height += h;
        prev = c;
    }
    (total_width, total_height)
}
