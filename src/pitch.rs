//! Pitch representation (spec §3 "Pitch").
//!
//! Absolute pitch is quantised to quarter-tones, 24 steps per octave.
//! Stave pitch is the separate vertical-placement integer; `P_1S` names the
//! middle-line position so callers don't have to hardcode it.

/// Quarter-tone steps per octave.
pub const OCTAVE: i32 = 24;

/// Stave-pitch value of the treble-clef middle line (B4), used as the
/// anchor for `pitch_to_y`-style computations elsewhere in the crate.
pub const P_1S: i32 = 32;

/// Absolute pitch, quantised to quarter-tones (24 per octave).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AbsPitch(pub i32);

impl AbsPitch {
    pub fn pitch_class(self) -> i32 {
        self.0.rem_euclid(OCTAVE)
    }

    pub fn octave(self) -> i32 {
        self.0.div_euclid(OCTAVE)
    }
}

/// Vertical stave position, one integer per stave-line-or-space step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StavePitch(pub i32);

/// Accidental, each with a signed quarter-tone offset from the natural
/// letter pitch (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accidental {
    None,
    Natural,
    HalfFlat,
    Flat,
    DoubleFlat,
    HalfSharp,
    Sharp,
    DoubleSharp,
}

impl Accidental {
    pub const ALL: [Accidental; 8] = [
        Accidental::None,
        Accidental::Natural,
        Accidental::HalfFlat,
        Accidental::Flat,
        Accidental::DoubleFlat,
        Accidental::HalfSharp,
        Accidental::Sharp,
        Accidental::DoubleSharp,
    ];

    pub fn offset(self) -> i32 {
        match self {
            Accidental::None => 0,
            Accidental::Natural => 0,
            Accidental::HalfFlat => -1,
            Accidental::Flat => -2,
            Accidental::DoubleFlat => -4,
            Accidental::HalfSharp => 1,
            Accidental::Sharp => 2,
            Accidental::DoubleSharp => 4,
        }
    }

    /// The nine-entry `offset+4`-indexed table from spec §4.3 step 3.
    pub fn from_offset(offset: i32) -> Option<Accidental> {
        match offset {
            -4 => Some(Accidental::DoubleFlat),
            -2 => Some(Accidental::Flat),
            -1 => Some(Accidental::HalfFlat),
            0 => Some(Accidental::Natural),
            1 => Some(Accidental::HalfSharp),
            2 => Some(Accidental::Sharp),
            4 => Some(Accidental::DoubleSharp),
            _ => None,
        }
    }
}

/// Horizontal bracketing kind for a printed accidental (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccidentalKind {
    Plain,
    RoundBracket,
    SquareBracket,
    Invisible,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_class_wraps_negative() {
        assert_eq!(AbsPitch(-1).pitch_class(), 23);
        assert_eq!(AbsPitch(-1).octave(), -1);
    }

    #[test]
    fn accidental_offset_roundtrip() {
        for acc in Accidental::ALL {
            if acc as u8 == Accidental::None as u8 {
                continue;
            }
            let off = acc.offset();
            if let Some(back) = Accidental::from_offset(off) {
                assert_eq!(back.offset(), off);
            }
        }
    }
}
