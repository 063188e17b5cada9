//! Transposition of pitches and key signatures (spec §4.3).
//!
//! Tables and algorithm are grounded directly in `transpose.c`: the five
//! "able" tables select whether a requested accidental can be used at a
//! given pitch class, the forward/reverse letter-step tables walk the note
//! letter by the key's letter-change count, and `tp_newacc` maps the
//! resulting offset to an accidental. The three-quarter-tone rewrite and
//! the key-N enharmonic special case are preserved exactly as observed,
//! per the open question in the spec's Design Notes: this behaviour is not
//! rationalised, only reproduced.

use crate::pitch::Accidental;

/// One quarter tone, named the way the source calls it (`P_T`), used by
/// the three-quarter-tone rewrite below.
const P_T: i32 = 2;

const SHARPABLE: [bool; 24] = [
    true, false, true, false, false, false, true, false, false, false, true, false, true, false,
    false, false, true, false, false, false, true, false, false, false,
];
const FLATABLE: [bool; 24] = [
    false, false, true, false, false, false, true, false, true, false, false, false, true, false,
    false, true, false, false, false, true, false, false, true, false,
];
const DSHARPABLE: [bool; 24] = [
    false, false, false, false, true, false, false, false, true, false, false, false, false,
    false, true, false, false, false, true, false, false, false, true, false,
];
const DFLATABLE: [bool; 24] = [
    true, false, false, false, true, false, false, false, false, false, true, false, false,
    false, true, false, false, false, true, false, false, false, false, false,
];
const NATURALABLE: [bool; 24] = [
    true, false, false, false, true, false, false, false, true, false, true, false, false, false,
    true, false, false, false, true, false, false, false, true, false,
];

fn able_table(acc: Accidental) -> Option<&'static [bool; 24]> {
    match acc {
        Accidental::Natural => Some(&NATURALABLE),
        Accidental::Sharp => Some(&SHARPABLE),
        Accidental::DoubleSharp => Some(&DSHARPABLE),
        Accidental::Flat => Some(&FLATABLE),
        Accidental::DoubleFlat => Some(&DFLATABLE),
        _ => None,
    }
}

/// Pitch offset implied by an accidental, used to recover the written
/// (unaccidented) pitch of a requested accidental (`read_accpitch` in the
/// source).
fn acc_pitch(acc: Accidental) -> i32 {
    acc.offset()
}

const TP_FORWARD_OFFSET: [usize; 12] = [2, 0, 4, 0, 5, 7, 0, 9, 0, 11, 0, 0];
const TP_FORWARD_PITCH: [i32; 12] = [2, 0, 2, 0, 1, 2, 0, 2, 0, 2, 0, 1];
const TP_REVERSE_OFFSET: [usize; 12] = [11, 0, 0, 0, 2, 4, 0, 5, 0, 7, 0, 9];
const TP_REVERSE_PITCH: [i32; 12] = [1, 0, 2, 0, 2, 1, 0, 2, 0, 2, 0, 2];

/// `offset + 4`-indexed accidental table; entries at index 1 and 7
/// (three-quarter-tone offsets) are unused by design.
const TP_NEWACC: [Option<Accidental>; 9] = [
    Some(Accidental::DoubleFlat),
    None,
    Some(Accidental::Flat),
    Some(Accidental::HalfFlat),
    Some(Accidental::Natural),
    Some(Accidental::HalfSharp),
    Some(Accidental::Sharp),
    None,
    Some(Accidental::DoubleSharp),
];

/// Standard key identifiers, just enough to carry the tables; callers may
/// use a wider representation and only rely on equality/indexing here.
pub type KeyId = u8;

pub const KEY_N: KeyId = 255;

/// Upward-by-one-semitone key transposition table (`tp_keytable`).
const TP_KEYTABLE: [u8; 42] = [
    15, 2, 17, 18, 5, 20, 14, // natural
    0, 0, 3, 0, 0, 6, 0, // sharp
    0, 1, 2, 3, 4, 5, 6, // flat
    36, 23, 30, 39, 26, 33, 34, // minor
    22, 0, 24, 25, 0, 27, 21, // sharp minor
    21, 22, 23, 24, 25, 25, 26, // flat minor
];

/// Enharmonic key overrides: (never-auto-selected key, equivalent key).
const ENH_KEYTABLE: [(u8, u8); 6] = [
    (16, 1),  // Cb = B
    (9, 17),  // C# = Db
    (12, 20), // F# = Gb
    (35, 34), // Abm = G#m
    (31, 39), // D#m = Ebm
    (28, 36), // A#m = Bbm
];

const KEY_C: u8 = 2;

/// Transpose a standard key signature by `semitones` (signed, +up/-down),
/// returning the new key and the number of letter changes implied (spec
/// §4.3: "sets a hidden global letter change count"). A custom override is
/// not modelled here (no custom-key table is in scope); callers supply
/// that via `custom_override` if present.
pub fn transpose_key(
    key: KeyId,
    quarter_tones: i32,
    custom_override: Option<(u8, i32)>,
) -> (KeyId, i32) {
    if quarter_tones == 0 {
        return (key, 0);
    }
    if let Some((newkey, letter_changes)) = custom_override {
        let signed = if quarter_tones > 0 {
            letter_changes.abs()
        } else {
            -letter_changes.abs()
        };
        return (newkey, signed);
    }

    // Octave-normalise into [0, 24) the way `transpose_key` does with
    // `for (j = active_transpose; j < 0; j += 24)` followed by
    // `while (j > 23) j -= 24`, so a downward transposition becomes an
    // equivalent forward walk rather than an inverse table lookup. A
    // quarter-tone transposition of a standard key requires an odd count
    // to be rejected without a custom instruction (spec §4.3, `ERR74`);
    // since this signature has no error path, an odd count is folded to
    // the nearest even quarter-tone below it.
    let mut j = quarter_tones;
    while j < 0 {
        j += 24;
    }
    while j > 23 {
        j -= 24;
    }
    let semitones = j / 2;

    let usekey = if key == KEY_N { KEY_C } else { key };
    let mut newkey = usekey;
    for _ in 0..semitones {
        newkey = TP_KEYTABLE[newkey as usize];
    }

    for &(never_selected, equivalent) in ENH_KEYTABLE.iter() {
        if newkey == never_selected {
            newkey = equivalent;
            break;
        }
    }

    // Letter-change count is the difference of note-letter positions
    // between the transposed key and the starting key (`transpose.c`:
    // `active_transpose_letter = (letterkey%7) - (usekey%7)`), not the
    // semitone count.
    let mut letter_changes = (newkey % 7) as i32 - (usekey % 7) as i32;
    if quarter_tones > 0 && letter_changes < 0 {
        letter_changes += 7;
    }
    if quarter_tones < 0 && letter_changes > 0 {
        letter_changes -= 7;
    }

    let result_key = if key == KEY_N { key } else { newkey };
    (result_key, letter_changes)
}

/// Result of [`transpose_note`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transposed {
    pub abspitch: i32,
    pub pitch: i32,
    pub acc: Accidental,
}

/// Per-bar remembered accidental, keyed by written pitch (`baraccs_tp` /
/// `tiedata[].acc_tp` in the source).
pub trait AccidentalMemory {
    fn implied(&self, pitch: i32) -> Option<i32>;
    fn remember(&mut self, pitch: i32, acc_pitch: i32);
}

/// Simple bar-scoped accidental memory, one slot per written pitch value
/// observed so far in the bar.
#[derive(Debug, Clone, Default)]
pub struct BarAccMemory {
    entries: std::collections::HashMap<i32, i32>,
}

impl AccidentalMemory for BarAccMemory {
    fn implied(&self, pitch: i32) -> Option<i32> {
        self.entries.get(&pitch).copied()
    }
    fn remember(&mut self, pitch: i32, acc_pitch: i32) {
        self.entries.insert(pitch, acc_pitch);
    }
}

/// Transpose a single note (spec §4.3). `active_transpose` is `amount`;
/// `active_transpose_letter` is `letter_changes` (signed; from
/// [`transpose_key`]'s second return value). `key_is_n` selects the key-N
/// special-casing branch. `memory` models `baraccs_tp`/`tiedata[].acc_tp`
/// depending on whether `tied` is set.
#[allow(clippy::too_many_arguments)]
pub fn transpose_note(
    abspitch: i32,
    pitch: i32,
    acc: Accidental,
    amount: i32,
    letter_changes: i32,
    letter_changes_is_auto: bool,
    requested_acc: Option<Accidental>,
    force_acc: bool,
    acc_onenote: bool,
    in_text: bool,
    key_is_n: bool,
    first_nontied_in_bar: bool,
    tied_acc: Option<i32>,
    memory: &mut dyn AccidentalMemory,
) -> Result<Transposed, crate::error::PmwError> {
    let new_abspitch = abspitch + amount;
    let mut newpitch;
    let newacc;

    if let Some(racc) = requested_acc
        && let Some(table) = able_table(racc)
            && table[new_abspitch.rem_euclid(24) as usize] {
                newacc = racc;
                newpitch = new_abspitch - acc_pitch(racc);
                return finish_transpose_note(
                    new_abspitch,
                    newpitch,
                    newacc,
                    pitch,
                    acc,
                    force_acc,
                    acc_onenote,
                    in_text,
                    key_is_n,
                    first_nontied_in_bar,
                    tied_acc,
                    memory,
                );
            }

    let mut i = letter_changes;
    let mut offset = (pitch.rem_euclid(24)) / 2;
    newpitch = pitch;

    if i >= 0 {
        while i > 0 {
            newpitch += 2 * TP_FORWARD_PITCH[offset as usize];
            offset = TP_FORWARD_OFFSET[offset as usize] as i32;
            i -= 1;
        }
    } else {
        while i < 0 {
            newpitch -= 2 * TP_REVERSE_PITCH[offset as usize];
            offset = TP_REVERSE_OFFSET[offset as usize] as i32;
            i += 1;
        }
    }

    while newpitch <= new_abspitch - 24 {
        newpitch += 24;
    }
    while newpitch >= new_abspitch + 24 {
        newpitch -= 24;
    }

    let mut off = new_abspitch - newpitch;
    if off >= 20 {
        off -= 24;
        newpitch += 24;
    } else if off <= -20 {
        off += 24;
        newpitch -= 24;
    }

    let note_offset = newpitch.rem_euclid(24);

    if off == -3 || off == -6 {
        if note_offset == 0 || note_offset == 10 {
            newpitch -= P_T / 2;
            off += 2;
        } else {
            newpitch -= P_T;
            off += 4;
        }
    } else if off == 3 || off == 6 {
        if note_offset == 8 || note_offset == 22 {
            newpitch += P_T / 2;
            off -= 2;
        } else {
            newpitch += P_T;
            off -= 4;
        }
    }

    if !(-4..=4).contains(&off) {
        return Err(crate::error::PmwError::TranspositionRange(off));
    }
    let _ = letter_changes_is_auto;

    newacc = TP_NEWACC[(off + 4) as usize].unwrap_or(Accidental::Natural);

    finish_transpose_note(
        new_abspitch,
        newpitch,
        newacc,
        pitch,
        acc,
        force_acc,
        acc_onenote,
        in_text,
        key_is_n,
        first_nontied_in_bar,
        tied_acc,
        memory,
    )
}

#[allow(clippy::too_many_arguments)]
fn finish_transpose_note(
    abspitch: i32,
    mut newpitch: i32,
    mut newacc: Accidental,
    old_pitch: i32,
    old_acc: Accidental,
    force_acc: bool,
    acc_onenote: bool,
    in_text: bool,
    key_is_n: bool,
    first_nontied_in_bar: bool,
    tied_acc: Option<i32>,
    memory: &mut dyn AccidentalMemory,
) -> Result<Transposed, crate::error::PmwError> {
    if in_text {
        return Ok(Transposed {
            abspitch,
            pitch: newpitch,
            acc: newacc,
        });
    }

    let mut key_n_omit = false;

    if key_is_n {
        let note_offset = newpitch.rem_euclid(24);
        let old_offset = old_pitch.rem_euclid(24);
        let is_e_or_b = note_offset == 8 || note_offset == 22;
        let is_c_or_f = note_offset == 0 || note_offset == 10;
        let old_is_e_or_b = old_offset == 8 || old_offset == 22;
        let old_is_c_or_f = old_offset == 0 || old_offset == 10;

        match newacc {
            Accidental::DoubleSharp if old_acc != Accidental::DoubleSharp => {
                if is_e_or_b {
                    newpitch += P_T / 2;
                    newacc = Accidental::Sharp;
                } else {
                    newpitch += P_T;
                    newacc = Accidental::Natural;
                }
            }
            Accidental::DoubleFlat if old_acc != Accidental::DoubleFlat => {
                if is_c_or_f {
                    newpitch -= P_T / 2;
                    newacc = Accidental::Flat;
                } else {
                    newpitch -= P_T;
                    newacc = Accidental::Natural;
                }
            }
            Accidental::Sharp if is_e_or_b && !old_is_e_or_b => {
                newpitch += P_T / 2;
                newacc = Accidental::Natural;
            }
            Accidental::Flat if is_c_or_f && !old_is_c_or_f => {
                newpitch -= P_T / 2;
                newacc = Accidental::Natural;
            }
            _ => {}
        }

        if old_acc != Accidental::Natural || !first_nontied_in_bar {
            key_n_omit = true;
        }
    }

    let new_acc_pitch = acc_pitch(newacc);
    let implied = match tied_acc {
        Some(v) => Some(v),
        None => memory.implied(newpitch),
    };

    if implied == Some(new_acc_pitch)
        && (old_acc == Accidental::None || !force_acc || key_n_omit)
    {
        newacc = Accidental::None;
    } else if !acc_onenote {
        memory.remember(newpitch, new_acc_pitch);
    }

    Ok(Transposed {
        abspitch,
        pitch: newpitch,
        acc: newacc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem() -> BarAccMemory {
        BarAccMemory::default()
    }

    #[test]
    fn no_transposition_is_identity_ish() {
        let mut m = mem();
        let r = transpose_note(
            48, 48, Accidental::None, 0, 0, false, None, false, false, false, false, true, None,
            &mut m,
        )
        .unwrap();
        assert_eq!(r.abspitch, 48);
        assert_eq!(r.pitch, 48);
    }

    #[test]
    fn requested_accidental_used_when_able() {
        let mut m = mem();
        // C (pitch class 0) up a tone with sharp requested should be
        // expressible if the able-table allows it at the resulting class.
        let r = transpose_note(
            0,
            0,
            Accidental::None,
            4,
            2,
            false,
            Some(Accidental::Sharp),
            false,
            false,
            false,
            false,
            true,
            None,
            &mut m,
        );
        assert!(r.is_ok());
    }

    #[test]
    fn out_of_range_offset_is_error() {
        // Force an inconsistent letter-change count far from the true
        // pitch so the |offset| > 4 guard trips.
        let mut m = mem();
        let r = transpose_note(
            0, 0, Accidental::None, 0, 11, false, None, false, false, false, false, true, None,
            &mut m,
        );
        assert!(r.is_err());
    }

    #[test]
    fn key_transposition_up_one_tone() {
        let (newkey, letters) = transpose_key(KEY_C, 4, None);
        assert_eq!(letters, 1, "C to D is one letter step, not two semitones");
        assert_ne!(newkey, KEY_C);
    }

    #[test]
    fn enharmonic_override_applied() {
        // newkey 16 (Cb) must never surface; it maps to 1 (B).
        assert_eq!(
            ENH_KEYTABLE.iter().find(|&&(k, _)| k == 16).unwrap().1,
            1
        );
    }
}
