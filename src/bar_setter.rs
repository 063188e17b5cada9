//! Bar setter (spec §4.7): assembles one bar across every stave of a
//! system, bottom to top, reinstating beam carries, dispatching items to
//! the note renderer or other-item handling, and closing continuations
//! that end at the line.
//!
//! Grounded in the teacher's `layout::breaker` greedy accumulate-and-flush
//! idiom (here applied per-stave instead of per-measure) and `layout::stems`
//! for the up/down coupling gap rule.

use crate::bar_item::{Bar, BarItem, BarlineStyle};
use crate::contstr::ContState;
use crate::diagnostics::Diagnostics;
use crate::note::{render_note, RenderOp};
use crate::config::NoteContext;

/// Music-font glyph id for the tuplet numeral, offset by the tuplet count
/// (spec §4.7 "triplet bracket"; `{3 ...}` draws the digit `3`).
const PLET_NUMERAL_BASE: u32 = 0xE880;
const PLET_BRACKET_HALF_HEIGHT: i32 = 3000;
const PLET_NUMERAL_CLEARANCE: i32 = 2000;

/// Music-font glyph id for an underlay hyphen (spec §4.7 "underlay/overlay
/// pending `-`"), following the same PUA convention as the notehead table.
const HYPHEN_GLYPH: u32 = 0xE1F0;
const HYPHEN_STRIDE: i32 = 6000;

/// Millipoint adjustments applied to end-of-line tie/slur anchors,
/// mirroring the movement-level `endlinetieadjust`/`endlinesluradjust`
/// knobs in the original (`setbar.c`); both default to zero since this
/// crate has no per-movement override for them yet.
const ENDLINE_TIE_ADJUST: i32 = 0;
const ENDLINE_SLUR_ADJUST: i32 = 0;

/// Minimum horizontal gap (millipoints) enforced between a stem-up note on
/// one stave and a stem-down note directly below it on the coupled stave
/// beneath, so chord noteheads never visually collide across the join
/// (spec §4.7 "up/down coupling gaps").
pub const UP_DOWN_COUPLING_GAP: i32 = 1800;

/// One stave's worth of rendering output for a single bar.
#[derive(Debug, Default)]
pub struct BarRenderResult {
    pub ops: Vec<RenderOp>,
    pub bar_width: i32,
    pub drew_barline: bool,
    pub bar_number_text: Option<String>,
}

/// `set_bar` (spec §4.7): iterate one bar's items on one stave bottom to
/// top relative to the stave below it, reinstating any beam carried over
/// from the previous bar, dispatching notes/chords/rests to
/// [`render_note`] and everything else to item-specific handling, and
/// finally drawing the barline.
#[allow(clippy::too_many_arguments)]
pub fn set_bar(
    bar: &Bar,
    _stave_index: u32,
    cont: &mut ContState,
    prev_stave_stem_down_x: Option<i32>,
    ctx: &NoteContext,
    magnification: i32,
    bar_number: u32,
    force_bar_number: bool,
    diagnostics: &mut Diagnostics,
) -> BarRenderResult {
    let mut result = BarRenderResult::default();
    let mut x = 0i32;
    let mut notehead_y = 4000i32;

    if let Some(carry) = cont.beam_carry.take() {
        // A beam crossing into this bar starts drawing from the carried
        // slope/x-correction rather than replanning from scratch.
        x += carry.x_correction;
        notehead_y = carry.first_note_y;
    }

    let mut open_plet: Option<(i32, u32)> = None;

    for item in bar.iter() {
        match item {
            BarItem::Start { .. } => {}
            BarItem::Note(note) | BarItem::Chord(note) | BarItem::Rest(note) => {
                let note_ctx = *ctx;
                if let Some(down_x) = prev_stave_stem_down_x
                    && note_ctx.stem_up && (down_x - x).abs() < UP_DOWN_COUPLING_GAP {
                        x = down_x + UP_DOWN_COUPLING_GAP;
                    }
                let mut ops = render_note(note, x, notehead_y, &note_ctx, magnification);
                result.ops.append(&mut ops);
                x += note.duration.max(1) * 400;
            }
            BarItem::Barline(data) => {
                result.drew_barline = true;
                result.bar_width = x;
                if data.style == BarlineStyle::Double && cont.last_bar_double_repeat {
                    diagnostics.warn("consecutive double barlines collapsed");
                }
                cont.last_bar_double_repeat = data.style == BarlineStyle::Double;
            }
            BarItem::Clef { name } => {
                cont.clef = name.clone();
            }
            BarItem::Key { name } => {
                cont.key = name.clone();
            }
            BarItem::Time {
                numerator,
                denominator,
            } => {
                cont.time_num = *numerator;
                cont.time_den = *denominator;
            }
            BarItem::Slur { id, below } => {
                cont.open_slurs.push(crate::contstr::OpenSlur {
                    id: *id,
                    below: *below,
                    start_x: x,
                    start_y: notehead_y,
                });
            }
            BarItem::EndSlur { id } => {
                cont.open_slurs.retain(|s| s.id != *id);
            }
            BarItem::Hairpin { crescendo } => {
                cont.hairpin = Some(crate::contstr::OpenHairpin {
                    crescendo: *crescendo,
                    start_x: x,
                });
            }
            BarItem::EndLine => {
                close_end_of_line_continuations(cont, x, notehead_y, magnification, &mut result.ops);
            }
            BarItem::BarNumber { force }
                if (*force || force_bar_number) => {
                    result.bar_number_text = Some(bar_number.to_string());
                }
            BarItem::TripletSwitch { on } => {
                cont.triplets_on = *on;
            }
            BarItem::NotesOnOff { on } => {
                cont.notes_on = *on;
            }
            BarItem::NoteHeads { style } => {
                cont.notehead_style = Some(*style);
            }
            BarItem::PletStart { count, .. } => {
                open_plet = Some((x, *count));
            }
            BarItem::PletEnd => {
                if let Some((start_x, count)) = open_plet.take() {
                    let y = if ctx.stem_up {
                        notehead_y - ctx.stem_length - PLET_BRACKET_HALF_HEIGHT
                    } else {
                        notehead_y + ctx.stem_length + PLET_BRACKET_HALF_HEIGHT
                    };
                    result.ops.push(RenderOp::Bracket { x: start_x, y, left: true });
                    result.ops.push(RenderOp::Bracket { x, y, left: false });
                    let mid_x = (start_x + x) / 2;
                    let numeral_y = if ctx.stem_up {
                        y - PLET_NUMERAL_CLEARANCE
                    } else {
                        y + PLET_NUMERAL_CLEARANCE
                    };
                    result.ops.push(RenderOp::MusicChar {
                        x: mid_x,
                        y: numeral_y,
                        id: PLET_NUMERAL_BASE + count,
                        size: ctx.font_size,
                    });
                }
            }
            BarItem::Move { dx, .. } => {
                x += dx;
            }
            BarItem::Space { amount } | BarItem::Ensure { amount } => {
                x += amount;
            }
            _ => {}
        }
    }

    if !result.drew_barline {
        result.bar_width = x;
    }

    result
}

/// End-of-line continuation closing (spec §4.7, §8 scenarios 3 & 6): any
/// slur, tie, hairpin, nth-time chain, or underlay record still open when
/// a system ends is drawn out to the line's right edge rather than
/// silently dropped or flagged — a continuation across a system break is
/// normal input, not an error.
///
/// Slurs, the nth-time chain, and underlay records close out completely
/// here, matching `setbar.c`'s `out_lineendflag` block, which frees each
/// of those chains after drawing. A pending tie and an open hairpin are
/// drawn but left in `cont`, since the original only clears
/// `bar_cont->tie` in `setnote.c` once a note on the far side of the
/// break actually closes it, and never clears `bar_cont->hairpin` here at
/// all; both are reinstated at the next system's left edge.
fn close_end_of_line_continuations(
    cont: &mut ContState,
    line_end_x: i32,
    y: i32,
    magnification: i32,
    ops: &mut Vec<RenderOp>,
) {
    for slur in cont.open_slurs.drain(..) {
        ops.push(RenderOp::Curve {
            x0: slur.start_x,
            y0: slur.start_y,
            x1: line_end_x + ENDLINE_SLUR_ADJUST,
            y1: slur.start_y,
            below: slur.below,
            control_offset: 4000,
        });
    }

    if let Some(tie) = &cont.pending_tie {
        ops.push(RenderOp::Curve {
            x0: tie.start_x,
            y0: tie.start_y,
            x1: line_end_x - 4 * magnification + ENDLINE_TIE_ADJUST,
            y1: tie.start_y,
            below: false,
            control_offset: 1500,
        });
    }

    if let Some(hairpin) = &cont.hairpin {
        ops.push(RenderOp::Hairpin {
            x0: hairpin.start_x,
            x1: line_end_x - 4 * magnification,
            y,
            crescendo: hairpin.crescendo,
        });
    }

    if let Some(chain) = cont.nth_time.take() {
        ops.push(RenderOp::EndingBracket {
            x0: chain.start_x,
            x1: line_end_x,
            y,
            jog: true,
        });
    }

    for rec in cont.underlay.drain(..) {
        match rec.kind {
            crate::contstr::HyphenKind::Hyphen => {
                let mut hx = rec.start_x;
                while hx < line_end_x - 2000 {
                    ops.push(RenderOp::MusicChar {
                        x: hx,
                        y: rec.y,
                        id: HYPHEN_GLYPH,
                        size: magnification,
                    });
                    hx += HYPHEN_STRIDE;
                }
            }
            crate::contstr::HyphenKind::Extender => {
                ops.push(RenderOp::Rule {
                    x0: rec.start_x,
                    y0: rec.y,
                    x1: line_end_x - 4000,
                    y1: rec.y,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bar_item::{BarlineData, HeadStyle, NoteData, NoteType, StemFlag};
    use crate::pitch::{AbsPitch, Accidental, AccidentalKind, StavePitch};

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
    fn single_note_bar_produces_ops_and_width() {
        let mut bar = Bar::new(0);
        bar.push(BarItem::Note(sample_note(NoteType::Crotchet)));
        bar.push(BarItem::Barline(BarlineData {
            style: BarlineStyle::Single,
            repeat_left: false,
            repeat_right: false,
        }));
        let mut cont = ContState::new();
        let ctx = NoteContext {
            font_size: 10000,
            stem_up: true,
            stem_length: 7000,
            ..Default::default()
        };
        let mut d = Diagnostics::new();
        let r = set_bar(&bar, 0, &mut cont, None, &ctx, 1000, 1, false, &mut d);
        assert!(r.drew_barline);
        assert!(r.bar_width > 0);
        assert!(!r.ops.is_empty());
    }

    #[test]
    fn clef_key_time_items_update_continuation_state() {
        let mut bar = Bar::new(0);
        bar.push(BarItem::Clef {
            name: "treble".into(),
        });
        bar.push(BarItem::Key { name: "G".into() });
        bar.push(BarItem::Time {
            numerator: 3,
            denominator: 4,
        });
        let mut cont = ContState::new();
        let ctx = NoteContext::default();
        let mut d = Diagnostics::new();
        set_bar(&bar, 0, &mut cont, None, &ctx, 1000, 1, false, &mut d);
        assert_eq!(cont.clef, "treble");
        assert_eq!(cont.key, "G");
        assert_eq!((cont.time_num, cont.time_den), (3, 4));
    }

    #[test]
    fn open_tie_at_end_of_line_is_drawn_and_persists() {
        let mut bar = Bar::new(0);
        bar.push(BarItem::EndLine);
        let mut cont = ContState::new();
        cont.pending_tie = Some(crate::contstr::PendingTie {
            item: crate::bar_item::ItemId(0),
            start_x: 0,
            start_y: 4000,
        });
        let ctx = NoteContext::default();
        let mut d = Diagnostics::new();
        let r = set_bar(&bar, 0, &mut cont, None, &ctx, 1000, 1, false, &mut d);
        assert!(!d.has_soft_errors());
        assert!(r.ops.iter().any(|op| matches!(op, RenderOp::Curve { .. })));
        assert!(cont.pending_tie.is_some());
    }

    #[test]
    fn stem_down_neighbour_pushes_note_right_to_avoid_collision() {
        let mut bar = Bar::new(0);
        bar.push(BarItem::Note(sample_note(NoteType::Crotchet)));
        let mut cont = ContState::new();
        let ctx = NoteContext {
            stem_up: true,
            ..Default::default()
        };
        let mut d = Diagnostics::new();
        let r = set_bar(&bar, 1, &mut cont, Some(500), &ctx, 1000, 1, false, &mut d);
        let first_x = r.ops.iter().find_map(|o| match o {
            RenderOp::MusicChar { x, .. } => Some(*x),
            _ => None,
        });
        assert_eq!(first_x, Some(500 + UP_DOWN_COUPLING_GAP));
    }
}
