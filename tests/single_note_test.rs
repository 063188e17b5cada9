//! End-to-end scenario: a single C-major crotchet on a plain treble stave
//! (spec §8 scenario 1).

use pmw::bar_item::{
    AccentFlags, Bar, BarItem, BarlineData, BarlineStyle, HeadStyle, NoteData, NoteType, StemFlag,
};
use pmw::bar_setter::set_bar;
use pmw::config::NoteContext;
use pmw::contstr::ContState;
use pmw::diagnostics::Diagnostics;
use pmw::note::RenderOp;
use pmw::pitch::{AbsPitch, Accidental, AccidentalKind, StavePitch};
use pmw::system_setter::{set_system, JoiningSigns, StaveLayout};

fn middle_c_crotchet() -> NoteData {
    NoteData {
        note_type: NoteType::Crotchet,
        masquerade: None,
        stem: StemFlag::Up,
        head_style: HeadStyle::Normal,
        abspitch: AbsPitch(48),
        stave_pitch: StavePitch(32),
        duration: 24,
        stem_length_delta: 0,
        accidental: Accidental::None,
        accidental_kind: AccidentalKind::Plain,
        accents: AccentFlags::empty(),
        yextra: 0,
    }
}

fn single_note_bar() -> Bar {
    let mut bar = Bar::new(0);
    bar.push(BarItem::Clef {
        name: "treble".into(),
    });
    bar.push(BarItem::Note(middle_c_crotchet()));
    bar.push(BarItem::Barline(BarlineData {
        style: BarlineStyle::Single,
        repeat_left: false,
        repeat_right: false,
    }));
    bar
}

#[test]
fn notehead_stem_and_no_accidental_or_ledger() {
    let bar = single_note_bar();
    let mut cont = ContState::new();
    let ctx = NoteContext {
        font_size: 10_000,
        stem_up: true,
        stem_length: 7_000,
        ..Default::default()
    };
    let mut diagnostics = Diagnostics::new();
    let r = set_bar(&bar, 0, &mut cont, None, &ctx, 1000, 1, false, &mut diagnostics);

    let noteheads: Vec<_> = r
        .ops
        .iter()
        .filter(|op| matches!(op, RenderOp::MusicChar { .. }))
        .collect();
    assert_eq!(noteheads.len(), 1, "exactly one notehead glyph");

    let stems: Vec<_> = r.ops.iter().filter(|op| matches!(op, RenderOp::Stem { .. })).collect();
    assert_eq!(stems.len(), 1, "exactly one stem");
    if let RenderOp::Stem { y0, y1, .. } = stems[0] {
        assert!(*y1 < *y0, "stem descends from the notehead");
    }

    assert!(
        !r.ops.iter().any(|op| matches!(op, RenderOp::LedgerLine { .. })),
        "a mid-staff note needs no ledger line"
    );
    assert!(r.drew_barline);
    assert!(!diagnostics.has_soft_errors());
}

#[test]
fn whole_system_draws_one_stave_line_group_and_clef() {
    let staves = vec![StaveLayout {
        index: 0,
        y: 0,
        suspended: false,
        shows_time_signature: false,
        name: None,
    }];
    let bars = vec![vec![single_note_bar()]];
    let mut cont = pmw::contstr::SystemContinuation::with_stave_count(1);
    let joining = JoiningSigns::default();
    let mut state = pmw::config::SystemState::default();
    let ctx = NoteContext {
        font_size: 10_000,
        stem_up: true,
        stem_length: 7_000,
        ..Default::default()
    };
    let mut diagnostics = Diagnostics::new();
    let r = set_system(
        &staves, &bars, &mut cont, &joining, &mut state, &ctx, 1000, true, 1, 0, &mut diagnostics,
    );

    let stave_lines = r
        .ops
        .iter()
        .filter(|op| matches!(op, RenderOp::LedgerLine { x1, .. } if *x1 > 50_000))
        .count();
    assert_eq!(stave_lines, 1, "one stave-line group for the single stave");
}
