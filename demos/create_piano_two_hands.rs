//! Example: a two-stave piano part (treble + bass) laid out through
//! `set_system`, each hand holding a C major chord as a whole note.

use pmw::bar_item::{
    AccentFlags, Bar, BarItem, BarlineData, BarlineStyle, HeadStyle, NoteData, NoteType, StemFlag,
};
use pmw::config::NoteContext;
use pmw::contstr::SystemContinuation;
use pmw::diagnostics::Diagnostics;
use pmw::note::RenderOp;
use pmw::pitch::{AbsPitch, Accidental, AccidentalKind, StavePitch};
use pmw::system_setter::{set_system, JoiningSigns, StaveLayout};

fn chord_note(abspitch: i32, stave_pitch: i32, stem_up: bool) -> BarItem {
    BarItem::Note(NoteData {
        note_type: NoteType::Semibreve,
        masquerade: None,
        stem: if stem_up { StemFlag::Up } else { StemFlag::Down },
        head_style: HeadStyle::Normal,
        abspitch: AbsPitch(abspitch),
        stave_pitch: StavePitch(stave_pitch),
        duration: 96,
        stem_length_delta: 0,
        accidental: Accidental::None,
        accidental_kind: AccidentalKind::Plain,
        accents: AccentFlags::empty(),
        yextra: 0,
    })
}

fn main() {
    println!("=== Laying out a Two-Hand Piano Chord ===\n");

    let mut treble_bar = Bar::new(0);
    treble_bar.push(BarItem::Clef { name: "treble".into() });
    // C5, E5, G5 under one stem.
    treble_bar.push(chord_note(72, 21, true));
    treble_bar.push(chord_note(76, 19, true));
    treble_bar.push(chord_note(79, 17, true));
    treble_bar.push(BarItem::Barline(BarlineData {
        style: BarlineStyle::Single,
        repeat_left: false,
        repeat_right: false,
    }));
    println!("  treble: C5, E5, G5 (whole note)");

    let mut bass_bar = Bar::new(0);
    bass_bar.push(BarItem::Clef { name: "bass".into() });
    // C3, E3, G3 under one stem.
    bass_bar.push(chord_note(48, 33, false));
    bass_bar.push(chord_note(52, 31, false));
    bass_bar.push(chord_note(55, 29, false));
    bass_bar.push(BarItem::Barline(BarlineData {
        style: BarlineStyle::Single,
        repeat_left: false,
        repeat_right: false,
    }));
    println!("  bass:   C3, E3, G3 (whole note)");

    let staves = vec![
        StaveLayout {
            index: 0,
            y: 0,
            suspended: false,
            shows_time_signature: true,
            name: None,
        },
        StaveLayout {
            index: 1,
            y: -40_000,
            suspended: false,
            shows_time_signature: true,
            name: None,
        },
    ];
    let bars = vec![vec![treble_bar], vec![bass_bar]];

    let mut cont = SystemContinuation::with_stave_count(2);
    let joining = JoiningSigns {
        join: true,
        brackets: vec![(0, 1)],
        ..Default::default()
    };
    let mut state = Default::default();
    let ctx = NoteContext {
        font_size: 10_000,
        stem_up: true,
        stem_length: 7_000,
        ..Default::default()
    };
    let mut diagnostics = Diagnostics::new();

    let result = set_system(
        &staves,
        &bars,
        &mut cont,
        &joining,
        &mut state,
        &ctx,
        1000,
        true,
        1,
        4,
        &mut diagnostics,
    );

    let notehead_count = result
        .ops
        .iter()
        .filter(|op| matches!(op, RenderOp::MusicChar { .. }))
        .count();

    println!("\n=== Layout Summary ===");
    println!("Staves joined with a brace-and-bracket pair");
    println!("Noteheads drawn: {}", notehead_count);
    println!("Bar numbers emitted: {:?}", result.bar_numbers);
    println!("Diagnostics: {}", diagnostics.entries().len());
    println!("\n✓ Two-hand piano chord laid out successfully!");
}
