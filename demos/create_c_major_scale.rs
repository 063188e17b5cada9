//! Example: lay out a single-stave C major scale through the bar and
//! system setters and print a summary of what was emitted.

use pmw::bar_item::{
    AccentFlags, Bar, BarItem, BarlineData, BarlineStyle, HeadStyle, NoteData, NoteType, StemFlag,
};
use pmw::bar_setter::set_bar;
use pmw::config::NoteContext;
use pmw::contstr::ContState;
use pmw::diagnostics::Diagnostics;
use pmw::note::RenderOp;
use pmw::pitch::{AbsPitch, Accidental, AccidentalKind, StavePitch};

fn pitch_to_note_name(abspitch: i32) -> String {
    let names = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
    let octave = abspitch / 12 - 1;
    format!("{}{}", names[(abspitch.rem_euclid(12)) as usize], octave)
}

fn main() {
    println!("=== Laying out a C Major Scale ===\n");

    let scale_pitches = [60, 62, 64, 65, 67, 69, 71, 72];
    let stave_steps = [28, 27, 26, 25, 24, 23, 22, 21];

    let mut bar = Bar::new(0);
    bar.push(BarItem::Clef {
        name: "treble".into(),
    });
    for (&abspitch, &stave_pitch) in scale_pitches.iter().zip(stave_steps.iter()) {
        bar.push(BarItem::Note(NoteData {
            note_type: NoteType::Crotchet,
            masquerade: None,
            stem: StemFlag::Up,
            head_style: HeadStyle::Normal,
            abspitch: AbsPitch(abspitch),
            stave_pitch: StavePitch(stave_pitch),
            duration: 24,
            stem_length_delta: 0,
            accidental: Accidental::None,
            accidental_kind: AccidentalKind::Plain,
            accents: AccentFlags::empty(),
            yextra: 0,
        }));
        println!("  added note: {} (abspitch {})", pitch_to_note_name(abspitch), abspitch);
    }
    bar.push(BarItem::Barline(BarlineData {
        style: BarlineStyle::Single,
        repeat_left: false,
        repeat_right: false,
    }));

    let mut cont = ContState::new();
    let ctx = NoteContext {
        font_size: 10_000,
        stem_up: true,
        stem_length: 7_000,
        ..Default::default()
    };
    let mut diagnostics = Diagnostics::new();
    let result = set_bar(&bar, 0, &mut cont, None, &ctx, 1000, 1, false, &mut diagnostics);

    let notehead_count = result
        .ops
        .iter()
        .filter(|op| matches!(op, RenderOp::MusicChar { .. }))
        .count();

    println!("\n=== Layout Summary ===");
    println!("Notes laid out: {}", notehead_count);
    println!("Bar width: {} millipoints", result.bar_width);
    println!("Diagnostics: {}", diagnostics.entries().len());
    println!("\n✓ C major scale laid out successfully!");
}
