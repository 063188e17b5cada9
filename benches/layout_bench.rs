//! Criterion benchmarks for the bar/system setters across score sizes.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pmw::bar_item::{
    AccentFlags, Bar, BarItem, BarlineData, BarlineStyle, HeadStyle, NoteData, NoteType, StemFlag,
};
use pmw::bar_setter::set_bar;
use pmw::config::NoteContext;
use pmw::contstr::ContState;
use pmw::diagnostics::Diagnostics;
use pmw::pitch::{AbsPitch, Accidental, AccidentalKind, StavePitch};

fn scale_note(step: i32) -> NoteData {
    let degrees = [0, 2, 4, 5, 7, 9, 11];
    let octave = step / 7;
    let degree = degrees[(step % 7) as usize];
    NoteData {
        note_type: NoteType::Crotchet,
        masquerade: None,
        stem: StemFlag::Up,
        head_style: HeadStyle::Normal,
        abspitch: AbsPitch(48 + octave * 24 + degree),
        stave_pitch: StavePitch(32 - step),
        duration: 24,
        stem_length_delta: 0,
        accidental: Accidental::None,
        accidental_kind: AccidentalKind::Plain,
        accents: AccentFlags::empty(),
        yextra: 0,
    }
}

fn build_bars(count: usize) -> Vec<Bar> {
    (0..count)
        .map(|i| {
            let mut bar = Bar::new(0);
            for n in 0..4 {
                bar.push(BarItem::Note(scale_note((i * 4 + n) as i32)));
            }
            bar.push(BarItem::Barline(BarlineData {
                style: BarlineStyle::Single,
                repeat_left: false,
                repeat_right: false,
            }));
            bar
        })
        .collect()
}

fn run_bars(bars: &[Bar]) {
    let mut cont = ContState::new();
    let ctx = NoteContext {
        font_size: 10_000,
        stem_up: true,
        stem_length: 7_000,
        ..Default::default()
    };
    let mut diagnostics = Diagnostics::new();
    for (i, bar) in bars.iter().enumerate() {
        black_box(set_bar(
            bar,
            0,
            &mut cont,
            None,
            &ctx,
            1000,
            i as u32 + 1,
            false,
            &mut diagnostics,
        ));
    }
}

fn bench_set_bar_50(c: &mut Criterion) {
    let bars = build_bars(50);
    c.bench_function("set_bar_50_bars", |b| b.iter(|| run_bars(&bars)));
}

fn bench_set_bar_100(c: &mut Criterion) {
    let bars = build_bars(100);
    c.bench_function("set_bar_100_bars", |b| b.iter(|| run_bars(&bars)));
}

fn bench_set_bar_200(c: &mut Criterion) {
    let bars = build_bars(200);
    c.bench_function("set_bar_200_bars", |b| b.iter(|| run_bars(&bars)));
}

criterion_group!(benches, bench_set_bar_50, bench_set_bar_100, bench_set_bar_200);
criterion_main!(benches);
