//! End-to-end scenario: `\music C\` inline text in a heading — the music
//! font run is emitted from its own glyph table without breaking the
//! surrounding text's baseline (spec §8 scenario 5).

use pmw::backend::postscript::PostScriptBackend;
use pmw::backend::{OutputBackend, PmwChar, PmwString};

const TEXT_FONT: u8 = 0;
const MUSIC_FONT: u8 = 1;

fn heading_with_inline_music() -> PmwString {
    let mut s = PmwString::from_str("Tempo ", TEXT_FONT);
    s.0.push(PmwChar::new(MUSIC_FONT, 0, 'C' as u32));
    s.0.extend(PmwString::from_str(" = 120", TEXT_FONT).0);
    s
}

#[test]
fn inline_music_character_is_its_own_font_run() {
    let s = heading_with_inline_music();
    let runs = s.font_runs();
    assert_eq!(runs.len(), 3, "text, music char, text");
    assert_eq!(runs[0].0, TEXT_FONT);
    assert_eq!(runs[1].0, MUSIC_FONT);
    assert_eq!(runs[1].1.len(), 1);
    assert_eq!(runs[2].0, TEXT_FONT);
}

#[test]
fn heading_text_stays_on_one_baseline_across_the_music_run() {
    // The music character carries no vertical movement of its own, so a
    // heading string drawn at a fixed y stays on that baseline regardless
    // of how many font runs it's split into.
    let s = heading_with_inline_music();
    let mut backend = PostScriptBackend::new();
    let baseline_y = 40_000;
    let (_, y) = backend.draw_string(&s, 0, baseline_y, 10_000);
    assert_eq!(y, baseline_y);

    let out = backend.output();
    assert!(out.contains("/F0 "), "the surrounding text uses the text font");
    assert!(out.contains("/F1 "), "the inline character uses the music font");
}
