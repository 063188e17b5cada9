//! Universal invariants from spec §8 exercised end-to-end rather than
//! inline in each module, to read as the acceptance checklist for the
//! layout core as a whole.

use pmw::beam::{level_draw, through_beam_count_level1, LevelDraw};
use pmw::bar_item::NoteType;
use pmw::pitch::Accidental;
use pmw::position::{PositionEntry, PositionTable};
use pmw::transpose::{transpose_note, BarAccMemory};

#[test]
fn position_table_is_strictly_increasing_and_starts_non_positive() {
    let table = PositionTable::new(vec![
        PositionEntry { moff: -4, xoff: 0 },
        PositionEntry { moff: 0, xoff: 2_000 },
        PositionEntry { moff: 24, xoff: 10_000 },
    ]);
    assert!(table.is_valid());
    assert!(table.entries().first().unwrap().moff <= 0);
    assert!(table
        .entries()
        .windows(2)
        .all(|w| w[0].moff < w[1].moff && w[0].xoff < w[1].xoff));
}

#[test]
fn transpose_then_transpose_back_is_identity() {
    let mut memory = BarAccMemory::default();
    let up = transpose_note(
        48, 48, Accidental::None, 4, 2, false, None, false, false, false, false, true, None,
        &mut memory,
    )
    .unwrap();

    let mut memory2 = BarAccMemory::default();
    let back = transpose_note(
        up.abspitch,
        up.pitch,
        up.acc,
        -4,
        -2,
        false,
        None,
        false,
        false,
        false,
        false,
        true,
        None,
        &mut memory2,
    )
    .unwrap();

    assert_eq!(back.abspitch, 48);
    assert_eq!(back.pitch, 48);
}

#[test]
fn through_beam_count_matches_minimum_notetype_minus_crotchet_plus_one() {
    let types = vec![NoteType::Quaver, NoteType::Quaver, NoteType::Quaver];
    // crotchet.beam_levels() == 0, quaver.beam_levels() == 1; the minimum
    // of an all-quaver run is 1.
    assert_eq!(through_beam_count_level1(&types), 1);

    let types = vec![NoteType::SemiQuaver, NoteType::Quaver, NoteType::SemiQuaver];
    assert_eq!(through_beam_count_level1(&types), 1);
}

#[test]
fn hook_direction_follows_immediate_neighbours() {
    let types = vec![NoteType::Quaver, NoteType::SemiQuaver, NoteType::Quaver];
    // Level 2 only exists on the middle semiquaver; with no level-2
    // neighbour on either side it draws as a hook, not a through-beam.
    assert_ne!(level_draw(2, 1, &types, None), LevelDraw::Through);
    assert_eq!(level_draw(2, 1, &types, None), LevelDraw::ForwardHook);
}
