//! End-to-end scenario: a beam of four quavers C4 D4 E4 F4 at default
//! spacing (spec §8 scenario 2).

use pmw::bar_item::NoteType;
use pmw::beam::{plan_beam, BeamNote, MaxBeamSlope};
use pmw::diagnostics::Diagnostics;

fn quaver(x: i32, y: i32) -> BeamNote {
    BeamNote {
        x,
        y,
        note_type: NoteType::Quaver,
        stem_up: true,
        is_grace: false,
        is_rest: false,
        stem_adjust: 0,
    }
}

#[test]
fn four_rising_quavers_get_one_through_beam_no_hooks() {
    // C4 D4 E4 F4: smaller y means higher on the stave (visually "up"),
    // so a steadily rising scale line produces a steadily falling y.
    let notes = vec![quaver(0, 4000), quaver(9600, 3700), quaver(19200, 3400), quaver(28800, 3100)];
    let mut diagnostics = Diagnostics::new();
    let plan = plan_beam(&notes, false, false, MaxBeamSlope::default(), &mut diagnostics).unwrap();

    assert_eq!(plan.count, 4);
    assert!(!plan.split, "all four notes share the same stem direction");
    assert_eq!(
        plan.slope_thousandths,
        MaxBeamSlope::default().multi_note,
        "a steady rising run clamps to maxbeamslope[1]"
    );

    let types = vec![NoteType::Quaver; 4];
    assert_eq!(
        pmw::beam::through_beam_count_level1(&types),
        1,
        "a beam of quavers carries one through-beam at level 1"
    );
    for idx in 0..4 {
        assert_eq!(
            pmw::beam::level_draw(1, idx, &types, None),
            pmw::beam::LevelDraw::Through,
            "no hooks on a uniform quaver beam"
        );
    }
}
