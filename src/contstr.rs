//! Per-stave continuation state (spec §3 "Continuation state").
//!
//! Carries everything that survives a bar boundary within a system and,
//! selectively, across a system break: open slurs, an open hairpin, active
//! nth-time chain, a beam that straddles the barline, a pending tie,
//! pending underlay/overlay records, and the active clef/key/time/notehead
//! style. One record exists per stave, plus one per active "copy of stave
//! 0" (spec §4.8 step 3).

use crate::bar_item::{HeadStyle, ItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HyphenKind {
    Hyphen,
    Extender,
}

#[derive(Debug, Clone)]
pub struct UnderlayRecord {
    pub kind: HyphenKind,
    pub start_x: i32,
    pub y: i32,
    pub verse: u32,
}

#[derive(Debug, Clone)]
pub struct OpenSlur {
    pub id: u32,
    pub below: bool,
    pub start_x: i32,
    pub start_y: i32,
}

#[derive(Debug, Clone)]
pub struct OpenHairpin {
    pub crescendo: bool,
    pub start_x: i32,
}

#[derive(Debug, Clone)]
pub struct NthTimeChain {
    pub which: Vec<u32>,
    pub start_x: i32,
}

/// A beam whose notes straddle a bar line (spec §3, §4.5 "Beam-over-
/// barline"); rebuilt into real geometry by the next system's bar setter.
#[derive(Debug, Clone)]
pub struct BeamCarry {
    pub first_note_x: i32,
    pub first_note_y: i32,
    pub slope_thousandths: i32,
    pub remaining_count: u32,
    pub longest_note_level: i32,
    pub x_correction: i32,
    pub split: bool,
    pub stem_up: bool,
}

#[derive(Debug, Clone)]
pub struct PendingTie {
    pub item: ItemId,
    pub start_x: i32,
    pub start_y: i32,
}

/// Continuation record for one stave (or one active copy of stave 0).
#[derive(Debug, Clone, Default)]
pub struct ContState {
    pub open_slurs: Vec<OpenSlur>,
    pub hairpin: Option<OpenHairpin>,
    pub nth_time: Option<NthTimeChain>,
    pub beam_carry: Option<BeamCarry>,
    pub pending_tie: Option<PendingTie>,
    pub underlay: Vec<UnderlayRecord>,
    pub clef: String,
    pub key: String,
    pub time_num: u32,
    pub time_den: u32,
    pub notehead_style: Option<HeadStyle>,
    pub bowing_above: bool,
    pub notes_on: bool,
    pub triplets_on: bool,
    pub noteheads_on: bool,
    pub last_bar_double_repeat: bool,
}

impl ContState {
    pub fn new() -> Self {
        ContState {
            notes_on: true,
            noteheads_on: true,
            ..Default::default()
        }
    }

    pub fn has_open_continuations(&self) -> bool {
        !self.open_slurs.is_empty()
            || self.hairpin.is_some()
            || self.nth_time.is_some()
            || self.pending_tie.is_some()
            || !self.underlay.is_empty()
    }
}

/// One continuation record per stave, keyed by stave index, plus records
/// for any active copies of stave 0 (spec §4.8 step 3: "multiple copies
/// landing on the same stave level collapse to the last one").
#[derive(Debug, Clone, Default)]
pub struct SystemContinuation {
    staves: Vec<ContState>,
    copies: Vec<(u32, ContState)>,
}

impl SystemContinuation {
    pub fn with_stave_count(n: usize) -> Self {
        SystemContinuation {
            staves: (0..n).map(|_| ContState::new()).collect(),
            copies: Vec::new(),
        }
    }

    pub fn stave(&self, idx: usize) -> &ContState {
        &self.staves[idx]
    }

    pub fn stave_mut(&mut self, idx: usize) -> &mut ContState {
        &mut self.staves[idx]
    }

    /// Register (or replace) a copy-of-stave-0 continuation record at the
    /// given target stave level; later registrations for the same level
    /// win, per spec §4.8 step 3.
    pub fn set_copy(&mut self, target_stave: u32, state: ContState) {
        if let Some(existing) = self.copies.iter_mut().find(|(t, _)| *t == target_stave) {
            existing.1 = state;
        } else {
            self.copies.push((target_stave, state));
        }
    }

    pub fn copy_at(&self, target_stave: u32) -> Option<&ContState> {
        self.copies
            .iter()
            .find(|(t, _)| *t == target_stave)
            .map(|(_, s)| s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_has_no_open_continuations() {
        let st = ContState::new();
        assert!(!st.has_open_continuations());
    }

    #[test]
    fn open_slur_is_tracked() {
        let mut st = ContState::new();
        st.open_slurs.push(OpenSlur {
            id: 1,
            below: false,
            start_x: 0,
            start_y: 0,
        });
        assert!(st.has_open_continuations());
    }

    #[test]
    fn copy_of_stave_zero_collapses_to_last() {
        let mut sc = SystemContinuation::with_stave_count(3);
        let mut a = ContState::new();
        a.key = "A".into();
        sc.set_copy(2, a);
        let mut b = ContState::new();
        b.key = "B".into();
        sc.set_copy(2, b);
        assert_eq!(sc.copy_at(2).unwrap().key, "B");
    }
}
