//! Per-bar horizontal position tables (spec §4.4, §3 "Position table").
//!
//! Grounded in the teacher's `layout::spacer` accumulate-then-query idiom,
//! extended with the crotchet-based musical-offset unit and the
//! beam-crossing-barline extension this spec requires.

use crate::error::PmwError;

/// One `(musical-offset, x-offset)` entry. `moff` uses a crotchet-based
/// fixed-point unit; negative values are auxiliary entries (clefs, keys,
/// time signatures, left-repeat marks, grace-note slots) that precede the
/// first note (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionEntry {
    pub moff: i32,
    pub xoff: i32,
}

/// Extrapolation rate used by [`PositionTable::x_at_interpolated`] when a
/// query falls outside the table's range (spec §4.4).
pub const EXTRAPOLATE_MILLIPOINTS_PER_CROTCHET: i32 = 16000;

#[derive(Debug, Clone)]
pub struct PositionTable {
    entries: Vec<PositionEntry>,
    /// Index of the "current" cursor; only moves forward in the direction
    /// of the last-requested `moff` (spec §4.4, §5 "out_posptr").
    cursor: usize,
}

impl PositionTable {
    pub fn new(entries: Vec<PositionEntry>) -> Self {
        PositionTable { entries, cursor: 0 }
    }

    pub fn entries(&self) -> &[PositionEntry] {
        &self.entries
    }

    /// `x_at(moff)` (spec §4.4). `next_bar` is consulted only when `moff`
    /// equals the last entry and a beam is crossing the barline — the
    /// search then continues into the next bar's table, adding that bar's
    /// accumulated x-offset plus `barline_width`.
    pub fn x_at(
        &mut self,
        moff: i32,
        crossing_barline: Option<(&PositionTable, i32)>,
    ) -> Result<i32, PmwError> {
        if let Some((next_bar, barline_width)) = crossing_barline
            && let Some(last) = self.entries.last()
                && moff == last.moff
                    && let Some(first) = next_bar.entries.first() {
                        self.cursor = self.entries.len() - 1;
                        return Ok(last.xoff + barline_width + first.xoff);
                    }
        if let Some(pos) = self.find_from_cursor(moff) {
            return Ok(self.entries[pos].xoff);
        }
        Err(PmwError::PositionNotFound(moff))
    }

    fn find_from_cursor(&mut self, moff: i32) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        // The cursor only moves in the direction of the requested moff;
        // reset it if the new query goes the other way.
        if self.cursor < self.entries.len() && self.entries[self.cursor].moff > moff {
            self.cursor = 0;
        }
        for i in self.cursor..self.entries.len() {
            if self.entries[i].moff == moff {
                self.cursor = i;
                return Some(i);
            }
            if self.entries[i].moff > moff {
                break;
            }
        }
        None
    }

    /// `x_at_either(moff1, moff2)` (spec §4.4).
    pub fn x_at_either(
        &mut self,
        moff1: i32,
        moff2: i32,
        crossing_barline: Option<(&PositionTable, i32)>,
    ) -> Result<i32, PmwError> {
        match self.x_at(moff1, crossing_barline) {
            Ok(x) => Ok(x),
            Err(_) => self.x_at(moff2, crossing_barline),
        }
    }

    /// `x_at_interpolated(moff)` (spec §4.4): does not advance the shared
    /// cursor.
    pub fn x_at_interpolated(&self, moff: i32) -> i32 {
        if self.entries.is_empty() {
            return 0;
        }
        if let Ok(pos) = self
            .entries
            .binary_search_by(|e| e.moff.cmp(&moff))
        {
            return self.entries[pos].xoff;
        }
        let first = self.entries.first().unwrap();
        let last = self.entries.last().unwrap();
        if moff <= first.moff {
            return first.xoff - (first.moff - moff) * EXTRAPOLATE_MILLIPOINTS_PER_CROTCHET / 24;
        }
        if moff >= last.moff {
            return last.xoff + (moff - last.moff) * EXTRAPOLATE_MILLIPOINTS_PER_CROTCHET / 24;
        }
        // Linear interpolation between the bracketing entries.
        let idx = self.entries.partition_point(|e| e.moff < moff);
        let before = self.entries[idx - 1];
        let after = self.entries[idx];
        let span = after.moff - before.moff;
        let frac = moff - before.moff;
        before.xoff + (after.xoff - before.xoff) * frac / span
    }

    pub fn is_valid(&self) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let strictly_increasing = self
            .entries
            .windows(2)
            .all(|w| w[0].moff < w[1].moff && w[0].xoff < w[1].xoff);
        strictly_increasing && self.entries.first().unwrap().moff <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PositionTable {
        PositionTable::new(vec![
            PositionEntry { moff: -4, xoff: 0 },
            PositionEntry { moff: 0, xoff: 2000 },
            PositionEntry { moff: 24, xoff: 10000 },
            PositionEntry { moff: 48, xoff: 18000 },
        ])
    }

    #[test]
    fn exact_lookup_succeeds() {
        let mut t = sample();
        assert_eq!(t.x_at(24, None).unwrap(), 10000);
    }

    #[test]
    fn missing_offset_is_fatal() {
        let mut t = sample();
        assert!(t.x_at(12, None).is_err());
    }

    #[test]
    fn either_falls_back_to_second() {
        let mut t = sample();
        assert_eq!(t.x_at_either(12, 24, None).unwrap(), 10000);
    }

    #[test]
    fn interpolated_value_between_entries() {
        let t = sample();
        // Halfway between moff=0 (2000) and moff=24 (10000).
        assert_eq!(t.x_at_interpolated(12), 2000 + (10000 - 2000) / 2);
    }

    #[test]
    fn interpolated_extrapolates_beyond_end() {
        let t = sample();
        let beyond = t.x_at_interpolated(72);
        assert_eq!(beyond, 18000 + 24 * EXTRAPOLATE_MILLIPOINTS_PER_CROTCHET / 24);
    }

    #[test]
    fn crossing_barline_extends_into_next_table() {
        let mut t = PositionTable::new(vec![
            PositionEntry { moff: -4, xoff: 0 },
            PositionEntry { moff: 0, xoff: 2000 },
            PositionEntry { moff: 24, xoff: 10000 },
        ]);
        let next = PositionTable::new(vec![
            PositionEntry { moff: 0, xoff: 500 },
            PositionEntry { moff: 24, xoff: 9000 },
        ]);
        let x = t.x_at(24, Some((&next, 1000))).unwrap();
        assert_eq!(x, 10000 + 1000 + 500);
    }

    #[test]
    fn table_validity_invariant() {
        assert!(sample().is_valid());
        let bad = PositionTable::new(vec![
            PositionEntry { moff: 1, xoff: 0 },
            PositionEntry { moff: 2, xoff: 10 },
        ]);
        assert!(!bad.is_valid());
    }
}
