//! Bar item stream (spec §3 "Bar item stream", Design Notes §9
//! "Heterogeneous bar-item list").
//!
//! The original engine links items with a doubly-linked list of structs
//! sharing a generic header so any item can be cast to ~40 specialised
//! shapes. Here a single tagged enum replaces the cast-based union, and an
//! arena (`Bar`) replaces the pointer links: items are frequently
//! truncated or inserted into during pagination, and continuation records
//! hold back-references to specific items that must stay valid across bar
//! boundaries, so an index into a `Vec` is used in place of a raw pointer.

use crate::pitch::{AbsPitch, Accidental, AccidentalKind, StavePitch};

/// Minimal bitflags macro: the corpus pulls in the real `bitflags` crate
/// for this shape, but it is not part of the teacher's dependency table,
/// so we generate the same `const`-based API by hand at the one call site
/// that needs it.
macro_rules! bitflags_like {
    (
        $(#[$meta:meta])*
        pub struct $name:ident: $ty:ty {
            $(const $flag:ident = $val:expr;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
        pub struct $name(pub $ty);

        impl $name {
            $(pub const $flag: $name = $name($val);)*

            pub const fn empty() -> Self {
                $name(0)
            }

            pub fn contains(self, other: $name) -> bool {
                (self.0 & other.0) == other.0
            }

            pub fn insert(&mut self, other: $name) {
                self.0 |= other.0;
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;
            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }
    };
}

/// Index of an item within a single bar's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteType {
    Breve,
    Semibreve,
    Minim,
    Crotchet,
    Quaver,
    SemiQuaver,
    DemiSemiQuaver,
    HemiDemiSemiQuaver,
}

impl NoteType {
    /// Ordinal used by beam-level and through-beam-count arithmetic
    /// (spec §8: "number of through-beams at level 1 equals the minimum
    /// notetype in the beam minus crotchet + 1").
    pub fn level(self) -> i32 {
        match self {
            NoteType::Breve => -2,
            NoteType::Semibreve => -1,
            NoteType::Minim => 0,
            NoteType::Crotchet => 1,
            NoteType::Quaver => 2,
            NoteType::SemiQuaver => 3,
            NoteType::DemiSemiQuaver => 4,
            NoteType::HemiDemiSemiQuaver => 5,
        }
    }

    /// Number of beam hooks/through-levels a note of this type carries
    /// when beamed (quaver = 1, semiquaver = 2, ...).
    pub fn beam_levels(self) -> i32 {
        (self.level() - 1).max(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StemFlag {
    Up,
    Down,
    None,
    Centred,
    Invert,
    CoupledUpOrDown,
    AppoggiaturaSlash,
    SmallHead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadStyle {
    Normal,
    Cross,
    Harmonic,
    None,
    Direct,
    Circular,
}

bitflags_like! {
    /// Accent/ornament capability bitset carried on a note item.
    pub struct AccentFlags: u32 {
        const STACCATO = 1 << 0;
        const STACCATISSIMO = 1 << 1;
        const ACCENT_GT = 1 << 2;
        const WEDGE = 1 << 3;
        const DOWN_BOW = 1 << 4;
        const UP_BOW = 1 << 5;
        const TRILL = 1 << 6;
        const FERMATA = 1 << 7;
        const ARPEGGIO_UP = 1 << 8;
        const ARPEGGIO_DOWN = 1 << 9;
    }
}

/// Shared per-note data (spec §3 "Note/chord/rest item").
#[derive(Debug, Clone)]
pub struct NoteData {
    pub note_type: NoteType,
    pub masquerade: Option<NoteType>,
    pub stem: StemFlag,
    pub head_style: HeadStyle,
    pub abspitch: AbsPitch,
    pub stave_pitch: StavePitch,
    /// Duration in musical-offset units (crotchet-based fixed point).
    pub duration: i32,
    pub stem_length_delta: i32,
    pub accidental: Accidental,
    pub accidental_kind: AccidentalKind,
    pub accents: AccentFlags,
    /// Manual vertical-level delta; only meaningful when this is a rest
    /// (spec §3: "A rest uses the same structure with pitch=0; its
    /// `yextra` is a manual vertical-level delta").
    pub yextra: i32,
}

impl NoteData {
    pub fn is_rest(&self) -> bool {
        self.abspitch.0 == 0 && self.duration != 0 && self.stave_pitch.0 == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarlineStyle {
    Single,
    Dotted,
    Double,
    Thick,
    Ending,
}

#[derive(Debug, Clone)]
pub struct BarlineData {
    pub style: BarlineStyle,
    pub repeat_left: bool,
    pub repeat_right: bool,
}

/// The tagged union of bar-item kinds (spec §3; ~80 kinds in the original,
/// reduced here to those this crate's pipeline actually dispatches on —
/// every kind named in spec §3/§4 has a variant).
#[derive(Debug, Clone)]
pub enum BarItem {
    /// Sentinel leading every bar, carrying its repeat-count number
    /// (spec §3: "The leading item of every bar is a sentinel of type
    /// `b_start`").
    Start { repeat_count: u32 },
    Note(NoteData),
    Chord(NoteData),
    Rest(NoteData),
    Tie { to: Option<ItemId> },
    Barline(BarlineData),
    Clef { name: String },
    Key { name: String },
    Time { numerator: u32, denominator: u32 },
    Repeat { left: bool, right: bool },
    Ornament { code: u32 },
    AccentMove { dx: i32, dy: i32 },
    BeamBreak { level: u8 },
    BeamMove { dx: i32, dy: i32 },
    BeamSlope { thousandths: i32 },
    Move { dx: i32, dy: i32 },
    Reset,
    PletStart { count: u32, shape: u32 },
    PletEnd,
    Hairpin { crescendo: bool },
    NthBar { which: Vec<u32> },
    EndLine,
    Slur { id: u32, below: bool },
    EndSlur { id: u32 },
    SlurGap { id: u32 },
    Text { text: String },
    Draw,
    StaveSize { thousandths: u32 },
    NoteHeads { style: HeadStyle },
    NotesOnOff { on: bool },
    TripletSwitch { on: bool },
    MasqSet { note_type: NoteType },
    PageBreak,
    LineBreak,
    BarNumber { force: bool },
    Footnote { text: String },
    Space { amount: i32 },
    Ensure { amount: i32 },
    SpacingChange { thousandths: i32 },
    Suspend,
    Resume,
    MidiChange,
    OverBeam,
    CopyZero { target_stave: u32 },
}

/// Arena-owned list of items for one bar on one stave. Items are indexed,
/// not pointer-linked, so continuation records can keep stable handles
/// across truncation/insertion during pagination.
#[derive(Debug, Clone, Default)]
pub struct Bar {
    items: Vec<BarItem>,
}

impl Bar {
    pub fn new(repeat_count: u32) -> Self {
        Bar {
            items: vec![BarItem::Start { repeat_count }],
        }
    }

    pub fn push(&mut self, item: BarItem) -> ItemId {
        self.items.push(item);
        ItemId(self.items.len() - 1)
    }

    pub fn get(&self, id: ItemId) -> &BarItem {
        &self.items[id.0]
    }

    pub fn get_mut(&mut self, id: ItemId) -> &mut BarItem {
        &mut self.items[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &BarItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.len() <= 1
    }

    /// Truncate the item list after `id` (inclusive keep), returning the
    /// removed tail. Used when a system break splits a bar's continuation.
    pub fn truncate_after(&mut self, id: ItemId) -> Vec<BarItem> {
        self.items.split_off(id.0 + 1)
    }

    pub fn repeat_count(&self) -> u32 {
        match self.items.first() {
            Some(BarItem::Start { repeat_count }) => *repeat_count,
            _ => 0,
        }
    }
}
