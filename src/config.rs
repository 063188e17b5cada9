//! Configuration and per-phase scratch state (Design Notes §9 "Global
//! mutable state"): the ~200 C globals factor into three explicit bags
//! instead of being hidden behind process-wide state, grounded in the
//! teacher's `layout::LayoutConfig` (a plain `Default`-deriving value
//! struct with no environment parsing).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Imposition {
    OneUp,
    TwoUpA5OnA4,
    TwoUpA4OnA3,
    Pamphlet,
}

/// Immutable per output run (spec §6 "CLI-level process-wide state").
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub magnification: i32,
    pub imposition: Imposition,
    pub paper_width_millipoints: i32,
    pub paper_height_millipoints: i32,
    pub colour_forced_red: bool,
    pub include_pmw_font: bool,
    pub right_to_left: bool,
    pub page_numbers: Option<Vec<u32>>,
    pub side1: bool,
    pub side2: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            magnification: 1000,
            imposition: Imposition::OneUp,
            paper_width_millipoints: 595_000,
            paper_height_millipoints: 842_000,
            colour_forced_red: false,
            include_pmw_font: true,
            right_to_left: false,
            page_numbers: None,
            side1: true,
            side2: true,
        }
    }
}

/// Per-system scratch (Design Notes §9): y position, stave magnifications,
/// depth vector, last-bar x, beam carry, overdraw/text queues.
#[derive(Debug, Clone, Default)]
pub struct SystemState {
    pub y: i32,
    pub stave_magn: Vec<i32>,
    pub depth_vector: Vec<i32>,
    pub last_bar_x: i32,
    pub overdraw: Vec<OverdrawOp>,
    pub queued_text: Vec<QueuedText>,
}

#[derive(Debug, Clone)]
pub enum OverdrawOp {
    Line {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        stave: u32,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        stave: u32,
    },
}

#[derive(Debug, Clone)]
pub struct QueuedText {
    pub text: String,
    pub verse: u32,
}

/// Per-note scratch (Design Notes §9): font size, accidental-left, pitch,
/// up-flag/factor, stem length, chord range, ornament link, cue-adjust.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoteContext {
    pub font_size: i32,
    pub accidental_left: i32,
    pub stem_up: bool,
    pub up_factor: i32,
    pub stem_length: i32,
    pub chord_top_y: i32,
    pub chord_bottom_y: i32,
    pub cue_adjust_thousandths: i32,
}
