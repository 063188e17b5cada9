//! Page setter (spec §4.9): walks a page's heading/system chain, placing
//! each in turn and tracking the running bounding box.
//!
//! Grounded in the teacher's `layout::breaker` accumulate-then-emit idiom,
//! applied here to vertical placement of heads and systems rather than
//! horizontal measure packing.

use crate::config::LayoutConfig;

/// 6.5pt/mag expressed in millipoints at unit magnification, per spec
/// §4.9's left-margin derivation.
const DEFAULT_MARGIN_PAD_MILLIPOINTS: i32 = 6500;
const MIN_LEFT_MARGIN_MILLIPOINTS: i32 = 20_000;
const STAVE_GAP_AFTER_HEADING: i32 = 17_000;
const SYSTEM_BBOX_MARGIN_WIDE: i32 = 48_000;
const SYSTEM_BBOX_MARGIN_NARROW: i32 = 32_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BoundingBox {
    pub fn empty() -> Self {
        BoundingBox {
            left: i32::MAX,
            top: i32::MAX,
            right: i32::MIN,
            bottom: i32::MIN,
        }
    }

    fn grow(&mut self, left: i32, top: i32, right: i32, bottom: i32) {
        self.left = self.left.min(left);
        self.top = self.top.min(top);
        self.right = self.right.max(right);
        self.bottom = self.bottom.max(bottom);
    }
}

#[derive(Debug, Clone)]
pub enum HeadLine {
    Text {
        left: String,
        middle: String,
        right: String,
        space: i32,
    },
    Drawing {
        space: i32,
    },
}

#[derive(Debug, Clone)]
pub struct HeadBlock {
    pub lines: Vec<HeadLine>,
    pub is_page_heading: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct SystemBlock {
    pub depth: i32,
    pub no_advance: bool,
}

#[derive(Debug, Clone)]
pub enum PageElement {
    Heading(HeadBlock),
    System(SystemBlock),
}

#[derive(Debug, Clone)]
pub struct Page {
    pub number: u32,
    pub top_space: i32,
    pub elements: Vec<PageElement>,
    pub footing: Option<HeadBlock>,
}

/// One drawn placement: either a heading line at a y position, or a
/// system placed at a y position.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    HeadingLine { y: i32 },
    Drawing { y: i32 },
    System { y: i32 },
}

#[derive(Debug)]
pub struct PageRenderResult {
    pub placements: Vec<Placement>,
    pub bbox: BoundingBox,
    pub left_margin: i32,
}

/// `set_page` (spec §4.9). `is_movement_boundary` triggers re-derivation
/// of the left margin from `config.left_margin` (when set) or the
/// centred-on-sheet formula, clamped to a minimum of 20pt.
pub fn set_page(
    page: &Page,
    config: &LayoutConfig,
    explicit_left_margin: Option<i32>,
    line_length: i32,
    is_movement_boundary: bool,
) -> PageRenderResult {
    let mut result = PageRenderResult {
        placements: Vec::new(),
        bbox: BoundingBox::empty(),
        left_margin: 0,
    };

    result.left_margin = if is_movement_boundary {
        derive_left_margin(explicit_left_margin, config.paper_width_millipoints, line_length)
    } else {
        explicit_left_margin.unwrap_or(MIN_LEFT_MARGIN_MILLIPOINTS)
    };

    let mut y = page.top_space;
    let mut just_had_heading = false;
    let mut advanced_top_space_once = false;

    for element in &page.elements {
        match element {
            PageElement::Heading(head) => {
                if head.is_page_heading {
                    y += page.top_space;
                } else if !advanced_top_space_once {
                    y += page.top_space;
                    advanced_top_space_once = true;
                }
                for line in &head.lines {
                    match line {
                        HeadLine::Text { space, .. } => {
                            result.placements.push(Placement::HeadingLine { y });
                            result
                                .bbox
                                .grow(result.left_margin, y, result.left_margin + line_length, y);
                            y += space;
                        }
                        HeadLine::Drawing { space } => {
                            result.placements.push(Placement::Drawing { y });
                            y += space;
                        }
                    }
                }
                just_had_heading = true;
            }
            PageElement::System(sys) => {
                if just_had_heading {
                    y += STAVE_GAP_AFTER_HEADING;
                    just_had_heading = false;
                }
                result.placements.push(Placement::System { y });
                let margin = if sys.depth > 16_000 {
                    SYSTEM_BBOX_MARGIN_WIDE
                } else {
                    SYSTEM_BBOX_MARGIN_NARROW
                };
                result.bbox.grow(
                    result.left_margin,
                    y - margin,
                    result.left_margin + line_length,
                    y + sys.depth + margin,
                );
                if !sys.no_advance {
                    y += sys.depth + system_gap(config);
                }
            }
        }
    }

    if let Some(footing) = &page.footing {
        for line in &footing.lines {
            if let HeadLine::Text { space, .. } = line {
                result.placements.push(Placement::HeadingLine { y });
                y += space;
            }
        }
    }

    result
}

fn derive_left_margin(explicit: Option<i32>, sheet_width: i32, line_length: i32) -> i32 {
    let computed = match explicit {
        Some(m) => m,
        None => (sheet_width - line_length) / 2 + DEFAULT_MARGIN_PAD_MILLIPOINTS,
    };
    computed.max(MIN_LEFT_MARGIN_MILLIPOINTS)
}

fn system_gap(config: &LayoutConfig) -> i32 {
    // Derived from magnification so a denser layout keeps proportional
    // breathing room between systems.
    12_000 * config.magnification / 1000
}
