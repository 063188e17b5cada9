//! Font metrics (spec §4.1): loading AFM + optional UTR, per-glyph widths,
//! right-to-left adjusts, heights, kern pairs, encoding maps; font-instance
//! rotation.

pub mod afm;
pub mod utr;

use crate::error::PmwError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Size of the widths/r2l-adjusts arrays (spec §3 "Font structure":
/// `FONTWIDTHS_SIZE` entries).
pub const FONTWIDTHS_SIZE: usize = 512;

/// Boundary above which a standard-encoded font's Unicode code points are
/// relocated into the secondary tree (spec §3, §4.1, §8).
pub const LOWCHARLIMIT: usize = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FontFlags {
    pub standard_encoding: bool,
    pub fixed_pitch: bool,
    pub include_in_output: bool,
    pub used: bool,
    pub used_lower_half: bool,
    pub used_upper_half: bool,
}

/// Sorted-by-packed-key kern table (spec §4.1: "sorted by packed
/// `(left<<16)|right` key for binary search"). Keys are packed into a
/// `u64` rather than the original's `u32` so the table can be extended to
/// 32-bit code points without a format change — see SPEC_FULL.md's Open
/// Question on kerning above `0xFFFF`.
#[derive(Debug, Clone, Default)]
pub struct KernTable {
    pairs: Vec<(u64, i32)>,
}

fn pack_kern_key(left: u32, right: u32) -> u64 {
    ((left as u64) << 32) | (right as u64)
}

impl KernTable {
    pub fn from_pairs(mut pairs: Vec<(u32, u32, i32)>) -> Self {
        pairs.retain(|&(_, _, v)| v != 0);
        let mut packed: Vec<(u64, i32)> = pairs
            .into_iter()
            .map(|(l, r, v)| (pack_kern_key(l, r), v))
            .collect();
        packed.sort_by_key(|&(k, _)| k);
        packed.dedup_by_key(|&mut (k, _)| k);
        KernTable { pairs: packed }
    }

    pub fn lookup(&self, left: u32, right: u32) -> Option<i32> {
        let key = pack_kern_key(left, right);
        self.pairs
            .binary_search_by_key(&key, |&(k, _)| k)
            .ok()
            .map(|i| self.pairs[i].1)
    }

    pub fn is_sorted_and_deduped(&self) -> bool {
        self.pairs.windows(2).all(|w| w[0].0 < w[1].0)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Font-wide metrics produced by [`load_font`] / [`load_font_from_str`].
#[derive(Debug, Clone)]
pub struct FontMetrics {
    pub name: String,
    pub widths: Vec<i32>,
    pub r2l_adjusts: Vec<i32>,
    pub heights: Option<Vec<i32>>,
    pub kerns: KernTable,
    pub utr: Vec<utr::UtrTranslation>,
    pub encoding: Option<HashMap<String, u32>>,
    pub high_tree: HashMap<String, u32>,
    pub flags: FontFlags,
    pub ascent: i32,
    pub descent: i32,
    pub cap_height: i32,
    pub italic_angle: i32,
    pub stem_v: i32,
    pub bbox: [i32; 4],
}

impl FontMetrics {
    pub fn width(&self, code: usize) -> i32 {
        self.widths.get(code).copied().unwrap_or(-1)
    }

    /// Apply the soft-hyphen invariant (spec §4.1: "character 173 (soft
    /// hyphen) if unset inherits the width of character 45").
    fn finish(&mut self) {
        if self.flags.standard_encoding && self.widths[173] == -1 {
            self.widths[173] = self.widths[45];
            self.r2l_adjusts[173] = self.r2l_adjusts[45];
        }
    }
}

/// Parse an in-memory AFM (+ optional UTR) pair into a [`FontMetrics`].
/// Separated from [`load_font`] so tests and callers with already-read
/// bytes don't need a filesystem round-trip.
pub fn load_font_from_str(
    name: &str,
    afm_path: &str,
    afm_text: &str,
    utr_path_and_text: Option<(&str, &str)>,
) -> Result<FontMetrics, PmwError> {
    let parsed = afm::parse_afm(afm_path, afm_text)?;

    let mut encoding_override: HashMap<String, u32> = HashMap::new();
    let mut utr_translations = Vec::new();
    if let Some((utr_path, utr_text)) = utr_path_and_text {
        let (utr_data, softerrors) = utr::parse_utr(utr_path, utr_text)?;
        for e in &softerrors {
            log::warn!("{e}");
        }
        encoding_override = utr_data.encoding;
        utr_translations = utr_data.translations;
    }

    let mut widths = vec![-1i32; FONTWIDTHS_SIZE];
    let mut r2l_adjusts = vec![0i32; FONTWIDTHS_SIZE];
    let mut high_tree: HashMap<String, u32> = HashMap::new();

    for m in &parsed.metrics {
        let idx = afm::resolve_index(
            m.name.as_deref(),
            m.code,
            parsed.header.standard_encoding,
            &encoding_override,
            &mut high_tree,
        );
        if idx < FONTWIDTHS_SIZE {
            widths[idx] = m.width;
            r2l_adjusts[idx] = m.r2l_adjust;
        }
    }

    let kerns = KernTable::from_pairs(
        parsed
            .kerns
            .iter()
            .map(|k| (k.left, k.right, k.value))
            .collect(),
    );

    let mut metrics = FontMetrics {
        name: name.to_string(),
        widths,
        r2l_adjusts,
        heights: None,
        kerns,
        utr: utr_translations,
        encoding: if encoding_override.is_empty() {
            None
        } else {
            Some(encoding_override)
        },
        high_tree,
        flags: FontFlags {
            standard_encoding: parsed.header.standard_encoding,
            fixed_pitch: parsed.header.fixed_pitch,
            include_in_output: true,
            used: false,
            used_lower_half: false,
            used_upper_half: false,
        },
        ascent: parsed.header.ascent,
        descent: parsed.header.descent,
        cap_height: parsed.header.cap_height,
        italic_angle: parsed.header.italic_angle,
        stem_v: parsed.header.stem_v,
        bbox: parsed.header.bbox,
    };
    metrics.finish();
    Ok(metrics)
}

/// Search a colon-separated path for `<name>.afm` (and, optionally,
/// `<name>.utr`), then load it (spec §4.1: "Contract: `load_font(name,
/// extras, default_dirs) -> FontStruct`").
pub fn load_font(name: &str, search_dirs: &[PathBuf]) -> Result<FontMetrics, PmwError> {
    let afm_path = find_on_path(search_dirs, name, "afm")
        .ok_or_else(|| PmwError::MissingFont(name.to_string()))?;
    let afm_text = fs::read_to_string(&afm_path).map_err(|e| PmwError::MalformedAfm {
        path: afm_path.display().to_string(),
        reason: e.to_string(),
    })?;

    let utr_path = find_on_path(search_dirs, name, "utr");
    let utr_text = utr_path
        .as_ref()
        .and_then(|p| fs::read_to_string(p).ok());

    let afm_path_str = afm_path.display().to_string();
    match (&utr_path, &utr_text) {
        (Some(up), Some(ut)) => {
            load_font_from_str(name, &afm_path_str, &afm_text, Some((&up.display().to_string(), ut)))
        }
        _ => load_font_from_str(name, &afm_path_str, &afm_text, None),
    }
}

fn find_on_path(dirs: &[PathBuf], name: &str, ext: &str) -> Option<PathBuf> {
    for dir in dirs {
        let candidate: PathBuf = Path::new(dir).join(format!("{name}.{ext}"));
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// A font-instance: a font's metrics plus a point size and (if rotated) a
/// 2x2 matrix with its sin/cos cached for backend trig (spec §4.1
/// "Rotation").
#[derive(Debug, Clone, Copy)]
pub struct FontInst {
    pub size: i32,
    pub matrix: [[f64; 2]; 2],
    pub sin: f64,
    pub cos: f64,
}

impl FontInst {
    pub fn plain(size: i32) -> Self {
        FontInst {
            size,
            matrix: [[1.0, 0.0], [0.0, 1.0]],
            sin: 0.0,
            cos: 1.0,
        }
    }
}

/// `rotate_font(inst, angle_millidegrees) -> FontInst` (spec §4.1):
/// multiply the instance's matrix by the rotation matrix and cache the
/// sin/cos of the angle for backend inline trig.
pub fn rotate_font(inst: FontInst, angle_millidegrees: i32) -> FontInst {
    let radians = (angle_millidegrees as f64 / 1000.0).to_radians();
    let (s, c) = radians.sin_cos();
    let rot = [[c, -s], [s, c]];
    let mut out = [[0.0; 2]; 2];
    for i in 0..2 {
        for j in 0..2 {
            out[i][j] = inst.matrix[i][0] * rot[0][j] + inst.matrix[i][1] * rot[1][j];
        }
    }
    FontInst {
        size: inst.size,
        matrix: out,
        sin: s,
        cos: c,
    }
}
