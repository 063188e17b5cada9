//! PDF output backend (spec §4.10, §6 "PDF output").
//!
//! Maintains its own object table by hand rather than depending on a PDF
//! authoring crate (no example repo's dependency table carries one; this
//! keeps the same "hand-rolled, explicit buffer per object" texture the
//! teacher's adapters use for other serialisation formats). Objects are
//! numbered in emission order; the trailer's `/ID` pair is an MD5 digest
//! over every object body's bytes, computed once at `finish()`.

use super::{BarlineKind, CapStyle, LineStyle, OutputBackend, PmwString, Rgb};
use std::fmt::Write as _;

/// Four high-code PMW-Music wide stave characters that must be remapped
/// down to just after the last positive-width character before the font's
/// widths array is serialized, to avoid a huge zero-width run in the PDF
/// font object (spec §9 "wide-stave remapping").
const WIDE_STAVE_CODES: [u32; 4] = [0xE3A0, 0xE3A1, 0xE3A2, 0xE3A3];

/// Move the wide-stave codes immediately after `last_positive_width_code`
/// in a widths table represented as `(code, width)` pairs, preserving
/// every other entry's relative order. Must be re-run every output pass
/// because user font substitution can change which codes are in use
/// (spec §9, Open Question "wide-stave remapping is dynamic each run").
pub fn adjust_wide_stave_table(
    widths: &mut Vec<(u32, i32)>,
    last_positive_width_code: u32,
) {
    let mut wide_entries: Vec<(u32, i32)> = Vec::new();
    widths.retain(|&(code, width)| {
        if WIDE_STAVE_CODES.contains(&code) {
            wide_entries.push((code, width));
            false
        } else {
            true
        }
    });
    wide_entries.sort_by_key(|&(code, _)| code);
    let insert_at = widths
        .iter()
        .position(|&(code, _)| code > last_positive_width_code)
        .unwrap_or(widths.len());
    for (i, entry) in wide_entries.into_iter().enumerate() {
        widths.insert(insert_at + i, entry);
    }
}

struct Obj {
    body: Vec<u8>,
}

pub struct PdfBackend {
    objects: Vec<Obj>,
    current_stream: usize,
    text_open: bool,
    pending_et: bool,
    current_colour: Option<Rgb>,
    current_dash: Option<(i32, i32)>,
}

impl PdfBackend {
    pub fn new() -> Self {
        let mut backend = PdfBackend {
            objects: Vec::new(),
            current_stream: 0,
            text_open: false,
            pending_et: false,
            current_colour: None,
            current_dash: None,
        };
        backend.push_object(b"<< /Type /Catalog /Pages 3 0 R >>".to_vec());
        backend.push_object(b"<< /Creator (pmw) /CreationDate (D:19700101000000Z) >>".to_vec());
        backend.push_object(b"<< /Type /Pages /Kids [] /Count 0 >>".to_vec());
        backend.push_object(b"<< /Font << >> >>".to_vec());
        backend.current_stream = backend.push_object(Vec::new());
        backend
    }

    fn push_object(&mut self, body: Vec<u8>) -> usize {
        self.objects.push(Obj { body });
        self.objects.len() - 1
    }

    fn stream_mut(&mut self) -> &mut Vec<u8> {
        &mut self.objects[self.current_stream].body
    }

    /// Write a non-text drawing op, closing any lazily-open `BT ... ET`
    /// block first.
    fn write_stream(&mut self, s: &str) {
        self.close_text_block_if_pending_incompatible();
        self.stream_mut().extend_from_slice(s.as_bytes());
    }

    /// Write within the current (possibly freshly opened) text block
    /// without closing it.
    fn write_text_stream(&mut self, s: &str) {
        self.stream_mut().extend_from_slice(s.as_bytes());
    }

    fn close_text_block_if_pending_incompatible(&mut self) {
        // Non-text ops must close any lazily-open `BT ... ET` block first.
        if self.text_open {
            self.objects[self.current_stream]
                .body
                .extend_from_slice(b"ET\n");
            self.text_open = false;
            self.pending_et = false;
        }
    }

    /// Byte offset of each object in emission order, as would be recorded
    /// in the xref table.
    pub fn object_offsets(&self) -> Vec<usize> {
        let mut offset = 0;
        let mut out = Vec::with_capacity(self.objects.len());
        for obj in &self.objects {
            out.push(offset);
            offset += obj.body.len();
        }
        out
    }

    /// MD5 over every object body's bytes, used for the trailer `/ID` pair.
    pub fn compute_id(&self) -> [u8; 16] {
        let mut ctx = md5::Context::new();
        for obj in &self.objects {
            ctx.consume(&obj.body);
        }
        ctx.compute().0
    }

    pub fn finish(self) -> Vec<u8> {
        let id = self.compute_id();
        let mut out = Vec::new();
        out.extend_from_slice(b"%PDF-2.0\n");
        for (i, obj) in self.objects.iter().enumerate() {
            out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
            out.extend_from_slice(&obj.body);
            out.extend_from_slice(b"\nendobj\n");
        }
        let id_hex: String = id.iter().map(|b| format!("{b:02x}")).collect();
        out.extend_from_slice(format!("trailer << /ID [ <{id_hex}> <{id_hex}> ] >>\n").as_bytes());
        out
    }
}

impl Default for PdfBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputBackend for PdfBackend {
    fn draw_string(&mut self, s: &PmwString, x: i32, y: i32, size: i32) -> (i32, i32) {
        if !self.text_open {
            self.write_stream("BT\n");
            self.text_open = true;
        }
        let mut cur_x = x;
        for (font, run) in s.font_runs() {
            let text: String = run.iter().map(|c| (c.code as u8) as char).collect();
            let line = format!("/F{font} {size} Tf {cur_x} {y} Td ({text}) Tj\n");
            self.write_text_stream(&line);
            cur_x += run.len() as i32 * size;
        }
        self.pending_et = true;
        (cur_x, y)
    }

    fn draw_musch(&mut self, x: i32, y: i32, id: u32, size: i32) {
        let s = PmwString(vec![super::PmwChar::new(1, 0, id)]);
        self.draw_string(&s, x, y, size);
    }

    fn draw_beam(&mut self, x0: i32, x1: i32, y: i32, level: i32, thickness: i32) {
        let yoff = y + level * 3000;
        let line = format!("{thickness} w\n{x0} {yoff} m {x1} {yoff} l S\n");
        self.write_stream(&line);
    }

    fn draw_barline(&mut self, x: i32, y_top: i32, y_bot: i32, kind: BarlineKind, magn: i32) {
        let width = match kind {
            BarlineKind::Thick => magn,
            BarlineKind::Dotted => magn / 5,
            _ => 3 * magn / 20,
        };
        let line = format!("{width} w\n{x} {y_top} m {x} {y_bot} l S\n");
        self.write_stream(&line);
    }

    fn draw_brace(&mut self, x: i32, y_top: i32, y_bot: i32, magn: i32) {
        let span = (y_bot - y_top).abs();
        let scale = ((span + 16 * magn) * 23 / 12000).min(110);
        let bow = scale * 200;
        let line = format!(
            "{x} {y_top} m {} {} {} {} {x} {y_bot} c S\n",
            x - bow,
            y_top + span / 3,
            x - bow,
            y_bot - span / 3
        );
        self.write_stream(&line);
    }

    fn draw_bracket(&mut self, x: i32, y_top: i32, y_bot: i32, magn: i32) {
        self.draw_musch(x, y_top, super::mftable::BRACKET_TOP_GLYPH, magn);
        let middle = super::mftable::expand(super::mftable::VirtualChar::BracketMiddle)[0].char as u32;
        let span = (y_top - y_bot).abs();
        let stride = (span.min(16 * magn) - 1000).max(1000);
        let step = if y_bot < y_top { -stride } else { stride };
        let mut y = y_top + step;
        while (step < 0 && y > y_bot) || (step > 0 && y < y_bot) {
            self.draw_musch(x, y, middle, magn);
            y += step;
        }
        self.draw_musch(x, y_bot, super::mftable::BRACKET_BOTTOM_GLYPH, magn);
    }

    fn draw_stave(&mut self, left_x: i32, y: i32, right_x: i32, lines: u32) {
        for i in 0..lines {
            let ly = y + i as i32 * 2000;
            let line = format!("{left_x} {ly} m {right_x} {ly} l S\n");
            self.write_stream(&line);
        }
    }

    fn draw_slur(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, below: bool, control_offset: i32) {
        let sign = if below { -1 } else { 1 };
        let co = sign * control_offset;
        let line = format!(
            "{x0} {y0} m {x0} {} {x1} {} {x1} {y1} c S\n",
            y0 + co,
            y1 + co
        );
        self.write_stream(&line);
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, thickness: i32, style: LineStyle) {
        match style {
            LineStyle::Dashed => self.set_dash(3000, 3000),
            LineStyle::Dotted => self.set_dash(100, 300),
            _ => self.set_dash(0, 0),
        }
        let line = format!("{thickness} w\n{x0} {y0} m {x1} {y1} l S\n");
        self.write_stream(&line);
    }

    fn draw_lines(&mut self, points: &[(i32, i32)], thickness: i32) {
        if points.is_empty() {
            return;
        }
        let mut s = format!("{thickness} w\n{} {} m\n", points[0].0, points[0].1);
        for (x, y) in &points[1..] {
            let _ = writeln!(s, "{x} {y} l");
        }
        s.push_str("S\n");
        self.write_stream(&s);
    }

    fn draw_path(&mut self, points: &[(i32, i32)], closed: bool) {
        self.draw_lines(points, 1000);
        if closed {
            self.write_stream("h S\n");
        }
    }

    fn draw_abspath(&mut self, points: &[(i32, i32)]) {
        self.draw_path(points, false);
    }

    fn save(&mut self) {
        self.write_stream("q\n");
    }

    fn restore(&mut self) {
        self.write_stream("Q\n");
    }

    fn set_dash(&mut self, dash: i32, gap: i32) {
        if self.current_dash == Some((dash, gap)) {
            return;
        }
        self.current_dash = Some((dash, gap));
        let line = if dash == 0 {
            "[] 0 d\n".to_string()
        } else {
            format!("[{dash} {gap}] 0 d\n")
        };
        self.write_stream(&line);
    }

    fn set_caps(&mut self, style: CapStyle) {
        let n = match style {
            CapStyle::Butt => 0,
            CapStyle::Round => 1,
            CapStyle::Square => 2,
        };
        let line = format!("{n} J\n");
        self.write_stream(&line);
    }

    fn set_colour(&mut self, rgb: Rgb) {
        if self.current_colour == Some(rgb) {
            return;
        }
        self.current_colour = Some(rgb);
        let line = if rgb.r == rgb.g && rgb.g == rgb.b {
            format!("{} g\n", rgb.r)
        } else {
            format!("{} {} {} rg\n", rgb.r, rgb.g, rgb.b)
        };
        self.write_stream(&line);
    }

    fn get_colour(&self) -> Rgb {
        self.current_colour.unwrap_or(Rgb { r: 0.0, g: 0.0, b: 0.0 })
    }

    fn rotate(&mut self, radians: f64) {
        let (s, c) = radians.sin_cos();
        let line = format!("{c} {s} {} {c} 0 0 cm\n", -s);
        self.write_stream(&line);
    }

    fn translate(&mut self, x: i32, y: i32) {
        let line = format!("1 0 0 1 {x} {y} cm\n");
        self.write_stream(&line);
    }

    fn start_bar(&mut self, abs_bar: u32, stave: u32) {
        let line = format!("%% bar {abs_bar} stave {stave}\n");
        self.write_stream(&line);
    }
}
