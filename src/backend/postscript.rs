//! PostScript output backend (spec §4.10, §6 "PostScript output").
//!
//! Emits inline `setfont`/`moveto`/`show`; dashes and caps map directly
//! onto PostScript graphics-state operators; colour uses
//! `setrgbcolor`/`setgray`. Memoises graphics state so repeated calls with
//! the same colour/dash/cap don't re-emit redundant operators, matching
//! the teacher's buffered-writer idiom in its output adapters.

use super::{BarlineKind, CapStyle, LineStyle, OutputBackend, PmwString, Rgb};
use std::fmt::Write as _;

const PS_HEADER: &str = "%!PS-Adobe-3.0\n%%Pages: (atend)\n";

pub struct PostScriptBackend {
    buf: String,
    current_colour: Option<Rgb>,
    current_dash: Option<(i32, i32)>,
    current_caps: Option<CapStyle>,
    save_depth: u32,
}

impl PostScriptBackend {
    pub fn new() -> Self {
        let mut buf = String::new();
        buf.push_str(PS_HEADER);
        PostScriptBackend {
            buf,
            current_colour: None,
            current_dash: None,
            current_caps: None,
            save_depth: 0,
        }
    }

    pub fn finish(mut self) -> String {
        self.buf.push_str("%%EOF\n");
        self.buf
    }

    pub fn output(&self) -> &str {
        &self.buf
    }
}

impl Default for PostScriptBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputBackend for PostScriptBackend {
    fn draw_string(&mut self, s: &PmwString, x: i32, y: i32, size: i32) -> (i32, i32) {
        let mut cur_x = x;
        for (font, run) in s.font_runs() {
            let text: String = run.iter().map(|c| (c.code as u8) as char).collect();
            let _ = writeln!(
                self.buf,
                "/F{font} findfont {size} scalefont setfont {cur_x} {y} moveto ({text}) show"
            );
            cur_x += run.len() as i32 * size;
        }
        (cur_x, y)
    }

    fn draw_musch(&mut self, x: i32, y: i32, id: u32, size: i32) {
        let _ = writeln!(
            self.buf,
            "/Fmusic findfont {size} scalefont setfont {x} {y} moveto ({:04x}) show",
            id
        );
    }

    fn draw_beam(&mut self, x0: i32, x1: i32, y: i32, level: i32, thickness: i32) {
        let yoff = y + level * 3000;
        let _ = writeln!(
            self.buf,
            "{x0} {yoff} moveto {x1} {yoff} lineto {thickness} setlinewidth stroke"
        );
    }

    fn draw_barline(&mut self, x: i32, y_top: i32, y_bot: i32, kind: BarlineKind, magn: i32) {
        let style = match kind {
            BarlineKind::Single => "single",
            BarlineKind::Dotted => "dotted",
            BarlineKind::Double => "double",
            BarlineKind::Thick => "thick",
            BarlineKind::Ending => "ending",
        };
        let _ = writeln!(
            self.buf,
            "% barline {style} magn={magn}\n{x} {y_top} moveto {x} {y_bot} lineto stroke"
        );
    }

    fn draw_brace(&mut self, x: i32, y_top: i32, y_bot: i32, magn: i32) {
        let span = (y_bot - y_top).abs();
        let scale = ((span + 16 * magn) * 23 / 12000).min(110);
        let bow = scale * 200;
        let _ = writeln!(
            self.buf,
            "{x} {y_top} moveto {} {} {} {} {x} {y_bot} curveto stroke",
            x - bow,
            y_top + span / 3,
            x - bow,
            y_bot - span / 3
        );
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
            let _ = writeln!(self.buf, "{left_x} {ly} moveto {right_x} {ly} lineto stroke");
        }
    }

    fn draw_slur(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, below: bool, control_offset: i32) {
        let sign = if below { -1 } else { 1 };
        let co = sign * control_offset;
        let _ = writeln!(
            self.buf,
            "{x0} {y0} moveto {x0} {} {x1} {} {x1} {y1} curveto stroke",
            y0 + co,
            y1 + co
        );
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, thickness: i32, style: LineStyle) {
        match style {
            LineStyle::Dashed => self.set_dash(3000, 3000),
            LineStyle::Dotted => self.set_dash(100, 300),
            _ => self.set_dash(0, 0),
        }
        let _ = writeln!(
            self.buf,
            "{thickness} setlinewidth {x0} {y0} moveto {x1} {y1} lineto stroke"
        );
    }

    fn draw_lines(&mut self, points: &[(i32, i32)], thickness: i32) {
        if points.is_empty() {
            return;
        }
        let _ = writeln!(self.buf, "{thickness} setlinewidth {} {} moveto", points[0].0, points[0].1);
        for (x, y) in &points[1..] {
            let _ = writeln!(self.buf, "{x} {y} lineto");
        }
        self.buf.push_str("stroke\n");
    }

    fn draw_path(&mut self, points: &[(i32, i32)], closed: bool) {
        self.draw_lines(points, 1000);
        if closed {
            self.buf.push_str("closepath stroke\n");
        }
    }

    fn draw_abspath(&mut self, points: &[(i32, i32)]) {
        self.draw_path(points, false);
    }

    fn save(&mut self) {
        self.save_depth += 1;
        self.buf.push_str("gsave\n");
    }

    fn restore(&mut self) {
        self.save_depth = self.save_depth.saturating_sub(1);
        self.buf.push_str("grestore\n");
    }

    fn set_dash(&mut self, dash: i32, gap: i32) {
        if self.current_dash == Some((dash, gap)) {
            return;
        }
        self.current_dash = Some((dash, gap));
        if dash == 0 {
            self.buf.push_str("[] 0 setdash\n");
        } else {
            let _ = writeln!(self.buf, "[{dash} {gap}] 0 setdash");
        }
    }

    fn set_caps(&mut self, style: CapStyle) {
        if self.current_caps == Some(style) {
            return;
        }
        self.current_caps = Some(style);
        let n = match style {
            CapStyle::Butt => 0,
            CapStyle::Round => 1,
            CapStyle::Square => 2,
        };
        let _ = writeln!(self.buf, "{n} setlinecap");
    }

    fn set_colour(&mut self, rgb: Rgb) {
        if self.current_colour == Some(rgb) {
            return;
        }
        self.current_colour = Some(rgb);
        if rgb.r == rgb.g && rgb.g == rgb.b {
            let _ = writeln!(self.buf, "{} setgray", rgb.r);
        } else {
            let _ = writeln!(self.buf, "{} {} {} setrgbcolor", rgb.r, rgb.g, rgb.b);
        }
    }

    fn get_colour(&self) -> Rgb {
        self.current_colour.unwrap_or(Rgb { r: 0.0, g: 0.0, b: 0.0 })
    }

    fn rotate(&mut self, radians: f64) {
        let degrees = radians.to_degrees();
        let _ = writeln!(self.buf, "{degrees} rotate");
    }

    fn translate(&mut self, x: i32, y: i32) {
        let _ = writeln!(self.buf, "{x} {y} translate");
    }

    fn start_bar(&mut self, abs_bar: u32, stave: u32) {
        let _ = writeln!(self.buf, "% bar {abs_bar} stave {stave}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_written_at_construction() {
        let ps = PostScriptBackend::new();
        assert!(ps.output().starts_with("%!PS-Adobe-3.0"));
    }

    #[test]
    fn redundant_colour_change_is_suppressed() {
        let mut ps = PostScriptBackend::new();
        let len_before_first = {
            ps.set_colour(Rgb { r: 1.0, g: 0.0, b: 0.0 });
            ps.output().len()
        };
        let len_after_repeat = {
            ps.set_colour(Rgb { r: 1.0, g: 0.0, b: 0.0 });
            ps.output().len()
        };
        assert_eq!(len_before_first, len_after_repeat);
    }

    #[test]
    fn gsave_grestore_are_balanced() {
        let mut ps = PostScriptBackend::new();
        ps.save();
        ps.save();
        ps.restore();
        assert_eq!(ps.save_depth, 1);
    }

    #[test]
    fn barline_emits_kind_comment() {
        let mut ps = PostScriptBackend::new();
        ps.draw_barline(0, 0, 8000, BarlineKind::Double, 1000);
        assert!(ps.output().contains("double"));
    }
}
