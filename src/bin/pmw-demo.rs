//! Command-line driver that lays out a small built-in score and emits it
//! as PostScript or PDF (spec §6 "CLI-level process-wide state").

use clap::{Parser, ValueEnum};
use pmw::backend::pdf::PdfBackend;
use pmw::backend::postscript::PostScriptBackend;
use pmw::backend::OutputBackend;
use pmw::bar_item::{
    AccentFlags, Bar, BarItem, BarlineData, BarlineStyle, HeadStyle, NoteData, NoteType, StemFlag,
};
use pmw::bar_setter::set_bar;
use pmw::config::{LayoutConfig, NoteContext};
use pmw::contstr::ContState;
use pmw::diagnostics::Diagnostics;
use pmw::note::RenderOp;
use pmw::page_setter::{HeadBlock, HeadLine, Page, PageElement, SystemBlock};
use pmw::pitch::{AbsPitch, Accidental, AccidentalKind, StavePitch};
use std::path::PathBuf;
use std::process;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Ps,
    Pdf,
}

/// Lay out and render the built-in demo score.
#[derive(Parser, Debug)]
#[command(name = "pmw-demo", about = "Render a built-in demo score to PostScript or PDF", version)]
struct Cli {
    /// Output format.
    #[arg(short, long, value_enum, default_value = "ps")]
    format: Format,

    /// Output file path (default: stdout for PostScript, required for PDF).
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    configure_logging(&cli);

    let mut diagnostics = Diagnostics::new();
    let bar = build_c_major_scale_bar();

    let mut cont = ContState::new();
    cont.clef = "treble".into();
    cont.key = "C".into();
    let ctx = NoteContext {
        font_size: 10_000,
        accidental_left: 3_000,
        stem_up: true,
        up_factor: 1,
        stem_length: 7_000,
        ..Default::default()
    };

    let result = set_bar(&bar, 0, &mut cont, None, &ctx, 1000, 1, true, &mut diagnostics);
    if cli.verbose {
        log::debug!("laid out bar: width={} drew_barline={}", result.bar_width, result.drew_barline);
    }

    let page = Page {
        number: 1,
        top_space: 40_000,
        elements: vec![
            PageElement::Heading(HeadBlock {
                lines: vec![HeadLine::Text {
                    left: String::new(),
                    middle: "C major scale".into(),
                    right: String::new(),
                    space: 15_000,
                }],
                is_page_heading: true,
            }),
            PageElement::System(SystemBlock {
                depth: result.bar_width.max(20_000),
                no_advance: false,
            }),
        ],
        footing: None,
    };
    let config = LayoutConfig::default();
    let page_result = pmw::page_setter::set_page(&page, &config, None, 400_000, true);
    if cli.verbose {
        log::debug!("page bounding box: {:?}", page_result.bbox);
    }

    let bytes = match cli.format {
        Format::Ps => {
            let mut backend = PostScriptBackend::new();
            emit_ops(&mut backend, &result.ops);
            backend.finish().into_bytes()
        }
        Format::Pdf => {
            let mut backend = PdfBackend::new();
            emit_ops(&mut backend, &result.ops);
            backend.finish()
        }
    };

    match &cli.output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, &bytes) {
                eprintln!("Error: failed to write output file: {e}");
                process::exit(3);
            }
            if !cli.quiet {
                eprintln!("Score written to: {}", path.display());
            }
        }
        None => match cli.format {
            Format::Ps => {
                print!("{}", String::from_utf8_lossy(&bytes));
            }
            Format::Pdf => {
                eprintln!("Error: --output is required for PDF (binary output can't go to stdout)");
                process::exit(1);
            }
        },
    }

    if !cli.quiet && diagnostics.has_soft_errors() {
        eprintln!("Warnings:");
        for entry in diagnostics.entries() {
            eprintln!("  {entry}");
        }
    }

    process::exit(diagnostics.exit_code());
}

fn configure_logging(cli: &Cli) {
    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();
}

fn emit_ops(backend: &mut impl OutputBackend, ops: &[RenderOp]) {
    for op in ops {
        match *op {
            RenderOp::MusicChar { x, y, id, size } => backend.draw_musch(x, y, id, size),
            RenderOp::Stem { x, y0, y1 } => {
                backend.draw_line(x, y0, x, y1, 300, pmw::backend::LineStyle::Plain)
            }
            RenderOp::LedgerLine { x0, x1, y } => {
                backend.draw_line(x0, y, x1, y, 300, pmw::backend::LineStyle::Plain)
            }
            RenderOp::Dot { x, y } => backend.draw_musch(x, y, 0xE1E7, 10_000),
            RenderOp::Bracket { x, y, left } => backend.draw_bracket(
                x,
                y - 4_000,
                y + 4_000,
                if left { 1000 } else { 950 },
            ),
            RenderOp::Accent { x, y, code } => backend.draw_musch(x, y, code, 8_000),
            RenderOp::Curve { x0, y0, x1, y1, below, control_offset } => {
                backend.draw_slur(x0, y0, x1, y1, below, control_offset)
            }
            RenderOp::Hairpin { x0, x1, y, crescendo } => backend.draw_hairpin(x0, x1, y, crescendo),
            RenderOp::EndingBracket { x0, x1, y, jog } => backend.draw_nth_time_ending(x0, x1, y, jog),
            RenderOp::Rule { x0, y0, x1, y1 } => {
                backend.draw_line(x0, y0, x1, y1, 150, pmw::backend::LineStyle::Plain)
            }
        }
    }
}

/// C4 through C5 as crotchets in a single 4/4-ish demo bar, every scale
/// degree taking a turn as stem-up quarter notes.
fn build_c_major_scale_bar() -> Bar {
    let mut bar = Bar::new(0);
    let pitches = [(0, 0), (2, 0), (4, 0), (5, 0), (7, 0), (9, 0), (11, 0), (12, 0)];
    for (abs, extra) in pitches {
        bar.push(BarItem::Note(NoteData {
            note_type: NoteType::Crotchet,
            masquerade: None,
            stem: StemFlag::Up,
            head_style: HeadStyle::Normal,
            abspitch: AbsPitch(60 + abs),
            stave_pitch: StavePitch(32 + extra),
            duration: 24,
            stem_length_delta: 0,
            accidental: Accidental::None,
            accidental_kind: AccidentalKind::Plain,
            accents: AccentFlags::empty(),
            yextra: 0,
        }));
    }
    bar.push(BarItem::Barline(BarlineData {
        style: BarlineStyle::Single,
        repeat_left: false,
        repeat_right: false,
    }));
    bar
}
