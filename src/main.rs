use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, LevelFilter, WriteLogger};

use glossa::event_source::TerminalEventSource;
use glossa::panic_handler;
use glossa::viewer::{DocumentSource, RenderEngine};
use glossa::{App, AppOptions, run_app_with_event_source};

/// Terminal PDF viewer with comments and annotations
#[derive(Parser, Debug)]
#[command(name = "glossa", version, about)]
struct Args {
    /// PDF file path or http(s) URL
    document: String,

    /// Page to open at (1-indexed)
    #[arg(long)]
    page: Option<usize>,

    /// Initial zoom factor, clamped to [0.25, 3.0]
    #[arg(long)]
    zoom: Option<f32>,

    /// Directory for comment store files (defaults to the platform data dir)
    #[arg(long)]
    comments_dir: Option<PathBuf>,

    /// Directory exports are written to
    #[arg(long, default_value = ".")]
    export_dir: PathBuf,

    /// Author name recorded on comments and annotations
    #[arg(long)]
    author: Option<String>,

    /// Log file path
    #[arg(long, default_value = "glossa.log")]
    log_file: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    WriteLogger::init(
        LevelFilter::Debug,
        Config::default(),
        File::create(&args.log_file)
            .with_context(|| format!("Failed to create log file {}", args.log_file.display()))?,
    )?;
    panic_handler::initialize_panic_handler();

    let source = if args.document.starts_with("http://") || args.document.starts_with("https://") {
        DocumentSource::Url(args.document.clone())
    } else {
        DocumentSource::Path(PathBuf::from(&args.document))
    };
    info!("opening {}", args.document);

    let options = AppOptions {
        author: args
            .author
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "anonymous".to_string()),
        comments_dir: args.comments_dir,
        export_dir: args.export_dir,
        start_page: args.page,
        start_zoom: args.zoom,
    };

    let mut app = App::new(build_engine()?, source, options)?;

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run_app_with_event_source(&mut terminal, &mut app, &mut TerminalEventSource);

    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

#[cfg(feature = "mupdf")]
fn build_engine() -> Result<Arc<dyn RenderEngine>> {
    Ok(Arc::new(glossa::viewer::MupdfEngine::new()))
}

#[cfg(not(feature = "mupdf"))]
fn build_engine() -> Result<Arc<dyn RenderEngine>> {
    anyhow::bail!("built without a rendering backend; rebuild with --features mupdf")
}
