//! CLI tool for docpanel - previews a file the way the panel would
//!
//! Usage:
//!   docpanel_cli <file>                   # Print the visible text
//!   docpanel_cli <book.xlsx> --json       # Print the sheet grid as JSON
//!   docpanel_cli <book.xlsx> --sheet 2    # Show the third sheet
//!   docpanel_cli <file.pdf> --search-template 'https://duckduckgo.com/?q={query}'
//!   docpanel_cli <file> --config panel.json   # PanelConfig overrides

use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use futures::executor::LocalPool;

use docpanel::clipboard::ClipboardStrategy;
use docpanel::outline::{DocxOutline, PptxOutline};
use docpanel::runtime::ImmediateTimer;
use docpanel::{
    Action, MemoryClipboard, MemoryMount, MountPoint, OfficeWorkbookParser, PanelConfig, PanelServices,
    RenderCapability, RenderState, SearchFallback, Size, TargetFile, ViewStateController,
};

#[derive(Parser, Debug)]
#[command(name = "docpanel_cli", version, about = "Preview a document the way the panel renders it")]
struct Args {
    /// File to preview
    file: PathBuf,

    /// Print the spreadsheet grid as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Zero-based sheet index to show
    #[arg(long)]
    sheet: Option<usize>,

    /// JSON file with panel configuration overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Search URL template containing {query}
    #[arg(long = "search-template")]
    search_template: Option<String>,

    /// Log pipeline events to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> docpanel::Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => PanelConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => PanelConfig::default(),
    };
    if let Some(template) = &args.search_template {
        config.search_url_template.clone_from(template);
    }
    config.validate()?;
    // A terminal has nowhere to show a search frame.
    config.sheet_auto_fallback = false;
    let search = SearchFallback::new(config.search_url_template.clone());

    let mut pool = LocalPool::new();
    let clipboard: Vec<Rc<dyn ClipboardStrategy>> = vec![Rc::new(MemoryClipboard::new())];
    let services = PanelServices::new(
        config,
        Rc::new(pool.spawner()),
        Rc::new(ImmediateTimer::new()),
        Rc::new(DocxOutline),
        Rc::new(PptxOutline),
        Rc::new(OfficeWorkbookParser),
        clipboard,
    );
    let panel = MemoryMount::new(Size::new(1280.0, 800.0), 1280.0);
    let controller = ViewStateController::new(panel.clone(), services);

    let target = TargetFile::from_path(&args.file);
    controller.open()?;
    controller.retarget(target.clone())?;
    pool.run_until_stalled();

    if controller.mode() == Some(RenderCapability::SearchOnly) {
        println!("{}", search.build_query(&target));
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(index) = args.sheet {
        controller.handle(Action::SelectSheet(index))?;
    }

    if controller.state() == RenderState::Error {
        eprintln!("{}", panel.visible_text());
        return Ok(ExitCode::FAILURE);
    }

    if args.json {
        let Some(grid) = controller.with_sheet(|view| view.grid()) else {
            eprintln!("--json needs a spreadsheet");
            return Ok(ExitCode::FAILURE);
        };
        println!("{}", serde_json::to_string_pretty(&grid)?);
    } else {
        eprintln!("{}", controller.title());
        println!("{}", panel.visible_text());
    }
    Ok(ExitCode::SUCCESS)
}
