//! folio - office document viewer core

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use folio::dom::ArenaDom;
use folio::{
    ChapterGrouper, DefaultResolver, DocumentConverter, DocumentKind, DocumentSource,
    DocxConverter, DocxRenderer, HtmlConverter, LoadRequest, Pagination, Viewer, ViewerConfig,
};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version, about = "Office document viewer core", long_about = None)]
#[command(after_help = "EXAMPLES:
    folio info report.docx               Show document kind and page count
    folio paginate report.docx --json    Print pages as JSON
    folio chapters report.docx --print   Print a printable HTML document")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the detected kind of a document
    Info {
        #[arg(value_name = "INPUT")]
        input: String,
    },
    /// Split a Word or HTML document into pages
    Paginate {
        #[arg(value_name = "INPUT")]
        input: String,

        /// Viewer configuration (JSON)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Print pages as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render a DOCX file and group its chapters
    Chapters {
        #[arg(value_name = "INPUT")]
        input: String,

        /// Start every chapter after the first on a new page
        #[arg(long)]
        force_breaks: bool,

        /// Print the printable HTML document instead of a summary
        #[arg(long)]
        print: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let result = match cli.command {
        Command::Info { input } => show_info(&input).await,
        Command::Paginate {
            input,
            config,
            json,
        } => paginate(&input, config.as_deref(), json).await,
        Command::Chapters {
            input,
            force_breaks,
            print,
        } => chapters(&input, force_breaks, print).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn is_html(input: &str) -> bool {
    let lower = input.to_ascii_lowercase();
    lower.ends_with(".html") || lower.ends_with(".htm")
}

fn load_config(path: Option<&Path>) -> Result<ViewerConfig, String> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("{}: {e}", path.display()))?;
            ViewerConfig::from_json(&json).map_err(|e| e.to_string())
        }
        None => Ok(ViewerConfig::default()),
    }
}

async fn show_info(input: &str) -> Result<(), String> {
    let source = DocumentSource::from_reference(input);
    let data = std::fs::read(input).map_err(|e| format!("{input}: {e}"))?;
    let kind = DocumentKind::detect(source.name_hint().as_deref(), None, &data);

    println!("File: {input}");
    println!("Size: {} bytes", data.len());
    match kind {
        Some(kind) => {
            println!("Kind: {kind}");
            println!("MIME type: {}", kind.mime_type());
        }
        None if is_html(input) => println!("Kind: html"),
        None => println!("Kind: unknown"),
    }

    if kind == Some(DocumentKind::Word) || is_html(input) {
        let pagination = run_pagination(input, ViewerConfig::default()).await?;
        println!("Mode: {:?}", pagination.mode);
        println!("Pages: {}", pagination.total_pages());
    }

    Ok(())
}

async fn paginate(input: &str, config: Option<&Path>, json: bool) -> Result<(), String> {
    let config = load_config(config)?;
    let pagination = run_pagination(input, config).await?;

    if json {
        let out = serde_json::to_string_pretty(&pagination).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    println!("Mode: {:?}", pagination.mode);
    if let Some(measurement) = pagination.measurement {
        println!("Measurement: {measurement:?}");
    }
    for page in &pagination.pages {
        println!(
            "\n--- page {}/{} ({} blocks, {:.0}px) ---",
            page.index,
            pagination.total_pages(),
            page.blocks.len(),
            page.height
        );
        println!("{}", page.html);
    }
    Ok(())
}

async fn run_pagination(input: &str, config: ViewerConfig) -> Result<Pagination, String> {
    let request =
        LoadRequest::new(DocumentSource::from_reference(input)).with_kind(DocumentKind::Word);
    if is_html(input) {
        load_pages(Viewer::new(config, DefaultResolver::new(), HtmlConverter), request).await
    } else {
        load_pages(Viewer::new(config, DefaultResolver::new(), DocxConverter), request).await
    }
}

async fn load_pages<C: DocumentConverter>(
    viewer: Viewer<DefaultResolver, C>,
    request: LoadRequest<'_>,
) -> Result<Pagination, String> {
    let outcome = viewer.load(request).await.map_err(|e| e.to_string())?;
    outcome
        .loaded()
        .and_then(|doc| doc.pagination)
        .ok_or_else(|| "load produced no pages".to_string())
}

async fn chapters(input: &str, force_breaks: bool, print: bool) -> Result<(), String> {
    let mut config = ViewerConfig::default();
    config.chapters.force_page_breaks = force_breaks;

    let renderer = DocxRenderer::new(&config.chapters);
    let grouper = ChapterGrouper::new(config.chapters.clone());
    let viewer = Viewer::new(config, DefaultResolver::new(), DocxConverter);

    let mut dom = ArenaDom::new();
    let container = dom.create_html_element("div", Vec::new());
    dom.append(dom.document(), container);

    let source = DocumentSource::from_reference(input);
    let outcome = viewer
        .load_rendered(&source, &renderer, &mut dom, container)
        .await
        .map_err(|e| e.to_string())?;
    let doc = outcome
        .loaded()
        .ok_or_else(|| "load was superseded".to_string())?;

    if print {
        println!("{}", grouper.print_document(&dom, container));
        return Ok(());
    }

    println!("Pages: {}", doc.state.total_pages());
    match doc.chapters {
        Some(layout) => {
            println!("Chapters: {}", layout.len());
            for (i, chapter) in layout.chapters.iter().enumerate() {
                println!(
                    "  {}. {} ({} nodes)",
                    i + 1,
                    dom.deep_text(chapter.heading).trim(),
                    chapter.members.len()
                );
            }
        }
        None => println!("Chapters: not grouped"),
    }
    Ok(())
}
