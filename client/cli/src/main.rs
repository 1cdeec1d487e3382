mod terminal_output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::debug;

use matriq_api::PipelineRepository;
use matriq_config::Config;
use matriq_core::{NoticeKind, Pipeline, UiEvent};
use matriq_transport::HttpTransport;
use matriq_workflow::{CreateFlow, DetailSession, FilePicker, ListController};

use terminal_output::{note_error, note_info, note_success, render_result_card, render_table, Column};

#[derive(Parser)]
#[command(name = "matriq")]
#[command(about = "MatriQ — scan material labels into inspection pipelines")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all pipelines
    Pipelines,
    /// Create a new pipeline
    Create {
        /// Display name, e.g. "SMT-A线"
        name: String,
    },
    /// Show one pipeline
    Show { id: String },
    /// Scan label images into a pipeline
    Scan {
        id: String,
        /// Image files to submit, in order
        images: Vec<PathBuf>,
    },
    /// Download the pipeline's spreadsheet
    Export {
        id: String,
        /// Output file; defaults to <code>_MatriQ.xlsx
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    debug!(base_url = %config.base_url, "using MatriQ service");
    let transport = Arc::new(HttpTransport::new(&config)?);

    match cli.command {
        Commands::Pipelines => list_pipelines(transport).await,
        Commands::Create { name } => create_pipeline(transport, &name).await,
        Commands::Show { id } => show_pipeline(transport, &config, &id).await,
        Commands::Scan { id, images } => scan_images(transport, &config, &id, &images).await,
        Commands::Export { id, output } => export_spreadsheet(transport, &id, output).await,
    }
}

/// Forward workflow effects to the terminal as they arrive.
fn spawn_event_printer(mut rx: mpsc::UnboundedReceiver<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                UiEvent::Notice(notice) => match notice.kind {
                    NoticeKind::Success => note_success(&notice.message),
                    NoticeKind::Error => note_error(&notice.message),
                },
                UiEvent::NavigateBack => note_info("returning to the pipeline list"),
                UiEvent::NavigateToDetail { pipeline_id } => {
                    note_info(&format!("view it with: matriq show {pipeline_id}"));
                }
            }
        }
    })
}

fn pipeline_row(pipeline: &Pipeline) -> Vec<String> {
    vec![
        pipeline.code.clone(),
        pipeline.name.clone(),
        pipeline.created_at.format("%Y-%m-%d %H:%M").to_string(),
        pipeline.total_scans.to_string(),
    ]
}

async fn list_pipelines(transport: Arc<HttpTransport>) -> Result<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    let printer = spawn_event_printer(rx);
    let mut list = ListController::new(PipelineRepository::new(transport), tx);

    list.load().await;
    if list.pipelines().is_empty() {
        note_info("no pipelines yet — create one with: matriq create <name>");
    } else {
        let columns = vec![
            Column::left("Code"),
            Column::left("Name"),
            Column::left("Created"),
            Column::right("Scans"),
        ];
        let rows: Vec<Vec<String>> = list.pipelines().iter().map(pipeline_row).collect();
        print!("{}", render_table(&columns, &rows));
    }

    drop(list);
    printer.await.ok();
    Ok(())
}

async fn create_pipeline(transport: Arc<HttpTransport>, name: &str) -> Result<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    let printer = spawn_event_printer(rx);
    let mut flow = CreateFlow::new(PipelineRepository::new(transport), tx);

    let created = flow.submit(name).await?;
    drop(flow);
    printer.await.ok();

    match created {
        Some(pipeline) => {
            println!("{} ({})", pipeline.name, pipeline.code);
            Ok(())
        }
        None => bail!("pipeline was not created"),
    }
}

async fn show_pipeline(transport: Arc<HttpTransport>, config: &Config, id: &str) -> Result<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    let printer = spawn_event_printer(rx);
    let mut session = DetailSession::new(id, transport, config, tx);

    let loaded = session.load().await;
    drop(session);
    printer.await.ok();

    if !loaded {
        bail!("could not load pipeline {id}");
    }
    Ok(())
}

async fn scan_images(
    transport: Arc<HttpTransport>,
    config: &Config,
    id: &str,
    images: &[PathBuf],
) -> Result<()> {
    if images.is_empty() {
        bail!("no image files given");
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let printer = spawn_event_printer(rx);
    let mut session = DetailSession::new(id, transport, config, tx);

    if !session.load().await {
        drop(session);
        printer.await.ok();
        bail!("could not load pipeline {id}");
    }

    for path in images {
        let before = session.results().len();
        let capture = session.capture();
        // A failed scan retains its image for resubmission; this run moves
        // on to the next file instead.
        capture.cancel();
        capture.choose_image(&FilePicker::new(path)).await;
        capture.submit().await?;
        if session.results().len() > before {
            if let Some(result) = session.results().first() {
                print!("{}", render_result_card(&result.display_fields()));
            }
        }
    }

    let total = session.results().len();
    note_info(&format!("{total} of {} image(s) recognized this session", images.len()));

    session.teardown();
    drop(session);
    printer.await.ok();
    Ok(())
}

async fn export_spreadsheet(
    transport: Arc<HttpTransport>,
    id: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let repo = PipelineRepository::new(transport);
    let pipeline = repo.get(id).await.map_err(|e| anyhow::anyhow!(e.message()))?;
    let bytes = repo.export(id).await.map_err(|e| anyhow::anyhow!(e.message()))?;

    let path = output.unwrap_or_else(|| PathBuf::from(format!("{}_MatriQ.xlsx", pipeline.code)));
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    note_success(&format!("exported {} bytes to {}", bytes.len(), path.display()));
    Ok(())
}
