//! clause-review
//!
//! Terminal front end for reviewing analysed legal documents:
//!
//! - `analyze`: upload a document to the analysis service
//! - `render`: show the annotated document and its findings
//! - `review`: apply scripted decisions and print the change report
//! - `diff`: compare two versions of a document line by line

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use clause_engine::ReviewSession;
use clause_types::AnalysisResult;
use review_client::{ClientConfig, HttpBackend, ReviewController, StepStatus, Upload};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod decisions;
mod view;

use decisions::{apply_step, DecisionFile};

/// Command-line arguments for clause-review
#[derive(Parser, Debug)]
#[command(name = "clause-review")]
#[command(about = "Review missing and corrupted clauses in analysed documents")]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a document for analysis
    Analyze {
        #[arg(short, long)]
        file: PathBuf,

        /// Client configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Where to write the analysis result
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print the annotated document and its findings
    Render {
        #[arg(short, long)]
        analysis: PathBuf,
    },

    /// Apply a decisions file and print the resulting changes
    Review {
        #[arg(short, long)]
        analysis: PathBuf,

        #[arg(short, long)]
        decisions: PathBuf,

        /// Where to write the completed document
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Compare an original document against a modified one
    Diff {
        #[arg(long)]
        original: PathBuf,

        #[arg(long)]
        modified: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match args.command {
        Command::Analyze { file, config, out } => {
            analyze(&file, config.as_deref(), out.as_deref()).await
        }
        Command::Render { analysis } => render(&analysis),
        Command::Review {
            analysis,
            decisions,
            out,
        } => review(&analysis, &decisions, out.as_deref()),
        Command::Diff { original, modified } => diff(&original, &modified),
    }
}

fn load_config(path: Option<&Path>) -> Result<ClientConfig> {
    let config = match path {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };
    Ok(config.with_env_override())
}

fn load_session(path: &Path) -> Result<ReviewSession> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read analysis: {}", path.display()))?;
    let result: AnalysisResult = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse analysis: {}", path.display()))?;
    Ok(ReviewSession::from_analysis(&result)?)
}

async fn analyze(file: &Path, config: Option<&Path>, out: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());

    info!(url = %config.url(&config.analyze_path), file = %filename, "Submitting document");
    let backend = HttpBackend::new(config.clone())?;
    let mut controller = ReviewController::new(backend, config);

    let session = controller
        .run_analysis(
            Upload::new(filename, bytes),
            Box::new(|percent: u8| debug!(percent, "upload progress")),
        )
        .await?;
    println!("{}", view::summary(&session.summary()));

    if let Some(mut progress) = controller.progress() {
        while progress.changed().await.is_ok() {
            let state = progress.borrow_and_update().clone();
            if let Some(step) = state
                .steps
                .iter()
                .rev()
                .find(|s| s.status == StepStatus::Complete)
            {
                eprintln!("[{:>3}%] {}", state.percent, step.name);
            }
            if state.is_complete() {
                break;
            }
        }
    }

    if let Some(session) = controller.session() {
        println!("{}", view::findings(session));
    }

    if let (Some(out), Some(result)) = (out, controller.analysis()) {
        let json = serde_json::to_string_pretty(result)?;
        std::fs::write(out, json)
            .with_context(|| format!("Failed to write {}", out.display()))?;
        info!(path = %out.display(), "Analysis written");
    }
    Ok(())
}

fn render(analysis: &Path) -> Result<()> {
    let session = load_session(analysis)?;
    println!("{}", view::annotated(&session));
    println!();
    println!("{}", view::findings(&session));
    println!("{}", view::summary(&session.summary()));
    Ok(())
}

fn review(analysis: &Path, decisions: &Path, out: Option<&Path>) -> Result<()> {
    let mut session = load_session(analysis)?;
    if session.filename().is_none() {
        if let Some(name) = analysis.file_stem() {
            session.set_filename(format!("{}.pdf", name.to_string_lossy()));
        }
    }

    let file = DecisionFile::from_file(decisions)?;
    let mut failed = 0;
    for (idx, step) in file.decisions.iter().enumerate() {
        match apply_step(&mut session, step) {
            Ok(message) => info!(step = idx + 1, "{}", message),
            Err(err) => {
                failed += 1;
                warn!(step = idx + 1, error = %err, "decision skipped");
            }
        }
    }

    println!("{}", view::summary(&session.summary()));
    println!();
    println!("{}", session.comparison_report(chrono::Utc::now()));

    if let Some(out) = out {
        std::fs::write(out, session.document().modified())
            .with_context(|| format!("Failed to write {}", out.display()))?;
        info!(path = %out.display(), "Completed document written");
    }

    if failed > 0 {
        bail!("{} of {} decisions could not be applied", failed, file.decisions.len());
    }
    Ok(())
}

fn diff(original: &Path, modified: &Path) -> Result<()> {
    let left = std::fs::read_to_string(original)
        .with_context(|| format!("Failed to read {}", original.display()))?;
    let right = std::fs::read_to_string(modified)
        .with_context(|| format!("Failed to read {}", modified.display()))?;

    let comparison = clause_engine::diff(&left, &right);
    println!("{}", view::dual(&comparison));
    println!();
    println!(
        "{} new lines, {} lines with defect markers",
        comparison.new_lines().count(),
        comparison.defect_lines().count()
    );
    Ok(())
}
