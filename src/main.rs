//! redraft - Instruction-guided rewriting of text files and zip archives
//!
//! Main entry point for the command-line tool.
//!
//! # Overview
//!
//! This binary wires the library services to a clap command line. It initializes:
//! - Configuration loading ([`ConfigManager`]) from `Redraft Data/`
//! - Logging infrastructure (file rotation + console output)
//! - A current-thread tokio runtime; every completion request is awaited in turn
//! - The completion client and [`BatchProcessor`]
//!
//! # Commands
//!
//! - `edit <FILES>...`: rewrite loose files, writing `edited_<name>` copies or a zip
//! - `archive <ZIP>`: rewrite every text member of a zip into a new zip
//! - `preview <ZIP>`: show the first members of a zip
//! - `ask <MESSAGE>`: ask the editing assistant about files and instructions
//! - `models`: list selectable models
//!
//! Members that cannot be decoded or rewritten are reported in the summary; the
//! process only exits with an error when an input cannot be opened or the
//! configuration is invalid.

use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use redraft::models::MODEL_OPTIONS;
use redraft::services::archive::{PREVIEW_CHARS, PREVIEW_MEMBERS};
use redraft::services::{
    BatchProcessor, ChatSession, FileContext, edited_file_name, load_text_file, preview_archive,
};
use redraft::{APP_NAME, BatchResult, ConfigManager, RewriteService, Settings, VERSION};
use std::fs;

/// Output archive name used when none is given
const DEFAULT_ARCHIVE_OUTPUT: &str = "edited_project.zip";

#[derive(Parser, Debug)]
#[command(name = "redraft", version, about = "Rewrite files and zip archives with a chat-completion model")]
struct Cli {
    /// Directory holding `Redraft Settings.yaml` and logs
    #[arg(long, global = true, default_value = "Redraft Data")]
    config_dir: Utf8PathBuf,

    /// Model name; names outside the listed models are used as a custom model
    #[arg(long, global = true)]
    model: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rewrite one or more text files
    Edit {
        #[arg(required = true)]
        files: Vec<Utf8PathBuf>,

        /// Editing instruction (defaults to the configured instruction)
        #[arg(short, long)]
        instruction: Option<String>,

        /// Directory for `edited_<name>` files
        #[arg(long, default_value = ".")]
        out_dir: Utf8PathBuf,

        /// Write all edited files into this zip instead
        #[arg(long)]
        zip: Option<Utf8PathBuf>,
    },

    /// Rewrite every text file inside a zip archive
    Archive {
        archive: Utf8PathBuf,

        #[arg(short, long)]
        instruction: Option<String>,

        #[arg(short, long, default_value = DEFAULT_ARCHIVE_OUTPUT)]
        output: Utf8PathBuf,
    },

    /// Show the first members of a zip archive
    Preview { archive: Utf8PathBuf },

    /// Ask the editing assistant a question
    Ask {
        message: String,

        /// Files to describe to the assistant
        #[arg(long, num_args = 1..)]
        files: Vec<Utf8PathBuf>,

        #[arg(short, long)]
        instruction: Option<String>,
    },

    /// List selectable models
    Models,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(&cli.config_dir)?;

    let log_guard = redraft::logging::setup_logging(
        &config_manager.config_dir().join("logs"),
        APP_NAME,
        cli.debug,
        true,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let mut settings = config_manager.load_settings()?;
    if settings.debug_mode && !cli.debug {
        log_guard.set_debug(true)?;
    }
    apply_model_override(&mut settings, cli.model.as_deref());

    // One request in flight at a time, so a single-threaded runtime is enough
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let result = runtime.block_on(run(cli.command, settings));

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}

fn apply_model_override(settings: &mut Settings, model: Option<&str>) {
    let Some(model) = model.map(str::trim).filter(|m| !m.is_empty()) else {
        return;
    };

    if MODEL_OPTIONS.contains(&model) {
        settings.model = model.to_string();
        settings.custom_model = None;
    } else {
        settings.custom_model = Some(model.to_string());
    }
}

async fn run(command: Command, settings: Settings) -> Result<()> {
    match command {
        Command::Edit {
            files,
            instruction,
            out_dir,
            zip,
        } => {
            let instruction = instruction.unwrap_or_else(|| settings.instruction.clone());
            edit_files(&settings, &files, &instruction, &out_dir, zip.as_deref()).await
        }
        Command::Archive {
            archive,
            instruction,
            output,
        } => {
            let instruction = instruction.unwrap_or_else(|| settings.instruction.clone());
            edit_archive(&settings, &archive, &instruction, &output).await
        }
        Command::Preview { archive } => preview(&archive),
        Command::Ask {
            message,
            files,
            instruction,
        } => {
            let instruction = instruction.unwrap_or_else(|| settings.instruction.clone());
            ask(&settings, &message, &files, &instruction).await
        }
        Command::Models => {
            list_models(&settings);
            Ok(())
        }
    }
}

fn batch_processor(settings: &Settings) -> Result<BatchProcessor> {
    let client = redraft::client_from_settings(settings)?;
    if client.is_none() {
        eprintln!("Please set OPENAI_API_KEY (or api_key in the settings file) to use redraft.");
    }
    Ok(BatchProcessor::new(RewriteService::new(client, settings)))
}

fn display_name(path: &Utf8Path) -> String {
    path.file_name()
        .map(str::to_string)
        .unwrap_or_else(|| path.to_string())
}

/// Load loose input files keyed by file name.
///
/// A later input whose file name is already taken is left out with a warning,
/// since its `edited_<name>` output would overwrite the first one.
fn load_inputs(paths: &[Utf8PathBuf]) -> IndexMap<String, String> {
    let mut files = IndexMap::new();
    for path in paths {
        let name = display_name(path);
        if files.contains_key(&name) {
            tracing::warn!("Skipping {}: another input is already named {}", path, name);
            eprintln!("Skipping {}: another input is already named {}", path, name);
            continue;
        }

        match load_text_file(path) {
            Ok(text) => {
                files.insert(name, text);
            }
            Err(e) => {
                tracing::error!("Failed to read file {}: {}", path, e);
                eprintln!("Failed to read file {}: {}", path, e);
            }
        }
    }
    files
}

async fn edit_files(
    settings: &Settings,
    paths: &[Utf8PathBuf],
    instruction: &str,
    out_dir: &Utf8Path,
    zip: Option<&Utf8Path>,
) -> Result<()> {
    let files = load_inputs(paths);
    if files.is_empty() {
        bail!("No file(s) to edit");
    }

    println!(
        "Loaded {} file(s): {}",
        files.len(),
        files.keys().cloned().collect::<Vec<_>>().join(", ")
    );

    let result = batch_processor(settings)?
        .process_files(&files, instruction)
        .await;
    report(&result);

    if result.is_empty() {
        return Ok(());
    }

    match zip {
        Some(zip_path) => {
            write_archive(&result, zip_path)?;
        }
        None => {
            fs::create_dir_all(out_dir)
                .with_context(|| format!("Failed to create output directory: {}", out_dir))?;
            for (name, text) in &result.edited {
                let target = out_dir.join(edited_file_name(name));
                fs::write(&target, text)
                    .with_context(|| format!("Failed to write {}", target))?;
                println!("Wrote {}", target);
            }
        }
    }

    Ok(())
}

async fn edit_archive(
    settings: &Settings,
    archive: &Utf8Path,
    instruction: &str,
    output: &Utf8Path,
) -> Result<()> {
    let bytes = fs::read(archive).with_context(|| format!("Failed to read zip file: {}", archive))?;

    let result = batch_processor(settings)?
        .process_archive(&bytes, instruction)
        .await
        .with_context(|| format!("Failed to read zip file: {}", archive))?;
    report(&result);

    if !result.is_empty() {
        write_archive(&result, output)?;
    }
    Ok(())
}

fn write_archive(result: &BatchResult, output: &Utf8Path) -> Result<()> {
    let bytes = result.to_archive()?;
    fs::write(output, bytes).with_context(|| format!("Failed to write {}", output))?;
    println!("Wrote {} ({} files)", output, result.len());
    Ok(())
}

fn report(result: &BatchResult) {
    let summary = result.summary();
    println!("Edited {} of {} file(s): {}", summary.edited, summary.total(), summary.summary());

    for outcome in result.problems() {
        println!("  {:?} {}: {}", outcome.status, outcome.name, outcome.message);
    }
}

fn preview(archive: &Utf8Path) -> Result<()> {
    let bytes = fs::read(archive).with_context(|| format!("Failed to read zip file: {}", archive))?;
    let previews = preview_archive(&bytes, PREVIEW_MEMBERS, PREVIEW_CHARS)
        .with_context(|| format!("Failed to read zip file: {}", archive))?;

    let total = redraft::services::list_members(&bytes)?.len();
    println!("{} ({} files, showing {})", archive, total, previews.len());
    for preview in previews {
        println!("\n== {}\n{}", preview.name, preview.text);
    }
    Ok(())
}

async fn ask(
    settings: &Settings,
    message: &str,
    paths: &[Utf8PathBuf],
    instruction: &str,
) -> Result<()> {
    let client = redraft::client_from_settings(settings)?;
    let mut session = ChatSession::editing(settings.effective_model());

    let context = if paths.is_empty() {
        FileContext::None
    } else {
        let names: Vec<String> = paths.iter().map(|p| display_name(p)).collect();
        let selected = load_text_file(&paths[0])
            .ok()
            .map(|text| (names[0].clone(), text));
        FileContext::Files { names, selected }
    };

    let reply = session
        .send_with_context(client.as_deref(), message, &context, instruction)
        .await?;
    println!("{}", reply);
    Ok(())
}

fn list_models(settings: &Settings) {
    let current = settings.effective_model();
    for model in MODEL_OPTIONS {
        let marker = if *model == current { "*" } else { " " };
        println!("{} {}", marker, model);
    }
    if settings.has_custom_model() {
        println!("* {} (custom)", current);
    }
}
