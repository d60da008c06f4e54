use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod config;
mod model;
mod parsers;
mod protocol;
mod services;

use config::TranslatorConfig;
use services::{encoding, pipeline, splitter};

/// Salon service menus to bilingual (English/Arabic) spreadsheets.
///
/// Without a subcommand, reads JSON requests line by line on stdin and answers
/// on stdout.
#[derive(Debug, Parser)]
#[command(author, version, bin_name = "salon-core")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve JSON-line requests on stdin/stdout.
    Serve,

    /// Convert a menu payload (JSON or saved booking page) into an .xlsx file.
    Export {
        /// Input file, or `-` to read stdin.
        input: PathBuf,

        /// Directory the workbook is written to.
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        #[command(flatten)]
        translator: TranslatorConfig,
    },

    /// Print the English and Arabic halves of a string.
    Split { text: String },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        None | Some(Command::Serve) => serve(),
        Some(Command::Export {
            input,
            out,
            translator,
        }) => export(&input, &out, &translator),
        Some(Command::Split { text }) => {
            let split = splitter::split_str(&text);
            println!("{}", serde_json::to_string(&split)?);
            Ok(())
        }
    }
}

// stdout carries protocol responses, so logs go to stderr.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn serve() -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };

        if line.trim().is_empty() {
            continue;
        }

        let result = std::panic::catch_unwind(|| protocol::handle(&line));

        let response = match result {
            Ok(resp) => resp,
            Err(_) => serde_json::json!({
                "status": "error",
                "message": "internal core error"
            })
            .to_string(),
        };

        if writeln!(stdout, "{response}").is_err() {
            break;
        }

        let _ = stdout.flush();
    }

    Ok(())
}

fn export(input: &Path, out: &Path, translator: &TranslatorConfig) -> Result<()> {
    let source = if input.as_os_str() == "-" {
        let mut bytes = Vec::new();
        io::stdin()
            .read_to_end(&mut bytes)
            .context("failed to read stdin")?;
        encoding::decode(&bytes)
    } else {
        encoding::read_text(input)?
    };

    let report = pipeline::run(&source, out, translator)
        .with_context(|| format!("failed to export {}", input.display()))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
