//! docsmith: publish markdown into remote documents, whole or one section at a time.
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use docsmith::compiler::{CompileOptions, Script};
use docsmith::config::Config;
use docsmith::publish;
use docsmith::service::GoogleDocs;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "docsmith")]
#[command(author, version, about = "Markdown to remote document publisher", long_about = None)]
struct Cli {
    /// Path to configuration file (defaults to docsmith.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a markdown file and print the edit script without touching any document
    Compile {
        /// Markdown source
        file: PathBuf,

        /// Position the script should start at
        #[arg(long, default_value_t = 1)]
        at: u32,
    },

    /// Replace the whole body of a document
    Write {
        /// Document to overwrite
        document_id: String,
        /// Markdown source
        file: PathBuf,
    },

    /// Append to the end of a document
    Append {
        document_id: String,
        file: PathBuf,
    },

    /// Replace the content under a heading, keeping the heading itself
    ReplaceSection {
        document_id: String,
        /// Heading text, matched without regard to case
        title: String,
        file: PathBuf,
    },

    /// Delete a heading and everything nested under it
    DeleteSection {
        document_id: String,
        title: String,
    },

    /// List the document's sections
    Sections {
        document_id: String,

        /// List sections in document order instead of nesting them
        #[arg(long)]
        flat: bool,
    },

    /// Find text, ignoring case
    Search {
        document_id: String,
        query: String,

        /// Only search inside this section
        #[arg(long)]
        section: Option<String>,
    },

    /// Replace every occurrence of some text, ignoring case
    Replace {
        document_id: String,
        find: String,
        replacement: String,

        /// Only replace inside this section
        #[arg(long)]
        section: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cfg = Config::load(cli.config.as_deref()).context("loading configuration")?;
    let options = CompileOptions::from(&cfg);

    match cli.command {
        Commands::Compile { file, at } => print_json(&load_script(&file, &options)?.rebased(at)?),
        Commands::Write { document_id, file } => {
            let script = load_script(&file, &options)?;
            let report = publish::write_document(&mut remote(&cfg)?, &document_id, script)?;
            print_json(&report)
        }
        Commands::Append { document_id, file } => {
            let script = load_script(&file, &options)?;
            let report = publish::append_document(&mut remote(&cfg)?, &document_id, script)?;
            print_json(&report)
        }
        Commands::ReplaceSection {
            document_id,
            title,
            file,
        } => {
            let script = load_script(&file, &options)?;
            let report =
                publish::replace_section(&mut remote(&cfg)?, &document_id, &title, script)?;
            print_json(&report)
        }
        Commands::DeleteSection { document_id, title } => {
            let removed = publish::delete_section(&mut remote(&cfg)?, &document_id, &title)?;
            print_json(&removed)
        }
        Commands::Sections { document_id, flat } => {
            print_json(&publish::list_sections(&remote(&cfg)?, &document_id, flat)?)
        }
        Commands::Search {
            document_id,
            query,
            section,
        } => {
            let matches =
                publish::find_text(&remote(&cfg)?, &document_id, &query, section.as_deref())?;
            print_json(&matches)
        }
        Commands::Replace {
            document_id,
            find,
            replacement,
            section,
        } => {
            let replaced = publish::replace_text(
                &mut remote(&cfg)?,
                &document_id,
                &find,
                &replacement,
                section.as_deref(),
            )?;
            print_json(&serde_json::json!({ "replaced": replaced }))
        }
    }
}

fn remote(cfg: &Config) -> docsmith::Result<GoogleDocs> {
    Ok(GoogleDocs::new(cfg.api_base.clone(), cfg.access_token()?))
}

fn load_script(path: &Path, options: &CompileOptions) -> anyhow::Result<Script> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(publish::compile_markdown(&source, options)?)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
