mod config;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::debug;

use config::Config;

#[derive(Parser)]
#[command(name = "mdpress")]
#[command(version, about = "Render Markdown with math to preview HTML and office-friendly exports")]
struct Cli {
    /// Config file (defaults to $MDPRESS_CONFIG, then ./mdpress.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the preview HTML
    Preview {
        #[command(flatten)]
        io: IoArgs,
        /// Skip the HTML sanitizer
        #[arg(long)]
        raw: bool,
    },
    /// Print the preview's tables as JSON
    Tables {
        #[command(flatten)]
        io: IoArgs,
    },
    /// Print the spreadsheet layout of the preview's tables as JSON
    Sheet {
        #[command(flatten)]
        io: IoArgs,
    },
    /// Write a Word-compatible HTML document
    Word {
        #[command(flatten)]
        io: IoArgs,
        #[arg(long)]
        title: Option<String>,
    },
    /// Write a standalone page for printing or long-image capture
    Print {
        #[command(flatten)]
        io: IoArgs,
        /// Syntax-highlight fenced code blocks
        #[arg(long)]
        highlight: bool,
        #[arg(long)]
        title: Option<String>,
    },
    /// Print the clipboard plain-text projection
    Text {
        #[command(flatten)]
        io: IoArgs,
    },
}

#[derive(Args)]
struct IoArgs {
    /// Input Markdown file (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Output file (writes stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::discover(cli.config.as_deref())?;
    let preview_options = config.preview_options();

    let (io, output) = match cli.command {
        Command::Preview { io, raw } => {
            let mut options = preview_options;
            if raw {
                options.sanitize = false;
            }
            let html = mdpress_core::render_preview(&read_input(&io)?, &options);
            (io, html)
        }
        Command::Tables { io } => {
            let html = mdpress_core::render_preview(&read_input(&io)?, &preview_options);
            let tables = mdpress_core::extract_tables(&html);
            let json = serde_json::to_string_pretty(&tables).context("failed to encode tables")?;
            (io, json)
        }
        Command::Sheet { io } => {
            let html = mdpress_core::render_preview(&read_input(&io)?, &preview_options);
            let layout = mdpress_export::sheet_layout(&html, &config.sheet_options())?;
            let json =
                serde_json::to_string_pretty(&layout).context("failed to encode sheet layout")?;
            (io, json)
        }
        Command::Word { io, title } => {
            let mut options = config.word_options();
            if let Some(title) = title {
                options.title = title;
            }
            let html = mdpress_core::render_preview(&read_input(&io)?, &preview_options);
            (io, mdpress_export::word_document(&html, &options))
        }
        Command::Print {
            io,
            highlight,
            title,
        } => {
            let mut options = config.print_options();
            options.highlight_code |= highlight;
            if let Some(title) = title {
                options.title = title;
            }
            let html = mdpress_core::render_preview(&read_input(&io)?, &preview_options);
            (io, mdpress_export::print_document(&html, &options))
        }
        Command::Text { io } => {
            let html = mdpress_core::render_preview(&read_input(&io)?, &preview_options);
            (io, mdpress_export::plain_text(&html))
        }
    };

    write_result(io.output.as_deref(), &output)
}

fn read_input(args: &IoArgs) -> Result<String> {
    match &args.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn write_result(output: Option<&Path>, contents: &str) -> Result<()> {
    match output {
        Some(path) => {
            mdpress_export::write_output(path, contents)
                .with_context(|| format!("failed to write {}", path.display()))?;
            debug!("output written to {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(contents.as_bytes())?;
            if !contents.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}
