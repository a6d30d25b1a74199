// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Command-line interface for dce2md.
//!
//! This binary exports a Discord channel with DiscordChatExporter (or reads an
//! existing export) and writes a compressed Markdown digest of it.

use dce2md::document::{self, Banner, DocumentOptions};
use dce2md::exporter::{self, ExportConfig};
use dce2md::{compressor, parser};
use lexopt::prelude::*;
use snafu::{OptionExt, ensure, prelude::*};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Environment variable holding the Discord token.
const TOKEN_VAR: &str = "DISCORD_TOKEN";

/// Where to write the rendered digest.
#[derive(Clone)]
enum OutputTarget {
    /// Write to the specified file.
    File(PathBuf),
    /// Write to stdout.
    Stdout,
}

/// Where the export JSON comes from.
enum Source {
    /// A file or directory that already holds an export.
    Existing(PathBuf),
    /// A fresh container export of this channel.
    Export(ExportConfig),
}

#[allow(clippy::struct_excessive_bools)]
struct Cli {
    channel_id: Option<String>,
    input: Option<PathBuf>,
    output: OutputTarget,
    export_dir: PathBuf,
    token: Option<String>,
    image: Option<String>,
    banner: Banner,
    heading_offset: u8,
    quiet: bool,
    verbose: bool,
    dry_run: bool,
    force: bool,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("failed to read {what} from stdin: {source}"))]
    Prompt {
        what: &'static str,
        source: std::io::Error,
    },

    #[snafu(display("channel ID cannot be empty"))]
    EmptyChannelId,

    #[snafu(display("{TOKEN_VAR} not set and no token entered"))]
    MissingToken,

    #[snafu(display("failed to create {}: {source}", path.display()))]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("{source}"))]
    Export { source: exporter::ExportError },

    #[snafu(display("no JSON export found in {}", dir.display()))]
    NoExportFound { dir: PathBuf },

    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to parse {}: {source}", path.display()))]
    ParseFile {
        path: PathBuf,
        source: parser::ParseError,
    },

    #[snafu(display("failed to write {}: {source}", path.display()))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn print_help() {
    println!(
        "\
{name} {version}
Export a Discord channel and compress it into a Markdown digest

Usage: {name} [OPTIONS] [CHANNEL_ID]

Arguments:
  [CHANNEL_ID]  Channel to export (prompted for if omitted)

Options:
  -i, --input <PATH>        Use an existing export file, or the newest export in a directory
  -o, --output <FILE>       Digest file (default: team_chat.md, - for stdout)
      --export-dir <DIR>    Directory receiving exports (default: team_chat)
  -t, --token <TOKEN>       Discord token (default: ${token_var}, then prompt)
      --image <IMAGE>       Exporter image (default: {image})
      --banner <STYLE>      Title style: channel or plain (default: channel)
      --heading-offset <N>  Shift heading levels by N (0-5, default: 0)

Other options:
  -q, --quiet               Suppress progress messages
  -v, --verbose             Show debug logging
  -n, --dry-run             Show what would be done without exporting or writing
  -f, --force               Overwrite an existing digest
  -h, --help                Print help
  -V, --version             Print version",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        token_var = TOKEN_VAR,
        image = exporter::DEFAULT_IMAGE,
    );
}

fn parse_args() -> Result<Cli, lexopt::Error> {
    let mut channel_id = None;
    let mut input = None;
    let mut output = OutputTarget::File(PathBuf::from("team_chat.md"));
    let mut export_dir = PathBuf::from("team_chat");
    let mut token = None;
    let mut image = None;
    let mut banner = Banner::default();
    let mut heading_offset: u8 = 0;
    let mut quiet = false;
    let mut verbose = false;
    let mut dry_run = false;
    let mut force = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Short('i') | Long("input") => input = Some(parser.value()?.parse()?),
            Short('o') | Long("output") => {
                let val: PathBuf = parser.value()?.parse()?;
                output = if val == Path::new("-") {
                    OutputTarget::Stdout
                } else {
                    OutputTarget::File(val)
                };
            }
            Long("export-dir") => export_dir = parser.value()?.parse()?,
            Short('t') | Long("token") => token = Some(parser.value()?.string()?),
            Long("image") => image = Some(parser.value()?.string()?),
            Long("banner") => {
                banner = parser.value()?.string()?.parse::<Banner>()?;
            }
            Long("heading-offset") => {
                let val: u8 = parser
                    .value()?
                    .parse()
                    .map_err(|_| "heading-offset must be a number 0-5")?;
                if val > 5 {
                    return Err("heading-offset must be 0-5".into());
                }
                heading_offset = val;
            }
            Short('q') | Long("quiet") => quiet = true,
            Short('v') | Long("verbose") => verbose = true,
            Short('n') | Long("dry-run") => dry_run = true,
            Short('f') | Long("force") => force = true,
            Short('h') | Long("help") => {
                print_help();
                std::process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            Value(val) if channel_id.is_none() => channel_id = Some(val.string()?),
            _ => return Err(arg.unexpected()),
        }
    }

    Ok(Cli {
        channel_id,
        input,
        output,
        export_dir,
        token,
        image,
        banner,
        heading_offset,
        quiet,
        verbose,
        dry_run,
        force,
    })
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() -> Result<(), Error> {
    // A missing .env file is fine; the token may come from elsewhere.
    dotenvy::dotenv().ok();

    let cli = parse_args().context(ParseArgsSnafu)?;
    init_logging(&cli);

    step(&cli, "Starting Discord conversation export and compression");

    if let OutputTarget::File(path) = &cli.output
        && !cli.dry_run
        && path.exists()
        && !cli.force
    {
        skip_existing(path);
        return Ok(());
    }

    let source = resolve_source(&cli)?;
    let (json_path, channel_id) = match source {
        Source::Existing(path) => (find_export(&path, &cli)?, channel_arg(&cli)),
        Source::Export(config) => {
            if cli.dry_run {
                eprintln!(
                    "Would export channel {} into {} using {}",
                    config.channel_id,
                    config.output_dir.display(),
                    config.image
                );
                return Ok(());
            }
            run_export(&config, &cli)?;
            (
                find_export(&config.output_dir, &cli)?,
                Some(config.channel_id),
            )
        }
    };

    step(&cli, "Reading conversation data...");
    let json = std::fs::read_to_string(&json_path).context(ReadFileSnafu { path: &json_path })?;
    let conversation =
        parser::parse_conversation(&json).context(ParseFileSnafu { path: &json_path })?;
    done(&cli, "Successfully loaded conversation data");

    step(&cli, "Compressing conversation...");
    let summary = compressor::compress_conversation(&conversation);
    done(&cli, &format!("Compressed {} messages", summary.message_count));

    let channel_id = channel_id
        .or_else(|| conversation.channel.as_ref()?.id.clone())
        .unwrap_or_else(|| "unknown".to_owned());
    let opts = DocumentOptions {
        banner: cli.banner,
        heading_offset: cli.heading_offset,
    };
    let markdown = document::render_document(&summary, &channel_id, chrono::Local::now(), &opts);

    write_output(&markdown, &cli)
}

/// Decides whether to read an existing export or run a new one.
fn resolve_source(cli: &Cli) -> Result<Source, Error> {
    if let Some(input) = &cli.input {
        return Ok(Source::Existing(input.clone()));
    }

    let channel_id = match channel_arg(cli) {
        Some(id) => id,
        None => prompt("Enter the Discord channel ID").context(PromptSnafu {
            what: "channel ID",
        })?,
    };
    ensure!(!channel_id.is_empty(), EmptyChannelIdSnafu);

    let token = match cli.token.clone().or_else(token_from_env) {
        Some(token) => token,
        None => prompt("Enter your Discord token").context(PromptSnafu { what: "token" })?,
    };
    ensure!(!token.is_empty(), MissingTokenSnafu);

    let mut config = ExportConfig::new(channel_id, token, absolute(&cli.export_dir));
    if let Some(image) = &cli.image {
        config.image.clone_from(image);
    }
    Ok(Source::Export(config))
}

/// The positional channel ID, trimmed; blank counts as absent.
fn channel_arg(cli: &Cli) -> Option<String> {
    cli.channel_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
}

fn token_from_env() -> Option<String> {
    std::env::var(TOKEN_VAR)
        .ok()
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
}

/// Docker bind mounts need an absolute host path.
fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Checks Docker and runs the exporter into the configured directory.
fn run_export(config: &ExportConfig, cli: &Cli) -> Result<(), Error> {
    step(
        cli,
        &format!("Setting up output directory: {}", config.output_dir.display()),
    );
    std::fs::create_dir_all(&config.output_dir).context(CreateDirSnafu {
        path: &config.output_dir,
    })?;
    done(cli, "Output directory ready");

    step(cli, "Checking if Docker is installed and running...");
    exporter::check_docker().context(ExportSnafu)?;
    done(cli, "Docker is ready");

    step(cli, &format!("Exporting Discord channel {}...", config.channel_id));
    exporter::export_channel(config).context(ExportSnafu)?;
    done(cli, "Successfully exported Discord channel");
    Ok(())
}

/// Resolves a file or directory to the export file to read.
fn find_export(path: &Path, cli: &Cli) -> Result<PathBuf, Error> {
    if !path.is_dir() {
        return Ok(path.to_path_buf());
    }

    step(cli, "Looking for exported Discord data...");
    let latest = exporter::latest_export(path)
        .context(ExportSnafu)?
        .context(NoExportFoundSnafu { dir: path })?;
    done(
        cli,
        &format!(
            "Found export file: {}",
            latest.file_name().unwrap_or_default().to_string_lossy()
        ),
    );
    Ok(latest)
}

/// Writes the digest to its destination, honoring dry-run and force.
fn write_output(markdown: &str, cli: &Cli) -> Result<(), Error> {
    match &cli.output {
        OutputTarget::Stdout => {
            if cli.dry_run {
                eprintln!("Would output digest");
            } else {
                print!("{markdown}");
            }
        }
        OutputTarget::File(path) => {
            if cli.dry_run {
                eprintln!("Would write {}", path.display());
                return Ok(());
            }
            if path.exists() && !cli.force {
                skip_existing(path);
                return Ok(());
            }

            step(cli, &format!("Writing compressed summary to {}", path.display()));
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).context(CreateDirSnafu { path: parent })?;
            }
            std::fs::write(path, markdown).context(WriteFileSnafu { path })?;
            debug!(path = %path.display(), bytes = markdown.len(), "wrote digest");
            done(
                cli,
                &format!("Successfully wrote conversation summary to {}", path.display()),
            );
        }
    }
    Ok(())
}

fn skip_existing(path: &Path) {
    eprintln!(
        "Skipping {} (already exists, use --force to overwrite)",
        path.display()
    );
}

/// Reads one trimmed line from stdin after printing a prompt.
fn prompt(label: &str) -> std::io::Result<String> {
    let mut stderr = std::io::stderr();
    write!(stderr, "{label}: ")?;
    stderr.flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_owned())
}

fn step(cli: &Cli, message: &str) {
    if !cli.quiet {
        eprintln!("\n==> {message}");
    }
}

fn done(cli: &Cli, message: &str) {
    if !cli.quiet {
        eprintln!("✓ {message}");
    }
}
