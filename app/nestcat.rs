//! Command-line interface for nestcat.
//!
//! Walks a file, archive or directory and prints every document found,
//! however it is compressed or archived.

use clap::{Parser, ValueEnum};
use nestcat::{NestcatBuilder, NestcatError, NestcatOptions, Visitor, output};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::exit;
use tracing_subscriber::EnvFilter;

/// nestcat: print every document inside files, archives and compressed streams
#[derive(Parser)]
#[command(name = "nestcat", version, about, long_about = None)]
struct Cli {
    /// A single file, an archive, or a directory of either
    root: PathBuf,

    /// Regular expression that must match whole file names and archive entry names
    #[arg(short = 'f', long)]
    filter: Option<String>,

    /// Log a progress line after every COUNT documents
    #[arg(short = 'r', long = "report", value_name = "COUNT")]
    report_interval: Option<usize>,

    /// Glob patterns to prune from the directory walk (can be repeated)
    #[arg(short = 'I', long = "ignore")]
    ignore_patterns: Vec<String>,

    /// Max depth (unlimited if not set)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Follow symlinks
    #[arg(long)]
    follow_links: bool,

    /// Skip hidden files
    #[arg(long)]
    no_hidden: bool,

    /// Honour .gitignore files
    #[arg(long)]
    gitignore: bool,

    /// Skip documents larger than this many bytes
    #[arg(long, value_name = "BYTES")]
    size_limit: Option<u64>,

    /// Skip ZIP archives larger than this many bytes (they are buffered whole)
    #[arg(long, value_name = "BYTES")]
    container_limit: Option<u64>,

    /// Load options from a JSON file; flags given here take precedence
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Pretty JSON output
    #[arg(short, long)]
    pretty: bool,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Paths,
    Text,
    Json,
}

impl From<OutputFormat> for output::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Paths => output::OutputFormat::Paths,
            OutputFormat::Text => output::OutputFormat::Text,
            OutputFormat::Json => output::OutputFormat::Json,
        }
    }
}

impl Cli {
    fn into_options(self) -> Result<(NestcatOptions, OutputFormat, bool), NestcatError> {
        let base = match &self.config {
            Some(path) => NestcatOptions::from_json_file(path)?,
            None => NestcatOptions::default(),
        };
        let mut builder = NestcatBuilder::from_options(NestcatOptions {
            root: self.root,
            ..base
        });
        if let Some(filter) = self.filter {
            builder = builder.filter(filter);
        }
        if let Some(every) = self.report_interval {
            builder = builder.report_interval(every);
        }
        if !self.ignore_patterns.is_empty() {
            builder = builder.ignore_patterns(self.ignore_patterns);
        }
        if let Some(depth) = self.max_depth {
            builder = builder.max_depth(depth);
        }
        if self.follow_links {
            builder = builder.follow_links(true);
        }
        if self.no_hidden {
            builder = builder.include_hidden(false);
        }
        if self.gitignore {
            builder = builder.respect_gitignore(true);
        }
        if self.size_limit.is_some() {
            builder = builder.document_size_limit(self.size_limit);
        }
        if self.container_limit.is_some() {
            builder = builder.container_size_limit(self.container_limit);
        }
        Ok((builder.build(), self.format, self.pretty))
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "nestcat=debug" } else { "nestcat=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let (options, format, pretty) = match cli.into_options() {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    };
    let mut visitor = match Visitor::new(options) {
        Ok(visitor) => visitor,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let format = output::OutputFormat::from(format);
    let summary = match visitor
        .visit(|document| output::write_document(&mut handle, document, format, pretty))
    {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Failed to write output: {}", e);
            exit(1);
        }
    };
    if let Err(e) = handle.flush() {
        eprintln!("Failed to write output: {}", e);
        exit(1);
    }
    tracing::info!(
        "done: {} documents from {} files, {} failed, {} filtered",
        summary.delivered,
        summary.candidates,
        summary.failed,
        summary.filtered
    );
}
