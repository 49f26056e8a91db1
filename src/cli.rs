//! Command-line interface for fieldscan.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::io::Read;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::config::{self, RegistryConfig};
use crate::detect::{default_scanner, Scanner};
use crate::remediate::{self, Unit};
use crate::report;
use crate::server;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Default extensions of ABAP source files.
const DEFAULT_EXTENSIONS: &[&str] = &["abap", "txt"];

/// Detect obsolete MARC/MARD fields in ABAP source.
///
/// Reports SELECT statements and TYPE/LIKE declarations that use fields
/// retired by SAP Note 2267246, with a suggested TODO comment for each.
#[derive(Parser)]
#[command(name = "fieldscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan ABAP files for obsolete field usage
    #[command(visible_alias = "check")]
    Scan(ScanArgs),
    /// Remediate a JSON array of units (file or stdin)
    Remediate(RemediateArgs),
    /// Serve the remediation API over HTTP
    Serve(ServeArgs),
    /// Write the built-in field registry as a config file
    Init(InitArgs),
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

/// Registry selection shared by the scanning commands.
#[derive(Args)]
pub struct ConfigArgs {
    /// Path to registry YAML file (default: auto-discover, else built-in)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the scan command.
#[derive(Parser)]
pub struct ScanArgs {
    /// Path to scan (file or directory)
    pub path: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// File extensions to scan
    #[arg(short, long, value_delimiter = ',', default_values_t = default_extensions())]
    pub ext: Vec<String>,

    /// Glob patterns for paths to skip (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,
}

/// Arguments for the remediate command.
#[derive(Parser)]
pub struct RemediateArgs {
    /// JSON file with an array of units ("-" or absent: stdin)
    pub input: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

/// Arguments for the serve command.
#[derive(Parser)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    pub addr: SocketAddr,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "fieldscan.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Install the tracing subscriber. Logs go to stderr.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build the scanner from `--config`, a discovered file, or the built-in table.
///
/// Returns the scanner and a label describing where the registry came from.
fn load_scanner(args: &ConfigArgs) -> anyhow::Result<(Scanner, String)> {
    let path = match &args.config {
        Some(p) => Some(p.clone()),
        None => config::discover(Path::new(".")),
    };

    match path {
        Some(path) => {
            let config = RegistryConfig::parse_file(&path)?;
            let scanner = Scanner::from_config(&config)
                .with_context(|| format!("loading {}", path.display()))?;
            tracing::debug!(config = %path.display(), "loaded field registry");
            Ok((scanner, path.to_string_lossy().to_string()))
        }
        None => {
            tracing::debug!("using built-in field registry");
            Ok((default_scanner().clone(), "built-in".to_string()))
        }
    }
}

fn build_excludes(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).with_context(|| format!("exclude pattern {:?}", pattern))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Collect files to scan.
fn collect_files(
    root: &Path,
    extensions: &[String],
    excludes: &GlobSet,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            // Skip hidden and vendored directories
            if e.file_type().is_dir()
                && e.depth() > 0
                && (name.starts_with('.') || name == "vendor" || name == "node_modules")
            {
                return false;
            }
            !excludes.is_match(e.path())
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Run the scan command.
pub fn run_scan(args: &ScanArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let (scanner, config_label) = match load_scanner(&args.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let metadata = match std::fs::metadata(&args.path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let files = if metadata.is_dir() {
        let excludes = build_excludes(&args.exclude)?;
        collect_files(&args.path, &args.ext, &excludes)?
    } else {
        vec![args.path.clone()]
    };

    if files.is_empty() {
        tracing::warn!(path = %args.path.display(), "no files to scan");
        return Ok(EXIT_SUCCESS);
    }

    tracing::debug!(files = files.len(), "scanning");
    let report = scanner.scan_files(&files)?;
    tracing::info!(
        files = report.scanned,
        findings = report.finding_count(),
        "scan finished"
    );

    let path_str = args.path.to_string_lossy().to_string();
    match args.format.as_str() {
        "json" => report::write_json(&path_str, &config_label, &report)?,
        _ => report::write_pretty(&path_str, &config_label, &report),
    }

    if report.has_findings() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the remediate command.
pub fn run_remediate(args: &RemediateArgs) -> anyhow::Result<i32> {
    let (scanner, _) = load_scanner(&args.config)?;

    let input = match &args.input {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };

    let units: Vec<Unit> =
        serde_json::from_str(&input).context("input must be a JSON array of units")?;
    let count = units.len();
    let remediated = remediate::remediate_units(&scanner, units);
    tracing::info!(
        units = count,
        findings = remediated.iter().map(|u| u.selects.len()).sum::<usize>(),
        "remediated batch"
    );

    let json = if args.compact {
        serde_json::to_string(&remediated)?
    } else {
        serde_json::to_string_pretty(&remediated)?
    };
    println!("{}", json);

    Ok(EXIT_SUCCESS)
}

/// Run the serve command.
pub fn run_serve(args: &ServeArgs) -> anyhow::Result<i32> {
    let (scanner, config_label) = load_scanner(&args.config)?;
    tracing::info!(registry = %config_label, "starting server");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server::serve(args.addr, Arc::new(scanner)))?;

    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or pass --force to overwrite");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }

    let yaml = RegistryConfig::default().to_yaml()?;
    std::fs::write(&args.output, yaml)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to add or remove watched fields", args.output.display());
    println!("  2. Run: fieldscan scan . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}
