mod assets;
mod config;
mod download;

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use dropfleet_core::assets::{AssetRepository, UrlStyle};
use dropfleet_core::core_api::{CoreError, TreeWalker, WalkOutcome};
use dropfleet_core::document::SaveDocument;
use dropfleet_render::{
    ERROR_LOG_FILE, LogHeader, SHIP_EXTRACT_REPORT_FILE, SHIP_REPORT_FILE, UPGRADE_REPORT_FILE,
    render_error_log, render_json, render_summary, write_ship_report, write_upgrade_report,
};
use log::{info, warn};

use crate::assets::{DirectoryAssetRepository, HttpAssetRepository, http_client};
use crate::config::{FileConfig, Overrides, Settings};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "SAVE.json")]
    path: PathBuf,
    /// Only extract card data; never change the save.
    #[arg(long = "extract-only")]
    extract_only: bool,
    #[arg(long = "no-ships")]
    no_ships: bool,
    #[arg(long = "no-upgrades")]
    no_upgrades: bool,
    /// Check images against a local checkout instead of over HTTP.
    #[arg(long = "asset-dir", value_name = "DIR", conflicts_with = "extract_only")]
    asset_dir: Option<PathBuf>,
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long, value_name = "OWNER/NAME")]
    repository: Option<String>,
    #[arg(long)]
    branch: Option<String>,
    #[arg(
        long = "url-style",
        value_name = "raw|blob|blob-raw|raw-redirect",
        value_parser = parse_url_style
    )]
    url_style: Option<UrlStyle>,
    #[arg(long = "timeout-secs", value_name = "SECS")]
    timeout_secs: Option<u64>,
    /// Extra container name to ignore. May be repeated.
    #[arg(long = "exclude", value_name = "CONTAINER")]
    exclude: Vec<String>,
    #[arg(long = "report-dir", value_name = "DIR")]
    report_dir: Option<PathBuf>,
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
    #[arg(long = "dry-run")]
    dry_run: bool,
    #[arg(long = "download-images", value_name = "DIR", requires = "extract_only")]
    download_images: Option<PathBuf>,
    #[arg(long)]
    json: bool,
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_url_style(value: &str) -> Result<UrlStyle, String> {
    value.parse::<UrlStyle>().map_err(|e| e.message)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.no_ships && cli.no_upgrades {
        eprintln!("--no-ships and --no-upgrades together leave nothing to process");
        process::exit(2);
    }
    if cli.extract_only && cli.output.is_some() {
        eprintln!("--output cannot be combined with --extract-only");
        process::exit(2);
    }

    match run(&cli) {
        Ok(outcome) => {
            if cli.json {
                match serde_json::to_string_pretty(&render_json(&outcome)) {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        eprintln!("Error serializing results: {e}");
                        process::exit(1);
                    }
                }
            } else {
                println!("{}", render_summary(&outcome));
            }
        }
        Err(e) => {
            eprintln!("Error processing {}: {e}", cli.path.display());
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<WalkOutcome, CoreError> {
    let settings = load_settings(cli)?;

    let bytes = fs::read(&cli.path)
        .map_err(|e| CoreError::io(format!("failed to read {}: {e}", cli.path.display())))?;
    let mut document = SaveDocument::from_slice(&bytes)?;
    info!(
        "loaded {} with {} top-level objects",
        cli.path.display(),
        document.object_states().len()
    );

    let assets: Option<Box<dyn AssetRepository>> = if cli.extract_only {
        None
    } else if let Some(dir) = &cli.asset_dir {
        Some(Box::new(DirectoryAssetRepository::new(
            dir,
            settings.layout.clone(),
        )?))
    } else {
        Some(Box::new(HttpAssetRepository::new(
            settings.layout.clone(),
            settings.timeout,
        )?))
    };

    let mut walker = TreeWalker::new(&settings.walk);
    if let Some(assets) = assets.as_deref() {
        walker = walker.with_assets(assets);
    }
    let mut outcome = walker.run(&mut document);

    if let Some(dir) = &cli.download_images {
        let client = http_client(settings.timeout)?;
        let notes = download::download_ship_images(&client, dir, &outcome.ships);
        outcome.notes.extend(notes);
    }

    let report_dir = report_dir(cli)?;
    write_reports(&report_dir, cli.extract_only, &outcome)?;

    if outcome.problems().next().is_some() {
        let header = LogHeader {
            repository: settings.layout.repository().to_string(),
            base_url: settings.layout.base_url().to_string(),
            url_style: settings.layout.style().to_string(),
        };
        let log_path = report_dir.join(ERROR_LOG_FILE);
        write_file(&log_path, render_error_log(&header, &outcome.notes).as_bytes())?;
        warn!(
            "{} problems written to {}",
            outcome.problems().count(),
            log_path.display()
        );
    }

    if outcome.modified && !cli.dry_run {
        let backup = backup_path(&cli.path);
        if backup.exists() {
            info!("keeping existing backup {}", backup.display());
        } else {
            write_file(&backup, &bytes)?;
            info!("backed up original save to {}", backup.display());
        }

        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| modified_path(&cli.path));
        write_file(&output, document.to_pretty_json()?.as_bytes())?;
        info!("wrote modified save to {}", output.display());
    } else if outcome.modified {
        info!("dry run: modified save not written");
    }

    Ok(outcome)
}

fn load_settings(cli: &Cli) -> Result<Settings, CoreError> {
    let config_path = cli
        .config
        .clone()
        .or_else(|| FileConfig::discover(&cli.path));
    let file = match &config_path {
        Some(path) => {
            info!("using config {}", path.display());
            FileConfig::load(path)?
        }
        None => FileConfig::default(),
    };

    Settings::resolve(
        file,
        Overrides {
            repository: cli.repository.clone(),
            branch: cli.branch.clone(),
            url_style: cli.url_style,
            timeout_secs: cli.timeout_secs,
            extra_excluded: cli.exclude.clone(),
            process_ships: !cli.no_ships,
            process_upgrades: !cli.no_upgrades,
        },
    )
}

fn report_dir(cli: &Cli) -> Result<PathBuf, CoreError> {
    let dir = match &cli.report_dir {
        Some(dir) => dir.clone(),
        None => cli
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    fs::create_dir_all(&dir)
        .map_err(|e| CoreError::io(format!("failed to create {}: {e}", dir.display())))?;
    Ok(dir)
}

fn write_reports(dir: &Path, extract_only: bool, outcome: &WalkOutcome) -> Result<(), CoreError> {
    if !outcome.ships.is_empty() {
        let name = if extract_only {
            SHIP_EXTRACT_REPORT_FILE
        } else {
            SHIP_REPORT_FILE
        };
        let path = dir.join(name);
        write_ship_report(create_file(&path)?, &outcome.ships)
            .map_err(|e| CoreError::io(format!("failed to write {}: {e}", path.display())))?;
        info!("wrote {} ship records to {}", outcome.ships.len(), path.display());
    }

    if !outcome.upgrades.is_empty() {
        let path = dir.join(UPGRADE_REPORT_FILE);
        write_upgrade_report(create_file(&path)?, &outcome.upgrades)
            .map_err(|e| CoreError::io(format!("failed to write {}: {e}", path.display())))?;
        info!(
            "wrote {} upgrade records to {}",
            outcome.upgrades.len(),
            path.display()
        );
    }

    Ok(())
}

fn create_file(path: &Path) -> Result<BufWriter<File>, CoreError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| CoreError::io(format!("failed to create {}: {e}", path.display())))
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
    fs::write(path, bytes)
        .map_err(|e| CoreError::io(format!("failed to write {}: {e}", path.display())))
}

/// `<save>.backup`, next to the save.
fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".backup");
    PathBuf::from(name)
}

/// `<stem>_modified.json`, next to the save.
fn modified_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "save".to_string());
    path.with_file_name(format!("{stem}_modified.json"))
}
