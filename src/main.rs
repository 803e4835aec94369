use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config as LogConfig, TermLogger, TerminalMode};

use map_uploader::archive;
use map_uploader::cli::Args;
use map_uploader::config::{self, HttpProbe, ResolvedConfig, UploadMode};
use map_uploader::constants::{ARCHIVE_NAME, NON_SECRET_STORE, SECRET_STORE};
use map_uploader::prompt::{self, TermPrompter};
use map_uploader::upload;
use map_uploader::vcs;

fn main() -> Result<()> {
    let args = Args::parse();
    initialize_logging(args.verbose)?;

    // The archive is produced first; configuration (and any prompting)
    // comes after.
    let archive_path = PathBuf::from(ARCHIVE_NAME);
    let bytes = archive::archive_directory(&args.source, &archive_path)?;
    info!(
        "Packaged {} ({} bytes) into {}",
        args.source.display(),
        bytes,
        archive_path.display()
    );

    let resolved = resolve_config(&args)?;

    if resolved.config.upload_mode == UploadMode::Custom {
        info!("Upload mode is CUSTOM, skipping the upload step");
    } else {
        upload::upload_archive(&archive_path, &resolved.config)?;
    }

    let outcome = config::persist(
        &resolved,
        Path::new(NON_SECRET_STORE),
        Path::new(SECRET_STORE),
    )?;
    if !outcome.non_secret && !outcome.secret {
        info!("No freshly entered settings, persisted stores left untouched");
    }

    Ok(())
}

/// Initialize logging with the specified verbosity level
fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(
        log_level,
        LogConfig::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .context("Failed to initialize logger")?;
    Ok(())
}

/// Merge flags, persisted stores and prompts into a validated config.
fn resolve_config(args: &Args) -> Result<ResolvedConfig> {
    let persisted = config::load_stores(Path::new(NON_SECRET_STORE), Path::new(SECRET_STORE))?;
    let vcs_slug = vcs::default_directory();
    let probe = HttpProbe::new().context("Failed to build HTTP client")?;
    let interactive = !args.non_interactive && prompt::stdin_is_interactive();
    let mut prompter = TermPrompter;

    let resolved = config::resolve(
        &args.overrides(),
        &persisted,
        vcs_slug.as_deref(),
        &probe,
        &mut prompter,
        interactive,
    )?;
    Ok(resolved)
}
