use clap::Parser;
use std::path::PathBuf;

use crate::config::{Overrides, UploadMode};
use crate::constants::DEFAULT_SOURCE_DIR;

/// Command-line arguments for the map-uploader tool.
///
/// Every configuration flag is optional and overrides the corresponding
/// persisted value for this run only; flag values are never written back
/// to the stores.
#[derive(Parser, Debug)]
#[clap(
    name = "map-uploader",
    about = "Package a built map directory and upload it to a map-storage endpoint"
)]
pub struct Args {
    /// Map storage API key (overrides the persisted secret store)
    #[clap(short = 'k', long)]
    pub map_storage_api_key: Option<String>,

    /// Base URL of the map storage endpoint
    #[clap(short = 'u', long)]
    pub map_storage_url: Option<String>,

    /// Remote directory to upload into (empty value selects the root)
    #[clap(short = 'd', long)]
    pub directory: Option<String>,

    /// Upload mode: CUSTOM validates and persists configuration without uploading
    #[clap(short = 'm', long, value_enum)]
    pub upload_mode: Option<UploadMode>,

    /// Built map directory to package
    #[clap(short = 's', long, default_value = DEFAULT_SOURCE_DIR)]
    pub source: PathBuf,

    /// Never prompt; fail when a mandatory field cannot be resolved
    #[clap(long)]
    pub non_interactive: bool,

    /// Verbose logging
    #[clap(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The CLI-supplied configuration fields, for precedence merging.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            storage_url: self.map_storage_url.clone(),
            api_key: self.map_storage_api_key.clone(),
            directory: self.directory.clone(),
            upload_mode: self.upload_mode,
        }
    }
}
