// Re-export all items from the submodules
mod model;
mod resolver;
mod store;
mod validate;

pub use model::{mask_secret, Config, FieldSource, Provenance, ResolvedConfig, UploadMode};
pub use resolver::{resolve, Overrides};
pub use store::{load_stores, persist, PersistOutcome, PersistedSettings};
pub use validate::{check_storage_url, normalize_storage_url, HttpProbe, StorageProbe};
