pub mod cpf;
pub mod declaration;
pub mod display;
pub mod entries;
pub mod schema;
pub mod tax;

use crate::service::DeclarationService;
use crate::store::JsonFileStore;
use std::path::Path;

pub type FileService = DeclarationService<JsonFileStore>;

/// Open the declaration store file, creating an empty store if it is missing
pub fn open_service(store: &Path) -> anyhow::Result<FileService> {
    let store = JsonFileStore::open(store)?;
    log::debug!("Using store {}", store.path().display());
    Ok(DeclarationService::new(store))
}
