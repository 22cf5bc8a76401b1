//! File stores for uploaded cover images - local disk and in-memory fallback.

mod local;
mod memory;

pub use local::LocalFileStore;
pub use memory::InMemoryFileStore;

use uuid::Uuid;

use folio_core::domain::UploadedFile;

/// Fresh identifier for an upload, keeping the original extension.
fn new_identifier(file: &UploadedFile) -> String {
    match file.extension() {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    }
}
