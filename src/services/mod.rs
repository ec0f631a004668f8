pub mod booking;
pub mod catalog_service;
pub mod indicators;
pub mod preferences;
pub mod seo;
pub mod storage;
pub mod uploads;

pub use catalog_service::{CatalogPage, CatalogQuery, CatalogService};
pub use preferences::PreferencesService;
pub use storage::{StorageError, StorageService};
pub use uploads::UploadJobs;
