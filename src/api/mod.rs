pub mod bookings;
pub mod error;
pub mod health;
pub mod preferences;
pub mod response;
pub mod seo;
pub mod uploads;
pub mod vehicles;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::AppConfig;
use crate::database::{Database, VehicleRepository};
use crate::services::{CatalogService, PreferencesService, StorageService, UploadJobs};
use crate::store::{KeyValueStore, SqliteStore};

/// multipart 请求在文件本身之外的额外开销
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub database: Database,
    pub catalog: Arc<CatalogService>,
    pub uploads: Arc<UploadJobs>,
    pub preferences: Arc<PreferencesService>,
}

impl AppState {
    pub fn new(config: AppConfig, database: Database) -> Self {
        let repository: Arc<dyn VehicleRepository> = Arc::new(database.repository().clone());
        let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new(database.pool().clone()));

        let storage = StorageService::new(
            config.storage_dir.clone(),
            config.public_base_url.clone(),
            config.max_upload_bytes,
            repository.clone(),
        );

        Self {
            catalog: Arc::new(CatalogService::new(repository)),
            uploads: Arc::new(UploadJobs::new(Arc::new(storage))),
            preferences: Arc::new(PreferencesService::new(store)),
            config: Arc::new(config),
            database,
        }
    }

    pub fn storage(&self) -> &Arc<StorageService> {
        self.uploads.storage()
    }
}

pub fn router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;
    let storage_dir = state.config.storage_dir.clone();

    Router::new()
        .route("/", get(|| async { "Fleet Catalog Backend API v1.0" }))
        // Health
        .route("/api/health", get(health::health_check))
        .route("/api/visitors", get(health::visitors))
        // Vehicles
        .route("/api/vehicles", get(vehicles::list_vehicles).post(vehicles::create_vehicle))
        .route("/api/vehicles/filters", get(vehicles::get_filter_options))
        .route("/api/vehicles/:id", get(vehicles::get_vehicle).delete(vehicles::delete_vehicle))
        .route("/api/vehicles/:id/image", put(vehicles::set_vehicle_image))
        .route("/api/vehicles/:id/availability", get(vehicles::get_availability))
        .route("/api/vehicles/:id/book", get(bookings::quick_book))
        // Bookings
        .route("/api/bookings", post(bookings::create_booking))
        // Uploads
        .route(
            "/api/uploads",
            post(uploads::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/uploads/:id", get(uploads::get_upload_status))
        // Session preferences
        .route(
            "/api/favorites/:session",
            get(preferences::get_favorites).post(preferences::toggle_favorite),
        )
        .route(
            "/api/preferences/:session/language",
            get(preferences::get_language).put(preferences::set_language),
        )
        // SEO
        .route("/api/seo/pages/:slug", get(seo::page_metadata))
        .route("/api/seo/vehicles/:id", get(seo::vehicle_seo))
        .route("/api/seo/organization", get(seo::organization))
        .route("/sitemap.xml", get(seo::sitemap))
        // Uploaded files
        .nest_service("/storage", ServeDir::new(storage_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
