pub mod auth;
pub mod config;
pub mod credits;
pub mod dashboard;
pub mod error;
pub mod generation;
pub mod history;
pub mod premium;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;
use actix_web::{web, HttpResponse};

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use crate::config::Settings;

pub use auth::{SessionStore, User, UserPatch};
pub use credits::{CreditLedger, CreditPolicy, CreditState, ResetScheduler};
pub use dashboard::Dashboard;
pub use generation::{Generator, HttpGenerator};
pub use history::HistoryStore;
pub use premium::PremiumVerifier;
pub use storage::{FileStore, KeyValueStore, MemoryStore};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Registers every dashboard route.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/auth/login", web::post().to(auth::handlers::login))
        .route("/auth/register", web::post().to(auth::handlers::register))
        .route("/auth/logout", web::post().to(auth::handlers::logout))
        .route("/auth/me", web::get().to(auth::handlers::me))
        .route("/auth/me", web::patch().to(auth::handlers::update_me))
        .route("/credits", web::get().to(credits::handlers::get_credits))
        .route("/premium/verify", web::post().to(premium::handlers::verify))
        .route("/premium/cancel", web::post().to(premium::handlers::cancel))
        .route("/generate/text", web::post().to(dashboard::handlers::generate_text))
        .route("/generate/image", web::post().to(dashboard::handlers::generate_image))
        .route("/templates/image", web::get().to(dashboard::handlers::image_templates))
        .route("/history/text", web::get().to(history::handlers::text_history))
        .route("/history/image", web::get().to(history::handlers::image_history))
        .route("/history/image/{id}/png", web::get().to(history::handlers::image_png))
        .route("/usage", web::get().to(history::handlers::usage));
}

/// Application state shared across all workers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub dashboard: Arc<Dashboard>,
}

impl AppState {
    /// Opens the on-disk stores under `storage.data_dir` and wires the HTTP
    /// generator and premium verifier from configuration.
    pub fn new(config: Settings) -> Result<Self> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.storage.data_dir)?);
        let generator: Arc<dyn Generator> = Arc::new(HttpGenerator::new(config.generation.clone())?);
        Self::with_parts(config, storage, generator)
    }

    /// Same as [`AppState::new`] with caller-supplied storage and generator.
    pub fn with_parts(
        config: Settings,
        storage: Arc<dyn KeyValueStore>,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        let session = SessionStore::new(storage.clone())?;
        let credits = CreditLedger::new(storage.clone(), CreditPolicy::from(&config.credits))?;
        let history = HistoryStore::new(storage, &config.history);
        let premium = PremiumVerifier::new(
            &config.premium,
            Duration::from_secs(config.generation.timeout_secs),
        )?;

        Ok(Self {
            config: Arc::new(config),
            dashboard: Arc::new(Dashboard::new(session, credits, history, generator, premium)),
        })
    }

    /// Starts the periodic daily-reset check. Keep the returned handle alive
    /// for as long as the check should run.
    pub fn start_reset_scheduler(&self) -> ResetScheduler {
        let period = Duration::from_secs(self.config.credits.check_interval_minutes * 60);
        ResetScheduler::spawn(self.dashboard.credits.clone(), period)
    }
}
