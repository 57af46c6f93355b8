pub mod config;
pub mod db;
pub mod medications;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod service;
pub mod state;
pub mod tracker;

use tracing_subscriber::EnvFilter;

pub use models::{AssessmentResult, HealthProfile, ProfileInput, UserRecord, ValidationError};
pub use service::{AssessmentOutcome, HealthService, ServiceError};

/// Install the global `fmt` subscriber, honouring `RUST_LOG`.
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} core v{}", config::APP_NAME, config::APP_VERSION);
    }
}
