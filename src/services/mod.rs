// All service modules
pub mod minter;
pub mod session_engine;

// Re-export for convenience
pub use minter::Minter;
pub use session_engine::{SessionEngine, SessionRegistry, TracingOutcomeSink};

use std::sync::Arc;

/// Start all background services
pub async fn start_background_services(sessions: SessionRegistry) {
    tracing::info!("Starting background services...");

    let engine = Arc::new(SessionEngine::new(
        sessions,
        Arc::new(TracingOutcomeSink),
    ));
    engine.start().await;
}
