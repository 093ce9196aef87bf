use std::sync::Arc;
use std::time::Duration;

use pinvault_api::auth::AppState;
use pinvault_db::TokenRepository;
use tracing::{info, warn};

/// Background task that drops revoked-token rows once the token has expired anyway.
pub async fn run_cleanup_loop(state: AppState, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;

        let db_state = Arc::clone(&state);
        let now = chrono::Utc::now().timestamp();
        let result =
            tokio::task::spawn_blocking(move || db_state.db.prune_revoked_tokens(now)).await;

        match result {
            Ok(Ok(count)) => {
                if count > 0 {
                    info!("Cleanup: pruned {} expired token revocations", count);
                }
            }
            Ok(Err(e)) => warn!("Cleanup error: {}", e),
            Err(e) => warn!("Cleanup task failed: {}", e),
        }
    }
}
