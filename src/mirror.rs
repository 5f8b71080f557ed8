use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::task::JoinHandle;

/// External mirror of the record store. Propagation is best-effort: the
/// caller never awaits the result, and a failure here must never roll back
/// the already-applied primary update.
#[async_trait]
pub trait MirrorStore: Send + Sync {
    async fn propagate(&self, record_id: &str, changes: &[(String, String)]) -> Result<()>;
}

/// Default when no mirror is configured. Propagation becomes a debug log.
pub struct DisabledMirror;

#[async_trait]
impl MirrorStore for DisabledMirror {
    async fn propagate(&self, record_id: &str, changes: &[(String, String)]) -> Result<()> {
        log::debug!(
            "mirror disabled, dropping {} field change(s) for record {}",
            changes.len(),
            record_id
        );
        Ok(())
    }
}

/// Runs the mirror call as an explicitly detached task. Errors land in the
/// log and nowhere else; the returned handle exists so tests can await the
/// attempt, production callers drop it.
pub fn spawn_propagate(
    mirror: Arc<dyn MirrorStore>,
    record_id: String,
    changes: Vec<(String, String)>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(err) = mirror.propagate(&record_id, &changes).await {
            log::warn!("mirror propagation failed for record {record_id}: {err:#}");
        } else {
            log::debug!("mirror propagation succeeded for record {record_id}");
        }
    })
}
