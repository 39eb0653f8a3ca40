//! Single writer that keeps board saves off the async workers

use tokio::{sync::mpsc, task};
use tracing::{debug, error, info};

use crate::storage::{Snapshot, Storage};

/// Background task that writes queued snapshots to disk one at a time.
///
/// Snapshots that pile up while a write is in flight are coalesced into the
/// newest one.
pub async fn save_task(storage: Storage, mut queue: mpsc::UnboundedReceiver<Snapshot>) {
    info!("Starting save task for {}", storage.path().display());

    while let Some(mut snapshot) = queue.recv().await {
        while let Ok(newer) = queue.try_recv() {
            snapshot = newer;
        }

        let writer = storage.clone();
        let generation = snapshot.generation;
        match task::spawn_blocking(move || writer.save_snapshot(&snapshot)).await {
            Ok(Ok(true)) => debug!("Saved board snapshot {}", generation),
            Ok(Ok(false)) => {}
            Ok(Err(e)) => error!("Failed to save board: {:#}", e),
            Err(e) => error!("Save worker failed: {}", e),
        }
    }

    info!("Save queue closed, save task exiting");
}
