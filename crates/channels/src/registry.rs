//! Source registry — manages all active signal sources.
//!
//! Starts every registered source and funnels their events into the single
//! queue the coach service drains.

use std::collections::HashMap;
use std::sync::Arc;

use streamcoach_core::error::SourceError;
use streamcoach_core::signal::SignalEvent;
use streamcoach_core::source::SignalSource;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Capacity of the merged event queue.
const MERGED_QUEUE_CAPACITY: usize = 256;

/// Central registry holding all enabled sources.
pub struct SourceRegistry {
    sources: HashMap<String, Arc<dyn SignalSource>>,
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
        }
    }

    /// Register a source, keyed by its ID.
    pub fn register(&mut self, source: Arc<dyn SignalSource>) {
        let id = source.id().to_string();
        info!(source = %id, "Registered signal source");
        self.sources.insert(id, source);
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn SignalSource>> {
        self.sources.get(id)
    }

    /// List all registered source IDs.
    pub fn list(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sources.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Start all sources and merge their event streams into one receiver.
    ///
    /// The merged receiver closes once every source has finished.
    pub async fn start_all(
        &self,
    ) -> Result<mpsc::Receiver<Result<SignalEvent, SourceError>>, SourceError> {
        let (merged_tx, merged_rx) = mpsc::channel(MERGED_QUEUE_CAPACITY);

        for (id, source) in &self.sources {
            let mut rx = source.start().await?;
            let tx = merged_tx.clone();
            let source_id = id.clone();

            tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    if tx.send(event).await.is_err() {
                        break; // Merged receiver dropped
                    }
                }
                debug!(source = %source_id, "Signal source finished");
            });

            info!(source = %id, "Started signal source");
        }

        Ok(merged_rx)
    }

    /// Stop all sources gracefully.
    pub async fn stop_all(&self) {
        for (id, source) in &self.sources {
            if let Err(e) = source.stop().await {
                warn!(source = %id, error = %e, "Failed to stop signal source");
            }
        }
    }

    /// Run health checks on all sources.
    pub async fn health_check_all(&self) -> HashMap<String, bool> {
        let mut results = HashMap::new();
        for (id, source) in &self.sources {
            let healthy = source.health_check().await.unwrap_or(false);
            results.insert(id.clone(), healthy);
        }
        results
    }
}
