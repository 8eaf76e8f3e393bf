//! Rebuild-and-swap holder for the latest graph snapshot.
//!
//! # Invariants
//! - Only the build holding the newest ticket may publish.
//! - Readers always see a whole snapshot or none.

use crate::config::Settings;
use crate::host::WorkspaceHost;
use crate::service::build::{build_graph, GraphSnapshot};
use log::{debug, info};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Generation token handed out when a build starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BuildTicket(u64);

/// Holds the most recent published snapshot.
#[derive(Debug, Default)]
pub struct GraphStore {
    generation: AtomicU64,
    current: RwLock<Option<Arc<GraphSnapshot>>>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a build; any earlier outstanding ticket becomes stale.
    pub fn begin_build(&self) -> BuildTicket {
        BuildTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Publishes `snapshot` unless a newer build has started since `ticket`.
    pub fn publish(&self, ticket: BuildTicket, snapshot: GraphSnapshot) -> bool {
        self.publish_shared(ticket, Arc::new(snapshot))
    }

    fn publish_shared(&self, ticket: BuildTicket, snapshot: Arc<GraphSnapshot>) -> bool {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::SeqCst) != ticket.0 {
            debug!(
                "event=snapshot_discarded module=store status=ok generation={} build_id={}",
                ticket.0, snapshot.build_id
            );
            return false;
        }
        info!(
            "event=snapshot_published module=store status=ok generation={} build_id={}",
            ticket.0, snapshot.build_id
        );
        *current = Some(snapshot);
        true
    }

    /// Latest published snapshot.
    pub fn current(&self) -> Option<Arc<GraphSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Builds from `host` and publishes the result; returns it when published.
    pub fn rebuild(
        &self,
        host: &dyn WorkspaceHost,
        settings: &Settings,
    ) -> Option<Arc<GraphSnapshot>> {
        let ticket = self.begin_build();
        let snapshot = Arc::new(build_graph(host, settings));
        self.publish_shared(ticket, Arc::clone(&snapshot))
            .then_some(snapshot)
    }
}
