//! Application state for the web layer.

use std::sync::Arc;

use crate::jobs::{InMemoryQueue, InMemoryResultStore, RouteJobs};
use crate::planner::MultimodalPlanner;
use crate::realtime::RealtimeViewService;
use crate::streets::StreetProvider;

/// Shared application state.
///
/// Generic over the street provider and the vehicle provider, matching the
/// planner and the realtime view; the job queue and store are the
/// in-process implementations.
pub struct AppState<S: StreetProvider, V> {
    /// Multimodal planner
    pub planner: Arc<MultimodalPlanner<S>>,

    /// Realtime map services
    pub realtime: Arc<RealtimeViewService<V>>,

    /// Async route jobs
    pub jobs: Arc<RouteJobs<InMemoryQueue, InMemoryResultStore>>,
}

impl<S: StreetProvider, V> AppState<S, V> {
    pub fn new(
        planner: Arc<MultimodalPlanner<S>>,
        realtime: Arc<RealtimeViewService<V>>,
        jobs: Arc<RouteJobs<InMemoryQueue, InMemoryResultStore>>,
    ) -> Self {
        Self {
            planner,
            realtime,
            jobs,
        }
    }
}

impl<S: StreetProvider, V> Clone for AppState<S, V> {
    fn clone(&self) -> Self {
        Self {
            planner: self.planner.clone(),
            realtime: self.realtime.clone(),
            jobs: self.jobs.clone(),
        }
    }
}
