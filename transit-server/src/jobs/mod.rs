//! Asynchronous route jobs.
//!
//! A caller submits a request, gets an id back immediately, and polls for
//! the result while a worker computes it. Route calculation is idempotent
//! and side-effect-free, so a redelivered message simply overwrites the
//! same job's prior result. A walk-only fallback itinerary is a SUCCESS;
//! the job failed only if the planner itself could not run.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use futures::future::join_all;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::domain::{GeoPoint, Itinerary};
use crate::planner::{MultimodalPlanner, Preference};
use crate::streets::StreetProvider;

/// How many messages a worker pulls per batch.
const WORKER_BATCH_SIZE: usize = 5;

/// Idle delay between empty polls.
const WORKER_IDLE_DELAY: Duration = Duration::from_millis(200);

/// Status of an async route job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Success,
    Error,
}

/// The routing request carried by a job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub depart_at: NaiveDateTime,
    pub preference: Preference,
}

/// Message placed on the queue for the worker.
#[derive(Debug, Clone)]
pub struct JobMessage {
    pub request_id: String,
    pub request: JobRequest,
}

/// Stored job state, as seen by pollers.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub request_id: String,
    pub status: JobStatus,
    pub request: Option<JobRequest>,
    pub result: Option<Itinerary>,
    pub error: Option<String>,
}

/// Messaging capability for route requests.
pub trait QueueService: Send + Sync {
    fn publish(&self, message: JobMessage) -> impl Future<Output = ()> + Send;

    /// Take up to `max_messages` pending messages off the queue.
    fn consume(&self, max_messages: usize) -> impl Future<Output = Vec<JobMessage>> + Send;
}

/// Persistence capability for job status and results.
pub trait ResultStore: Send + Sync {
    fn put_pending(
        &self,
        request_id: &str,
        request: JobRequest,
    ) -> impl Future<Output = ()> + Send;

    fn put_success(&self, request_id: &str, result: Itinerary)
    -> impl Future<Output = ()> + Send;

    fn put_error(&self, request_id: &str, error: String) -> impl Future<Output = ()> + Send;

    fn get(&self, request_id: &str) -> impl Future<Output = Option<JobRecord>> + Send;
}

/// In-process FIFO queue.
#[derive(Default)]
pub struct InMemoryQueue {
    messages: Mutex<VecDeque<JobMessage>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl QueueService for InMemoryQueue {
    async fn publish(&self, message: JobMessage) {
        self.messages.lock().await.push_back(message);
    }

    async fn consume(&self, max_messages: usize) -> Vec<JobMessage> {
        let mut queue = self.messages.lock().await;
        let take = max_messages.min(queue.len());
        queue.drain(..take).collect()
    }
}

/// In-process job store.
#[derive(Default)]
pub struct InMemoryResultStore {
    records: RwLock<HashMap<String, JobRecord>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for InMemoryResultStore {
    async fn put_pending(&self, request_id: &str, request: JobRequest) {
        let record = JobRecord {
            request_id: request_id.to_owned(),
            status: JobStatus::Pending,
            request: Some(request),
            result: None,
            error: None,
        };
        self.records
            .write()
            .await
            .insert(request_id.to_owned(), record);
    }

    async fn put_success(&self, request_id: &str, result: Itinerary) {
        let mut records = self.records.write().await;
        let record = records
            .entry(request_id.to_owned())
            .or_insert_with(|| JobRecord {
                request_id: request_id.to_owned(),
                status: JobStatus::Pending,
                request: None,
                result: None,
                error: None,
            });
        record.status = JobStatus::Success;
        record.result = Some(result);
        record.error = None;
    }

    async fn put_error(&self, request_id: &str, error: String) {
        let mut records = self.records.write().await;
        let record = records
            .entry(request_id.to_owned())
            .or_insert_with(|| JobRecord {
                request_id: request_id.to_owned(),
                status: JobStatus::Pending,
                request: None,
                result: None,
                error: None,
            });
        record.status = JobStatus::Error;
        record.result = None;
        record.error = Some(error);
    }

    async fn get(&self, request_id: &str) -> Option<JobRecord> {
        self.records.read().await.get(request_id).cloned()
    }
}

/// Submit/poll service for async route jobs.
pub struct RouteJobs<Q, R> {
    queue: Arc<Q>,
    store: Arc<R>,
}

impl<Q: QueueService, R: ResultStore> RouteJobs<Q, R> {
    pub fn new(queue: Arc<Q>, store: Arc<R>) -> Self {
        Self { queue, store }
    }

    /// Record a pending job, enqueue it, and return its request id.
    pub async fn submit(&self, request: JobRequest) -> String {
        let request_id = uuid::Uuid::new_v4().to_string();

        self.store.put_pending(&request_id, request.clone()).await;
        self.queue
            .publish(JobMessage {
                request_id: request_id.clone(),
                request,
            })
            .await;

        request_id
    }

    /// Current state of a job, `None` for unknown ids.
    pub async fn get(&self, request_id: &str) -> Option<JobRecord> {
        self.store.get(request_id).await
    }
}

/// Queue worker: consumes route requests and records results.
pub struct Worker<S: StreetProvider, Q, R> {
    planner: Arc<MultimodalPlanner<S>>,
    queue: Arc<Q>,
    store: Arc<R>,
}

impl<S, Q, R> Worker<S, Q, R>
where
    S: StreetProvider,
    Q: QueueService,
    R: ResultStore,
{
    pub fn new(planner: Arc<MultimodalPlanner<S>>, queue: Arc<Q>, store: Arc<R>) -> Self {
        Self {
            planner,
            queue,
            store,
        }
    }

    /// Consume and process one batch; returns how many messages were taken.
    pub async fn process_batch(&self, max_messages: usize) -> usize {
        let messages = self.queue.consume(max_messages).await;
        let count = messages.len();

        join_all(messages.into_iter().map(|message| self.process(message))).await;
        count
    }

    async fn process(&self, message: JobMessage) {
        let JobMessage {
            request_id,
            request,
        } = message;
        debug!(%request_id, "processing route job");

        let outcome = self.planner.calculate_route(
            request.origin,
            request.destination,
            request.depart_at,
            request.preference,
        );

        match outcome {
            Ok(itinerary) => self.store.put_success(&request_id, itinerary).await,
            Err(error) => {
                warn!(%request_id, %error, "route job failed");
                self.store.put_error(&request_id, error.to_string()).await;
            }
        }
    }

    /// Poll the queue forever.
    pub async fn run(&self) {
        loop {
            if self.process_batch(WORKER_BATCH_SIZE).await == 0 {
                tokio::time::sleep(WORKER_IDLE_DELAY).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Connection, Stop, StopId, TransitFeed, TravelMode, TripId};
    use crate::feed::{FeedError, FeedProvider, InMemoryFeedProvider};
    use crate::planner::RoutingConfig;
    use crate::streets::GreatCircleStreets;
    use chrono::NaiveDate;

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    fn request() -> JobRequest {
        JobRequest {
            origin: p(0.0, 0.0),
            destination: p(0.0, 0.04),
            depart_at: NaiveDate::from_ymd_opt(2026, 1, 2)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            preference: Preference::Fastest,
        }
    }

    fn transit_feed() -> TransitFeed {
        let stop = |id: &str, lon: f64| Stop {
            id: StopId::new(id),
            name: id.to_owned(),
            location: p(0.0, lon),
        };
        TransitFeed::new(
            vec![stop("A", 0.0005), stop("C", 0.0395)],
            vec![],
            vec![],
            vec![],
            vec![Connection {
                dep_stop: StopId::new("A"),
                arr_stop: StopId::new("C"),
                dep_time_s: 30_000,
                arr_time_s: 30_600,
                trip: TripId::new("T1"),
            }],
        )
    }

    fn planner(feed: TransitFeed) -> Arc<MultimodalPlanner<GreatCircleStreets>> {
        Arc::new(MultimodalPlanner::new(
            Arc::new(InMemoryFeedProvider::new(feed)),
            GreatCircleStreets::new(),
            RoutingConfig::default(),
        ))
    }

    fn harness(
        feed: TransitFeed,
    ) -> (
        RouteJobs<InMemoryQueue, InMemoryResultStore>,
        Worker<GreatCircleStreets, InMemoryQueue, InMemoryResultStore>,
    ) {
        let queue = Arc::new(InMemoryQueue::new());
        let store = Arc::new(InMemoryResultStore::new());
        let jobs = RouteJobs::new(queue.clone(), store.clone());
        let worker = Worker::new(planner(feed), queue, store);
        (jobs, worker)
    }

    #[tokio::test]
    async fn submit_then_process_records_success() {
        let (jobs, worker) = harness(transit_feed());

        let id = jobs.submit(request()).await;

        let pending = jobs.get(&id).await.unwrap();
        assert_eq!(pending.status, JobStatus::Pending);
        assert!(pending.result.is_none());

        assert_eq!(worker.process_batch(5).await, 1);

        let done = jobs.get(&id).await.unwrap();
        assert_eq!(done.status, JobStatus::Success);
        let itinerary = done.result.unwrap();
        assert_eq!(itinerary.legs.len(), 3);
        assert!(done.error.is_none());
    }

    #[tokio::test]
    async fn walk_only_fallback_is_success() {
        // No usable transit near the request: the job still succeeds with
        // the walk-only itinerary.
        let (jobs, worker) = harness(TransitFeed::default());

        let id = jobs.submit(request()).await;
        worker.process_batch(5).await;

        let done = jobs.get(&id).await.unwrap();
        assert_eq!(done.status, JobStatus::Success);
        let itinerary = done.result.unwrap();
        assert_eq!(itinerary.legs.len(), 1);
        assert_eq!(itinerary.legs[0].mode, TravelMode::Walk);
    }

    #[tokio::test]
    async fn planner_failure_records_error() {
        /// Feed provider that always fails.
        struct BrokenFeeds;
        impl FeedProvider for BrokenFeeds {
            fn load_feed(&self) -> Result<Arc<TransitFeed>, FeedError> {
                Err(FeedError::Io("disk on fire".into()))
            }
        }

        let queue = Arc::new(InMemoryQueue::new());
        let store = Arc::new(InMemoryResultStore::new());
        let jobs = RouteJobs::new(queue.clone(), store.clone());
        let planner = Arc::new(MultimodalPlanner::new(
            Arc::new(BrokenFeeds),
            GreatCircleStreets::new(),
            RoutingConfig::default(),
        ));
        let worker = Worker::new(planner, queue, store);

        let id = jobs.submit(request()).await;
        worker.process_batch(5).await;

        let done = jobs.get(&id).await.unwrap();
        assert_eq!(done.status, JobStatus::Error);
        assert!(done.error.unwrap().contains("disk on fire"));
        assert!(done.result.is_none());
    }

    #[tokio::test]
    async fn retry_overwrites_prior_result() {
        let (jobs, worker) = harness(transit_feed());

        let id = jobs.submit(request()).await;
        worker.process_batch(5).await;
        assert_eq!(jobs.get(&id).await.unwrap().status, JobStatus::Success);

        // Redeliver the same message, as a queue may after a retry.
        worker
            .queue
            .publish(JobMessage {
                request_id: id.clone(),
                request: request(),
            })
            .await;
        worker.process_batch(5).await;

        let done = jobs.get(&id).await.unwrap();
        assert_eq!(done.status, JobStatus::Success);
        assert!(done.result.is_some());
    }

    #[tokio::test]
    async fn unknown_job_is_none() {
        let (jobs, _) = harness(TransitFeed::default());
        assert!(jobs.get("nope").await.is_none());
    }

    #[tokio::test]
    async fn queue_batches_respect_limit() {
        let queue = InMemoryQueue::new();
        for i in 0..4 {
            queue
                .publish(JobMessage {
                    request_id: format!("j{i}"),
                    request: request(),
                })
                .await;
        }

        assert_eq!(queue.consume(3).await.len(), 3);
        assert_eq!(queue.consume(3).await.len(), 1);
        assert!(queue.consume(3).await.is_empty());
    }
}
