use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use transit_server::feed::{FeedProvider, JsonFeedProvider};
use transit_server::jobs::{InMemoryQueue, InMemoryResultStore, RouteJobs, Worker};
use transit_server::planner::{MultimodalPlanner, RoutingConfig};
use transit_server::realtime::{HttpVehicleProvider, RealtimeViewService, VehicleFeedConfig};
use transit_server::streets::{CachedStreets, GreatCircleStreets, StreetCacheConfig};
use transit_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let feed_path = std::env::var("FEED_PATH").unwrap_or_else(|_| "data/feed.json".to_string());
    let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "web".to_string());

    // Load the feed once up front so a broken snapshot fails fast.
    let feeds: Arc<dyn FeedProvider> = Arc::new(JsonFeedProvider::new(&feed_path));
    let feed = feeds.load_feed().expect("failed to load transit feed");
    tracing::info!(
        path = %feed_path,
        stops = feed.stops().count(),
        connections = feed.connections().len(),
        "loaded transit feed"
    );

    let streets = CachedStreets::new(GreatCircleStreets::new(), &StreetCacheConfig::default());
    let planner = Arc::new(MultimodalPlanner::new(
        feeds.clone(),
        streets,
        RoutingConfig::default(),
    ));

    // Realtime vehicles: live feed when configured, schedule projection
    // otherwise.
    let vehicles = match std::env::var("VEHICLES_URL") {
        Ok(url) => Some(
            HttpVehicleProvider::new(VehicleFeedConfig::new(url))
                .expect("failed to create vehicle feed client"),
        ),
        Err(_) => None,
    };
    let realtime = Arc::new(RealtimeViewService::new(feeds.clone(), vehicles));

    // Async jobs: in-process queue and store, one background worker.
    let queue = Arc::new(InMemoryQueue::new());
    let store = Arc::new(InMemoryResultStore::new());
    let jobs = Arc::new(RouteJobs::new(queue.clone(), store.clone()));

    let worker = Worker::new(planner.clone(), queue, store);
    tokio::spawn(async move { worker.run().await });

    let state = AppState::new(planner, realtime, jobs);
    let app = create_router(state, &static_dir);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    tracing::info!(%addr, "transit server listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
