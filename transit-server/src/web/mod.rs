//! Web layer for the multimodal transit router.
//!
//! Provides the JSON API for route calculation, async jobs and the
//! realtime map, plus static-file serving for the map frontend.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::create_router;
pub use state::AppState;
