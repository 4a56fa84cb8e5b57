//! Multimodal transit routing server.
//!
//! Answers "how do I get from A to B" for a city by combining walking with
//! scheduled public transit, and renders vehicle positions for a live map.

pub mod domain;
pub mod feed;
pub mod jobs;
pub mod planner;
pub mod realtime;
pub mod streets;
pub mod web;
