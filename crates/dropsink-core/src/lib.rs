//! dropsink core: filename derivation, collision handling, and persistence
//! dispatch for inbound share payloads.

pub mod config;
pub mod logging;

pub mod batch;
pub mod classify;
pub mod conflict;
pub mod content_type;
pub mod download;
pub mod error;
pub mod filename;
pub mod location;
pub mod media_index;
pub mod persist;
pub mod probe;
pub mod request;
