//! HTTP layer for the static responder
//!
//! Holds the `/work` handler. Routing lives in the crate root.

pub mod handlers;
