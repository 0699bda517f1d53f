// src/client/mod.rs
//
// Frontend-side plumbing: one HTTP wrapper for every page, plus the
// request-scoped session context the pages pass around explicitly.

mod api;
mod session;

pub use api::ApiClient;
pub use session::{Session, Theme};
