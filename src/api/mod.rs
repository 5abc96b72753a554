//! Canvas API module.
//!
//! This module provides:
//! - HTTP client for the Canvas REST API
//! - Bearer credential storage
//! - `Link` header pagination
//! - API response types

pub mod auth;
pub mod client;
pub mod pagination;
pub mod types;

pub use auth::Credentials;
pub use client::{CanvasApi, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE};
pub use types::*;
