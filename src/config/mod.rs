//! Configuration module for the canvas-downloader.
//!
//! This module handles:
//! - Loading and saving configuration from TOML files
//! - Configuration validation

pub mod loader;
pub mod validation;

pub use loader::{default_config_path, AccountConfig, Config, OptionsConfig};
pub use validation::{
    parse_course_id, parse_default_categories, validate_base_url, validate_config, validate_token,
};
