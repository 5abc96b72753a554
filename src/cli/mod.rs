//! Command-line interface.

pub mod args;

pub use args::{Args, ItemSelector, ResolvedToken, TokenSource, TOKEN_ENV};
