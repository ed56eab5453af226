//! Trovi client core.
//!
//! Client-side core for the Trovi research-artifact sharing platform:
//! typed API models, URN codec, artifact normalization, badge index,
//! cursor-pagination accumulation, and client-side filtering.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;
pub mod urn;

pub use config::Config;
pub use error::{Result, TroviError};
