//! Utility functions and helpers
//!
//! This module contains timestamp utilities shared by the record types and
//! the flush pipeline.

pub mod time;

pub use time::{
    current_timestamp, date_key, format_timestamp, parse_timestamp, resolve_client_timestamp,
};
