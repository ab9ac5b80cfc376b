//! Rwanda trade statistics client library
//!
//! This module exposes the fetch wrapper, trade data models, rendering and CLI
//! modules for use by the binary and in integration tests.

pub mod api;
pub mod cli;
pub mod config;
pub mod data;
pub mod render;
