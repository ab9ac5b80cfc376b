//! Fetch wrapper for the trade statistics API
//!
//! This module provides [`ApiClient`], which performs timeout-bounded JSON
//! calls with an in-memory response cache, classified failures, optional
//! fallback payloads and per-region loading indicators.

mod cache;
mod client;
mod error;
mod indicator;
mod notify;
mod options;

pub use cache::{CachedData, ResponseCache};
pub use client::{ApiClient, Connectivity};
pub use error::FetchError;
pub use indicator::{LoadingGuard, LoadingIndicator, NoopIndicator, TerminalIndicator};
pub use notify::{CollectingNotifier, LogNotifier, Notice, NoticeLevel, Notifier, TerminalNotifier};
pub use options::{FetchOptions, RequestBody};
