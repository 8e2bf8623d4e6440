//! Cognitive storage intelligence for documents — semantic search with
//! lifecycle-aware re-ranking and explainable scores.
//!
//! NeuroVault ingests embedded document chunks and answers semantic queries by
//! combining nearest-neighbor similarity with time- and usage-based signals.
//! Every document carries a composite **cognitive score** in `[0, 1]`:
//!
//! ```text
//! final = w_semantic·similarity + w_recency·recency + w_access·access
//! ```
//!
//! and is classified into a lifecycle tier:
//!
//! | Tier | Threshold | Meaning |
//! |------|-----------|---------|
//! | **Active** | ≥ 0.75 | Hot — frequently accessed, highly relevant |
//! | **Contextual** | ≥ 0.50 | Warm — moderately relevant, recent context |
//! | **Archived** | ≥ 0.25 | Cold — low activity, infrequent access |
//! | **Dormant** | < 0.25 | Deep archive — rarely accessed, low relevance |
//!
//! # Architecture
//!
//! - **Storage**: SQLite (WAL) with [sqlite-vec](https://github.com/asg017/sqlite-vec)
//!   as the chunk-level nearest-neighbor index
//! - **Scoring**: exponential recency half-life + saturating access frequency,
//!   recomputed on every access and every search appearance
//! - **Transport**: JSON REST over axum
//!
//! # Modules
//!
//! - [`config`] — Configuration from TOML files and environment variables
//! - [`db`] — SQLite initialization, schema, and migrations
//! - [`embedding`] — Text-to-vector provider boundary
//! - [`vault`] — Core engine: ingest, search, access tracking, analytics
//! - [`api`] — REST surface consumed by the NeuroVault front-end

pub mod api;
pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod server;
pub mod vault;
