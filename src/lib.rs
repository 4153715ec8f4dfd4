//! # Course Catalog
//!
//! A directory-backed catalog of PDF course material with per-item progress
//! tracking, served over a small JSON HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────┐
//! │ Group dirs  │──▶│   Indexer   │──▶│ Catalog  │
//! │  (*.pdf)    │   │  (startup)  │   │ (memory) │
//! └─────────────┘   └─────────────┘   └────┬─────┘
//!                                          │
//!                      ┌───────────────────┤
//!                      ▼                   ▼
//!                 ┌──────────┐       ┌──────────┐
//!                 │   CLI    │       │   HTTP   │
//!                 │  (scan)  │       │  (axum)  │
//!                 └──────────┘       └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Groups, items, and their wire forms |
//! | [`indexer`] | One-shot directory scan |
//! | [`catalog`] | Query and progress-update service |
//! | [`error`] | Error taxonomy |
//! | [`server`] | HTTP API |
//! | [`scan`] | `catalog scan` report |

pub mod catalog;
pub mod config;
pub mod error;
pub mod indexer;
pub mod models;
pub mod scan;
pub mod server;
