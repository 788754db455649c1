//! College Basketball Data Collector Library
//!
//! Pulls men's college basketball data from the ESPN site API and keeps a
//! local or remote copy of it in sync: team rosters, game schedules, and
//! per-player box-score stats.
//!
//! ## Features
//!
//! - **Roster Sync**: Team metadata plus per-player roster rows per season
//! - **Schedule Sync**: Game records deduped by game id, with an optional
//!   opponent-graph crawl
//! - **Stats Sync**: Box-score stat lines for completed games, resuming
//!   from a watermark in the sync log
//! - **Three Backends**: Append-only CSV files, a local SQLite database,
//!   or a PostgREST-style remote API with identical upsert semantics
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clap::Parser;
//! use cbb_sync::cli::CbbSync;
//! use cbb_sync::commands::{roster::run_roster, RunContext};
//!
//! # async fn example() -> cbb_sync::Result<()> {
//! let app = CbbSync::parse_from(["cbb-sync", "roster", "--backend", "sqlite"]);
//! if let cbb_sync::cli::Commands::Roster { common } = app.command {
//!     let mut ctx = RunContext::from_common(&common)?;
//!     run_roster(&mut ctx).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Configuration
//!
//! The REST backend reads its endpoint from the environment (or from
//! `.env.local` / `.env`):
//! ```bash
//! export CBB_SYNC_REST_URL=https://xyz.supabase.co
//! export CBB_SYNC_REST_KEY=service-role-key
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod espn;
pub mod rest;
pub mod storage;
pub mod sync;

// Re-export commonly used types
pub use cli::types::{GameId, PlayerId, Season, TeamId};
pub use error::{Result, SyncError};
