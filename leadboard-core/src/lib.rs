//! # leadboard-core
//!
//! Core library for leadboard - the lead pipeline of a real-estate CRM.
//!
//! This library provides:
//! - Domain types for remote leads, pipeline stages and board views
//! - Status classification and lead priority scoring
//! - A sync controller that keeps the board consistent with the leads API
//! - Background polling and a drag-and-drop interaction layer
//! - Configuration management and logging infrastructure
//!
//! ## Consistency model
//!
//! The leads API owns lead status. The board is rebuilt from it on every fetch,
//! moves are applied locally before they are persisted, and a failed write is
//! repaired by refetching everything.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use leadboard_core::pipeline::{IntervalTicker, MountedBoard, SyncController};
//! use leadboard_core::store::HttpLeadStore;
//! use leadboard_core::Config;
//!
//! # async fn run() -> leadboard_core::Result<()> {
//! let config = Config::load()?;
//! let store = HttpLeadStore::new(config.api.clone())?;
//! let controller = SyncController::new(Arc::new(store));
//! let board = MountedBoard::mount(
//!     controller,
//!     IntervalTicker::new(config.sync.poll_interval()),
//! )
//! .await;
//! println!("{} leads", board.controller().leads().len());
//! board.unmount().await;
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use store::{HttpLeadStore, LeadStore};
pub use types::*;

// Public modules
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod store;
pub mod types;
