//! Remote lead store
//!
//! The backend leads API is the single source of truth for lead status. The
//! board only needs two operations from it, captured by [`LeadStore`] so the
//! sync controller can be driven by an in-memory store in tests.
//!
//! ## Usage
//!
//! Point the client at the backend in `~/.config/leadboard/config.toml`:
//!
//! ```toml
//! [api]
//! base_url = "https://crm.example.com"
//! api_key = "tok_xxxxxxxxxxxx"
//! ```

mod client;
pub mod wire;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::RemoteLead;

pub use client::HttpLeadStore;

/// Abstraction over the leads API.
/// Real implementation: [`HttpLeadStore`].
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Fetch the current list of leads.
    async fn list_leads(&self) -> Result<Vec<RemoteLead>>;

    /// Set the remote status of lead `id`.
    async fn update_status(&self, id: &str, status: &str) -> Result<()>;
}
