//! Core domain types for leadboard
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Remote lead** | A lead record as held by the backend leads API (authoritative) |
//! | **Stage** | One of the seven kanban columns a lead sits in |
//! | **Status** | The free-text field on a remote lead that the stage is derived from |
//! | **View** | The board's derived, display-ready copy of a remote lead |
//! | **Priority** | Hot/warm/cold tier computed from lead attributes; never persisted |
//!
//! The remote `status` is the only field the board writes back. Everything else
//! on a view is recomputed from the latest remote snapshot.

use serde::{Deserialize, Serialize};

// ============================================
// Remote Leads
// ============================================

/// A lead as returned by the leads API.
///
/// Every field except `id` may be missing on the wire; [`crate::store::wire`]
/// coerces malformed values to `None` before a `RemoteLead` is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteLead {
    /// Stable unique identifier, the only join key between board and backend
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Authoritative stage indicator (free text)
    pub status: Option<String>,
    /// Shown on the card as the property address
    pub location: Option<String>,
    pub price_range_min: Option<f64>,
    pub price_range_max: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RemoteLead {
    /// Create a lead with only an id set
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Builder-style status setter
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Builder-style name setter
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }
}

// ============================================
// Pipeline Stages
// ============================================

/// A kanban column.
///
/// Declaration order is the column layout order. It does not restrict
/// transitions: a lead may move from any stage to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    New,
    Contacted,
    Qualified,
    Showing,
    UnderContract,
    Closing,
    ClosedWon,
}

impl PipelineStage {
    /// All stages in column order
    pub const ALL: [PipelineStage; 7] = [
        PipelineStage::New,
        PipelineStage::Contacted,
        PipelineStage::Qualified,
        PipelineStage::Showing,
        PipelineStage::UnderContract,
        PipelineStage::Closing,
        PipelineStage::ClosedWon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::New => "new",
            PipelineStage::Contacted => "contacted",
            PipelineStage::Qualified => "qualified",
            PipelineStage::Showing => "showing",
            PipelineStage::UnderContract => "under_contract",
            PipelineStage::Closing => "closing",
            PipelineStage::ClosedWon => "closed_won",
        }
    }

    /// Column heading
    pub fn display_name(&self) -> &'static str {
        match self {
            PipelineStage::New => "New",
            PipelineStage::Contacted => "Contacted",
            PipelineStage::Qualified => "Qualified",
            PipelineStage::Showing => "Showing",
            PipelineStage::UnderContract => "Under Contract",
            PipelineStage::Closing => "Closing",
            PipelineStage::ClosedWon => "Closed",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PipelineStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PipelineStage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| format!("unknown pipeline stage: {}", s))
    }
}

// ============================================
// Priority
// ============================================

/// Visual priority tier derived from the lead score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Hot,
    Warm,
    Cold,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Hot => "hot",
            Priority::Warm => "warm",
            Priority::Cold => "cold",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================
// Board Views
// ============================================

/// The board's copy of a lead.
///
/// Rebuilt from scratch on every successful fetch. Only `stage` is ever
/// mutated in place, by an optimistic move.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineLeadView {
    pub id: String,
    /// First and last name, or `"Unknown"`
    pub name: String,
    pub stage: PipelineStage,
    /// `price_range_max`, when present and non-zero
    pub deal_value: Option<f64>,
    pub priority: Priority,
    /// Verbatim remote status at fetch time
    pub original_status: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub property_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_round_trips_through_str() {
        for stage in PipelineStage::ALL {
            assert_eq!(stage.as_str().parse::<PipelineStage>(), Ok(stage));
        }
        assert!("closed".parse::<PipelineStage>().is_err());
    }

    #[test]
    fn test_stage_order_is_column_order() {
        let mut sorted = PipelineStage::ALL;
        sorted.sort();
        assert_eq!(sorted, PipelineStage::ALL);
        assert_eq!(PipelineStage::ALL[0], PipelineStage::New);
        assert_eq!(PipelineStage::ALL[6], PipelineStage::ClosedWon);
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        let json = serde_json::to_string(&PipelineStage::UnderContract).unwrap();
        assert_eq!(json, "\"under_contract\"");
    }
}
