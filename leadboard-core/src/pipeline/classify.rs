//! Mapping between remote status strings and pipeline stages
//!
//! Classification is many-to-one: several legacy status strings land in the
//! same column. Write-back is one-to-one: a move always sends the stage's
//! canonical status, so legacy variants are not preserved once a lead is moved.

use crate::types::PipelineStage;

/// Status strings each stage claims, checked in column order.
///
/// `New` additionally acts as the fallback bucket for missing, empty and
/// unrecognized statuses.
static STAGE_STATUSES: [(PipelineStage, &[&str]); 7] = [
    (PipelineStage::New, &["New", "Cold"]),
    (PipelineStage::Contacted, &["Contacted"]),
    (PipelineStage::Qualified, &["Qualified"]),
    (PipelineStage::Showing, &["Active", "Showing"]),
    (PipelineStage::UnderContract, &["Under Contract"]),
    (PipelineStage::Closing, &["Closing"]),
    (PipelineStage::ClosedWon, &["Closed", "Closed Won"]),
];

/// Classify a remote status into a stage. First match wins.
pub fn classify(status: Option<&str>) -> PipelineStage {
    let Some(status) = status.filter(|s| !s.is_empty()) else {
        return PipelineStage::New;
    };

    STAGE_STATUSES
        .iter()
        .find(|(_, statuses)| statuses.contains(&status))
        .map(|(stage, _)| *stage)
        .unwrap_or(PipelineStage::New)
}

/// Canonical status written back when a lead is moved into `stage`.
pub fn unclassify(stage: PipelineStage) -> &'static str {
    match stage {
        PipelineStage::New => "New",
        PipelineStage::Contacted => "Contacted",
        PipelineStage::Qualified => "Qualified",
        PipelineStage::Showing => "Active",
        PipelineStage::UnderContract => "Under Contract",
        PipelineStage::Closing => "Closing",
        PipelineStage::ClosedWon => "Closed",
    }
}

/// Status strings that classify into `stage` (excluding the fallback).
pub fn statuses_for(stage: PipelineStage) -> &'static [&'static str] {
    STAGE_STATUSES
        .iter()
        .find(|(s, _)| *s == stage)
        .map(|(_, statuses)| *statuses)
        .unwrap_or(&[])
}
