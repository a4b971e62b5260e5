//! Board view model
//!
//! The board is a flat `Vec<PipelineLeadView>`; columns are filtered out of it
//! by stage. A fetch replaces the whole vector, a move touches one record.

use serde::Serialize;

use crate::types::{PipelineLeadView, PipelineStage, RemoteLead};

use super::classify::classify;
use super::score::{has_amount, priority};

/// Build one view per remote lead. Never fails on missing fields.
pub fn rebuild(remote: &[RemoteLead]) -> Vec<PipelineLeadView> {
    remote.iter().map(to_view).collect()
}

fn to_view(lead: &RemoteLead) -> PipelineLeadView {
    PipelineLeadView {
        id: lead.id.clone(),
        name: display_name(lead),
        stage: classify(lead.status.as_deref()),
        deal_value: lead.price_range_max.filter(|v| has_amount(Some(*v))),
        priority: priority(lead),
        original_status: lead.status.clone(),
        email: lead.email.clone(),
        phone: lead.phone.clone(),
        property_address: lead.location.clone().filter(|s| !s.is_empty()),
    }
}

fn display_name(lead: &RemoteLead) -> String {
    let first = lead.first_name.as_deref().unwrap_or("");
    let last = lead.last_name.as_deref().unwrap_or("");
    let name = format!("{} {}", first, last);
    let name = name.trim();
    if name.is_empty() {
        "Unknown".to_string()
    } else {
        name.to_string()
    }
}

/// Return `views` with the stage of lead `id` set to `stage`.
///
/// Unknown ids are ignored and the input comes back unchanged.
pub fn move_local(
    views: Vec<PipelineLeadView>,
    id: &str,
    stage: PipelineStage,
) -> Vec<PipelineLeadView> {
    views
        .into_iter()
        .map(|view| {
            if view.id == id {
                PipelineLeadView { stage, ..view }
            } else {
                view
            }
        })
        .collect()
}

/// Current stage of lead `id`, if it is on the board.
pub fn stage_of(views: &[PipelineLeadView], id: &str) -> Option<PipelineStage> {
    views.iter().find(|v| v.id == id).map(|v| v.stage)
}

/// Leads in one column, in board order.
pub fn column<'a>(
    views: &'a [PipelineLeadView],
    stage: PipelineStage,
) -> impl Iterator<Item = &'a PipelineLeadView> + 'a {
    views.iter().filter(move |v| v.stage == stage)
}

// ============================================
// Board statistics
// ============================================

/// Header totals for the board
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoardStats {
    pub total_leads: usize,
    /// Sum of deal values outside `closed_won`
    pub pipeline_value: f64,
    pub closed_won: usize,
    pub closed_value: f64,
}

/// Per-column count and value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub stage: PipelineStage,
    pub count: usize,
    pub value: f64,
}

impl BoardStats {
    pub fn compute(views: &[PipelineLeadView]) -> Self {
        let mut stats = BoardStats {
            total_leads: views.len(),
            ..Default::default()
        };
        for view in views {
            let value = view.deal_value.unwrap_or(0.0);
            if view.stage == PipelineStage::ClosedWon {
                stats.closed_won += 1;
                stats.closed_value += value;
            } else {
                stats.pipeline_value += value;
            }
        }
        stats
    }
}

/// One summary per stage, in column order (empty columns included).
pub fn column_summaries(views: &[PipelineLeadView]) -> Vec<ColumnSummary> {
    PipelineStage::ALL
        .into_iter()
        .map(|stage| {
            let (count, value) = column(views, stage).fold((0, 0.0), |(n, sum), v| {
                (n + 1, sum + v.deal_value.unwrap_or(0.0))
            });
            ColumnSummary {
                stage,
                count,
                value,
            }
        })
        .collect()
}

/// Compact currency label: `$1.2M`, `$350K`, `$950`.
pub fn format_currency(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("${:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${}K", (value / 1_000.0).round() as i64)
    } else {
        format!("${}", value.round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Priority;

    fn sample() -> Vec<PipelineLeadView> {
        rebuild(&[
            RemoteLead::new("a").with_name("Ana", "Ruiz").with_status("New"),
            RemoteLead {
                price_range_max: Some(500_000.0),
                ..RemoteLead::new("b").with_status("Qualified")
            },
            RemoteLead {
                price_range_max: Some(1_250_000.0),
                ..RemoteLead::new("c").with_status("Closed")
            },
        ])
    }

    #[test]
    fn test_rebuild_empty() {
        assert!(rebuild(&[]).is_empty());
    }

    #[test]
    fn test_rebuild_tolerates_bare_lead() {
        let views = rebuild(&[RemoteLead::new("x")]);
        assert_eq!(views.len(), 1);
        let view = &views[0];
        assert_eq!(view.id, "x");
        assert_eq!(view.name, "Unknown");
        assert_eq!(view.stage, PipelineStage::New);
        assert_eq!(view.deal_value, None);
        assert_eq!(view.priority, Priority::Cold);
        assert_eq!(view.original_status, None);
        assert_eq!(view.property_address, None);
    }

    #[test]
    fn test_rebuild_derives_fields() {
        let lead = RemoteLead {
            first_name: Some("Sam".to_string()),
            last_name: None,
            location: Some("12 Elm St".to_string()),
            price_range_max: Some(f64::INFINITY),
            ..RemoteLead::new("s").with_status("Under Contract")
        };
        let view = &rebuild(&[lead])[0];
        assert_eq!(view.name, "Sam");
        assert_eq!(view.stage, PipelineStage::UnderContract);
        assert_eq!(view.original_status.as_deref(), Some("Under Contract"));
        assert_eq!(view.property_address.as_deref(), Some("12 Elm St"));
        assert_eq!(view.deal_value, None);
    }

    #[test]
    fn test_whitespace_names_become_unknown() {
        let lead = RemoteLead::new("w").with_name("  ", "");
        assert_eq!(rebuild(&[lead])[0].name, "Unknown");
    }

    #[test]
    fn test_move_local_unknown_id_is_noop() {
        let views = sample();
        let moved = move_local(views.clone(), "missing", PipelineStage::Closing);
        assert_eq!(moved, views);
    }

    #[test]
    fn test_move_local_changes_only_target_stage() {
        let views = sample();
        let moved = move_local(views.clone(), "a", PipelineStage::UnderContract);

        assert_eq!(moved.len(), views.len());
        for (before, after) in views.iter().zip(&moved) {
            if before.id == "a" {
                assert_eq!(after.stage, PipelineStage::UnderContract);
                let restored = PipelineLeadView {
                    stage: before.stage,
                    ..after.clone()
                };
                assert_eq!(&restored, before);
            } else {
                assert_eq!(after, before);
            }
        }
    }

    #[test]
    fn test_stats_and_columns() {
        let views = sample();
        let stats = BoardStats::compute(&views);
        assert_eq!(stats.total_leads, 3);
        assert_eq!(stats.pipeline_value, 500_000.0);
        assert_eq!(stats.closed_won, 1);
        assert_eq!(stats.closed_value, 1_250_000.0);

        let columns = column_summaries(&views);
        assert_eq!(columns.len(), PipelineStage::ALL.len());
        assert_eq!(columns[0].stage, PipelineStage::New);
        assert_eq!(columns[0].count, 1);
        assert_eq!(columns[2].count, 1);
        assert_eq!(columns[2].value, 500_000.0);
        assert_eq!(columns[3].count, 0);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1_230_000.0), "$1.2M");
        assert_eq!(format_currency(350_400.0), "$350K");
        assert_eq!(format_currency(950.0), "$950");
        assert_eq!(format_currency(0.0), "$0");
    }
}
