//! Lead priority scoring
//!
//! Scores are recomputed on every board rebuild and never stored, so the tier
//! shown on a card always follows the latest remote snapshot.

use crate::types::{Priority, RemoteLead};

const BASE_SCORE: u8 = 30;
const EMAIL_BONUS: u8 = 10;
const PHONE_BONUS: u8 = 15;
const BUDGET_BONUS: u8 = 10;
const QUALIFIED_BONUS: u8 = 20;
const ACTIVE_BONUS: u8 = 10;

/// Lowest score that is tiered hot
pub const HOT_THRESHOLD: u8 = 70;
/// Lowest score that is tiered warm
pub const WARM_THRESHOLD: u8 = 50;

/// Score a lead in `0..=100`.
pub fn score(lead: &RemoteLead) -> u8 {
    let mut score = BASE_SCORE;

    if has_text(&lead.email) {
        score += EMAIL_BONUS;
    }
    if has_text(&lead.phone) {
        score += PHONE_BONUS;
    }
    if has_amount(lead.price_range_max) {
        score += BUDGET_BONUS;
    }
    score += match lead.status.as_deref() {
        Some("Qualified") => QUALIFIED_BONUS,
        Some("Active") => ACTIVE_BONUS,
        _ => 0,
    };

    score.min(100)
}

/// Map a score to its tier.
pub fn tier(score: u8) -> Priority {
    if score >= HOT_THRESHOLD {
        Priority::Hot
    } else if score >= WARM_THRESHOLD {
        Priority::Warm
    } else {
        Priority::Cold
    }
}

/// Score and tier in one step.
pub fn priority(lead: &RemoteLead) -> Priority {
    tier(score(lead))
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}

/// Finite and non-zero.
pub(crate) fn has_amount(value: Option<f64>) -> bool {
    value.is_some_and(|v| v.is_finite() && v != 0.0)
}
