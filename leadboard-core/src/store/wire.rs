//! Wire shapes for the leads API
//!
//! Response bodies are parsed into envelopes first, then each lead entry is
//! validated on its own. A bad entry is dropped with a warning instead of
//! failing the whole list; a bad field becomes `None`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::RemoteLead;

/// Response from GET /api/leads
#[derive(Debug, Deserialize)]
pub struct ListLeadsResponse {
    #[serde(default)]
    pub success: bool,
    /// Raw entries, validated by [`parse_lead`]
    #[serde(default)]
    pub leads: Vec<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from PUT /api/leads/{id}
#[derive(Debug, Deserialize)]
pub struct UpdateLeadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Request body for PUT /api/leads/{id}
#[derive(Debug, Serialize)]
pub struct UpdateStatusRequest<'a> {
    pub status: &'a str,
}

/// Parse a list response body into validated leads.
pub fn parse_list_body(body: &str) -> Result<Vec<RemoteLead>> {
    let response: ListLeadsResponse = serde_json::from_str(body)?;
    if !response.success {
        return Err(Error::Rejected(
            response
                .error
                .unwrap_or_else(|| "list leads reported success: false".to_string()),
        ));
    }

    let total = response.leads.len();
    let leads: Vec<RemoteLead> = response.leads.iter().filter_map(parse_lead).collect();
    if leads.len() < total {
        tracing::warn!(
            dropped = total - leads.len(),
            total,
            "Dropped malformed lead entries"
        );
    }
    Ok(leads)
}

/// Parse an update response body.
pub fn parse_update_body(body: &str) -> Result<()> {
    let response: UpdateLeadResponse = serde_json::from_str(body)?;
    if response.success {
        Ok(())
    } else {
        Err(Error::Rejected(
            response
                .error
                .unwrap_or_else(|| "update reported success: false".to_string()),
        ))
    }
}

/// Validate one lead entry. Returns `None` when it has no usable id.
pub fn parse_lead(value: &Value) -> Option<RemoteLead> {
    let obj = value.as_object()?;

    let id = match obj.get("id")? {
        Value::String(s) if !s.trim().is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    Some(RemoteLead {
        id,
        first_name: text(obj.get("first_name")),
        last_name: text(obj.get("last_name")),
        email: text(obj.get("email")),
        phone: text(obj.get("phone")),
        status: text(obj.get("status")),
        location: text(obj.get("location")),
        price_range_min: number(obj.get("price_range_min")),
        price_range_max: number(obj.get("price_range_max")),
        tags: tags(obj.get("tags")),
    })
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Numbers, or strings holding a finite number.
fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn tags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}
