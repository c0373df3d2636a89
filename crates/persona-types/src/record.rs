//! Append-only change records kept in every ledger history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::context::ChangeContext;

/// One entry in a dimension's change history.
///
/// `delta` is what the caller asked for; `resulting_value` is where the
/// value actually landed after clamping. The two disagree whenever a change
/// ran into the dimension's floor or ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ChangeRecord {
    /// When the change was applied.
    pub timestamp: DateTime<Utc>,
    /// The requested change, before clamping.
    pub delta: f64,
    /// The dimension value after the change was clamped into range.
    pub resulting_value: f64,
    /// Human-readable reason (e.g. `"victory"`, `"Time decay"`).
    pub reason: String,
    /// Optional caller-supplied payload.
    #[serde(default)]
    #[ts(type = "Record<string, unknown> | null")]
    pub context: Option<ChangeContext>,
}

impl ChangeRecord {
    /// Create a record.
    pub fn new(
        timestamp: DateTime<Utc>,
        delta: f64,
        resulting_value: f64,
        reason: impl Into<String>,
        context: Option<ChangeContext>,
    ) -> Self {
        Self {
            timestamp,
            delta,
            resulting_value,
            reason: reason.into(),
            context,
        }
    }
}
