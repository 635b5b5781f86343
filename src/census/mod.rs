//! Caller aggregation across item histories.
//!
//! Each item's history response is reduced to a `CallerLedger`, and the
//! per-item ledgers are folded into one combined ledger for the whole
//! collection. The ledger is a plain value passed around explicitly, so
//! the merge step stays pure and testable.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

/// History wire shape. Only `source` and `timestamp` are read; an event
/// missing either is malformed and contributes nothing.
#[derive(Debug, Deserialize)]
struct HistoryPage {
    #[serde(default)]
    events: Vec<HistoryEvent>,
}

#[derive(Debug, Deserialize)]
struct HistoryEvent {
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    timestamp: Option<i64>,
}

/// Accumulated interaction data, keyed by caller address exactly as the
/// API returned it.
///
/// `first_seen` records the first timestamp encountered for a caller in
/// discovery order — within one response that is event order, across
/// items it is item processing order. It is deliberately NOT the numeric
/// minimum: an earlier timestamp found under a later item does not
/// replace it.
#[derive(Debug, Default)]
pub struct CallerLedger {
    timestamps: HashMap<String, Vec<i64>>,
    first_seen: HashMap<String, i64>,
    /// Caller discovery order, so iteration (and the report) is stable.
    order: Vec<String>,
}

impl CallerLedger {
    /// Reduce one history response to a ledger. A response without an
    /// `events` field yields an empty ledger.
    pub fn from_history(history: &Value) -> CallerLedger {
        let page: HistoryPage = match serde_json::from_value(history.clone()) {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "unexpected history shape, treating as empty");
                return CallerLedger::default();
            }
        };

        let mut ledger = CallerLedger::default();
        for event in page.events {
            let (Some(caller), Some(timestamp)) = (event.source, event.timestamp) else {
                continue;
            };
            debug!(caller = %caller, timestamp, "history event");
            ledger.record(caller, timestamp);
        }
        ledger
    }

    /// Append one observation for `caller`.
    pub fn record(&mut self, caller: String, timestamp: i64) {
        if !self.timestamps.contains_key(&caller) {
            self.order.push(caller.clone());
            self.first_seen.insert(caller.clone(), timestamp);
        }
        self.timestamps.entry(caller).or_default().push(timestamp);
    }

    /// Fold another ledger (one item's worth) into this one. Timestamp
    /// sequences concatenate; first-seen entries only land for callers
    /// not seen under any earlier item.
    pub fn merge(&mut self, other: CallerLedger) {
        for caller in other.order {
            let timestamps = &other.timestamps[&caller];
            if !self.timestamps.contains_key(&caller) {
                self.order.push(caller.clone());
                self.first_seen.insert(caller.clone(), other.first_seen[&caller]);
            }
            self.timestamps
                .entry(caller)
                .or_default()
                .extend_from_slice(timestamps);
        }
    }

    /// Number of distinct callers recorded.
    pub fn unique_callers(&self) -> usize {
        self.timestamps.len()
    }

    /// Callers with more than one recorded interaction, with their
    /// counts, in discovery order.
    pub fn repeat_callers(&self) -> Vec<(&str, usize)> {
        self.order
            .iter()
            .filter_map(|caller| {
                let count = self.timestamps[caller].len();
                (count > 1).then_some((caller.as_str(), count))
            })
            .collect()
    }

    /// First-seen timestamps in discovery order.
    pub fn first_seen(&self) -> impl Iterator<Item = (&str, i64)> {
        self.order
            .iter()
            .map(|caller| (caller.as_str(), self.first_seen[caller]))
    }

    /// All timestamps recorded for one caller, in observation order.
    pub fn timestamps_for(&self, caller: &str) -> Option<&[i64]> {
        self.timestamps.get(caller).map(Vec::as_slice)
    }
}
