//! Final report rendering.

use crate::address;
use crate::census::CallerLedger;
use crate::config::AddressConfig;
use chrono::{SecondsFormat, TimeZone, Utc};
use tracing::warn;

/// The computed census summary, ready to print.
#[derive(Debug)]
pub struct CensusReport {
    unique_callers: usize,
    repeat_callers: Vec<(String, usize)>,
    first_transactions: Vec<(String, String)>,
}

impl CensusReport {
    pub fn from_ledger(ledger: &CallerLedger, display: &AddressConfig) -> CensusReport {
        let render = |caller: &str| {
            if display.friendly_output {
                address::normalize(caller, display)
            } else {
                caller.to_string()
            }
        };

        CensusReport {
            unique_callers: ledger.unique_callers(),
            repeat_callers: ledger
                .repeat_callers()
                .into_iter()
                .map(|(caller, count)| (render(caller), count))
                .collect(),
            first_transactions: ledger
                .first_seen()
                .map(|(caller, utime)| (render(caller), render_timestamp(utime)))
                .collect(),
        }
    }

    /// Report lines, in print order.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(3 + self.repeat_callers.len() + self.first_transactions.len());
        lines.push(format!(
            "Total unique addresses interacted: {}",
            self.unique_callers
        ));
        lines.push("Addresses that interacted more than once:".to_string());
        for (caller, count) in &self.repeat_callers {
            lines.push(format!("Address {} interacted {} times.", caller, count));
        }
        lines.push("First transactions:".to_string());
        for (caller, time) in &self.first_transactions {
            lines.push(format!(
                "Address: {}, First Transaction Time: {}",
                caller, time
            ));
        }
        lines
    }
}

/// Render a history timestamp as ISO-8601.
///
/// The value is fed to chrono as milliseconds since the epoch.
/// TODO: tonapi's `utime` looks like seconds; confirm against a live
/// response and switch to `timestamp_opt` if so (report fixtures change
/// with it).
fn render_timestamp(utime: i64) -> String {
    match Utc.timestamp_millis_opt(utime).single() {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => {
            warn!(utime, "timestamp out of range, printing raw value");
            utime.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_display() -> AddressConfig {
        AddressConfig {
            friendly_output: false,
            ..AddressConfig::default()
        }
    }

    #[test]
    fn renders_the_combined_census() {
        // Two items' histories folded the same way the driver does it.
        let mut ledger = CallerLedger::default();
        ledger.merge(CallerLedger::from_history(&json!({
            "events": [
                {"source": "X", "timestamp": 100},
                {"source": "X", "timestamp": 200},
            ]
        })));
        ledger.merge(CallerLedger::from_history(&json!({
            "events": [
                {"source": "X", "timestamp": 50},
                {"source": "Y", "timestamp": 300},
            ]
        })));

        let report = CensusReport::from_ledger(&ledger, &raw_display());
        assert_eq!(
            report.lines(),
            vec![
                "Total unique addresses interacted: 2",
                "Addresses that interacted more than once:",
                "Address X interacted 3 times.",
                "First transactions:",
                "Address: X, First Transaction Time: 1970-01-01T00:00:00.100Z",
                "Address: Y, First Transaction Time: 1970-01-01T00:00:00.300Z",
            ]
        );
    }

    #[test]
    fn empty_ledger_still_prints_headers() {
        let report = CensusReport::from_ledger(&CallerLedger::default(), &raw_display());
        assert_eq!(
            report.lines(),
            vec![
                "Total unique addresses interacted: 0",
                "Addresses that interacted more than once:",
                "First transactions:",
            ]
        );
    }

    #[test]
    fn timestamps_render_as_milliseconds() {
        let mut ledger = CallerLedger::default();
        ledger.record("X".to_string(), 1_700_000_000_000);
        let report = CensusReport::from_ledger(&ledger, &raw_display());
        assert_eq!(
            report.lines()[3],
            "Address: X, First Transaction Time: 2023-11-14T22:13:20.000Z"
        );
    }

    #[test]
    fn friendly_output_rewrites_displayed_addresses_only() {
        let raw = "0:65b9853f4e5a2f291c06d7e227852c9861e7362d8f3d8782f2ee810cc238491f";
        let mut ledger = CallerLedger::default();
        ledger.record(raw.to_string(), 100);
        ledger.record("not-an-address".to_string(), 200);

        let report = CensusReport::from_ledger(&ledger, &AddressConfig::default());
        assert_eq!(
            report.lines()[3],
            "Address: EQBluYU_TlovKRwG1-InhSyYYec2LY89h4Ly7oEMwjhJH6l3, \
             First Transaction Time: 1970-01-01T00:00:00.100Z"
        );
        // Unparseable callers fall through unchanged.
        assert_eq!(
            report.lines()[4],
            "Address: not-an-address, First Transaction Time: 1970-01-01T00:00:00.200Z"
        );
    }
}
