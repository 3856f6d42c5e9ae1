//! Sync/async comparison reports.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Seconds a result reports in `elapsed_seconds`.
///
/// Numbers are taken as-is and numeric strings are parsed. Anything else,
/// including a missing field, counts as `0`.
pub fn elapsed_seconds(body: &Value) -> f64 {
    match body.get("elapsed_seconds") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeResult {
    pub mode: String,
    pub body: Value,
    pub elapsed_seconds: f64,
}

impl ModeResult {
    pub fn new(mode: impl Into<String>, body: Value) -> Self {
        let elapsed_seconds = elapsed_seconds(&body);
        Self {
            mode: mode.into(),
            body,
            elapsed_seconds,
        }
    }
}

/// Format with three decimals, rounding exact midpoints up.
///
/// `{:.3}` alone rounds a midpoint such as `1.0625` to even. A value that
/// sits exactly halfway between two thousandths is an odd number of
/// sixteenths, and scaling it by 1000 is exact, so only those are rounded
/// by hand.
fn three_places(value: f64) -> String {
    let sixteenths = value * 16.0;
    if sixteenths.fract() == 0.0 && sixteenths % 2.0 != 0.0 {
        return format!("{:.3}", (value * 1000.0).round() / 1000.0);
    }
    format!("{:.3}", value)
}

/// Derived part of a [`ComparisonReport`].
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Comparison {
    pub faster_mode: String,
    /// Absolute difference, three decimals
    pub delta_seconds: String,
}

/// Two results of alternate execution modes and which one was faster.
///
/// Serializes as `{<first mode>: .., <second mode>: .., "comparison": ..}`
/// in that order.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonReport {
    pub first: ModeResult,
    pub second: ModeResult,
    pub comparison: Comparison,
}

impl ComparisonReport {
    /// Compare two results. A tie goes to `first`.
    pub fn new(first: ModeResult, second: ModeResult) -> Self {
        let faster = if first.elapsed_seconds <= second.elapsed_seconds {
            &first
        } else {
            &second
        };
        let comparison = Comparison {
            faster_mode: faster.mode.clone(),
            delta_seconds: three_places((first.elapsed_seconds - second.elapsed_seconds).abs()),
        };

        Self {
            first,
            second,
            comparison,
        }
    }

    pub fn faster_mode(&self) -> &str {
        &self.comparison.faster_mode
    }

    pub fn delta_seconds(&self) -> &str {
        &self.comparison.delta_seconds
    }
}

impl Serialize for ComparisonReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(&self.first.mode, &self.first.body)?;
        map.serialize_entry(&self.second.mode, &self.second.body)?;
        map.serialize_entry("comparison", &self.comparison)?;
        map.end()
    }
}
