//! ---
//! sim_section: "01-core-functionality"
//! sim_subsection: "module"
//! sim_type: "source"
//! sim_scope: "code"
//! sim_description: "Shared primitives and utilities for the edgesim workspace."
//! sim_version: "v0.1.0"
//! sim_owner: "tbd"
//! ---
use chrono::Utc;

/// Current wall-clock time as UTC milliseconds.
pub fn timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Raise `now` to a previously emitted watermark so per-machine timestamps
/// never invert, even across clock steps. Ties are acceptable.
pub fn monotonic_ms(last: Option<i64>, now: i64) -> i64 {
    match last {
        Some(watermark) if watermark > now => watermark,
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_ms_passes_through_without_watermark() {
        assert_eq!(monotonic_ms(None, 1_000), 1_000);
    }

    #[test]
    fn monotonic_ms_raises_backwards_clock() {
        assert_eq!(monotonic_ms(Some(2_000), 1_000), 2_000);
    }

    #[test]
    fn monotonic_ms_allows_ties_and_progress() {
        assert_eq!(monotonic_ms(Some(1_000), 1_000), 1_000);
        assert_eq!(monotonic_ms(Some(1_000), 3_000), 3_000);
    }

    #[test]
    fn timestamp_ms_is_recent() {
        // Sanity floor: any time after 2020-01-01T00:00:00Z.
        assert!(timestamp_ms() > 1_577_836_800_000);
    }
}
