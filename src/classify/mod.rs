//! Market title classification
//!
//! Decides whether a market question belongs to the "Bitcoin Up or Down"
//! family and which 15-minute window it represents. Titles come in two
//! shapes: a short clock range ("1:15 PM - 1:30 PM", colon optional) and a
//! long form with a month/day prefix ("Jan 1, 1:00 PM - 1:15 PM").

use regex::Regex;
use std::sync::LazyLock;

/// Title phrase identifying the target market family
pub const FAMILY_PHRASE: &str = "bitcoin up or down";

/// Short clock-range form. Minute digits are restricted to quarter-hour
/// values by the pattern itself; the colon may be omitted.
static SHORT_WINDOW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2}):?(00|15|30|45)\s*[AP]M\s*-\s*\d{1,2}:?(15|30|45|00)\s*[AP]M")
        .expect("invalid short window pattern")
});

/// Long form with a month/day prefix and full H:MM times.
static LONG_WINDOW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[A-Za-z]+\s+\d{1,2},\s*\d{1,2}:(\d{2})\s*[AP]M\s*-\s*\d{1,2}:(\d{2})\s*[AP]M",
    )
    .expect("invalid long window pattern")
});

/// Canonical 15-minute-boundary pairs: start minute -> end minute
const VALID_15MIN_PAIRS: [(u32, u32); 4] = [(0, 15), (15, 30), (30, 45), (45, 0)];

/// A classified betting window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowKind {
    /// Window start minute within the hour
    pub start_min: u32,
    /// Window end minute within the hour
    pub end_min: u32,
}

/// Title matching mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternMode {
    /// Only canonical 15-minute windows
    #[default]
    FifteenMin,
    /// Any family-phrase title (discovery only, never the live entry path)
    Any,
}

/// Classify a market question into its 15-minute window.
///
/// Returns `None` for titles outside the market family, titles where neither
/// window pattern matches, and minute pairs off the canonical 15-minute
/// boundaries (e.g. hour-long windows). Mixing window granularities would
/// corrupt every per-bucket statistic downstream, so this is a hard filter.
pub fn classify(question: &str) -> Option<WindowKind> {
    if !contains_family_phrase(question) {
        return None;
    }

    let (start_min, end_min) = extract_minute_pair(question)?;

    if VALID_15MIN_PAIRS.contains(&(start_min, end_min)) {
        Some(WindowKind { start_min, end_min })
    } else {
        None
    }
}

/// Check a question against the given pattern mode.
pub fn matches(question: &str, mode: PatternMode) -> bool {
    match mode {
        PatternMode::FifteenMin => classify(question).is_some(),
        PatternMode::Any => contains_family_phrase(question),
    }
}

fn contains_family_phrase(question: &str) -> bool {
    question.to_lowercase().contains(FAMILY_PHRASE)
}

/// Extract the (start-minute, end-minute) pair via the short pattern, then
/// the long one. The short pattern also matches inside long-form titles,
/// which is fine: both read the same clock range.
fn extract_minute_pair(question: &str) -> Option<(u32, u32)> {
    if let Some(caps) = SHORT_WINDOW.captures(question) {
        let start = caps.get(2)?.as_str().parse().ok()?;
        let end = caps.get(3)?.as_str().parse().ok()?;
        return Some((start, end));
    }

    if let Some(caps) = LONG_WINDOW.captures(question) {
        let start = caps.get(1)?.as_str().parse().ok()?;
        let end = caps.get(2)?.as_str().parse().ok()?;
        return Some((start, end));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_all_canonical_pairs() {
        let titles = [
            ("Bitcoin Up or Down - 1:00 PM - 1:15 PM ET", (0, 15)),
            ("Bitcoin Up or Down - 1:15 PM - 1:30 PM ET", (15, 30)),
            ("Bitcoin Up or Down - 1:30 PM - 1:45 PM ET", (30, 45)),
            ("Bitcoin Up or Down - 1:45 PM - 2:00 PM ET", (45, 0)),
        ];

        for (title, (start, end)) in titles {
            let window = classify(title).unwrap_or_else(|| panic!("should classify: {}", title));
            assert_eq!(window.start_min, start);
            assert_eq!(window.end_min, end);
        }
    }

    #[test]
    fn test_classify_long_form() {
        let window = classify("Bitcoin Up or Down Jan 1, 1:00 PM - 1:15 PM").unwrap();
        assert_eq!(window.start_min, 0);
        assert_eq!(window.end_min, 15);
    }

    #[test]
    fn test_classify_colonless_minutes() {
        assert!(classify("Bitcoin Up or Down 115 PM - 130 PM").is_some());
    }

    #[test]
    fn test_classify_rejects_hour_window() {
        // (0, 30) is not a canonical 15-minute pair
        assert!(classify("Bitcoin Up or Down 1:00 PM - 1:30 PM").is_none());
        // (0, 0) is not either
        assert!(classify("Bitcoin Up or Down 1:00 PM - 2:00 PM").is_none());
    }

    #[test]
    fn test_classify_rejects_long_form_off_boundary() {
        assert!(classify("Bitcoin Up or Down Jan 1, 1:05 PM - 1:20 PM").is_none());
    }

    #[test]
    fn test_classify_rejects_foreign_family() {
        assert!(classify("Ethereum Up or Down 1:00 PM - 1:15 PM").is_none());
        assert!(classify("Will BTC close above $100k today?").is_none());
    }

    #[test]
    fn test_classify_rejects_missing_window() {
        assert!(classify("Bitcoin Up or Down").is_none());
        assert!(classify("").is_none());
    }

    #[test]
    fn test_classify_case_insensitive() {
        assert!(classify("BITCOIN UP OR DOWN 1:15 pm - 1:30 pm").is_some());
    }

    #[test]
    fn test_any_mode_accepts_windowless_title() {
        assert!(matches("Bitcoin Up or Down hourly special", PatternMode::Any));
        assert!(!matches(
            "Bitcoin Up or Down hourly special",
            PatternMode::FifteenMin
        ));
    }

    #[test]
    fn test_any_mode_still_requires_family_phrase() {
        assert!(!matches("Solana Up or Down 1:00 PM - 1:15 PM", PatternMode::Any));
    }
}
