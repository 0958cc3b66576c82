use chrono::{NaiveDate, Utc};

/// RFC3339 timestamp in UTC (for results/logs).
pub fn iso_timestamp_utc() -> String {
    Utc::now().to_rfc3339()
}

/// Current UTC calendar date.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Truncate remote-supplied text before it lands in results or logs.
pub fn truncate_text(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let mut out = s.chars().take(max_len).collect::<String>();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_text_adds_ellipsis() {
        let s = "a".repeat(300);
        let t = truncate_text(&s, 200);
        assert!(t.ends_with("..."));
        assert_eq!(t.chars().count(), 203);
    }

    #[test]
    fn truncate_text_keeps_short_strings() {
        assert_eq!(truncate_text("ok", 200), "ok");
    }

    #[test]
    fn iso_timestamp_parses_back() {
        let ts = iso_timestamp_utc();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
