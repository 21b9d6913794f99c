//! Time formatting helpers.

/// Format a duration in seconds to a human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// "ends in 2d 3h" while time remains, "ended" once it has run out.
pub fn format_remaining(remaining_secs: Option<u64>) -> String {
    match remaining_secs {
        Some(0) | None => "ended".to_string(),
        Some(secs) => format!("ends in {}", format_duration(secs)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_each_unit() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(125), "2m 5s");
        assert_eq!(format_duration(3 * 3600 + 120), "3h 2m");
        assert_eq!(format_duration(2 * 86400 + 3 * 3600), "2d 3h");
    }

    #[test]
    fn remaining_reads_naturally() {
        assert_eq!(format_remaining(None), "ended");
        assert_eq!(format_remaining(Some(0)), "ended");
        assert_eq!(format_remaining(Some(90)), "ends in 1m 30s");
    }
}
