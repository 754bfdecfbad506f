/// Format a duration in seconds, e.g. `2mins 5s`. The sign is dropped.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.unsigned_abs();
    let (minutes, seconds) = (seconds / 60, seconds % 60);
    match minutes {
        0 => format!("{seconds}s"),
        1 => format!("1min {seconds}s"),
        _ => format!("{minutes}mins {seconds}s"),
    }
}

/// First 7 characters of a commit hash.
pub fn short_sha(sha: &str) -> &str { sha.get(..7).unwrap_or(sha) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        let cases: &[(i64, &str)] = &[
            (0, "0s"),
            (1, "1s"),
            (59, "59s"),
            (60, "1min 0s"),
            (61, "1min 1s"),
            (119, "1min 59s"),
            (120, "2mins 0s"),
            (125, "2mins 5s"),
            (3600, "60mins 0s"),
            (-61, "1min 1s"),
            (-5, "5s"),
        ];
        for &(seconds, expected) in cases {
            assert_eq!(format_duration(seconds), expected, "seconds {seconds}");
        }
    }

    #[test]
    fn test_short_sha() {
        assert_eq!(short_sha("0123456789abcdef"), "0123456");
        assert_eq!(short_sha("abc"), "abc");
    }
}
