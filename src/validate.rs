//! Dotted-quad IPv4 syntax check.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::FormatError;

/// Each group is 250-255, 200-249, or 0-199 with an optional leading 0/1.
static IPV4: LazyLock<Regex> = LazyLock::new(|| {
    let octet = r"(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)";
    Regex::new(&format!(r"^{octet}\.{octet}\.{octet}\.{octet}$"))
        .expect("IPv4 pattern is a valid regex")
});

/// Whether `candidate` is exactly four dot-separated groups in 0..=255.
///
/// No trimming is applied: any surrounding character rejects the input.
pub fn is_valid_ipv4(candidate: &str) -> bool {
    IPV4.is_match(candidate)
}

/// Like [`is_valid_ipv4`], returning the rejected input on failure.
pub fn check(candidate: &str) -> Result<(), FormatError> {
    if is_valid_ipv4(candidate) {
        Ok(())
    } else {
        Err(FormatError {
            candidate: candidate.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_addresses() {
        for addr in ["192.168.1.1", "10.0.0.1", "0.0.0.0", "255.255.255.255", "8.8.8.8"] {
            assert!(is_valid_ipv4(addr), "{addr} should be valid");
        }
    }

    #[test]
    fn test_group_boundaries() {
        assert!(is_valid_ipv4("249.250.199.200"));
        assert!(!is_valid_ipv4("256.1.1.1"));
        assert!(!is_valid_ipv4("1.1.1.260"));
        assert!(!is_valid_ipv4("999.1.1.1"));
        assert!(!is_valid_ipv4("1.300.1.1"));
    }

    #[test]
    fn test_leading_zero_groups() {
        assert!(is_valid_ipv4("01.2.3.4"));
        assert!(is_valid_ipv4("001.2.3.4"));
        assert!(is_valid_ipv4("1.2.3.09"));
        // at most three digits per group
        assert!(!is_valid_ipv4("0001.2.3.4"));
    }

    #[test]
    fn test_rejects_wrong_shape() {
        for addr in [
            "",
            "1.2.3",
            "1.2.3.4.5",
            "1..2.3",
            "a.b.c.d",
            "1.2.3.4.",
            ".1.2.3.4",
            "1,2,3,4",
            "::1",
            "localhost",
        ] {
            assert!(!is_valid_ipv4(addr), "{addr:?} should be invalid");
        }
    }

    #[test]
    fn test_rejects_surrounding_characters() {
        assert!(!is_valid_ipv4(" 1.2.3.4"));
        assert!(!is_valid_ipv4("1.2.3.4 "));
        assert!(!is_valid_ipv4("1.2.3.4\n"));
        assert!(!is_valid_ipv4("x1.2.3.4"));
        assert!(!is_valid_ipv4("1.2.3.4/24"));
    }

    #[test]
    fn test_idempotent() {
        for addr in ["192.168.1.1", "256.1.1.1", ""] {
            assert_eq!(is_valid_ipv4(addr), is_valid_ipv4(addr));
        }
    }

    #[test]
    fn test_check_carries_candidate() {
        assert!(check("10.0.0.1").is_ok());
        let err = check("1.2.3").unwrap_err();
        assert_eq!(err.candidate, "1.2.3");
        assert!(err.to_string().contains("1.2.3"));
    }
}
