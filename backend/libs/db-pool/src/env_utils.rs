//! Environment variable parsing utilities
//!
//! Missing or unparsable values fall back to defaults instead of panicking.

use std::str::FromStr;

/// Parse an environment variable with a default fallback
///
/// # Example
/// ```ignore
/// let port: u16 = parse_env_with_default("SERVER_PORT", 3001);
/// ```
pub fn parse_env_with_default<T: FromStr>(key: &str, default: T) -> T {
    parse_env_optional(key).unwrap_or(default)
}

/// Parse an environment variable, returning None if missing or invalid
pub fn parse_env_optional<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Read a string variable, treating blank values as missing
pub fn env_string_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Parse a comma separated list, dropping empty entries
pub fn parse_env_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_parse_env_with_default() {
        let result: u32 = parse_env_with_default("TRIP_TIDE_NONEXISTENT_VAR", 42);
        assert_eq!(result, 42);

        std::env::set_var("TRIP_TIDE_TEST_PORT", " 8080 ");
        let result: u16 = parse_env_with_default("TRIP_TIDE_TEST_PORT", 3000);
        assert_eq!(result, 8080);

        std::env::set_var("TRIP_TIDE_TEST_PORT", "not-a-port");
        let result: u16 = parse_env_with_default("TRIP_TIDE_TEST_PORT", 3000);
        assert_eq!(result, 3000);
        std::env::remove_var("TRIP_TIDE_TEST_PORT");
    }

    #[test]
    #[serial]
    fn test_env_string_or_ignores_blank() {
        std::env::set_var("TRIP_TIDE_TEST_NAME", "   ");
        assert_eq!(env_string_or("TRIP_TIDE_TEST_NAME", "fallback"), "fallback");

        std::env::set_var("TRIP_TIDE_TEST_NAME", "trip-tide");
        assert_eq!(env_string_or("TRIP_TIDE_TEST_NAME", "fallback"), "trip-tide");
        std::env::remove_var("TRIP_TIDE_TEST_NAME");
    }

    #[test]
    #[serial]
    fn test_parse_env_list() {
        std::env::set_var("TRIP_TIDE_TEST_LIST", "http://localhost:3000, ,https://triptide.app");
        assert_eq!(
            parse_env_list("TRIP_TIDE_TEST_LIST"),
            vec!["http://localhost:3000", "https://triptide.app"]
        );
        std::env::remove_var("TRIP_TIDE_TEST_LIST");

        assert!(parse_env_list("TRIP_TIDE_TEST_LIST").is_empty());
    }
}
