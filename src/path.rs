//! Request path normalization.

/// Normalize a raw request target into the form the matcher expects:
/// query string dropped, lowercased, trailing slashes trimmed, exactly
/// one leading slash. Patterns are matched case-sensitively, so callers
/// apply this before matching; the matcher itself never transforms the
/// path.
pub fn normalize_path(raw: &str) -> String {
    let path = raw.split('?').next().unwrap_or_default();
    format!("/{}", path.trim_matches('/').to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_dropped() {
        assert_eq!(normalize_path("/users/42?tab=posts"), "/users/42");
    }

    #[test]
    fn test_lowercased() {
        assert_eq!(normalize_path("/Users/Me"), "/users/me");
    }

    #[test]
    fn test_slashes_trimmed() {
        assert_eq!(normalize_path("/a/b/"), "/a/b");
        assert_eq!(normalize_path("a/b"), "/a/b");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
    }
}
