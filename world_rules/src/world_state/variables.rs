//! Session variable keys.

/// Normalize a variable key to lower snake case.
///
/// Spaces, hyphens, dots and underscores are separators; runs of them collapse
/// to a single underscore and separators at either end are dropped.
pub fn normalize_var_key(key: &str) -> String {
    let mut normalized = String::with_capacity(key.len());
    let mut pending_separator = false;

    for ch in key.chars() {
        if ch.is_whitespace() || matches!(ch, '-' | '.' | '_') {
            pending_separator = true;
            continue;
        }
        if pending_separator && !normalized.is_empty() {
            normalized.push('_');
        }
        pending_separator = false;
        normalized.extend(ch.to_lowercase());
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_var_key() {
        assert_eq!(normalize_var_key("opened_grimoire"), "opened_grimoire");
        assert_eq!(normalize_var_key("Opened Grimoire"), "opened_grimoire");
        assert_eq!(normalize_var_key("door-state.north"), "door_state_north");
        assert_eq!(normalize_var_key("a - b"), "a_b");
        assert_eq!(normalize_var_key("a__b..c"), "a_b_c");
        assert_eq!(normalize_var_key("  _Trim Me_ "), "trim_me");
        assert_eq!(normalize_var_key(" -. "), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_var_key("Ship--Sails. Raised");
        assert_eq!(normalize_var_key(&once), once);
    }
}
