/// Marker appended to truncated descriptions.
pub const ELLIPSIS: &str = "...";

/// Collapse all whitespace (line breaks included) to single spaces, trim,
/// and cut to `cap` characters followed by [`ELLIPSIS`] if longer.
pub fn normalize_description(text: &str, cap: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= cap {
        return collapsed;
    }
    let mut truncated: String = collapsed.chars().take(cap).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_description_is_only_collapsed() {
        assert_eq!(normalize_description("  to the\n\tmoon  ", 35), "to the moon");
        assert_eq!(normalize_description("", 35), "");
    }

    #[test]
    fn test_long_description_is_capped_with_ellipsis() {
        let text = "The first cat coin on the chain.\r\nCommunity owned, no presale, no team tokens.";
        let out = normalize_description(text, 35);
        assert_eq!(out.chars().count(), 35 + 3);
        assert!(out.ends_with(ELLIPSIS));
        assert!(!out.contains(['\n', '\r']));
        assert!(out.starts_with("The first cat coin on the chain. Co"));
    }

    #[test]
    fn test_exactly_cap_is_not_truncated() {
        let text = "a".repeat(35);
        assert_eq!(normalize_description(&text, 35), text);
    }

    #[test]
    fn test_cap_counts_characters_not_bytes() {
        let text = "猫".repeat(40);
        let out = normalize_description(&text, 35);
        assert_eq!(out.chars().count(), 38);
    }
}
