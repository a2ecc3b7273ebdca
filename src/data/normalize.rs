//! Canonical form for region names so queries and dataset labels compare on equal footing.

/// Trim, lowercase and spell out `&` as `and`.
///
/// `"Konkan & Goa"` and `"  konkan and goa "` both become `"konkan and goa"`.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase().replace('&', "and")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ampersand_becomes_and() {
        assert_eq!(normalize("Konkan & Goa"), "konkan and goa");
    }

    #[test]
    fn test_trims_and_lowercases() {
        assert_eq!(normalize("  Gujarat "), "gujarat");
        assert_eq!(normalize("\tEAST MADHYA PRADESH\n"), "east madhya pradesh");
    }

    #[test]
    fn test_idempotent() {
        for input in ["Konkan & Goa", "  Gujarat ", "A & N Islands", "", "   "] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "normalize not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_inner_whitespace_untouched() {
        assert_eq!(normalize("Saurashtra &  Kutch"), "saurashtra and  kutch");
    }
}
