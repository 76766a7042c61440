//! Username canonicalization.
//!
//! Leak corpora key credentials by a normalized username: case differences
//! and a mail-provider suffix do not distinguish accounts. `"Alice"`,
//! `"ALICE"` and `"Alice@example.com"` all canonicalize to `"alice"`.

/// Produces the canonical form of `username`: lowercased, truncated at the
/// first `'@'`. Total; the worst case echoes the lowercased input.
pub fn canonicalize_username(username: &str) -> String {
    let lowered = username.to_lowercase();
    match lowered.split_once('@') {
        Some((local_part, _)) => local_part.to_string(),
        None => lowered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_equivalent_variants() {
        assert_eq!(canonicalize_username("alice"), "alice");
        assert_eq!(canonicalize_username("ALICE"), "alice");
        assert_eq!(canonicalize_username("Alice@example.com"), "alice");
    }

    #[test]
    fn keeps_non_mail_usernames() {
        assert_eq!(canonicalize_username("bob.smith"), "bob.smith");
        assert_eq!(canonicalize_username(""), "");
    }

    #[test]
    fn truncates_at_first_at_sign_only() {
        assert_eq!(canonicalize_username("a@b@c"), "a");
        assert_eq!(canonicalize_username("@example.com"), "");
    }

    #[test]
    fn is_idempotent() {
        for username in ["alice", "ALICE", "Alice@example.com", "a@b@c", "", "Bob"] {
            let once = canonicalize_username(username);
            assert_eq!(canonicalize_username(&once), once);
        }
    }
}
