//! Nick matching for alternate and away sessions.

/// Suffix characters marking an alternate session of the same user.
const DECORATIONS: [char; 3] = ['-', '_', '|'];

/// Returns true when `candidate` denotes the same logical user as `stored`.
///
/// A candidate matches on exact equality, or when it starts with the stored
/// nick followed immediately by a decoration character (`alice` matches
/// `alice_`, `alice|away`, `alice-2`). The check is asymmetric: the stored
/// nick always goes first.
#[must_use]
pub fn nick_matches(stored: &str, candidate: &str) -> bool {
    if stored == candidate {
        return true;
    }
    candidate
        .strip_prefix(stored)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| DECORATIONS.contains(&c))
}
