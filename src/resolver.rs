//! Expansion of a stored ping list against live channel presence.

use std::collections::{BTreeSet, HashSet};

use log::debug;

use crate::matcher::nick_matches;

/// Expands `stored` with every present nick that is a variant of a stored
/// nick, returning the union sorted lexicographically.
///
/// The presence snapshot is a read-only, point-in-time view supplied by the
/// runtime; nothing here is cached. Quadratic over the two sets, which is
/// fine for lists of tens of entries.
#[must_use]
pub fn resolve(stored: &BTreeSet<String>, presence: &HashSet<String>) -> Vec<String> {
    let mut result = stored.clone();
    for nick in stored {
        for present in presence {
            if present != nick && nick_matches(nick, present) {
                debug!("Resolved {} as variant of {}", present, nick);
                result.insert(present.clone());
            }
        }
    }
    result.into_iter().collect()
}
