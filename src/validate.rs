//! Legality rules for list names and nicks.

/// Characters the IRC protocol allows in nicks besides letters and digits.
const NICK_SPECIALS: &[char] = &['[', ']', '\\', '`', '_', '^', '{', '}', '|'];

/// Returns true when `name` is a legal ping list name.
///
/// Legal names are one or more word characters (letters, digits, underscore)
/// and nothing else. Checked only at list creation.
#[must_use]
pub fn is_valid_list_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_')
}

/// Returns true when `nick` is a legal nick under the chat protocol's rules.
///
/// The first character must be a letter or one of the special characters;
/// later characters may also be digits or `-`.
#[must_use]
pub fn is_valid_nick(nick: &str) -> bool {
    let mut chars = nick.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || NICK_SPECIALS.contains(&first)) {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || NICK_SPECIALS.contains(&c))
}
