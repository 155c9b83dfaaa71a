//! Reply-line wrapping for long nick and list enumerations.

use textwrap::{Options, WordSplitter, wrap};

/// Maximum reply line width in characters.
pub const REPLY_WIDTH: usize = 256;

/// Wraps `text` into lines of at most [`REPLY_WIDTH`] characters.
///
/// Nick tokens are never split and hyphens are not treated as break points,
/// so decorated nicks like `alice-2` stay intact. A token longer than the
/// width overflows on its own line. Empty input yields no lines.
#[must_use]
pub fn wrap_reply(text: &str) -> Vec<String> {
    let options = Options::new(REPLY_WIDTH)
        .break_words(false)
        .word_splitter(WordSplitter::NoHyphenation);
    wrap(text, options)
        .into_iter()
        .map(|line| line.into_owned())
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(wrap_reply("alice bob carol"), vec!["alice bob carol"]);
    }

    #[test]
    fn empty_text_yields_no_lines() {
        assert!(wrap_reply("").is_empty());
    }

    #[test]
    fn lines_never_exceed_the_width() {
        let nicks: Vec<String> = (0..100).map(|i| format!("member{i:03}")).collect();
        let lines = wrap_reply(&nicks.join(" "));
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.len() <= REPLY_WIDTH);
        }
    }

    #[test]
    fn hyphenated_nicks_are_never_split() {
        let nicks: Vec<String> = (0..40).map(|i| format!("longnickname{i:02}-alt")).collect();
        let lines = wrap_reply(&nicks.join(" "));
        let rejoined: Vec<&str> = lines
            .iter()
            .flat_map(|line| line.split_whitespace())
            .collect();
        assert_eq!(rejoined.len(), 40);
        for nick in rejoined {
            assert!(nick.ends_with("-alt"));
        }
    }

    #[test]
    fn oversized_token_overflows_alone() {
        let giant = "x".repeat(REPLY_WIDTH + 10);
        let lines = wrap_reply(&format!("alice {giant} bob"));
        assert!(lines.contains(&giant));
    }
}
