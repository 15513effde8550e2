use std::ops::RangeInclusive;

/// 10 chiffres, jeu de départ par défaut.
pub const CHARSET_DIGITS: &str = "0123456789";

/// 10 caractères compacts, bon contraste.
pub const CHARSET_COMPACT: &str = " .:-=+*#%@";

/// 70 caractères, Paul Bourke extended, bon équilibre.
pub const CHARSET_STANDARD: &str =
    " .'`^\",:;Il!i><~+_-?][}{1)(|/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";

/// Printable ASCII, space through tilde.
pub const PRINTABLE: RangeInclusive<char> = ' '..='~';

/// Named presets, looked up by [`preset`].
pub const PRESETS: &[(&str, &str)] = &[
    ("digits", CHARSET_DIGITS),
    ("compact", CHARSET_COMPACT),
    ("standard", CHARSET_STANDARD),
];

/// Resolve a preset name (case-insensitive).
///
/// # Example
/// ```
/// use at_core::charset::{preset, CHARSET_COMPACT};
/// assert_eq!(preset("Compact"), Some(CHARSET_COMPACT));
/// assert_eq!(preset("nope"), None);
/// ```
#[must_use]
pub fn preset(name: &str) -> Option<&'static str> {
    PRESETS
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|&(_, chars)| chars)
}

/// Whether `ch` is printable ASCII (space included).
///
/// # Example
/// ```
/// use at_core::charset::is_printable;
/// assert!(is_printable(' '));
/// assert!(is_printable('~'));
/// assert!(!is_printable('\t'));
/// assert!(!is_printable('é'));
/// ```
#[inline]
#[must_use]
pub fn is_printable(ch: char) -> bool {
    PRINTABLE.contains(&ch)
}

/// Every printable ASCII character, ascending.
pub fn printable() -> impl Iterator<Item = char> {
    PRINTABLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_has_95_chars() {
        assert_eq!(printable().count(), 95);
        assert_eq!(printable().next(), Some(' '));
        assert_eq!(printable().last(), Some('~'));
    }

    #[test]
    fn presets_are_printable() {
        for (name, chars) in PRESETS {
            assert!(chars.chars().all(is_printable), "{name}");
        }
    }
}
