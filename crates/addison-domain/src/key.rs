// SPDX-License-Identifier: GPL-3.0-or-later

//! Track keys and the sanitizer that produces them.
//!
//! A recognized title is untrusted text. Before it is used to address a
//! stored track it goes through [`sanitize`], which keeps an allowlist of
//! characters that are safe both as a file name and as a URL path segment:
//!
//! - spaces become [`SPACE_SUBSTITUTE`] (`+`)
//! - letters and digits (any script, NFC-normalized) are kept
//! - `+`, `-`, `_` and `.` are kept, except that leading dots are dropped
//! - everything else, apostrophes included, is removed
//!
//! The rule is a compatibility contract: existing keys stay reachable only as
//! long as the same titles sanitize to the same keys. Any change to the rule
//! must bump [`SANITIZER_VERSION`].

use std::fmt;

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

/// Version of the sanitization rule.
pub const SANITIZER_VERSION: u32 = 1;

/// Replacement for every space in a title.
pub const SPACE_SUBSTITUTE: char = '+';

/// Storage-safe identifier of a track.
///
/// Only [`sanitize`] builds one, so every `TrackKey` satisfies the allowlist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TrackKey(String);

impl TrackKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Accept `value` only if it is already a sanitized key.
    ///
    /// Used when reading keys back from storage, where anything that would
    /// not survive [`sanitize`] unchanged was not written by us.
    pub fn from_sanitized(value: &str) -> Option<Self> {
        let key = sanitize(value);
        (key.0 == value).then_some(key)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TrackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TrackKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '+' | '-' | '_' | '.')
}

/// Turn a raw title into a [`TrackKey`]. Total and deterministic.
pub fn sanitize(raw: &str) -> TrackKey {
    let mut key = String::with_capacity(raw.len());

    for c in raw.nfc() {
        if c == ' ' {
            key.push(SPACE_SUBSTITUTE);
        } else if is_key_char(c) {
            key.push(c);
        }
    }

    match key.find(|c: char| c != '.') {
        Some(0) => TrackKey(key),
        Some(start) => TrackKey(key[start..].to_string()),
        None => TrackKey(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_and_apostrophes() {
        assert_eq!(sanitize("Rock 'n' Roll").as_str(), "Rock+n+Roll");
        assert_eq!(sanitize("Song Title").as_str(), "Song+Title");
        assert_eq!(sanitize("Don't Stop Me Now").as_str(), "Dont+Stop+Me+Now");
    }

    #[test]
    fn plain_titles_pass_through() {
        assert_eq!(sanitize("Missing").as_str(), "Missing");
        assert_eq!(sanitize("Song_2-Remix.v1").as_str(), "Song_2-Remix.v1");
    }

    #[test]
    fn empty_title_gives_empty_key() {
        assert!(sanitize("").is_empty());
    }

    #[test]
    fn only_removed_characters_gives_empty_key() {
        assert!(sanitize("''''").is_empty());
        assert!(sanitize("?!/\\").is_empty());
        assert_eq!(sanitize("   ").as_str(), "+++");
    }

    #[test]
    fn path_and_url_metacharacters_are_removed() {
        let key = sanitize("../../etc/passwd?x=1#frag%20");
        assert_eq!(key.as_str(), "etcpasswdx1frag20");
        assert!(!key.as_str().contains('/'));

        assert_eq!(sanitize("AC/DC").as_str(), "ACDC");
        assert_eq!(sanitize("a\\b\0c\td").as_str(), "abcd");
    }

    #[test]
    fn leading_dots_are_dropped() {
        assert_eq!(sanitize("..").as_str(), "");
        assert_eq!(sanitize("...Baby One More Time").as_str(), "Baby+One+More+Time");
        assert_eq!(sanitize("Vol. 2").as_str(), "Vol.+2");
    }

    #[test]
    fn typographic_apostrophe_is_removed() {
        assert_eq!(sanitize("Rock \u{2019}n\u{2019} Roll").as_str(), "Rock+n+Roll");
    }

    #[test]
    fn unicode_letters_are_kept_and_normalized() {
        let composed = sanitize("Beyonc\u{e9}");
        let decomposed = sanitize("Beyonce\u{301}");
        assert_eq!(composed, decomposed);
        assert_eq!(composed.as_str(), "Beyonc\u{e9}");
        assert_eq!(sanitize("東京 Drift").as_str(), "東京+Drift");
    }

    #[test]
    fn deterministic_and_idempotent() {
        let titles = [
            "",
            "Rock 'n' Roll",
            "  spaced  out  ",
            "..hidden",
            "Sigur Rós – Hoppípolla",
            "100% Pure Love",
        ];
        for title in titles {
            let once = sanitize(title);
            assert_eq!(once, sanitize(title));
            assert_eq!(sanitize(once.as_str()), once);
        }
    }

    #[test]
    fn distinct_titles_can_collide() {
        // Punctuation outside the allowlist is dropped, so these share a key.
        assert_eq!(sanitize("Help!"), sanitize("Help"));
        assert_eq!(sanitize("Rock 'n' Roll"), sanitize("Rock n Roll"));
    }

    #[test]
    fn from_sanitized_accepts_only_clean_keys() {
        assert_eq!(
            TrackKey::from_sanitized("Song+Title").map(TrackKey::into_string),
            Some("Song+Title".to_string())
        );
        assert!(TrackKey::from_sanitized("Song Title").is_none());
        assert!(TrackKey::from_sanitized(".hidden").is_none());
        assert!(TrackKey::from_sanitized("").is_some());
    }

    #[test]
    fn displays_as_plain_string() {
        assert_eq!(sanitize("Song Title").to_string(), "Song+Title");
    }
}
