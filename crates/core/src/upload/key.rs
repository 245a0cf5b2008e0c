//! Storage key generation.
//!
//! A key is a random token followed by the extension of the submitted
//! filename, e.g. `V1StGXR8_Z5j.png`. Keys are not persisted and collisions
//! are not checked; with 64^12 possible tokens they are treated as negligible.

use rand::Rng;

/// URL-safe token alphabet.
const TOKEN_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Token length in characters.
pub const TOKEN_LEN: usize = 12;

/// Longest extension kept, excluding the dot.
const MAX_EXTENSION_LEN: usize = 16;

/// Generate a fresh random token.
#[must_use]
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LEN)
        .map(|_| char::from(TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())]))
        .collect()
}

/// Generate a storage key for a file named `filename`.
#[must_use]
pub fn generate_key(filename: &str) -> String {
    format!("{}{}", generate_token(), file_extension(filename))
}

/// Extension of `filename` including the leading dot, or an empty string.
///
/// Only the basename is considered. A leading dot (`.env`) does not start an
/// extension. The extension ends up verbatim in public URLs and object store
/// paths, so characters other than ASCII alphanumerics are dropped (spaces,
/// `?` and `#` would otherwise break the link) and the length is capped at
/// 16 characters.
#[must_use]
pub fn file_extension(filename: &str) -> String {
    let basename = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    match basename.rfind('.') {
        Some(idx) if idx > 0 => {
            let ext: String = basename[idx + 1..]
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .take(MAX_EXTENSION_LEN)
                .collect();
            if ext.is_empty() {
                String::new()
            } else {
                format!(".{ext}")
            }
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("photo.jpg", ".jpg")]
    #[case("archive.tar.gz", ".gz")]
    #[case("Report.PDF", ".PDF")]
    #[case("README", "")]
    #[case(".env", "")]
    #[case("trailing.", "")]
    #[case("dir.v2/notes", "")]
    #[case("C:\\Users\\me\\clip.mp4", ".mp4")]
    #[case("some/path/song.mp3", ".mp3")]
    #[case("weird.p n?g", ".png")]
    #[case("", "")]
    fn test_file_extension(#[case] filename: &str, #[case] expected: &str) {
        assert_eq!(file_extension(filename), expected);
    }

    #[test]
    fn test_file_extension_is_capped() {
        let ext = file_extension(&format!("x.{}", "a".repeat(100)));
        assert_eq!(ext.len(), MAX_EXTENSION_LEN + 1);
    }

    #[test]
    fn test_generate_key_shape() {
        let key = generate_key("holiday.jpeg");
        assert_eq!(key.len(), TOKEN_LEN + ".jpeg".len());
        assert!(key.ends_with(".jpeg"));
    }

    #[test]
    fn test_generate_key_without_extension() {
        assert_eq!(generate_key("Makefile").len(), TOKEN_LEN);
    }

    #[test]
    fn test_tokens_are_distinct() {
        let tokens: HashSet<String> = (0..10_000).map(|_| generate_token()).collect();
        assert_eq!(tokens.len(), 10_000);
    }
}
