//! Qualified names to renderer-safe identifiers
//!
//! A parametric renderer only understands plain camel-case identifiers. A
//! qualified name is stripped of illegal characters and camel-cased, then a
//! short hash suffix of the *unsanitized* name is appended so that names that
//! strip to the same stem (`a_b` and `aB`, `my box` and `mybox`) still get
//! different identifiers.

use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Default length of the hash suffix
pub const DEFAULT_SUFFIX_LEN: usize = 6;

const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// An identifier exposed to the renderer; matches `[A-Za-z_][A-Za-z0-9_]*`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Deterministic qualified-name to identifier conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sanitizer {
    suffix_len: usize,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(DEFAULT_SUFFIX_LEN)
    }
}

impl Sanitizer {
    pub fn new(suffix_len: usize) -> Self {
        Self { suffix_len }
    }

    pub fn suffix_len(&self) -> usize {
        self.suffix_len
    }

    pub fn sanitize(&self, qualified: &str) -> Identifier {
        let mut stem = camel_case(&strip(qualified));
        if stem.starts_with(|c: char| c.is_ascii_digit()) {
            stem.insert(0, '_');
        }
        stem.push_str(&hash_suffix(qualified, self.suffix_len));
        Identifier(stem)
    }
}

/// Sanitize with the default suffix length
pub fn sanitize(qualified: &str) -> Identifier {
    Sanitizer::default().sanitize(qualified)
}

fn strip(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '_')
        .collect()
}

/// `.` and `_` separate words. A word opening with two or more capitals is an
/// acronym and is kept as is; otherwise the first word starts lower-case and
/// later words start upper-case.
fn camel_case(stripped: &str) -> String {
    let mut out = String::with_capacity(stripped.len());
    let words = stripped
        .split(|c| c == '.' || c == '_')
        .filter(|w| !w.is_empty());

    for (index, word) in words.enumerate() {
        let leading_upper = word.chars().take_while(|c| c.is_ascii_uppercase()).count();
        if leading_upper >= 2 {
            out.push_str(word);
            continue;
        }

        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if index == 0 {
                out.push(first.to_ascii_lowercase());
            } else {
                out.push(first.to_ascii_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    out
}

fn hash_suffix(qualified: &str, len: usize) -> String {
    let digest = Sha256::digest(qualified.as_bytes());
    encode_base26(&digest).chars().take(len).collect()
}

/// Big-endian base-26 encoding over `A..Z`; each leading zero byte becomes `A`
fn encode_base26(bytes: &[u8]) -> String {
    let zeroes = bytes.iter().take_while(|b| **b == 0).count();
    // Little-endian base-26 digits
    let mut digits: Vec<u8> = Vec::with_capacity(bytes.len() * 2);

    for &byte in &bytes[zeroes..] {
        let mut carry = u32::from(byte);
        for digit in digits.iter_mut() {
            carry += u32::from(*digit) << 8;
            *digit = (carry % 26) as u8;
            carry /= 26;
        }
        while carry > 0 {
            digits.push((carry % 26) as u8);
            carry /= 26;
        }
    }

    let mut out = String::with_capacity(zeroes + digits.len());
    out.extend(std::iter::repeat('A').take(zeroes));
    out.extend(digits.iter().rev().map(|d| ALPHABET[usize::from(*d)] as char));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_legal(ident: &str) -> bool {
        let mut chars = ident.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    fn stem(ident: &Identifier) -> &str {
        &ident.as_str()[..ident.as_str().len() - DEFAULT_SUFFIX_LEN]
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("rect1.left"), "rect1Left");
        assert_eq!(camel_case("my_var"), "myVar");
        assert_eq!(camel_case("Box.width"), "boxWidth");
        assert_eq!(camel_case("HTTPServer.x"), "HTTPServerX");
        assert_eq!(camel_case("api.URL"), "apiURL");
        assert_eq!(camel_case("a..b__c"), "aBC");
        assert_eq!(camel_case(""), "");
    }

    #[test]
    fn test_strip() {
        assert_eq!(strip("my box-1.left!"), "mybox1.left");
        assert_eq!(strip("ünïcode"), "ncode");
    }

    #[test]
    fn test_encode_base26() {
        assert_eq!(encode_base26(&[]), "");
        assert_eq!(encode_base26(&[0]), "A");
        assert_eq!(encode_base26(&[25]), "Z");
        assert_eq!(encode_base26(&[26]), "BA");
        assert_eq!(encode_base26(&[0, 1, 0]), "AJW");
    }

    #[test]
    fn test_sanitize_shape() {
        let ident = sanitize("rect1.left");
        assert_eq!(stem(&ident), "rect1Left");
        assert_eq!(ident.as_str().len(), "rect1Left".len() + DEFAULT_SUFFIX_LEN);
        assert!(ident.as_str()[9..].chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_sanitize_is_deterministic() {
        assert_eq!(sanitize("box.right"), sanitize("box.right"));
    }

    #[test]
    fn test_same_stem_different_suffix() {
        let a = sanitize("a_b");
        let b = sanitize("aB");
        assert_eq!(stem(&a), stem(&b));
        assert_ne!(a, b);

        assert_ne!(sanitize("my box.x"), sanitize("mybox.x"));
    }

    #[test]
    fn test_legal_even_when_stripped_empty() {
        for name in ["", "!!!", "...", "é.ü", "9lives", "3.x", "_", "box.left"] {
            let ident = sanitize(name);
            assert!(is_legal(ident.as_str()), "{:?} -> {:?}", name, ident);
            assert!(!ident.as_str().is_empty());
        }
    }

    #[test]
    fn test_leading_digit_gets_underscore() {
        assert!(sanitize("9lives").as_str().starts_with("_9lives"));
    }

    #[test]
    fn test_custom_suffix_len() {
        let ident = Sanitizer::new(10).sanitize("x");
        assert_eq!(ident.as_str().len(), 11);
    }
}
