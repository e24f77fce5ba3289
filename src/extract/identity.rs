use std::fmt;
use std::str::FromStr;

use sha1::{Digest, Sha1};

/// Fixed separator between title and surname in the hashed payload.
const HASH_SEPARATOR: &str = "ZZZ";

/// 160-bit content-derived document identity.
///
/// Serves as the primary key for a document in the absence of any authoritative
/// source identifier. Textual form is 40-char lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity([u8; 20]);

impl Identity {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

/// Compute the identity for a (normalized title, first-author surname) pair.
///
/// Deterministic across processes: independently-run shard workers must agree
/// on identities with no shared state. Collisions at corpus scale are expected
/// and handled by the resolver, not avoided here.
pub fn hash_document_data(title: &str, surname: &str) -> Identity {
    let payload = format!(
        "{}{}{}",
        title.trim().to_lowercase(),
        HASH_SEPARATOR,
        surname.trim().to_lowercase()
    );
    Identity(Sha1::digest(payload.as_bytes()).into())
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for Identity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = hex::decode(s.trim())?;
        let len = decoded.len();
        let bytes: [u8; 20] = decoded
            .try_into()
            .map_err(|_| anyhow::anyhow!("identity must be 20 bytes, got {}", len))?;
        Ok(Identity(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        let a = hash_document_data("efficientparsing", "Smith");
        let b = hash_document_data("efficientparsing", "Smith");
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_ignores_case_and_surrounding_whitespace() {
        let a = hash_document_data("  Efficient Parsing ", " SMITH ");
        let b = hash_document_data("efficient parsing", "smith");
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_inputs_distinct_identities() {
        let a = hash_document_data("foo", "bar");
        let b = hash_document_data("foo", "baz");
        let c = hash_document_data("fooz", "bar");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_separator_prevents_boundary_ambiguity() {
        // "ab" + "c" must not hash equal to "a" + "bc"
        assert_ne!(hash_document_data("ab", "c"), hash_document_data("a", "bc"));
    }

    #[test]
    fn test_display_parse_round_trip() {
        let id = hash_document_data("some title", "surname");
        let text = id.to_string();
        assert_eq!(text.len(), 40);
        assert_eq!(text.parse::<Identity>().unwrap(), id);
    }

    #[test]
    fn test_parse_rejects_wrong_width() {
        assert!("abcd".parse::<Identity>().is_err());
        assert!("zz".repeat(20).parse::<Identity>().is_err());
    }
}
