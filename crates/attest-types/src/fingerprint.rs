use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Longest fingerprint accepted, in characters.
pub const MAX_FINGERPRINT_LEN: usize = 128;

/// Length of a hex-encoded SHA-256 digest.
pub const SHA256_HEX_LEN: usize = 64;

/// Content fingerprint used as the unique key of a registered document.
///
/// The ledger never hashes anything itself: the fingerprint is computed by
/// the submitting client and treated here as an opaque key. Parsing only
/// guarantees a well-formed key: surrounding whitespace is trimmed, the
/// value is non-empty, at most [`MAX_FINGERPRINT_LEN`] characters, and has
/// no inner whitespace or control characters. Hex values are lower-cased
/// so that `ABC1` and `abc1` address the same record.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Parse and normalise a caller-supplied fingerprint.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(TypeError::InvalidFingerprint("fingerprint is empty".into()));
        }
        let len = value.chars().count();
        if len > MAX_FINGERPRINT_LEN {
            return Err(TypeError::InvalidFingerprint(format!(
                "fingerprint is {len} characters, limit is {MAX_FINGERPRINT_LEN}"
            )));
        }
        if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(TypeError::InvalidFingerprint(
                "fingerprint contains whitespace or control characters".into(),
            ));
        }

        if value.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(value.to_ascii_lowercase()))
        } else {
            Ok(Self(value.to_string()))
        }
    }

    /// Build a fingerprint from a 32-byte digest.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(hex::encode(digest))
    }

    /// Returns `true` for a 64-character hex string (a SHA-256 digest).
    pub fn is_sha256_hex(&self) -> bool {
        self.0.len() == SHA256_HEX_LEN && self.0.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Decode the digest bytes when this is a SHA-256 hex fingerprint.
    pub fn to_digest(&self) -> Result<[u8; 32], TypeError> {
        let bytes = hex::decode(&self.0).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(arr)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 8 characters) for logs.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl FromStr for Fingerprint {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Fingerprint> for String {
    fn from(value: Fingerprint) -> Self {
        value.0
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.short())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hex_is_lowercased() {
        let upper = Fingerprint::parse("ABC123").unwrap();
        let lower = Fingerprint::parse("abc123").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.as_str(), "abc123");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let fp = Fingerprint::parse("  abc123\n").unwrap();
        assert_eq!(fp.as_str(), "abc123");
    }

    #[test]
    fn non_hex_keys_keep_their_case() {
        let fp = Fingerprint::parse("Nonexistent").unwrap();
        assert_eq!(fp.as_str(), "Nonexistent");
        assert!(!fp.is_sha256_hex());
    }

    #[test]
    fn empty_is_rejected() {
        assert!(matches!(
            Fingerprint::parse("   "),
            Err(TypeError::InvalidFingerprint(_))
        ));
    }

    #[test]
    fn inner_whitespace_is_rejected() {
        assert!(Fingerprint::parse("abc 123").is_err());
        assert!(Fingerprint::parse("abc\u{0}123").is_err());
    }

    #[test]
    fn overlong_is_rejected() {
        let raw = "a".repeat(MAX_FINGERPRINT_LEN + 1);
        assert!(Fingerprint::parse(&raw).is_err());
        let raw = "a".repeat(MAX_FINGERPRINT_LEN);
        assert!(Fingerprint::parse(&raw).is_ok());
    }

    #[test]
    fn sha256_detection() {
        let fp = Fingerprint::from_digest([0xab; 32]);
        assert!(fp.is_sha256_hex());
        assert_eq!(fp.to_digest().unwrap(), [0xab; 32]);
        assert!(!Fingerprint::parse("abc123").unwrap().is_sha256_hex());
    }

    #[test]
    fn short_form() {
        let fp = Fingerprint::from_digest([0x12; 32]);
        assert_eq!(fp.short(), "12121212");
        assert_eq!(Fingerprint::parse("abc").unwrap().short(), "abc");
    }

    #[test]
    fn deserialize_validates() {
        let fp: Fingerprint = serde_json::from_str("\"ABCDEF\"").unwrap();
        assert_eq!(fp.as_str(), "abcdef");
        assert!(serde_json::from_str::<Fingerprint>("\"\"").is_err());
        assert_eq!(serde_json::to_string(&fp).unwrap(), "\"abcdef\"");
    }

    proptest! {
        #[test]
        fn hex_case_never_splits_keys(bytes in proptest::collection::vec(any::<u8>(), 1..32)) {
            let lower = hex::encode(&bytes);
            let upper = lower.to_ascii_uppercase();
            prop_assert_eq!(Fingerprint::parse(&lower).unwrap(), Fingerprint::parse(&upper).unwrap());
        }
    }
}
