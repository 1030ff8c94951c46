//! Content signatures carried in the `Content-Signature` header.

use std::fmt;
use std::str::FromStr;

/// Digest algorithm tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashKind {
    Sha256,
    Sha512,
}

impl HashKind {
    /// The lowercase tag used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            HashKind::Sha256 => "sha256",
            HashKind::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for HashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashKind {
    type Err = SignatureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(HashKind::Sha256),
            "sha512" => Ok(HashKind::Sha512),
            other => Err(SignatureParseError::UnknownKind(other.to_string())),
        }
    }
}

/// Error parsing a `Content-Signature` header value.
#[derive(Debug, thiserror::Error)]
pub enum SignatureParseError {
    #[error("missing ':' separator")]
    MissingSeparator,

    #[error("unknown hash kind: {0}")]
    UnknownKind(String),

    #[error("invalid digest encoding: {0}")]
    InvalidDigest(#[from] hex::FromHexError),
}

/// A content signature: digest algorithm plus digest bytes.
///
/// Two signatures are equal when both the kind and the digest match.
/// The wire form is `<kind>:<lowercase hex digest>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    kind: HashKind,
    digest: Vec<u8>,
}

impl Signature {
    pub fn new(kind: HashKind, digest: Vec<u8>) -> Self {
        Self { kind, digest }
    }

    pub fn kind(&self) -> HashKind {
        self.kind
    }

    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    /// True when this signature carries the given kind and digest.
    pub fn matches(&self, kind: HashKind, digest: &[u8]) -> bool {
        self.kind == kind && self.digest == digest
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, hex::encode(&self.digest))
    }
}

impl FromStr for Signature {
    type Err = SignatureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, digest) = s
            .split_once(':')
            .ok_or(SignatureParseError::MissingSeparator)?;
        Ok(Self {
            kind: kind.parse()?,
            digest: hex::decode(digest)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_and_parse_roundtrip() {
        let sig = Signature::new(HashKind::Sha256, vec![0xde, 0xad, 0xbe, 0xef]);
        let text = sig.to_string();
        assert_eq!(text, "sha256:deadbeef");

        let parsed: Signature = text.parse().unwrap();
        assert_eq!(parsed, sig);
    }

    #[test]
    fn equality_requires_matching_kind() {
        let a = Signature::new(HashKind::Sha256, vec![1, 2, 3]);
        let b = Signature::new(HashKind::Sha512, vec![1, 2, 3]);
        assert_ne!(a, b);
        assert!(a.matches(HashKind::Sha256, &[1, 2, 3]));
        assert!(!a.matches(HashKind::Sha512, &[1, 2, 3]));
    }

    #[test]
    fn rejects_missing_separator() {
        let err = "sha256deadbeef".parse::<Signature>().unwrap_err();
        assert!(matches!(err, SignatureParseError::MissingSeparator));
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = "crc32:deadbeef".parse::<Signature>().unwrap_err();
        assert!(matches!(err, SignatureParseError::UnknownKind(_)));
    }

    #[test]
    fn rejects_non_hex_digest() {
        let err = "sha256:nothex!".parse::<Signature>().unwrap_err();
        assert!(matches!(err, SignatureParseError::InvalidDigest(_)));
    }
}
