//! Static selection of the hashing code path.
//!
//! Whether a transfer is signed is decided at engine instantiation by the
//! integrity policy type parameter, monomorphized over the body's hash
//! capability. There is no runtime capability probe on the hot path.

use std::io;

use fileferry_file_body::{digest_stream, FileBody, HashedBody};
use fileferry_http::Signature;

/// Integrity policy applied to outbound and inbound bodies.
pub trait Integrity<B: FileBody> {
    /// Computes the content signature for an outbound body, if the policy
    /// carries one. The body cursor is preserved.
    fn sign(body: &mut B) -> io::Result<Option<Signature>>;

    /// Checks an inbound signature against the body content. An absent
    /// signature is always accepted.
    fn verify(body: &mut B, signature: Option<&Signature>) -> bool;
}

/// Policy for bodies without a hash capability: nothing is signed and any
/// peer signature is taken on trust.
pub struct NoIntegrity;

impl<B: FileBody> Integrity<B> for NoIntegrity {
    fn sign(_body: &mut B) -> io::Result<Option<Signature>> {
        Ok(None)
    }

    fn verify(_body: &mut B, _signature: Option<&Signature>) -> bool {
        true
    }
}

/// Policy for [`HashedBody`] implementations.
///
/// Outbound content is digested from the current cursor to EOF. Inbound
/// signatures are checked by re-digesting the stored content from offset
/// zero, which is equivalent to hashing the bytes as they streamed in
/// without keeping them in memory. A body that cannot be re-read fails
/// the check.
pub struct HashedIntegrity;

impl<B: HashedBody> Integrity<B> for HashedIntegrity {
    fn sign(body: &mut B) -> io::Result<Option<Signature>> {
        digest_stream(body).map(Some)
    }

    fn verify(body: &mut B, signature: Option<&Signature>) -> bool {
        let Some(signature) = signature else {
            return true;
        };

        let origin = body.position();
        if body.set_position(false, 0).is_err() {
            return false;
        }
        let local = digest_stream(body);
        let _ = body.set_position(false, origin);

        match local {
            Ok(local) => signature.matches(local.kind(), local.digest()),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileferry_file_body::{HashedFile, StreamFile};
    use fileferry_http::HashKind;
    use sha2::{Digest, Sha256};
    use tempfile::TempDir;

    fn fixture(dir: &TempDir, data: &[u8]) -> HashedFile {
        let path = dir.path().join("body.bin");
        std::fs::write(&path, data).unwrap();
        let mut body = HashedFile::new();
        body.assign(&path);
        body.open(true).unwrap();
        body
    }

    #[test]
    fn unhashed_policy_accepts_everything() {
        let mut body = StreamFile::new();
        let bogus = Signature::new(HashKind::Sha256, vec![0; 32]);

        assert!(NoIntegrity::sign(&mut body).unwrap().is_none());
        assert!(NoIntegrity::verify(&mut body, Some(&bogus)));
        assert!(NoIntegrity::verify(&mut body, None));
    }

    #[test]
    fn hashed_policy_signs_and_verifies() {
        let dir = TempDir::new().unwrap();
        let mut body = fixture(&dir, b"signed content");

        let signature = HashedIntegrity::sign(&mut body).unwrap().unwrap();
        let expected = Sha256::digest(b"signed content");
        assert_eq!(signature.digest(), expected.as_slice());

        // Cursor parked at EOF, as it would be after a streamed receive.
        body.set_position(true, 0).unwrap();
        assert!(HashedIntegrity::verify(&mut body, Some(&signature)));
    }

    #[test]
    fn hashed_policy_rejects_mutated_content() {
        let dir = TempDir::new().unwrap();
        let mut body = fixture(&dir, b"original content");

        let foreign = Signature::new(
            HashKind::Sha256,
            Sha256::digest(b"different content").to_vec(),
        );
        assert!(!HashedIntegrity::verify(&mut body, Some(&foreign)));
    }

    #[test]
    fn hashed_policy_accepts_absent_signature() {
        let dir = TempDir::new().unwrap();
        let mut body = fixture(&dir, b"anything");
        assert!(HashedIntegrity::verify(&mut body, None));
    }

    #[test]
    fn verify_restores_the_cursor() {
        let dir = TempDir::new().unwrap();
        let mut body = fixture(&dir, b"0123456789");
        let signature = HashedIntegrity::sign(&mut body).unwrap().unwrap();

        body.set_position(false, 7).unwrap();
        HashedIntegrity::verify(&mut body, Some(&signature));
        assert_eq!(body.position(), 7);
    }
}
