//! Ed25519 signature scheme.
//!
//! The aggregate is the member signatures concatenated in committee-index
//! order, 64 bytes each.

use crate::ports::SignatureScheme;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use shared_types::PublicKey;

const SIGNATURE_LEN: usize = 64;

/// Ed25519 node key.
pub struct Ed25519Scheme {
    signing: SigningKey,
}

impl Ed25519Scheme {
    /// Derive the key pair from a 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing: SigningKey::from_bytes(&seed),
        }
    }

    fn verifying_key(key: &PublicKey) -> Option<VerifyingKey> {
        let bytes: [u8; 32] = key.as_bytes().try_into().ok()?;
        VerifyingKey::from_bytes(&bytes).ok()
    }
}

impl SignatureScheme for Ed25519Scheme {
    fn public_key(&self) -> PublicKey {
        PublicKey::from_bytes(self.signing.verifying_key().to_bytes().to_vec())
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing.sign(message).to_bytes().to_vec()
    }

    fn verify(&self, key: &PublicKey, message: &[u8], sig: &[u8]) -> bool {
        let Some(vk) = Self::verifying_key(key) else {
            return false;
        };
        let Ok(sig) = Signature::from_slice(sig) else {
            return false;
        };
        vk.verify(message, &sig).is_ok()
    }

    fn aggregate(&self, sigs: &[Vec<u8>]) -> Vec<u8> {
        sigs.concat()
    }

    fn verify_aggregate(&self, keys: &[PublicKey], message: &[u8], aggregated: &[u8]) -> bool {
        if keys.is_empty() || aggregated.len() != keys.len() * SIGNATURE_LEN {
            return false;
        }
        keys.iter()
            .zip(aggregated.chunks_exact(SIGNATURE_LEN))
            .all(|(key, sig)| self.verify(key, message, sig))
    }
}
