//! Signature computers: MAC primitives, digest encodings, and ECDSA verification.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use p256::ecdsa::{signature::Verifier, Signature, VerifyingKey};
use p256::pkcs8::DecodePublicKey;
use p256::PublicKey;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::error::{webhook_error, Error, WebhookErrorKind};
use crate::secret::ensure_pem_armor;

type HmacSha256 = Hmac<Sha256>;
type HmacSha1 = Hmac<Sha1>;

/// MAC primitive a scheme signs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacAlgorithm {
    HmacSha256,
    HmacSha1,
}

/// Text encoding of a signature on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureEncoding {
    Hex,
    Base64,
}

impl SignatureEncoding {
    pub fn encode(&self, bytes: &[u8]) -> String {
        match self {
            SignatureEncoding::Hex => hex::encode(bytes),
            SignatureEncoding::Base64 => STANDARD.encode(bytes),
        }
    }

    /// Decode a provided signature; `None` if it is not valid in this encoding.
    pub fn decode(&self, value: &str) -> Option<Vec<u8>> {
        let value = value.trim();
        match self {
            SignatureEncoding::Hex => hex::decode(value).ok(),
            SignatureEncoding::Base64 => STANDARD.decode(value).ok(),
        }
    }
}

/// Compute the MAC of `content` under `key`.
pub fn compute_mac(algorithm: MacAlgorithm, key: &[u8], content: &[u8]) -> Result<Vec<u8>, Error> {
    let digest = match algorithm {
        MacAlgorithm::HmacSha256 => {
            let mut mac = HmacSha256::new_from_slice(key).map_err(malformed_key)?;
            mac.update(content);
            mac.finalize().into_bytes().to_vec()
        }
        MacAlgorithm::HmacSha1 => {
            let mut mac = HmacSha1::new_from_slice(key).map_err(malformed_key)?;
            mac.update(content);
            mac.finalize().into_bytes().to_vec()
        }
    };
    Ok(digest)
}

/// Compute the MAC and encode it the way the sender puts it on the wire.
pub fn compute_encoded(
    algorithm: MacAlgorithm,
    encoding: SignatureEncoding,
    key: &[u8],
    content: &[u8],
) -> Result<String, Error> {
    compute_mac(algorithm, key, content).map(|digest| encoding.encode(&digest))
}

/// `base64(sha256(body))`, the digest FusionAuth embeds in its signature JWT.
pub fn body_sha256_base64(body: &[u8]) -> String {
    STANDARD.encode(Sha256::digest(body))
}

/// P-256 public key used to verify ECDSA/SHA-256 signatures.
pub struct EcdsaPublicKey {
    key: VerifyingKey,
}

impl EcdsaPublicKey {
    /// Parse a SubjectPublicKeyInfo PEM, synthesizing the armor if it was stripped.
    pub fn from_pem(key: &str) -> Result<Self, Error> {
        let pem = ensure_pem_armor(key);
        let key = PublicKey::from_public_key_pem(&pem).map_err(|e| {
            webhook_error(
                WebhookErrorKind::MalformedCredential,
                &format!("invalid P-256 public key: {}", e),
            )
        })?;
        Ok(Self {
            key: VerifyingKey::from(&key),
        })
    }

    /// Verify a DER-encoded signature over `content`.
    ///
    /// An unparseable signature simply fails to verify.
    pub fn verify_der(&self, content: &[u8], signature_der: &[u8]) -> bool {
        match Signature::from_der(signature_der) {
            Ok(signature) => self.key.verify(content, &signature).is_ok(),
            Err(_) => false,
        }
    }
}

fn malformed_key<E>(_: E) -> Error {
    webhook_error(WebhookErrorKind::MalformedCredential, "Invalid HMAC key")
}
