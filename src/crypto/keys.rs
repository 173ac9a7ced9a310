use k256::ecdsa::{signature::hazmat::PrehashSigner, Signature, SigningKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{WalletError, WalletResult};

/// Length of a secp256k1 scalar in hex characters.
const SECRET_HEX_LEN: usize = 64;

/// SHA-256 of a UTF-8 message, hex encoded. Ledger signatures cover this digest.
pub fn sha256_hex(message: &str) -> String {
    hex::encode(Sha256::digest(message.as_bytes()))
}

/// secp256k1 key pair for a single coin.
///
/// The private half is the coin secret stored in the wallet; the public half
/// is what the ledger records as the coin's holder.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a fresh key pair from OS entropy.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Rebuild the key pair for a hex-encoded secret scalar.
    ///
    /// Shorter inputs are left-padded with zeros, so `"1"` is the scalar one.
    pub fn from_secret_hex(secret: &str) -> WalletResult<Self> {
        let secret = secret.trim();
        if secret.is_empty() || secret.len() > SECRET_HEX_LEN {
            return Err(WalletError::InvalidSecret(format!(
                "expected 1 to {} hex characters, got {}",
                SECRET_HEX_LEN,
                secret.len()
            )));
        }

        let padded = Zeroizing::new(format!("{:0>width$}", secret, width = SECRET_HEX_LEN));
        let bytes = Zeroizing::new(
            hex::decode(padded.as_str())
                .map_err(|e| WalletError::InvalidSecret(format!("not hex: {}", e)))?,
        );
        let signing_key = SigningKey::from_slice(&bytes)
            .map_err(|_| WalletError::InvalidSecret("scalar out of range for secp256k1".to_string()))?;

        Ok(Self { signing_key })
    }

    /// Private scalar as 64 hex characters.
    pub fn private_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.signing_key.to_bytes()))
    }

    /// Public key as an uncompressed SEC1 point (`04 || x || y`), hex encoded.
    pub fn public_hex(&self) -> String {
        let point = self.signing_key.verifying_key().to_encoded_point(false);
        hex::encode(point.as_bytes())
    }

    /// ECDSA-sign a hex-encoded digest and return the DER signature as hex.
    pub fn sign_digest(&self, digest_hex: &str) -> WalletResult<String> {
        let digest = hex::decode(digest_hex)
            .map_err(|e| WalletError::crypto(format!("digest is not hex: {}", e)))?;
        let signature: Signature = self
            .signing_key
            .sign_prehash(&digest)
            .map_err(|e| WalletError::crypto(format!("signing failed: {}", e)))?;
        Ok(hex::encode(signature.to_der().as_bytes()))
    }

    /// Sign `sha256(message)`, the form every ledger operation expects.
    pub fn sign_message(&self, message: &str) -> WalletResult<String> {
        self.sign_digest(&sha256_hex(message))
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public_hex())
            .finish_non_exhaustive()
    }
}
