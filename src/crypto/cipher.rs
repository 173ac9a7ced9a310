//! Password-based encryption of wallet files.
//!
//! Two envelopes are understood:
//!
//! - **legacy**: `base64("Salted__" || salt[8] || AES-256-CBC(plaintext))` with
//!   key and IV from EVP_BytesToKey (MD5, one round). This is the format
//!   produced by the OpenSSL `enc` tool and by CryptoJS, so existing wallet
//!   files decrypt unchanged. A wrong password is not detected here: the
//!   padding is stripped leniently and the caller inspects the result.
//! - **sealed**: `"sealed:" || base64(salt[16] || nonce[12] || AES-256-GCM(plaintext))`
//!   with the key from Argon2id over the password and salt. A wrong password
//!   fails authentication.

use aes::cipher::{
    block_padding::{NoPadding, Pkcs7},
    BlockDecryptMut, BlockEncryptMut, KeyIvInit,
};
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    AeadCore, Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use md5::{Digest, Md5};
use rand::RngCore;
use serde::Deserialize;
use zeroize::{Zeroize, Zeroizing};

use crate::error::{WalletError, WalletResult};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const SALTED_MAGIC: &[u8; 8] = b"Salted__";
const LEGACY_SALT_LEN: usize = 8;
const AES_BLOCK_LEN: usize = 16;

const SEALED_PREFIX: &str = "sealed:";
const SEALED_SALT_LEN: usize = 16;
const SEALED_NONCE_LEN: usize = 12;
const GCM_TAG_LEN: usize = 16;
const ARGON2_MEMORY_KB: u32 = 65536;
const ARGON2_ITERATIONS: u32 = 3;
const ARGON2_PARALLELISM: u32 = 4;

/// Envelope used when writing a wallet file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletFormat {
    #[default]
    Legacy,
    Sealed,
}

impl WalletFormat {
    /// Detect the envelope of an encrypted token.
    pub fn detect(token: &str) -> Self {
        if token.trim_start().starts_with(SEALED_PREFIX) {
            Self::Sealed
        } else {
            Self::Legacy
        }
    }
}

/// Encrypt a payload with a password, producing a self-contained text token.
pub fn encrypt(plaintext: &[u8], password: &str, format: WalletFormat) -> WalletResult<String> {
    match format {
        WalletFormat::Legacy => {
            let mut salt = [0u8; LEGACY_SALT_LEN];
            rand::rngs::OsRng.fill_bytes(&mut salt);
            encrypt_legacy(plaintext, password, &salt)
        }
        WalletFormat::Sealed => encrypt_sealed(plaintext, password),
    }
}

/// Decrypt a token produced by [`encrypt`] (or by OpenSSL/CryptoJS).
///
/// Legacy tokens decrypted with the wrong password return garbage rather
/// than an error; sealed tokens return [`WalletError::InvalidPassword`].
pub fn decrypt(token: &str, password: &str) -> WalletResult<Zeroizing<Vec<u8>>> {
    let token = token.trim();
    match WalletFormat::detect(token) {
        WalletFormat::Legacy => decrypt_legacy(token, password),
        WalletFormat::Sealed => decrypt_sealed(token, password),
    }
}

/// OpenSSL EVP_BytesToKey with MD5 and a single round: 32 key bytes then 16 IV bytes.
fn evp_bytes_to_key(password: &[u8], salt: &[u8]) -> Zeroizing<[u8; 48]> {
    let mut material = Zeroizing::new([0u8; 48]);
    let mut block: Vec<u8> = Vec::new();
    let mut filled = 0;

    while filled < material.len() {
        let mut hasher = Md5::new();
        hasher.update(&block);
        hasher.update(password);
        hasher.update(salt);
        block.zeroize();
        block = hasher.finalize().to_vec();

        let take = (material.len() - filled).min(block.len());
        material[filled..filled + take].copy_from_slice(&block[..take]);
        filled += take;
    }

    block.zeroize();
    material
}

fn encrypt_legacy(plaintext: &[u8], password: &str, salt: &[u8; LEGACY_SALT_LEN]) -> WalletResult<String> {
    let material = evp_bytes_to_key(password.as_bytes(), salt);
    let (key, iv) = material.split_at(32);

    let ciphertext = Aes256CbcEnc::new_from_slices(key, iv)
        .map_err(|e| WalletError::crypto(format!("failed to create AES cipher: {}", e)))?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut output = Vec::with_capacity(SALTED_MAGIC.len() + salt.len() + ciphertext.len());
    output.extend_from_slice(SALTED_MAGIC);
    output.extend_from_slice(salt);
    output.extend_from_slice(&ciphertext);

    Ok(BASE64.encode(output))
}

fn decrypt_legacy(token: &str, password: &str) -> WalletResult<Zeroizing<Vec<u8>>> {
    let data = BASE64
        .decode(token)
        .map_err(|e| WalletError::crypto(format!("wallet file is not valid base64: {}", e)))?;

    let header_len = SALTED_MAGIC.len() + LEGACY_SALT_LEN;
    if data.len() < header_len || &data[..SALTED_MAGIC.len()] != SALTED_MAGIC {
        return Err(WalletError::crypto("wallet file is missing the salted header"));
    }

    let (salt, ciphertext) = data[SALTED_MAGIC.len()..].split_at(LEGACY_SALT_LEN);
    if ciphertext.is_empty() || ciphertext.len() % AES_BLOCK_LEN != 0 {
        return Err(WalletError::crypto("wallet file ciphertext is truncated"));
    }

    let material = evp_bytes_to_key(password.as_bytes(), salt);
    let (key, iv) = material.split_at(32);

    let mut plaintext = Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|e| WalletError::crypto(format!("failed to create AES cipher: {}", e)))?
        .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
        .map_err(|_| WalletError::crypto("wallet file ciphertext is truncated"))?;

    // Trust the last byte as the pad length without checking it, so a wrong
    // password yields garbage instead of a padding error.
    let pad = plaintext.last().copied().unwrap_or(0) as usize;
    let keep = plaintext.len().saturating_sub(pad);
    plaintext[keep..].zeroize();
    plaintext.truncate(keep);

    Ok(Zeroizing::new(plaintext))
}

/// AES-256-GCM keyed with Argon2id(password, salt).
fn sealed_cipher(password: &str, salt: &[u8]) -> WalletResult<Aes256Gcm> {
    let params = Params::new(ARGON2_MEMORY_KB, ARGON2_ITERATIONS, ARGON2_PARALLELISM, Some(32))
        .map_err(|e| WalletError::crypto(format!("invalid Argon2 parameters: {}", e)))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key[..])
        .map_err(|e| WalletError::crypto(format!("key derivation failed: {}", e)))?;
    Aes256Gcm::new_from_slice(&key[..])
        .map_err(|_| WalletError::crypto("failed to create AES cipher"))
}

fn encrypt_sealed(plaintext: &[u8], password: &str) -> WalletResult<String> {
    let mut salt = [0u8; SEALED_SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);

    let cipher = sealed_cipher(password, &salt)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| WalletError::crypto("encryption failed"))?;

    let mut output = Vec::with_capacity(SEALED_SALT_LEN + SEALED_NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&salt);
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);

    Ok(format!("{}{}", SEALED_PREFIX, BASE64.encode(output)))
}

fn decrypt_sealed(token: &str, password: &str) -> WalletResult<Zeroizing<Vec<u8>>> {
    let encoded = token.strip_prefix(SEALED_PREFIX).unwrap_or(token);
    let data = BASE64
        .decode(encoded)
        .map_err(|e| WalletError::crypto(format!("wallet file is not valid base64: {}", e)))?;

    if data.len() < SEALED_SALT_LEN + SEALED_NONCE_LEN + GCM_TAG_LEN {
        return Err(WalletError::crypto("wallet file is too short"));
    }

    let (salt, rest) = data.split_at(SEALED_SALT_LEN);
    let (nonce, ciphertext) = rest.split_at(SEALED_NONCE_LEN);

    let cipher = sealed_cipher(password, salt)?;
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| WalletError::InvalidPassword)
}
