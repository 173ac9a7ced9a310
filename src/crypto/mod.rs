//! Cryptographic primitives for the cold wallet.
//!
//! Uses:
//! - AES-256-CBC with an OpenSSL salted envelope for legacy wallet files
//! - AES-256-GCM keyed through Argon2id for sealed wallet files
//! - secp256k1 ECDSA over SHA-256 digests for ledger operations

pub mod cipher;
pub mod keys;

pub use cipher::{decrypt, encrypt, WalletFormat};
pub use keys::{sha256_hex, KeyPair};
