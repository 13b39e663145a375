//! Passphrase-based encryption of stored access keys via `ring`.
//!
//! Tokens have the form `hex(salt):hex(nonce):hex(ciphertext || tag)`.
//! Every call to [`CryptoBox::encrypt`] draws a fresh salt and nonce, so the
//! same plaintext never encrypts to the same token twice.

use std::fmt;
use std::num::NonZeroU32;

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};

use supaudit_core::{AuditError, Result, SecretKey};

/// PBKDF2 salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derived AES-256 key length in bytes.
const KEY_LEN: usize = 32;

/// Default PBKDF2-HMAC-SHA256 iteration count.
pub const DEFAULT_ITERATIONS: NonZeroU32 = match NonZeroU32::new(100_000) {
    Some(n) => n,
    None => unreachable!(),
};

/// Symmetric encrypt/decrypt of credential strings.
pub struct CryptoBox {
    passphrase: SecretKey,
    iterations: NonZeroU32,
    rng: SystemRandom,
}

impl fmt::Debug for CryptoBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoBox")
            .field("passphrase", &self.passphrase)
            .field("iterations", &self.iterations)
            .finish_non_exhaustive()
    }
}

impl CryptoBox {
    /// Create a box keyed by `passphrase` with the default iteration count.
    pub fn new(passphrase: impl Into<SecretKey>) -> Result<Self> {
        Self::with_iterations(passphrase, DEFAULT_ITERATIONS)
    }

    /// Create a box with an explicit PBKDF2 iteration count.
    ///
    /// Tokens only decrypt under the iteration count they were sealed with.
    pub fn with_iterations(passphrase: impl Into<SecretKey>, iterations: NonZeroU32) -> Result<Self> {
        let passphrase = passphrase.into();
        if passphrase.is_empty() {
            return Err(AuditError::Config("encryption passphrase is empty".into()));
        }
        Ok(Self {
            passphrase,
            iterations,
            rng: SystemRandom::new(),
        })
    }

    /// Encrypt `plaintext` into a `salt:nonce:ciphertext` token.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        self.fill(&mut salt)?;
        self.fill(&mut nonce)?;

        let key = self.derive_key(&salt)?;
        let mut in_out = plaintext.as_bytes().to_vec();
        key.seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce),
            Aad::empty(),
            &mut in_out,
        )
        .map_err(|_| AuditError::Config("credential encryption failed".into()))?;

        Ok(format!(
            "{}:{}:{}",
            hex::encode(salt),
            hex::encode(nonce),
            hex::encode(in_out)
        ))
    }

    /// Decrypt a token produced by [`CryptoBox::encrypt`].
    ///
    /// # Errors
    ///
    /// - `AuditError::MalformedToken` if the token does not have exactly three
    ///   hex fields of the expected lengths
    /// - `AuditError::DecryptionFailed` if the cipher rejects the ciphertext
    pub fn decrypt(&self, token: &str) -> Result<String> {
        let fields: Vec<&str> = token.split(':').collect();
        let [salt, nonce, ciphertext] = fields.as_slice() else {
            return Err(AuditError::MalformedToken(format!(
                "expected 3 fields, found {}",
                fields.len()
            )));
        };

        let salt = decode_field("salt", salt)?;
        if salt.len() != SALT_LEN {
            return Err(AuditError::MalformedToken(format!(
                "salt is {} bytes, expected {SALT_LEN}",
                salt.len()
            )));
        }
        let nonce: [u8; NONCE_LEN] = decode_field("nonce", nonce)?
            .try_into()
            .map_err(|_| AuditError::MalformedToken(format!("nonce is not {NONCE_LEN} bytes")))?;
        let mut in_out = decode_field("ciphertext", ciphertext)?;

        let key = self.derive_key(&salt)?;
        let plaintext = key
            .open_in_place(Nonce::assume_unique_for_key(nonce), Aad::empty(), &mut in_out)
            .map_err(|_| AuditError::DecryptionFailed)?;

        String::from_utf8(plaintext.to_vec()).map_err(|_| AuditError::DecryptionFailed)
    }

    fn derive_key(&self, salt: &[u8]) -> Result<LessSafeKey> {
        let mut key = [0u8; KEY_LEN];
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            self.iterations,
            salt,
            self.passphrase.expose().as_bytes(),
            &mut key,
        );
        let unbound = UnboundKey::new(&AES_256_GCM, &key)
            .map_err(|_| AuditError::Config("derived key rejected by cipher".into()))?;
        Ok(LessSafeKey::new(unbound))
    }

    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        self.rng
            .fill(buf)
            .map_err(|_| AuditError::Config("system random source unavailable".into()))
    }
}

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>> {
    hex::decode(value).map_err(|e| AuditError::MalformedToken(format!("{name}: {e}")))
}
