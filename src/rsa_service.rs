use base64::{Engine as _, engine::general_purpose::STANDARD};
use openssl::error::ErrorStack;
use openssl::pkey::{Private, Public};
use openssl::rsa::{Padding, Rsa};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

// OAEP with SHA-1 consumes 2 * 20 + 2 bytes of every block
const OAEP_OVERHEAD: usize = 42;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("plaintext too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),
    #[error("encryption failed")]
    Encryption(#[source] ErrorStack),
    // Every decrypt failure collapses here so callers cannot tell the causes apart.
    #[error("decryption failed")]
    Decryption,
}

/// Startup-time failures while loading the key pair.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("failed to read key file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: ErrorStack,
    },
    #[error("public and private keys do not belong to the same key pair")]
    Mismatch,
}

/// PEM text for one key, read once at startup and never mutated.
#[derive(Clone)]
pub struct KeyMaterial {
    pem: String,
}

impl KeyMaterial {
    pub fn new(pem: impl Into<String>) -> Self {
        Self { pem: pem.into() }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, KeyError> {
        let path = path.as_ref();
        let pem = std::fs::read_to_string(path).map_err(|source| KeyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { pem })
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.pem.as_bytes()
    }
}

// Never print the PEM body.
impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial").finish_non_exhaustive()
    }
}

/// Holds the lock for one openssl call and keeps the thread's error queue empty
/// on both sides of it, so a failure never bleeds into the next request.
struct CryptoCall<'a> {
    _lock: MutexGuard<'a, ()>,
}

impl<'a> CryptoCall<'a> {
    fn begin(lock: &'a Mutex<()>) -> Self {
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        drop(ErrorStack::get());
        Self { _lock: guard }
    }
}

impl Drop for CryptoCall<'_> {
    fn drop(&mut self) {
        // Runs before the guard field is released.
        drop(ErrorStack::get());
    }
}

// RSA-OAEP service using OpenSSL
pub struct RsaService {
    public_key: Rsa<Public>,
    private_key: Rsa<Private>,
    call_lock: Mutex<()>,
}

impl RsaService {
    pub fn new(public_key: &KeyMaterial, private_key: &KeyMaterial) -> Result<Self, KeyError> {
        openssl::init();

        let public_key = parse_public_key(public_key)?;
        let private_key =
            Rsa::private_key_from_pem(private_key.as_bytes()).map_err(|source| KeyError::Parse {
                what: "private key",
                source,
            })?;

        let same_pair = public_key.n() == private_key.n() && public_key.e() == private_key.e();
        if !same_pair {
            return Err(KeyError::Mismatch);
        }

        Ok(Self {
            public_key,
            private_key,
            call_lock: Mutex::new(()),
        })
    }

    /// Largest plaintext, in bytes, a single OAEP block can carry.
    pub fn max_plaintext_len(&self) -> usize {
        (self.public_key.size() as usize).saturating_sub(OAEP_OVERHEAD)
    }

    /// Encrypts UTF-8 text and returns the ciphertext as standard base64.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let data = plaintext.as_bytes();
        let max = self.max_plaintext_len();
        if data.len() > max {
            return Err(CryptoError::TooLarge(data.len(), max));
        }

        let mut buf = vec![0; self.public_key.size() as usize];
        let encrypted_len = {
            let _call = CryptoCall::begin(&self.call_lock);
            self.public_key
                .public_encrypt(data, &mut buf, Padding::PKCS1_OAEP)
                .map_err(CryptoError::Encryption)?
        };
        buf.truncate(encrypted_len);

        Ok(STANDARD.encode(&buf))
    }

    /// Decrypts base64 ciphertext back into UTF-8 text.
    pub fn decrypt(&self, ciphertext_b64: &str) -> Result<String, CryptoError> {
        let ciphertext = STANDARD
            .decode(ciphertext_b64)
            .map_err(|_| CryptoError::Decryption)?;

        let block = self.private_key.size() as usize;
        if ciphertext.len() != block {
            return Err(CryptoError::Decryption);
        }

        let mut buf = vec![0; block];
        let decrypted_len = {
            let _call = CryptoCall::begin(&self.call_lock);
            self.private_key
                .private_decrypt(&ciphertext, &mut buf, Padding::PKCS1_OAEP)
                .map_err(|_| CryptoError::Decryption)?
        };
        buf.truncate(decrypted_len);

        String::from_utf8(buf).map_err(|_| CryptoError::Decryption)
    }
}

fn parse_public_key(key: &KeyMaterial) -> Result<Rsa<Public>, KeyError> {
    // SubjectPublicKeyInfo first, then the bare PKCS#1 form
    Rsa::public_key_from_pem(key.as_bytes())
        .or_else(|_| Rsa::public_key_from_pem_pkcs1(key.as_bytes()))
        .map_err(|source| KeyError::Parse {
            what: "public key",
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn key_pair() -> &'static (KeyMaterial, KeyMaterial) {
        static PAIR: OnceLock<(KeyMaterial, KeyMaterial)> = OnceLock::new();
        PAIR.get_or_init(|| {
            let rsa = Rsa::generate(2048).unwrap();
            let public = String::from_utf8(rsa.public_key_to_pem().unwrap()).unwrap();
            let private = String::from_utf8(rsa.private_key_to_pem().unwrap()).unwrap();
            (KeyMaterial::new(public), KeyMaterial::new(private))
        })
    }

    fn service() -> RsaService {
        let (public, private) = key_pair();
        RsaService::new(public, private).unwrap()
    }

    #[test]
    fn encrypt_then_decrypt_recovers_text() {
        let service = service();
        for text in ["hello", "", "ünïcödé ✓", "a longer sentence with spaces and punctuation!"] {
            let ciphertext = service.encrypt(text).unwrap();
            assert_eq!(service.decrypt(&ciphertext).unwrap(), text);
        }
    }

    #[test]
    fn ciphertext_is_randomized() {
        let service = service();
        assert_ne!(service.encrypt("same").unwrap(), service.encrypt("same").unwrap());
    }

    #[test]
    fn max_payload_for_2048_bit_key() {
        let service = service();
        assert_eq!(service.max_plaintext_len(), 214);

        let exact = "x".repeat(214);
        let ciphertext = service.encrypt(&exact).unwrap();
        assert_eq!(service.decrypt(&ciphertext).unwrap(), exact);
    }

    #[test]
    fn oversized_plaintext_is_rejected() {
        let service = service();
        let err = service.encrypt(&"x".repeat(215)).unwrap_err();
        assert!(matches!(err, CryptoError::TooLarge(215, 214)));
    }

    #[test]
    fn decrypt_failures_are_indistinguishable() {
        let service = service();
        let garbage = STANDARD.encode([0xA5u8; 256]);
        let short = STANDARD.encode([1u8; 16]);

        for input in ["not base64 !!", short.as_str(), garbage.as_str()] {
            let err = service.decrypt(input).unwrap_err();
            assert!(matches!(err, CryptoError::Decryption));
            assert_eq!(err.to_string(), "decryption failed");
        }
    }

    #[test]
    fn ciphertext_from_another_key_fails() {
        let other = Rsa::generate(2048).unwrap();
        let mut buf = vec![0; other.size() as usize];
        let len = other
            .public_encrypt(b"hello", &mut buf, Padding::PKCS1_OAEP)
            .unwrap();
        buf.truncate(len);

        let err = service().decrypt(&STANDARD.encode(&buf)).unwrap_err();
        assert!(matches!(err, CryptoError::Decryption));
    }

    #[test]
    fn failure_leaves_error_queue_empty() {
        let service = service();
        assert!(service.decrypt(&STANDARD.encode([0xA5u8; 256])).is_err());
        assert!(ErrorStack::get().errors().is_empty());
    }

    #[test]
    fn accepts_pkcs1_public_key() {
        let (_, private) = key_pair();
        let rsa = Rsa::private_key_from_pem(private.as_bytes()).unwrap();
        let pkcs1 = String::from_utf8(rsa.public_key_to_pem_pkcs1().unwrap()).unwrap();

        let service = RsaService::new(&KeyMaterial::new(pkcs1), private).unwrap();
        let ciphertext = service.encrypt("pkcs1").unwrap();
        assert_eq!(service.decrypt(&ciphertext).unwrap(), "pkcs1");
    }

    #[test]
    fn rejects_garbage_pem() {
        let (_, private) = key_pair();
        let err = RsaService::new(&KeyMaterial::new("not a key"), private).err().unwrap();
        assert!(matches!(err, KeyError::Parse { what: "public key", .. }));
    }

    #[test]
    fn rejects_mismatched_pair() {
        let (public, _) = key_pair();
        let other = Rsa::generate(2048).unwrap();
        let private = KeyMaterial::new(String::from_utf8(other.private_key_to_pem().unwrap()).unwrap());

        let err = RsaService::new(public, &private).err().unwrap();
        assert!(matches!(err, KeyError::Mismatch));
    }

    #[test]
    fn missing_key_file_is_read_error() {
        let err = KeyMaterial::from_file("/nonexistent/dir/publicKey.pem").unwrap_err();
        assert!(matches!(err, KeyError::Read { .. }));
    }

    #[test]
    fn debug_hides_pem() {
        let (_, private) = key_pair();
        assert!(!format!("{:?}", private).contains("PRIVATE KEY"));
    }
}
