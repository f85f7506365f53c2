use std::ops::Deref;

use zeroize::{Zeroize, Zeroizing};

/// A byte buffer for secret material.
///
/// Zeroized on drop, deliberately not `Clone`, and its `Debug` output
/// never shows the content. Register requests carry their key material in
/// one of these; Get extractions hex-encode out of one before it drops.
#[derive(PartialEq, Eq)]
pub struct Secret(Zeroizing<Vec<u8>>);

impl Secret {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Take ownership of the bytes and zeroize the source.
    #[must_use]
    pub fn from_unprotected(bytes: &mut Vec<u8>) -> Self {
        let secret = Self::new(bytes.clone());
        bytes.zeroize();
        secret
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&*self.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for Secret {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes().to_vec())
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret({} bytes)", self.0.len())
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::Secret;

    #[test]
    fn from_unprotected_scrubs_the_source() {
        let mut source = vec![0xAB; 16];
        let secret = Secret::from_unprotected(&mut source);
        assert!(source.is_empty() || source.iter().all(|b| *b == 0));
        assert_eq!(secret.len(), 16);
        assert_eq!(secret.to_hex(), "ab".repeat(16));
    }

    #[test]
    fn debug_never_prints_content() {
        let secret = Secret::from("hunter2");
        assert_eq!(format!("{secret:?}"), "Secret(7 bytes)");
    }
}
