//! Running content hash identifying a slide ("quickhash").

use sha2::{Digest, Sha256};

/// SHA-256 accumulator fed by the tiled backend while levels are set up.
#[derive(Debug, Clone, Default)]
pub struct QuickHash {
    hasher: Sha256,
}

impl QuickHash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Hex digest of everything hashed so far.
    pub fn hex_digest(&self) -> String {
        hex::encode(self.hasher.clone().finalize())
    }
}
