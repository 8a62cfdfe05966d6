#[cfg(feature = "sha256")]
use sha2::Digest;

pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Vec<u8>;
}

#[cfg(feature = "sha256")]
pub struct Sha256Hasher(sha2::Sha256);

#[cfg(feature = "sha256")]
impl Hasher for Sha256Hasher {
    fn update(&mut self, data: &[u8]) { self.0.update(data); }
    fn finalize(self) -> Vec<u8> { self.0.finalize().to_vec() }
}

#[cfg(feature = "sha256")]
impl Default for Sha256Hasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "sha256")]
impl Sha256Hasher {
    pub fn new() -> Self { Self(sha2::Sha256::new()) }

    pub fn digest(data: &[u8]) -> Vec<u8> { sha2::Sha256::digest(data).to_vec() }

    pub fn hex_digest(data: &[u8]) -> String { hex::encode(Self::digest(data)) }
}
