/**
 * Invite token generation.
 *
 * Reworks `session.rs::generate_share_token` (which drew from a 62-character
 * alphabet with no entropy guarantee) into something that meets spec §4.1's
 * "≥32 bytes from a CSPRNG, URL-safe encoded" requirement: 32 raw bytes from
 * `rand`'s OS-backed `OsRng`-equivalent thread RNG, base64 URL-safe encoded
 * (no padding), yielding a 43-character token carrying the full 256 bits.
 */
use base64::Engine;
use rand::RngCore;

pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CsprngTokenGenerator;

impl TokenGenerator for CsprngTokenGenerator {
    fn generate(&self) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }
}

/// Returns tokens from a fixed sequence; used by tests that need to assert
/// on or replay a specific invite token.
#[derive(Clone)]
pub struct SequenceTokenGenerator {
    remaining: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
}

impl SequenceTokenGenerator {
    pub fn new(tokens: Vec<String>) -> Self {
        let mut tokens = tokens;
        tokens.reverse();
        Self {
            remaining: std::sync::Arc::new(std::sync::Mutex::new(tokens)),
        }
    }
}

impl TokenGenerator for SequenceTokenGenerator {
    fn generate(&self) -> String {
        let mut guard = self.remaining.lock().unwrap();
        guard
            .pop()
            .unwrap_or_else(|| CsprngTokenGenerator.generate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_at_least_256_bits_of_url_safe_entropy() {
        let token = CsprngTokenGenerator.generate();
        assert!(token.len() >= 43, "token too short: {token}");
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn tokens_are_not_trivially_repeated() {
        let a = CsprngTokenGenerator.generate();
        let b = CsprngTokenGenerator.generate();
        assert_ne!(a, b);
    }
}
