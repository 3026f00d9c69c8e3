//! Size limits for untrusted token input

/// Maximum length for a token string (64KB)
pub(crate) const MAX_TOKEN_LENGTH: usize = 64 * 1024;

/// Maximum size for decoded header JSON (8KB)
/// Headers are typically small (< 1KB), but we allow reasonable margin
pub(crate) const MAX_DECODED_HEADER_SIZE: usize = 8 * 1024;

/// Maximum size for decoded payload JSON (64KB)
pub(crate) const MAX_DECODED_PAYLOAD_SIZE: usize = 64 * 1024;

/// Maximum size for decoded signature bytes (1KB)
/// RSA signatures are typically 256-512 bytes, but we allow margin for larger keys
pub(crate) const MAX_DECODED_SIGNATURE_SIZE: usize = 1024;

/// Maximum length for algorithm (alg) field in the header (16 bytes)
pub(crate) const MAX_ALG_LENGTH: usize = 16;

/// Maximum length for key ID (kid) field in the header (256 bytes)
pub(crate) const MAX_KID_LENGTH: usize = 256;

/// Decode limits applied by [`CompactDecoder`](crate::CompactDecoder)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeLimits {
    pub(crate) max_token_length: usize,
    pub(crate) max_header_size: usize,
    pub(crate) max_payload_size: usize,
    pub(crate) max_signature_size: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_token_length: MAX_TOKEN_LENGTH,
            max_header_size: MAX_DECODED_HEADER_SIZE,
            max_payload_size: MAX_DECODED_PAYLOAD_SIZE,
            max_signature_size: MAX_DECODED_SIGNATURE_SIZE,
        }
    }
}

impl DecodeLimits {
    /// Create limits with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum length of the raw token string
    pub fn max_token_length(mut self, bytes: usize) -> Self {
        self.max_token_length = bytes;
        self
    }

    /// Maximum size of the decoded header JSON
    pub fn max_header_size(mut self, bytes: usize) -> Self {
        self.max_header_size = bytes;
        self
    }

    /// Maximum size of the decoded claims JSON
    pub fn max_payload_size(mut self, bytes: usize) -> Self {
        self.max_payload_size = bytes;
        self
    }

    /// Maximum size of the decoded signature
    pub fn max_signature_size(mut self, bytes: usize) -> Self {
        self.max_signature_size = bytes;
        self
    }
}
