use miniserde::Deserialize;

/// JOSE header of a compact token
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenHeader {
    /// Algorithm used for signing
    #[serde(rename = "alg")]
    pub algorithm: String,

    /// Key ID (for key selection)
    #[serde(rename = "kid")]
    pub key_id: Option<String>,

    /// Token type, usually `JWT`
    #[serde(rename = "typ")]
    pub token_type: Option<String>,
}
