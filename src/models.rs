use serde::{Deserialize, Serialize};

/// A shortened link record. This is also the wire and on-disk shape, so the
/// field names are camelCase when serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShortenedLink {
    pub original_url: String,
    pub short_id: String,
    pub short_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Stored and compared in plain text. Not a security boundary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
    #[serde(default)]
    pub total_clicks: i64,
    /// Epoch milliseconds of the most recent resolve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_clicked_at: Option<i64>,
}

impl ShortenedLink {
    /// `true` when the record carries credentials and they equal the given pair.
    pub fn is_owned_by(&self, username: &str, password: &str) -> bool {
        self.username.as_deref() == Some(username) && self.password.as_deref() == Some(password)
    }
}

/// Body of a create request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLink {
    #[serde(default)]
    pub original_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl NewLink {
    pub fn new(original_url: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            ..Self::default()
        }
    }
}

/// `POST /urls` accepts either a whole collection or a single new link.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UrlsPayload {
    Replace(Vec<ShortenedLink>),
    Create(NewLink),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Body of `PUT /urls/:short_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditLink {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_short_id: Option<String>,
}

/// Treat `Some("")` (and whitespace) the same as an absent field.
pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned)
}

/// Like `non_empty`, but a present value is kept byte for byte. Credentials
/// are compared exactly, so they must be stored as given.
pub(crate) fn present(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty()).map(str::to_owned)
}
