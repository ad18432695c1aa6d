//! Core types for Crosspost

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use chrono::{DateTime, SubsecRound, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current time at the millisecond precision the database keeps
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Supported social networks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    LinkedIn,
    Twitter,
    Facebook,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::LinkedIn, Platform::Twitter, Platform::Facebook];

    /// Lowercase identifier used on the wire and in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::LinkedIn => "linkedin",
            Platform::Twitter => "twitter",
            Platform::Facebook => "facebook",
        }
    }

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            Platform::LinkedIn => "LinkedIn",
            Platform::Twitter => "X (Twitter)",
            Platform::Facebook => "Facebook",
        }
    }

    /// Maximum post length in characters
    pub fn character_limit(&self) -> usize {
        match self {
            Platform::LinkedIn => 3000,
            Platform::Twitter => 280,
            Platform::Facebook => 63206,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linkedin" => Ok(Platform::LinkedIn),
            "twitter" | "x" => Ok(Platform::Twitter),
            "facebook" => Ok(Platform::Facebook),
            _ => Err(format!(
                "Unsupported platform: '{}'. Valid options: linkedin, twitter, facebook",
                s
            )),
        }
    }
}

/// Post-level summary of per-platform outcomes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Published,
    Partial,
    Failed,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Published => "published",
            PostStatus::Partial => "partial",
            PostStatus::Failed => "failed",
        }
    }

    /// Derive the aggregate status from per-platform results
    ///
    /// `published` iff every result succeeded, `failed` iff none did (including
    /// the degenerate empty case), `partial` otherwise.
    pub fn aggregate(results: &[PublishingResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.status == ResultStatus::Success).count();

        if succeeded == 0 {
            PostStatus::Failed
        } else if succeeded == results.len() {
            PostStatus::Published
        } else {
            PostStatus::Partial
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(PostStatus::Published),
            "partial" => Ok(PostStatus::Partial),
            "failed" => Ok(PostStatus::Failed),
            _ => Err(format!("Unknown post status: '{}'", s)),
        }
    }
}

/// Outcome of one platform attempt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Failed,
}

impl ResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Success => "success",
            ResultStatus::Failed => "failed",
        }
    }
}

impl FromStr for ResultStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(ResultStatus::Success),
            "failed" => Ok(ResultStatus::Failed),
            _ => Err(format!("Unknown result status: '{}'", s)),
        }
    }
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity claims handed over by the identity provider on login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

// ============================================================================
// Connected accounts
// ============================================================================

/// A social account linked to a user
///
/// Tokens stay in memory as secrets and are never serialized.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedAccount {
    pub id: String,
    pub user_id: String,
    pub platform: Platform,
    pub account_id: String,
    pub account_name: Option<String>,
    pub account_profile_url: Option<String>,
    #[serde(skip)]
    pub access_token: SecretString,
    #[serde(skip)]
    pub refresh_token: Option<SecretString>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a connected account
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConnectedAccount {
    pub platform: Platform,
    pub account_id: String,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub account_profile_url: Option<String>,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl NewConnectedAccount {
    /// Demo account standing in for a completed OAuth flow
    pub fn demo(platform: Platform) -> Self {
        let millis = Utc::now().timestamp_millis();
        let name = platform.as_str();
        let mut capitalized = name.to_string();
        if let Some(first) = capitalized.get_mut(0..1) {
            first.make_ascii_uppercase();
        }

        Self {
            platform,
            account_id: format!("demo_{}_{}", name, millis),
            account_name: Some(format!("Demo {} Account", capitalized)),
            account_profile_url: None,
            access_token: format!("demo_token_{}_{}", name, millis),
            refresh_token: None,
            token_expires_at: None,
            is_active: true,
        }
    }
}

/// Partial update of a connected account
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

// ============================================================================
// Posts and results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub image_url: Option<String>,
    pub platforms: Vec<Platform>,
    pub status: PostStatus,
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// New post with a provisional `published` status
    pub fn new(user_id: String, content: String, platforms: Vec<Platform>) -> Self {
        let now = now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            content,
            image_url: None,
            platforms,
            status: PostStatus::Published,
            published_at: now,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublishingResult {
    pub id: String,
    pub post_id: String,
    pub platform: Platform,
    pub status: ResultStatus,
    pub platform_post_id: Option<String>,
    pub platform_post_url: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PublishingResult {
    pub fn success(post_id: &str, platform: Platform, platform_post_id: String, url: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            post_id: post_id.to_string(),
            platform,
            status: ResultStatus::Success,
            platform_post_id: Some(platform_post_id),
            platform_post_url: url,
            error_message: None,
            created_at: now(),
        }
    }

    pub fn failure(post_id: &str, platform: Platform, error_message: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            post_id: post_id.to_string(),
            platform,
            status: ResultStatus::Failed,
            platform_post_id: None,
            platform_post_url: None,
            error_message: Some(error_message),
            created_at: now(),
        }
    }
}

/// A post with all its publishing results
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostWithResults {
    #[serde(flatten)]
    pub post: Post,
    pub results: Vec<PublishingResult>,
}

// ============================================================================
// Images
// ============================================================================

/// An uploaded image, as received from the client
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.content_type.to_lowercase().starts_with("image/")
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Inline `data:` URI holding the whole image
    pub fn to_data_uri(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.content_type, encoded)
    }
}
