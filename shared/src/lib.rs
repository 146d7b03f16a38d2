use serde::{Deserialize, Serialize};

// ── Auth ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub avatar_url: String,
    /// Gift currency the user holds.
    #[serde(default)]
    pub balance: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// ── Envelopes ──

/// Body of every list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
    pub count: u64,
}

impl<T> ListResponse<T> {
    pub fn has_more(&self) -> bool {
        self.skip + self.limit < self.count
    }
}

/// Success body of a mutation; `data` is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: Option<T>,
}

/// Failure body; the server does not always send a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

// ── Discussion posts ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Thumb {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub discussion_id: String,
    pub author: User,
    pub content: String,
    pub created_at: String,
    #[serde(default)]
    pub thumb_up: i64,
    #[serde(default)]
    pub thumb_down: i64,
    #[serde(default)]
    pub my_thumb: Option<Thumb>,
    #[serde(default)]
    pub gift_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePost {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePost {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbRequest {
    pub thumb: Thumb,
}

/// Thumb counters as the server computed them after a thumb action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbState {
    pub thumb_up: i64,
    pub thumb_down: i64,
    #[serde(default)]
    pub my_thumb: Option<Thumb>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendGift {
    pub gift_id: String,
    pub amount: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftReceipt {
    /// Sender's balance after the gift was paid for.
    pub balance: i64,
    pub gift_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPost {
    pub reason: String,
}

// ── Games ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameFlavor {
    #[default]
    Hot,
    New,
    Top,
}

impl GameFlavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameFlavor::Hot => "hot",
            GameFlavor::New => "new",
            GameFlavor::Top => "top",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cover: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub following: bool,
    #[serde(default)]
    pub follower_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowState {
    pub following: bool,
    pub follower_count: i64,
}
