use std::collections::VecDeque;

use ktap_shared::{Game, Post, User};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{FeedError, Result};
use crate::fetcher::{Method, Transport};
use crate::page::Page;
use crate::store::{Keyed, ListStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub liked: bool,
}

impl Keyed for Item {
    type Key = u32;

    fn key(&self) -> u32 {
        self.id
    }
}

pub fn item(id: u32, body: &str) -> Item {
    Item {
        id,
        body: body.to_string(),
        count: 0,
        liked: false,
    }
}

pub fn page(skip: u64, limit: u64, ids: &[u32], total: u64) -> Page<Item> {
    Page {
        items: ids.iter().map(|id| item(*id, "")).collect(),
        skip,
        limit,
        total,
    }
}

pub fn keys(store: &ListStore<Item>) -> Vec<u32> {
    store.iter().map(|i| i.id).collect()
}

pub fn list_body(ids: &[u32], skip: u64, limit: u64, count: u64) -> Value {
    let data: Vec<Item> = ids.iter().map(|id| item(*id, "")).collect();
    json!({ "data": data, "skip": skip, "limit": limit, "count": count })
}

pub fn user(id: &str, balance: i64) -> User {
    User {
        id: id.to_string(),
        username: format!("user-{id}"),
        avatar_url: String::new(),
        balance,
    }
}

pub fn post(id: &str, content: &str) -> Post {
    Post {
        id: id.to_string(),
        discussion_id: "d1".to_string(),
        author: user("author", 0),
        content: content.to_string(),
        created_at: "2024-05-01T12:00:00Z".to_string(),
        thumb_up: 0,
        thumb_down: 0,
        my_thumb: None,
        gift_count: 0,
    }
}

pub fn posts_body(ids: &[&str], skip: u64, limit: u64, count: u64) -> Value {
    let data: Vec<Post> = ids.iter().map(|id| post(id, &format!("post {id}"))).collect();
    json!({ "data": data, "skip": skip, "limit": limit, "count": count })
}

pub fn games_body(ids: &[&str], skip: u64, limit: u64, count: u64) -> Value {
    let data: Vec<Game> = ids
        .iter()
        .map(|id| Game {
            id: id.to_string(),
            name: format!("Game {id}"),
            cover: String::new(),
            score: 8.5,
            tags: vec!["rpg".to_string()],
            following: false,
            follower_count: 10,
        })
        .collect();
    json!({ "data": data, "skip": skip, "limit": limit, "count": count })
}

pub type Recorded = (Method, String, Option<Value>);

/// Scripted transport. Answers come off a queue in request order; an empty
/// queue answers `null`. Every request yields once before answering so
/// concurrent callers can interleave.
#[derive(Default)]
pub struct MockTransport {
    answers: Mutex<VecDeque<Result<Value>>>,
    requests: Mutex<Vec<Recorded>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, body: Value) {
        self.answers.lock().push_back(Ok(body));
    }

    pub fn fail(&self, err: FeedError) {
        self.answers.lock().push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().clone()
    }
}

impl Transport for MockTransport {
    async fn request<B, R>(&self, method: Method, path: &str, body: Option<&B>) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| FeedError::Decode(e.to_string()))?;
        self.requests.lock().push((method, path.to_string(), body));

        tokio::task::yield_now().await;

        let answer = self.answers.lock().pop_front().unwrap_or(Ok(Value::Null))?;
        serde_json::from_value(answer).map_err(|e| FeedError::Decode(e.to_string()))
    }
}
