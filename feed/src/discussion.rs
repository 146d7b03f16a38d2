use std::sync::Arc;

use ktap_shared::{
    CreatePost, GiftReceipt, Post, ReportPost, SendGift, Thumb, ThumbRequest, ThumbState,
    UpdatePost,
};

use crate::controller::{FeedController, LoadOutcome};
use crate::error::{FeedError, Result};
use crate::fetcher::{Method, Transport};
use crate::mutation::Toggle;
use crate::page::ListQuery;
use crate::session::Session;
use crate::store::{Keyed, Patch};

impl Keyed for Post {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }
}

/// Thumb up or down on a post. Thumbing the same way again takes it back.
#[derive(Debug, Clone, Copy)]
pub struct ThumbToggle(pub Thumb);

impl ThumbToggle {
    fn counter(post: &mut Post, thumb: Thumb) -> &mut i64 {
        match thumb {
            Thumb::Up => &mut post.thumb_up,
            Thumb::Down => &mut post.thumb_down,
        }
    }
}

impl Toggle<Post> for ThumbToggle {
    type Saved = ThumbState;
    type Confirmed = ThumbState;

    fn flip(&self, post: &mut Post) -> ThumbState {
        let saved = ThumbState {
            thumb_up: post.thumb_up,
            thumb_down: post.thumb_down,
            my_thumb: post.my_thumb,
        };
        let thumb = self.0;
        match post.my_thumb {
            Some(prev) if prev == thumb => {
                *Self::counter(post, thumb) -= 1;
                post.my_thumb = None;
            }
            Some(prev) => {
                *Self::counter(post, prev) -= 1;
                *Self::counter(post, thumb) += 1;
                post.my_thumb = Some(thumb);
            }
            None => {
                *Self::counter(post, thumb) += 1;
                post.my_thumb = Some(thumb);
            }
        }
        saved
    }

    fn restore(&self, post: &mut Post, saved: ThumbState) {
        self.confirm(post, saved);
    }

    fn confirm(&self, post: &mut Post, state: ThumbState) {
        post.thumb_up = state.thumb_up;
        post.thumb_down = state.thumb_down;
        post.my_thumb = state.my_thumb;
    }
}

/// The posts of one discussion, oldest first, with the actor's replies
/// pinned at the end until a later page brings them back.
pub struct DiscussionThread<X> {
    discussion_id: String,
    feed: FeedController<Post, X>,
}

impl<X> Clone for DiscussionThread<X> {
    fn clone(&self) -> Self {
        Self {
            discussion_id: self.discussion_id.clone(),
            feed: self.feed.clone(),
        }
    }
}

impl<X: Transport> DiscussionThread<X> {
    pub fn new(discussion_id: impl Into<String>, transport: Arc<X>, page_limit: u64) -> Self {
        let discussion_id = discussion_id.into();
        let query = ListQuery::new(format!("/discussions/{discussion_id}/posts"));
        Self {
            discussion_id,
            feed: FeedController::new(transport, query, page_limit),
        }
    }

    pub fn with_observer(mut self, observer: impl Fn() + Send + Sync + 'static) -> Self {
        self.feed = self.feed.with_observer(observer);
        self
    }

    pub fn discussion_id(&self) -> &str {
        &self.discussion_id
    }

    pub fn feed(&self) -> &FeedController<Post, X> {
        &self.feed
    }

    fn transport(&self) -> &X {
        self.feed.fetcher()
    }

    pub async fn load_more(&self) -> Result<LoadOutcome> {
        self.feed.load_more().await
    }

    /// Post a reply; it shows up at the end of the thread once the server
    /// has stored it. Returns the new post id.
    pub async fn reply(&self, content: &str) -> Result<String> {
        let content = content.trim();
        if content.is_empty() {
            return Err(FeedError::Invalid("reply is empty".into()));
        }
        let path = self.feed.query().path().to_string();
        let body = CreatePost {
            content: content.to_string(),
        };
        self.feed
            .create(self.transport().send(Method::Post, &path, Some(&body)))
            .await
    }

    pub fn begin_edit(&self, post_id: &str) -> Patch {
        self.feed.set_editing(&post_id.to_string(), true)
    }

    pub fn cancel_edit(&self, post_id: &str) -> Patch {
        self.feed.set_editing(&post_id.to_string(), false)
    }

    pub async fn edit(&self, post_id: &str, content: &str) -> Result<Patch> {
        let content = content.trim();
        if content.is_empty() {
            return Err(FeedError::Invalid("post is empty".into()));
        }
        let key = post_id.to_string();
        let body = UpdatePost {
            content: content.to_string(),
        };
        let path = format!("/posts/{post_id}");
        let request = self.transport().send(Method::Put, &path, Some(&body));
        let patch = self
            .feed
            .update(&key, request, |post, updated: Post| *post = updated)
            .await?;
        if patch == Patch::Applied {
            self.feed.set_editing(&key, false);
        }
        Ok(patch)
    }

    pub async fn remove(&self, post_id: &str) -> Result<Patch> {
        let path = format!("/posts/{post_id}");
        let request = self
            .transport()
            .send_empty::<()>(Method::Delete, &path, None);
        self.feed.delete(&post_id.to_string(), request).await
    }

    pub async fn thumb(&self, post_id: &str, thumb: Thumb) -> Result<Patch> {
        let body = ThumbRequest { thumb };
        let path = format!("/posts/{post_id}/thumb");
        let request = self.transport().send(Method::Post, &path, Some(&body));
        self.feed
            .toggle(&post_id.to_string(), ThumbToggle(thumb), request)
            .await
    }

    /// Pay for `amount` gifts on a post. The sender's balance in `session`
    /// follows the server's receipt.
    pub async fn send_gift(
        &self,
        post_id: &str,
        gift_id: &str,
        amount: u32,
        session: &Session,
    ) -> Result<Patch> {
        if amount == 0 {
            return Err(FeedError::Invalid("gift amount must be positive".into()));
        }
        let body = SendGift {
            gift_id: gift_id.to_string(),
            amount,
        };
        let path = format!("/posts/{post_id}/gifts");
        let request = async {
            let receipt: GiftReceipt = self
                .transport()
                .send(Method::Post, &path, Some(&body))
                .await?;
            session.set_balance(receipt.balance);
            Ok::<_, FeedError>(receipt)
        };
        self.feed
            .update(&post_id.to_string(), request, |post, receipt: GiftReceipt| {
                post.gift_count = receipt.gift_count;
            })
            .await
    }

    /// Flag a post for moderators. The thread itself does not change.
    pub async fn report(&self, post_id: &str, reason: &str) -> Result<()> {
        let body = ReportPost {
            reason: reason.to_string(),
        };
        self.transport()
            .send_empty(Method::Post, &format!("/posts/{post_id}/report"), Some(&body))
            .await
    }
}
