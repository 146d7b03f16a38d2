use std::sync::Arc;

use ktap_shared::{FollowState, Game, GameFlavor};

use crate::controller::{FeedController, LoadOutcome};
use crate::error::Result;
use crate::fetcher::{Method, Transport};
use crate::mutation::Toggle;
use crate::page::ListQuery;
use crate::store::{Keyed, Patch};

impl Keyed for Game {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }
}

pub struct FollowToggle;

impl Toggle<Game> for FollowToggle {
    type Saved = FollowState;
    type Confirmed = FollowState;

    fn flip(&self, game: &mut Game) -> FollowState {
        let saved = FollowState {
            following: game.following,
            follower_count: game.follower_count,
        };
        game.following = !game.following;
        game.follower_count += if game.following { 1 } else { -1 };
        saved
    }

    fn restore(&self, game: &mut Game, saved: FollowState) {
        self.confirm(game, saved);
    }

    fn confirm(&self, game: &mut Game, state: FollowState) {
        game.following = state.following;
        game.follower_count = state.follower_count;
    }
}

/// Game listing with keyword search and flavor tabs.
pub struct GameCatalog<X> {
    feed: FeedController<Game, X>,
}

impl<X> Clone for GameCatalog<X> {
    fn clone(&self) -> Self {
        Self {
            feed: self.feed.clone(),
        }
    }
}

impl<X: Transport> GameCatalog<X> {
    pub fn new(transport: Arc<X>, page_limit: u64) -> Self {
        let query = ListQuery::new("/games").with_filter("flavor", GameFlavor::default().as_str());
        Self {
            feed: FeedController::new(transport, query, page_limit),
        }
    }

    pub fn with_observer(mut self, observer: impl Fn() + Send + Sync + 'static) -> Self {
        self.feed = self.feed.with_observer(observer);
        self
    }

    pub fn feed(&self) -> &FeedController<Game, X> {
        &self.feed
    }

    pub fn flavor(&self) -> GameFlavor {
        match self.feed.query().filter("flavor") {
            Some("new") => GameFlavor::New,
            Some("top") => GameFlavor::Top,
            _ => GameFlavor::Hot,
        }
    }

    pub async fn load_more(&self) -> Result<LoadOutcome> {
        self.feed.load_more().await
    }

    /// New keyword; the list starts over. Unchanged keywords are ignored.
    pub fn search(&self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        let query = self.feed.query();
        if query.keyword() == keyword {
            return false;
        }
        self.feed.set_query(query.with_keyword(keyword));
        true
    }

    /// Switch tabs; the list starts over.
    pub fn set_flavor(&self, flavor: GameFlavor) -> bool {
        if self.flavor() == flavor {
            return false;
        }
        let query = self.feed.query().with_filter("flavor", flavor.as_str());
        self.feed.set_query(query);
        true
    }

    pub async fn follow(&self, game_id: &str) -> Result<Patch> {
        let key = game_id.to_string();
        let Some(game) = self.feed.item(&key) else {
            return Ok(Patch::Stale);
        };
        let method = if game.following {
            Method::Delete
        } else {
            Method::Post
        };
        let path = format!("/games/{game_id}/follow");
        let request = self.feed.fetcher().send::<(), _>(method, &path, None);
        self.feed.toggle(&key, FollowToggle, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::test_helpers::{games_body, MockTransport};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    async fn loaded(transport: &Arc<MockTransport>) -> GameCatalog<MockTransport> {
        let catalog = GameCatalog::new(Arc::clone(transport), 3);
        transport.respond(games_body(&["g1", "g2", "g3"], 0, 3, 7));
        catalog.load_more().await.unwrap();
        catalog
    }

    fn last_path(transport: &MockTransport) -> String {
        transport.requests().pop().unwrap().1
    }

    #[tokio::test]
    async fn test_first_page_uses_default_flavor() {
        let transport = Arc::new(MockTransport::new());
        let catalog = loaded(&transport).await;
        assert_eq!(catalog.flavor(), GameFlavor::Hot);
        assert_eq!(last_path(&transport), "/games?keyword=&skip=0&limit=3&flavor=hot");
        assert!(catalog.feed().has_more());
    }

    #[tokio::test]
    async fn test_search_resets_and_restarts_at_zero() {
        let transport = Arc::new(MockTransport::new());
        let catalog = loaded(&transport).await;

        assert!(catalog.search(" elden ring "));
        assert!(catalog.feed().is_empty());
        assert!(!catalog.search("elden ring"));

        transport.respond(games_body(&["g7"], 0, 3, 1));
        catalog.load_more().await.unwrap();
        assert_eq!(
            last_path(&transport),
            "/games?keyword=elden%20ring&skip=0&limit=3&flavor=hot"
        );
        assert_eq!(catalog.feed().keys(), vec!["g7"]);
        assert!(!catalog.feed().has_more());
    }

    #[tokio::test]
    async fn test_flavor_switch_keeps_keyword() {
        let transport = Arc::new(MockTransport::new());
        let catalog = loaded(&transport).await;
        catalog.search("zelda");

        assert!(catalog.set_flavor(GameFlavor::Top));
        assert!(!catalog.set_flavor(GameFlavor::Top));
        assert_eq!(catalog.flavor(), GameFlavor::Top);

        transport.respond(games_body(&[], 0, 3, 0));
        catalog.load_more().await.unwrap();
        assert_eq!(last_path(&transport), "/games?keyword=zelda&skip=0&limit=3&flavor=top");
    }

    #[tokio::test]
    async fn test_follow_and_unfollow() {
        let transport = Arc::new(MockTransport::new());
        let catalog = loaded(&transport).await;

        transport.respond(json!({ "data": { "following": true, "followerCount": 11 } }));
        assert_eq!(catalog.follow("g2").await, Ok(Patch::Applied));
        let (method, path, _) = transport.requests().pop().unwrap();
        assert_eq!((method, path.as_str()), (Method::Post, "/games/g2/follow"));
        let game = catalog.feed().item(&"g2".to_string()).unwrap();
        assert_eq!((game.following, game.follower_count), (true, 11));

        transport.fail(FeedError::FetchFailed("offline".into()));
        assert!(catalog.follow("g2").await.is_err());
        let (method, _, _) = transport.requests().pop().unwrap();
        assert_eq!(method, Method::Delete);
        let game = catalog.feed().item(&"g2".to_string()).unwrap();
        assert_eq!((game.following, game.follower_count), (true, 11));
    }

    #[tokio::test]
    async fn test_follow_unknown_game_is_stale() {
        let transport = Arc::new(MockTransport::new());
        let catalog = loaded(&transport).await;
        let sent = transport.requests().len();
        assert_eq!(catalog.follow("nope").await, Ok(Patch::Stale));
        assert_eq!(transport.requests().len(), sent);
    }
}
