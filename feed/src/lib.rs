//! Paginated "load more" lists with optimistic local inserts, and the KTap
//! feeds built on them.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod cursor;
pub mod discussion;
pub mod error;
pub mod fetcher;
#[cfg(not(target_arch = "wasm32"))]
pub mod http;
pub mod mutation;
pub mod page;
pub mod session;
pub mod store;

#[cfg(test)]
mod test_helpers;

pub use catalog::{FollowToggle, GameCatalog};
pub use config::FeedConfig;
pub use controller::{FeedController, ListState, LoadOutcome};
pub use cursor::Cursor;
pub use discussion::{DiscussionThread, ThumbToggle};
pub use error::{login_redirect, Criticality, FeedError, Recovery, Result};
pub use fetcher::{Method, PageFetcher, Transport};
#[cfg(not(target_arch = "wasm32"))]
pub use http::HttpClient;
pub use mutation::{Mutation, MutationState, Toggle};
pub use page::{ListQuery, Page};
pub use session::Session;
pub use store::{Keyed, ListStore, Patch, UiState};
