use ktap_feed::{Criticality, FeedController, FeedError, Keyed, Recovery};
use leptos::prelude::*;
use serde::de::DeserializeOwned;
use wasm_bindgen_futures::spawn_local;

use crate::api::{self, GlooTransport};

pub type Feed<T> = FeedController<T, GlooTransport>;

/// Route a failure: navigate away for page loads, inline notice otherwise.
pub fn recover(err: FeedError, criticality: Criticality, notice: RwSignal<Option<String>>) {
    match err.recovery(criticality, &api::current_path()) {
        Recovery::Login { redirect } => api::go_to(&redirect),
        Recovery::NotFound => api::go_to("/not-found"),
        Recovery::Failure => api::go_to("/error"),
        Recovery::Inline(message) => notice.set(Some(message)),
    }
}

/// Fetch the next page of `feed`.
pub fn spawn_load<T>(feed: Feed<T>, criticality: Criticality, notice: RwSignal<Option<String>>)
where
    T: Keyed + DeserializeOwned + 'static,
{
    spawn_local(async move {
        if let Err(err) = feed.load_more().await {
            recover(err, criticality, notice);
        }
    });
}

/// Dismissible negative notification.
#[component]
pub fn Notice(notice: RwSignal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || notice.get().is_some()>
            <div class="ktap-notice ktap-notice-error">
                <span>{move || notice.get().unwrap_or_default()}</span>
                <button class="ktap-btn ktap-btn-sm" on:click=move |_| notice.set(None)>"Dismiss"</button>
            </div>
        </Show>
    }
}

/// "Load more" footer. `rev` is the feed's change counter.
pub fn load_more_button<T>(
    feed: Feed<T>,
    rev: RwSignal<u64>,
    notice: RwSignal<Option<String>>,
    empty_label: &'static str,
) -> impl IntoView
where
    T: Keyed + DeserializeOwned + Send + Sync + 'static,
    T::Key: Send,
{
    let status = {
        let feed = feed.clone();
        move || {
            rev.track();
            (feed.is_loading(), feed.has_more(), feed.is_empty())
        }
    };
    let label = {
        let status = status.clone();
        move || match status() {
            (true, _, _) => "Loading...",
            (false, true, _) => "Load more",
            (false, false, true) => empty_label,
            (false, false, false) => "That's everything",
        }
    };
    let disabled = move || {
        let (loading, has_more, _) = status();
        loading || !has_more
    };

    view! {
        <div class="ktap-load-more">
            <button
                class="ktap-btn"
                disabled=disabled
                on:click=move |_| spawn_load(feed.clone(), Criticality::Secondary, notice)
            >
                {label}
            </button>
        </div>
    }
}
