use std::sync::Arc;

use ktap_feed::{Criticality, GameCatalog};
use ktap_shared::GameFlavor;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api::{self, GlooTransport};
use crate::auth::AuthState;
use crate::feed::{load_more_button, recover, spawn_load, Notice};

type Catalog = GameCatalog<GlooTransport>;

const TABS: [(GameFlavor, &str); 3] = [
    (GameFlavor::Hot, "Hot"),
    (GameFlavor::New, "New"),
    (GameFlavor::Top, "Top rated"),
];

/// Game library with search and flavor tabs.
#[component]
pub fn GameList() -> impl IntoView {
    let rev = RwSignal::new(0u64);
    let notice: RwSignal<Option<String>> = RwSignal::new(None);
    let keyword = RwSignal::new(String::new());

    let config = api::config();
    let limit = config.page_limit;
    let catalog = GameCatalog::new(Arc::new(GlooTransport::new(config)), limit)
        .with_observer(move || rev.update(|r| *r += 1));

    {
        let catalog = catalog.clone();
        on_cleanup(move || catalog.feed().detach());
    }
    spawn_load(catalog.feed().clone(), Criticality::Primary, notice);

    let on_search = {
        let catalog = catalog.clone();
        move |ev: leptos::ev::SubmitEvent| {
            ev.prevent_default();
            if catalog.search(&keyword.get_untracked()) {
                spawn_load(catalog.feed().clone(), Criticality::Secondary, notice);
            }
        }
    };

    let tabs = TABS
        .into_iter()
        .map(|(flavor, label)| {
            let catalog = catalog.clone();
            let is_active = {
                let catalog = catalog.clone();
                move || {
                    rev.track();
                    catalog.flavor() == flavor
                }
            };
            let on_click = move |_| {
                if catalog.set_flavor(flavor) {
                    spawn_load(catalog.feed().clone(), Criticality::Secondary, notice);
                }
            };
            view! {
                <button class="ktap-tab" class:active=is_active on:click=on_click>{label}</button>
            }
        })
        .collect_view();

    let game_ids = {
        let catalog = catalog.clone();
        move || {
            rev.track();
            catalog.feed().keys()
        }
    };

    let item_catalog = catalog.clone();
    view! {
        <section class="ktap-games">
            <form class="ktap-search" on:submit=on_search>
                <input
                    type="search"
                    placeholder="Search games"
                    prop:value=move || keyword.get()
                    on:input=move |ev| keyword.set(event_target_value(&ev))
                />
                <button class="ktap-btn" type="submit">"Search"</button>
            </form>
            <nav class="ktap-tabs">{tabs}</nav>
            <Notice notice=notice />
            <ul class="ktap-game-list">
                <For
                    each=game_ids
                    key=|id| id.clone()
                    let:game_id
                >
                    <GameItem catalog=item_catalog.clone() game_id=game_id rev=rev notice=notice />
                </For>
            </ul>
            {load_more_button(catalog.feed().clone(), rev, notice, "No games found")}
        </section>
    }
}

#[component]
fn GameItem(
    catalog: Catalog,
    game_id: String,
    rev: RwSignal<u64>,
    notice: RwSignal<Option<String>>,
) -> impl IntoView {
    let auth = expect_context::<AuthState>();

    move || {
        rev.track();
        let game = catalog.feed().item(&game_id)?;
        let busy = catalog.feed().ui(&game_id).busy;

        let on_follow = {
            let auth = auth.clone();
            let catalog = catalog.clone();
            let game_id = game_id.clone();
            move |_| {
                if auth.require_login() {
                    return;
                }
                let catalog = catalog.clone();
                let game_id = game_id.clone();
                spawn_local(async move {
                    if let Err(err) = catalog.follow(&game_id).await {
                        recover(err, Criticality::Secondary, notice);
                    }
                });
            }
        };

        Some(view! {
            <li class="ktap-game">
                <img src={game.cover.clone()} alt="" class="ktap-game-cover" />
                <div class="ktap-game-info">
                    <strong>{game.name.clone()}</strong>
                    <span class="ktap-score">{format!("{:.1}", game.score)}</span>
                    <span class="ktap-tags">{game.tags.join(" / ")}</span>
                </div>
                <button
                    class="ktap-btn ktap-btn-sm"
                    class:active=game.following
                    on:click=on_follow
                    disabled=busy
                >
                    {if game.following { "Following" } else { "Follow" }}
                    " (" {game.follower_count} ")"
                </button>
            </li>
        })
    }
}
