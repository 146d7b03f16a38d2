use ktap_feed::{Criticality, DiscussionThread};
use ktap_shared::{Post, Thumb};
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api::GlooTransport;
use crate::auth::AuthState;
use crate::feed::recover;

/// Thumb up / down buttons with counts.
///
/// The counts flip as soon as the button is hit; the thread puts them back if
/// the server says no.
#[component]
pub fn ThumbButtons(
    thread: DiscussionThread<GlooTransport>,
    post: Post,
    busy: bool,
    notice: RwSignal<Option<String>>,
) -> impl IntoView {
    let auth = expect_context::<AuthState>();
    let post_id = post.id.clone();

    let cast = move |thumb: Thumb| {
        if auth.require_login() {
            return;
        }
        let thread = thread.clone();
        let post_id = post_id.clone();
        spawn_local(async move {
            if let Err(err) = thread.thumb(&post_id, thumb).await {
                recover(err, Criticality::Secondary, notice);
            }
        });
    };

    let cast_up = {
        let cast = cast.clone();
        move |_| cast(Thumb::Up)
    };
    let cast_down = move |_| cast(Thumb::Down);

    view! {
        <div class="ktap-thumbs">
            <button
                class="ktap-thumb-btn"
                class:active={post.my_thumb == Some(Thumb::Up)}
                on:click=cast_up
                disabled=busy
            >
                "\u{1F44D} " {post.thumb_up}
            </button>
            <button
                class="ktap-thumb-btn"
                class:active={post.my_thumb == Some(Thumb::Down)}
                on:click=cast_down
                disabled=busy
            >
                "\u{1F44E} " {post.thumb_down}
            </button>
        </div>
    }
}
