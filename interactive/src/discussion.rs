use std::sync::Arc;

use ktap_feed::{Criticality, DiscussionThread, Mutation, Patch};
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api::{self, GlooTransport};
use crate::auth::AuthState;
use crate::feed::{load_more_button, recover, spawn_load, Notice};
use crate::thumbs::ThumbButtons;

/// Gift sent by the quick gift button.
const QUICK_GIFT: &str = "cake";

type Thread = DiscussionThread<GlooTransport>;

/// Notice for a change the thread did not apply.
fn refusal(patch: Patch) -> &'static str {
    match patch {
        Patch::Busy => "Still working on that post, try again in a moment.",
        Patch::Stale | Patch::Applied => "That post is gone.",
    }
}

/// `/discussions/:id` inside the router.
#[component]
pub fn DiscussionRoute() -> impl IntoView {
    let params = leptos_router::hooks::use_params_map();
    let id = Memo::new(move |_| params.with(|p| p.get("id").unwrap_or_default()));
    // A new id gets a fresh view; the old one detaches on cleanup.
    move || view! { <DiscussionView discussion_id=id.get() /> }
}

/// All posts of one discussion, with reply form.
#[component]
pub fn DiscussionView(discussion_id: String) -> impl IntoView {
    let rev = RwSignal::new(0u64);
    let notice: RwSignal<Option<String>> = RwSignal::new(None);

    let config = api::config();
    let limit = config.page_limit;
    let thread = DiscussionThread::new(discussion_id, Arc::new(GlooTransport::new(config)), limit)
        .with_observer(move || rev.update(|r| *r += 1));

    {
        let thread = thread.clone();
        on_cleanup(move || thread.feed().detach());
    }
    spawn_load(thread.feed().clone(), Criticality::Primary, notice);

    let post_ids = {
        let thread = thread.clone();
        move || {
            rev.track();
            thread.feed().keys()
        }
    };

    let item_thread = thread.clone();
    view! {
        <section class="ktap-discussion">
            <Notice notice=notice />
            <div class="ktap-post-list">
                <For
                    each=post_ids
                    key=|id| id.clone()
                    let:post_id
                >
                    <PostItem thread=item_thread.clone() post_id=post_id rev=rev notice=notice />
                </For>
            </div>
            {load_more_button(thread.feed().clone(), rev, notice, "No posts yet")}
            <ReplyForm thread=thread.clone() notice=notice />
        </section>
    }
}

/// One post. Re-renders from the thread whenever it changes.
#[component]
fn PostItem(
    thread: Thread,
    post_id: String,
    rev: RwSignal<u64>,
    notice: RwSignal<Option<String>>,
) -> impl IntoView {
    let auth = expect_context::<AuthState>();
    let draft = RwSignal::new(String::new());

    move || {
        rev.track();
        let post = thread.feed().item(&post_id)?;
        let ui = thread.feed().ui(&post_id);
        let is_own = auth.session.is_author(&post.author);

        let body = if ui.editing {
            view! {
                <EditForm thread=thread.clone() post_id=post_id.clone() draft=draft notice=notice />
            }
            .into_any()
        } else {
            view! { <p class="ktap-post-body">{post.content.clone()}</p> }.into_any()
        };

        let actions = is_own.then(|| {
            let on_edit = {
                let thread = thread.clone();
                let post_id = post_id.clone();
                let content = post.content.clone();
                move |_| {
                    draft.set(content.clone());
                    thread.begin_edit(&post_id);
                }
            };
            let on_delete = {
                let thread = thread.clone();
                let post_id = post_id.clone();
                move |_| {
                    let thread = thread.clone();
                    let post_id = post_id.clone();
                    spawn_local(async move {
                        if let Err(err) = thread.remove(&post_id).await {
                            recover(err, Criticality::Secondary, notice);
                        }
                    });
                }
            };
            view! {
                <button class="ktap-btn ktap-btn-sm" on:click=on_edit disabled=ui.busy>"Edit"</button>
                <button class="ktap-btn ktap-btn-sm ktap-btn-danger" on:click=on_delete disabled=ui.busy>"Delete"</button>
            }
        });

        let on_report = {
            let auth = auth.clone();
            let thread = thread.clone();
            let post_id = post_id.clone();
            move |_| {
                if auth.require_login() {
                    return;
                }
                let thread = thread.clone();
                let post_id = post_id.clone();
                spawn_local(async move {
                    match thread.report(&post_id, "inappropriate").await {
                        Ok(()) => notice.set(Some("Thanks, a moderator will take a look.".into())),
                        Err(err) => recover(err, Criticality::Secondary, notice),
                    }
                });
            }
        };

        Some(view! {
            <article class="ktap-post" class:ktap-post-busy=ui.busy>
                <div class="ktap-post-header">
                    <img src={post.author.avatar_url.clone()} alt="" class="ktap-avatar" width="24" height="24" />
                    <strong>{post.author.username.clone()}</strong>
                    <time>{post.created_at.clone()}</time>
                    {actions}
                    <button class="ktap-btn ktap-btn-sm" on:click=on_report>"Report"</button>
                </div>
                {body}
                <div class="ktap-post-footer">
                    <ThumbButtons thread=thread.clone() post=post.clone() busy=ui.busy notice=notice />
                    <GiftButton thread=thread.clone() post_id=post_id.clone() gift_count=post.gift_count busy=ui.busy notice=notice />
                </div>
            </article>
        })
    }
}

#[component]
fn EditForm(
    thread: Thread,
    post_id: String,
    draft: RwSignal<String>,
    notice: RwSignal<Option<String>>,
) -> impl IntoView {
    let saving = RwSignal::new(false);

    let on_cancel = {
        let thread = thread.clone();
        let post_id = post_id.clone();
        move |_| {
            thread.cancel_edit(&post_id);
        }
    };

    let on_save = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        saving.set(true);
        let thread = thread.clone();
        let post_id = post_id.clone();
        let text = draft.get_untracked();
        spawn_local(async move {
            match thread.edit(&post_id, &text).await {
                Ok(Patch::Applied) => {}
                Ok(patch) => notice.set(Some(refusal(patch).into())),
                Err(err) => recover(err, Criticality::Secondary, notice),
            }
            saving.set(false);
        });
    };

    view! {
        <form class="ktap-edit-form" on:submit=on_save>
            <textarea
                class="ktap-textarea"
                prop:value=move || draft.get()
                on:input=move |ev| draft.set(event_target_value(&ev))
            />
            <button class="ktap-btn" type="submit" disabled=move || saving.get()>
                {move || if saving.get() { "Saving..." } else { "Save" }}
            </button>
            <button class="ktap-btn" type="button" on:click=on_cancel>"Cancel"</button>
        </form>
    }
}

/// Sends one quick gift; the count and the sender's balance follow the
/// receipt.
#[component]
fn GiftButton(
    thread: Thread,
    post_id: String,
    gift_count: i64,
    busy: bool,
    notice: RwSignal<Option<String>>,
) -> impl IntoView {
    let auth = expect_context::<AuthState>();
    let mutation = RwSignal::new(Mutation::new());

    let on_gift = move |_| {
        if auth.require_login() {
            return;
        }
        if !mutation.try_update(|m| m.begin()).unwrap_or(false) {
            return;
        }
        let thread = thread.clone();
        let post_id = post_id.clone();
        let auth = auth.clone();
        spawn_local(async move {
            let result = thread
                .send_gift(&post_id, QUICK_GIFT, 1, &auth.session)
                .await;
            mutation.update(|m| m.settle(&result));
            match result {
                Ok(Patch::Applied) => auth.touch(),
                Ok(patch) => {
                    notice.set(Some(refusal(patch).into()));
                    mutation.update(|m| m.dismiss());
                }
                Err(err) => {
                    recover(err, Criticality::Secondary, notice);
                    mutation.update(|m| m.dismiss());
                }
            }
        });
    };

    view! {
        <button
            class="ktap-btn ktap-btn-sm ktap-gift-btn"
            on:click=on_gift
            disabled=move || busy || mutation.with(|m| m.is_submitting())
        >
            {move || if mutation.with(|m| m.is_submitting()) { "Sending...".to_string() } else { format!("\u{1F381} {}", gift_count) }}
        </button>
    }
}

/// Reply form.
#[component]
fn ReplyForm(thread: Thread, notice: RwSignal<Option<String>>) -> impl IntoView {
    let auth = expect_context::<AuthState>();
    let body = RwSignal::new(String::new());
    let mutation = RwSignal::new(Mutation::new());

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let text = body.get_untracked();
        if text.trim().is_empty() {
            return;
        }
        if !mutation.try_update(|m| m.begin()).unwrap_or(false) {
            return;
        }
        let thread = thread.clone();
        spawn_local(async move {
            let result = thread.reply(&text).await;
            mutation.update(|m| m.settle(&result));
            match result {
                Ok(_) => body.set(String::new()),
                Err(err) => recover(err, Criticality::Secondary, notice),
            }
        });
    };

    move || {
        if auth.user().is_some() {
            let submitting = move || mutation.with(|m| m.is_submitting());
            view! {
                <form class="ktap-reply-form" on:submit=on_submit.clone()>
                    <textarea
                        class="ktap-textarea"
                        placeholder="Write a reply..."
                        prop:value=move || body.get()
                        on:input=move |ev| body.set(event_target_value(&ev))
                    />
                    <button class="ktap-btn" type="submit" disabled=submitting>
                        {move || if submitting() { "Replying..." } else { "Reply" }}
                    </button>
                </form>
            }
            .into_any()
        } else {
            view! { <p class="ktap-hint">"Log in to reply."</p> }.into_any()
        }
    }
}
