use std::sync::Arc;

use ktap_feed::{login_redirect, Session, Transport};
use ktap_shared::User;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api::{self, GlooTransport};

/// The current actor, shared via context.
///
/// `session` is the same object the feeds are handed; `rev` makes reads of
/// it reactive.
#[derive(Clone, Debug)]
pub struct AuthState {
    pub session: Session,
    rev: RwSignal<u64>,
}

impl AuthState {
    pub fn user(&self) -> Option<User> {
        self.rev.track();
        self.session.user()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    /// Re-render whatever shows the actor (e.g. after a balance change).
    pub fn touch(&self) {
        self.rev.update(|r| *r += 1);
    }

    pub fn logout(&self) {
        api::clear_token();
        self.session.logout();
        self.touch();
    }

    /// Send anonymous users to the login page; true if they were.
    pub fn require_login(&self) -> bool {
        if self.is_logged_in() {
            return false;
        }
        api::go_to(&login_redirect(&api::current_path()));
        true
    }
}

/// Puts the session in context for everything below it.
#[component]
pub fn AuthProvider(children: Children) -> impl IntoView {
    let session = match api::take_login_token().or_else(api::get_token) {
        Some(token) => Session::with_token(token),
        None => Session::anonymous(),
    };
    let auth = AuthState {
        session: session.clone(),
        rev: RwSignal::new(0),
    };
    provide_context(auth.clone());

    if session.is_logged_in() {
        let transport = Arc::new(GlooTransport::new(api::config()));
        spawn_local(async move {
            match transport.get::<User>("/auth/me").await {
                Ok(user) => session.set_user(user),
                Err(_) => {
                    // Stale token
                    api::clear_token();
                    session.logout();
                }
            }
            auth.touch();
        });
    }

    children()
}

/// Login / logout button with the gift balance.
#[component]
pub fn LoginButton() -> impl IntoView {
    let auth = expect_context::<AuthState>();

    move || {
        if let Some(user) = auth.user() {
            let auth = auth.clone();
            view! {
                <div class="ktap-auth">
                    <img src={user.avatar_url.clone()} alt="" class="ktap-avatar" width="24" height="24" />
                    <span class="ktap-username">{user.username.clone()}</span>
                    <span class="ktap-balance">{format!("{} coins", user.balance)}</span>
                    <button class="ktap-btn ktap-btn-sm" on:click=move |_| auth.logout()>"Logout"</button>
                </div>
            }
            .into_any()
        } else {
            let url = login_redirect(&api::current_path());
            view! {
                <a class="ktap-btn" href={url}>"Log in"</a>
            }
            .into_any()
        }
    }
}
