mod api;
mod auth;
mod discussion;
mod feed;
mod games;
mod thumbs;

use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;
use wasm_bindgen::JsCast;

/// Full client, mounted on `#ktap-app`.
#[component]
fn App() -> impl IntoView {
    view! {
        <Router>
            <div class="ktap-app">
                <header class="ktap-header">
                    <a href="/games">"Games"</a>
                    <auth::LoginButton />
                </header>
                <Routes fallback=|| view! { <p>"Page not found."</p> }>
                    <Route path=path!("/") view=games::GameList />
                    <Route path=path!("/games") view=games::GameList />
                    <Route path=path!("/discussions/:id") view=discussion::DiscussionRoute />
                    <Route path=path!("/not-found") view=|| view! { <p>"That page does not exist."</p> } />
                    <Route path=path!("/error") view=|| view! { <p>"Something went wrong. Try again later."</p> } />
                </Routes>
            </div>
        </Router>
    }
}

fn main() {
    console_error_panic_hook::set_once();

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };

    // Single discussion embedded in a host page
    if let Some(el) = document.get_element_by_id("ktap-discussion") {
        let discussion_id = el.get_attribute("data-discussion-id").unwrap_or_default();
        let html_el: web_sys::HtmlElement = el.unchecked_into();
        leptos::mount::mount_to(html_el, move || {
            view! {
                <auth::AuthProvider>
                    <auth::LoginButton />
                    <discussion::DiscussionView discussion_id=discussion_id.clone() />
                </auth::AuthProvider>
            }
        })
        .forget();
    }

    if let Some(el) = document.get_element_by_id("ktap-app") {
        let html_el: web_sys::HtmlElement = el.unchecked_into();
        leptos::mount::mount_to(html_el, move || {
            view! {
                <auth::AuthProvider>
                    <App />
                </auth::AuthProvider>
            }
        })
        .forget();
    }
}
