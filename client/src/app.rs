//! Application shell: routes and shared context.
//!
//! DESIGN
//! ======
//! One [`AuthClient`] is constructed here and provided through context —
//! explicit construction passed down, never a module-level singleton — and
//! the presence hook mounts once for the whole app, so every page and
//! component reads the same reactive auth state.

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

use crate::net::gateway::AuthClient;
use crate::pages::home::HomePage;
use crate::pages::login::LoginPage;
use crate::state::presence::use_presence;

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let client = AuthClient::new();
    provide_context(client);
    let presence = use_presence();
    provide_context(presence);

    view! {
        <Title text="Routineo"/>
        <Router>
            <main class="app-shell">
                <Routes fallback=|| view! { <p class="not-found">"Not found"</p> }>
                    <Route path=path!("/") view=HomePage/>
                    <Route path=path!("/auth/login") view=LoginPage/>
                    <Route path=path!("/auth/signup") view=LoginPage/>
                </Routes>
            </main>
        </Router>
    }
}
