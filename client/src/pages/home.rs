//! Home page: authenticated landing.
//!
//! SYSTEM CONTEXT
//! ==============
//! The access gate keeps unauthenticated requests out server-side; the
//! client-side redirect guard covers in-app navigation after a sign-out.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::components::user_info::UserInfo;
use crate::net::gateway::AuthClient;
use crate::state::presence::PresenceState;
use crate::util::auth::install_unauth_redirect;

#[component]
pub fn HomePage() -> impl IntoView {
    let client = expect_context::<AuthClient>();
    let presence = expect_context::<RwSignal<PresenceState>>();
    let navigate = use_navigate();

    install_unauth_redirect(presence, navigate);

    let on_sign_out = move |_| {
        #[cfg(feature = "csr")]
        {
            let client = client.clone();
            leptos::task::spawn_local(async move {
                if let Err(error) = client.sign_out().await {
                    log::warn!("sign-out failed: {error}");
                }
            });
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = &client;
        }
    };

    view! {
        <main class="home-page">
            <div class="home-page__inner">
                <h1>"Welcome to Routineo"</h1>
                <UserInfo/>
                <Show when=move || presence.get().is_authenticated()>
                    <button class="home-signout" on:click=on_sign_out.clone()>"Sign out"</button>
                </Show>
            </div>
        </main>
    }
}
