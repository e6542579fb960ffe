//! Login page supporting password sign-in and account sign-up.
//!
//! SYSTEM CONTEXT
//! ==============
//! The only public page. After a successful sign-in the page navigates to
//! the `redirectTo` query parameter the access gate attached on deny, so
//! the user lands back where they were headed.

#[cfg(test)]
#[path = "login_test.rs"]
mod tests;

use leptos::prelude::*;
use leptos_router::hooks::use_location;

use crate::net::gateway::AuthClient;

/// Whether a route path selects sign-up mode initially.
pub(crate) fn is_signup_path(path: &str) -> bool {
    path.ends_with("/signup")
}

/// Trim and sanity-check the form inputs before any network call.
pub(crate) fn validate_credentials(
    email: &str,
    password: &str,
) -> Result<(String, String), &'static str> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err("Enter a valid email address.");
    }
    if password.len() < 6 {
        return Err("Password must be at least 6 characters.");
    }
    Ok((email.to_owned(), password.to_owned()))
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let client = expect_context::<AuthClient>();
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let location = use_location();
    let signup_mode = RwSignal::new(is_signup_path(&location.pathname.get_untracked()));

    #[cfg(feature = "csr")]
    let navigate = leptos_router::hooks::use_navigate();
    #[cfg(feature = "csr")]
    let query = leptos_router::hooks::use_query_map();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let (email_value, password_value) =
            match validate_credentials(&email.get(), &password.get()) {
                Ok(values) => values,
                Err(message) => {
                    info.set(message.to_owned());
                    return;
                }
            };
        busy.set(true);
        info.set(
            if signup_mode.get() { "Creating account..." } else { "Signing in..." }.to_owned(),
        );

        #[cfg(feature = "csr")]
        {
            let client = client.clone();
            let navigate = navigate.clone();
            let target = crate::util::auth::sanitize_redirect(
                query.get_untracked().get("redirectTo").as_deref(),
            );
            leptos::task::spawn_local(async move {
                if signup_mode.get_untracked() {
                    match client.sign_up(&email_value, &password_value).await {
                        Ok(response) if response.confirmation_required => {
                            info.set("Check your email for the confirmation link!".to_owned());
                            busy.set(false);
                        }
                        Ok(_) => navigate(&target, leptos_router::NavigateOptions::default()),
                        Err(e) => {
                            info.set(format!("Sign-up failed: {e}"));
                            busy.set(false);
                        }
                    }
                } else {
                    match client.sign_in(&email_value, &password_value).await {
                        Ok(_) => navigate(&target, leptos_router::NavigateOptions::default()),
                        Err(e) => {
                            info.set(format!("Sign-in failed: {e}"));
                            busy.set(false);
                        }
                    }
                }
            });
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (&client, email_value, password_value);
            busy.set(false);
        }
    };

    let on_toggle = move |_| {
        signup_mode.update(|mode| *mode = !*mode);
        info.set(String::new());
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Routineo"</h1>
                <p class="login-card__subtitle">
                    {move || if signup_mode.get() { "Create an account" } else { "Sign in" }}
                </p>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="you@example.com"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        {move || match (busy.get(), signup_mode.get()) {
                            (true, _) => "Working...",
                            (false, true) => "Sign Up",
                            (false, false) => "Sign In",
                        }}
                    </button>
                </form>
                <button class="login-toggle" on:click=on_toggle>
                    {move || {
                        if signup_mode.get() {
                            "Have an account? Sign in"
                        } else {
                            "New here? Sign up"
                        }
                    }}
                </button>
                <p class="login-info">{move || info.get()}</p>
            </div>
        </div>
    }
}
