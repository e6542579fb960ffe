//! Current-user card: the view over presence state.
//!
//! Renders all four presence states distinctly — loading, error, signed
//! out, and the user's details. Error and signed-out are deliberately not
//! the same screen: one is unknown, the other is certain.

#[cfg(test)]
#[path = "user_info_test.rs"]
mod tests;

use leptos::prelude::*;

use crate::state::presence::PresenceState;

pub(crate) fn verified_label(email_confirmed_at: Option<&str>) -> &'static str {
    if email_confirmed_at.is_some() { "Yes" } else { "No" }
}

pub(crate) fn last_sign_in_label(last_sign_in_at: Option<&str>) -> String {
    last_sign_in_at.map_or_else(|| "N/A".to_owned(), str::to_owned)
}

#[component]
pub fn UserInfo() -> impl IntoView {
    let presence = expect_context::<RwSignal<PresenceState>>();

    view! {
        <div class="user-info">
            {move || {
                let state = presence.get();
                if state.loading {
                    return view! { <p>"Loading user info..."</p> }.into_any();
                }
                if let Some(error) = state.error {
                    return view! {
                        <p class="user-info__error">"Error: " {error}</p>
                    }
                    .into_any();
                }
                match state.user {
                    Some(user) => {
                        let verified = verified_label(user.email_confirmed_at.as_deref());
                        let last_sign_in = last_sign_in_label(user.last_sign_in_at.as_deref());
                        view! {
                            <div class="user-info__card">
                                <h2>"User Information"</h2>
                                <p>
                                    <span class="user-info__label">"Email: "</span>
                                    {user.email.clone().unwrap_or_default()}
                                </p>
                                <p>
                                    <span class="user-info__label">"User ID: "</span>
                                    {user.id.clone()}
                                </p>
                                <p>
                                    <span class="user-info__label">"Email Verified: "</span>
                                    {verified}
                                </p>
                                <p>
                                    <span class="user-info__label">"Last Sign In: "</span>
                                    {last_sign_in}
                                </p>
                            </div>
                        }
                        .into_any()
                    }
                    None => view! { <p>"Not logged in"</p> }.into_any(),
                }
            }}
        </div>
    }
}
