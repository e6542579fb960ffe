//! Browser cookie adapter over `document.cookie`.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser context's implementation of the shared cookie capability.
//! Outside a browser build every operation no-ops and reads resolve absent,
//! mirroring how the rest of the client degrades off-wasm.

#[cfg(test)]
#[path = "cookie_test.rs"]
mod tests;

use session::{CookieOptions, CookieStore, DEFAULT_MAX_AGE_SECS};

/// Cookie access through the document's cookie string.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserCookies;

impl BrowserCookies {
    #[cfg(feature = "csr")]
    fn document() -> Option<web_sys::HtmlDocument> {
        use wasm_bindgen::JsCast;
        web_sys::window()?.document()?.dyn_into::<web_sys::HtmlDocument>().ok()
    }

    fn raw_cookies() -> Option<String> {
        #[cfg(feature = "csr")]
        {
            Self::document()?.cookie().ok()
        }
        #[cfg(not(feature = "csr"))]
        {
            None
        }
    }
}

impl CookieStore for BrowserCookies {
    fn get(&self, name: &str) -> Option<String> {
        Self::raw_cookies().and_then(|raw| cookie_value(&raw, name))
    }

    fn set(&self, name: &str, value: &str, options: &CookieOptions) {
        #[cfg(feature = "csr")]
        {
            if let Some(document) = Self::document() {
                let _ = document.set_cookie(&format_set_cookie(name, value, options));
            }
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (name, value, options);
        }
    }
}

/// Extract one cookie's value from a `document.cookie` string.
pub(crate) fn cookie_value(raw: &str, name: &str) -> Option<String> {
    raw.split(';').map(str::trim).find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_owned())
    })
}

/// Serialize a cookie assignment. The default lifetime applies when the
/// options leave max-age unspecified.
pub(crate) fn format_set_cookie(name: &str, value: &str, options: &CookieOptions) -> String {
    let max_age = options.max_age_secs.unwrap_or(DEFAULT_MAX_AGE_SECS);
    format!("{name}={value}; Path={}; Max-Age={max_age}; SameSite=Lax", options.path)
}
