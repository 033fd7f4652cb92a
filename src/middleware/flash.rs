//! One-shot toast messages carried across a redirect in a short-lived
//! cookie. The next page load takes the toast and clears the cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "vd_flash";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub kind: String,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: "success".into(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: "error".into(),
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: "info".into(),
            message: message.into(),
        }
    }
}

pub fn set_toast(jar: CookieJar, toast: &Toast) -> CookieJar {
    let json = serde_json::to_string(toast).unwrap_or_default();
    let encoded: String = url::form_urlencoded::byte_serialize(json.as_bytes()).collect();
    let cookie = Cookie::build((FLASH_COOKIE, encoded))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

pub fn take_toast(jar: CookieJar) -> (CookieJar, Option<Toast>) {
    let toast = jar.get(FLASH_COOKIE).and_then(|cookie| {
        let decoded: String = url::form_urlencoded::parse(cookie.value().as_bytes())
            .map(|(k, v)| format!("{k}{v}"))
            .collect();
        serde_json::from_str(&decoded).ok()
    });
    if toast.is_some() {
        let removal = Cookie::build(FLASH_COOKIE).path("/").build();
        (jar.remove(removal), toast)
    } else {
        (jar, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_take_round_trips() {
        let jar = CookieJar::new();
        let toast = Toast::success("Deposit #42 approved");
        let jar = set_toast(jar, &toast);

        let (jar, taken) = take_toast(jar);
        assert_eq!(taken, Some(toast));
        let (_, again) = take_toast(jar);
        assert!(again.is_none());
    }

    #[test]
    fn missing_cookie_yields_none() {
        let (_, taken) = take_toast(CookieJar::new());
        assert!(taken.is_none());
    }
}
