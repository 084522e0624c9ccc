//! Data kept in a browser session.
//!
//! Stored as JSON in `sessions.data`. Every field defaults, so sessions written
//! by older builds still load.

use crate::users::LoginUser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Info,
    Error,
}

/// A one-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub text: String,
}

/// Pending OAuth authorization started from this session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthState {
    pub provider: String,
    pub state: String,
    /// PKCE verifier, for providers that require one
    #[serde(default)]
    pub code_verifier: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionData {
    pub login_user: Option<LoginUser>,
    /// Unix time in milliseconds after which the login is dropped
    pub login_expires: Option<i64>,
    #[serde(rename = "backURL")]
    pub back_url: Option<String>,
    pub flash: Vec<Flash>,
    pub oauth_state: Option<OAuthState>,
}

impl SessionData {
    pub fn flash(&mut self, kind: FlashKind, text: impl Into<String>) {
        self.flash.push(Flash {
            kind,
            text: text.into(),
        });
    }

    /// Removes and returns the queued flash messages.
    pub fn take_flash(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.flash)
    }

    pub fn login(&mut self, user: LoginUser) {
        self.login_user = Some(user);
    }

    pub fn logout(&mut self) {
        self.login_user = None;
        self.login_expires = None;
    }
}
