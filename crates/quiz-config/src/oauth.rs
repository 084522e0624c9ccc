//! Third-party login providers.
//!
//! A provider is enabled only when BOTH halves of its credential pair are present
//! and non-empty. Disabled providers get no routes at all.

use std::collections::BTreeMap;
use std::fmt;

use crate::{Lookup, env_lookup, non_empty};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OAuthProvider {
    GitHub,
    Twitter,
    Google,
    LinkedIn,
}

impl OAuthProvider {
    pub const ALL: [OAuthProvider; 4] = [
        OAuthProvider::GitHub,
        OAuthProvider::Twitter,
        OAuthProvider::Google,
        OAuthProvider::LinkedIn,
    ];

    /// Path segment used in `/auth/<slug>`.
    pub fn slug(&self) -> &'static str {
        match self {
            OAuthProvider::GitHub => "github",
            OAuthProvider::Twitter => "twitter",
            OAuthProvider::Google => "google",
            OAuthProvider::LinkedIn => "linkedin",
        }
    }

    /// Value stored in `users.account_type_id` for accounts of this provider.
    /// Local accounts use 0.
    pub fn account_type_id(&self) -> i32 {
        match self {
            OAuthProvider::GitHub => 1,
            OAuthProvider::Twitter => 2,
            OAuthProvider::Google => 3,
            OAuthProvider::LinkedIn => 4,
        }
    }

    /// Environment variables holding the (client id, client secret) pair.
    pub fn credential_vars(&self) -> (&'static str, &'static str) {
        match self {
            OAuthProvider::GitHub => ("GITHUB_CLIENT_ID", "GITHUB_CLIENT_SECRET"),
            OAuthProvider::Twitter => ("TWITTER_CONSUMER_KEY", "TWITTER_CONSUMER_SECRET"),
            OAuthProvider::Google => ("GOOGLE_CLIENT_ID", "GOOGLE_CLIENT_SECRET"),
            OAuthProvider::LinkedIn => ("LINKEDIN_API_KEY", "LINKEDIN_SECRET_KEY"),
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl OAuthCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Both halves or nothing.
    pub fn from_pair(client_id: Option<String>, client_secret: Option<String>) -> Option<Self> {
        match (client_id, client_secret) {
            (Some(id), Some(secret)) => Some(Self::new(id, secret)),
            _ => None,
        }
    }
}

/// Credentials of every enabled provider.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OAuthConfig {
    providers: BTreeMap<OAuthProvider, OAuthCredentials>,
}

impl OAuthConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        let mut providers = BTreeMap::new();
        for provider in OAuthProvider::ALL {
            let (id_var, secret_var) = provider.credential_vars();
            let credentials = OAuthCredentials::from_pair(
                non_empty(lookup, id_var),
                non_empty(lookup, secret_var),
            );
            match credentials {
                Some(credentials) => {
                    providers.insert(provider, credentials);
                }
                None => {
                    tracing::debug!(provider = %provider, "OAuth provider disabled: credential pair incomplete");
                }
            }
        }
        Self { providers }
    }

    /// Builder used by tests and embedders.
    pub fn with(mut self, provider: OAuthProvider, credentials: OAuthCredentials) -> Self {
        self.providers.insert(provider, credentials);
        self
    }

    pub fn credentials(&self, provider: OAuthProvider) -> Option<&OAuthCredentials> {
        self.providers.get(&provider)
    }

    pub fn is_enabled(&self, provider: OAuthProvider) -> bool {
        self.providers.contains_key(&provider)
    }

    /// Enabled providers in a stable order.
    pub fn enabled(&self) -> impl Iterator<Item = OAuthProvider> + '_ {
        self.providers.keys().copied()
    }
}
