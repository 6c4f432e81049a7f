//! API-key authentication and scope checks.
//!
//! Clients present an `X-Api-Key` header. The [`ClientRegistry`] is resolved once at startup
//! from a compact configuration string and maps each key to the [`ScopeSet`] it was granted:
//!
//! ```text
//! key-one=documenten.lezen,documenten.aanmaken;key-two=*
//! ```
//!
//! `*` grants every scope.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// Header carrying the client's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("no API key supplied")]
    MissingKey,
    #[error("unknown API key")]
    UnknownKey,
    #[error("missing scope: {0}")]
    MissingScope(Scope),
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Authorisation scopes of the documents API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    Read,
    Create,
    Update,
    Delete,
    Lock,
    /// Allows edits to a document family whose latest version is definitive.
    ForceUpdate,
    /// Allows releasing a lock without presenting its token.
    ForceUnlock,
}

impl Scope {
    pub const ALL: [Scope; 7] = [
        Scope::Read,
        Scope::Create,
        Scope::Update,
        Scope::Delete,
        Scope::Lock,
        Scope::ForceUpdate,
        Scope::ForceUnlock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Read => "documenten.lezen",
            Scope::Create => "documenten.aanmaken",
            Scope::Update => "documenten.bijwerken",
            Scope::Delete => "documenten.verwijderen",
            Scope::Lock => "documenten.lock",
            Scope::ForceUpdate => "documenten.geforceerd-bijwerken",
            Scope::ForceUnlock => "documenten.geforceerd-unlock",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scope::ALL
            .into_iter()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| AuthError::InvalidConfig(format!("unknown scope '{s}'")))
    }
}

/// The scopes granted to one client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSet(BTreeSet<Scope>);

impl ScopeSet {
    pub fn new(scopes: impl IntoIterator<Item = Scope>) -> Self {
        Self(scopes.into_iter().collect())
    }

    pub fn all() -> Self {
        Self::new(Scope::ALL)
    }

    pub fn contains(&self, scope: Scope) -> bool {
        self.0.contains(&scope)
    }

    /// Returns `Err(AuthError::MissingScope)` unless `scope` was granted.
    pub fn require(&self, scope: Scope) -> AuthResult<()> {
        if self.contains(scope) {
            Ok(())
        } else {
            Err(AuthError::MissingScope(scope))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Scope> + '_ {
        self.0.iter().copied()
    }
}

/// Maps API keys to granted scopes.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, ScopeSet>,
}

impl ClientRegistry {
    /// Parses `key=scope,scope;key=*`. Whitespace around entries is ignored; an empty value
    /// yields a registry that rejects every key.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidConfig` for entries without `=`, empty keys or unknown scopes.
    pub fn from_config_value(value: &str) -> AuthResult<Self> {
        let mut clients = HashMap::new();

        for entry in value.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, scopes) = entry.split_once('=').ok_or_else(|| {
                AuthError::InvalidConfig(format!("entry '{entry}' is not key=scopes"))
            })?;

            let key = key.trim();
            if key.is_empty() {
                return Err(AuthError::InvalidConfig("empty API key".into()));
            }

            let scopes = if scopes.trim() == "*" {
                ScopeSet::all()
            } else {
                let parsed = scopes
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(Scope::from_str)
                    .collect::<AuthResult<Vec<_>>>()?;
                ScopeSet::new(parsed)
            };

            clients.insert(key.to_owned(), scopes);
        }

        if clients.is_empty() {
            tracing::warn!("client registry is empty; every request will be rejected");
        }

        Ok(Self { clients })
    }

    /// Registers a client programmatically.
    pub fn with_client(mut self, key: impl Into<String>, scopes: ScopeSet) -> Self {
        self.clients.insert(key.into(), scopes);
        self
    }

    /// Resolves the scopes for a presented API key.
    pub fn authenticate(&self, provided_key: Option<&str>) -> AuthResult<&ScopeSet> {
        let key = provided_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(AuthError::MissingKey)?;
        self.clients.get(key).ok_or(AuthError::UnknownKey)
    }
}
