//! Administrator identity types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// OAuth identity provider an administrator signs in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthProvider {
    Discord,
    Google,
}

impl AuthProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Discord => "discord",
            Self::Google => "google",
        }
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown auth provider: {0}")]
pub struct UnknownAuthProvider(pub String);

impl FromStr for AuthProvider {
    type Err = UnknownAuthProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discord" => Ok(Self::Discord),
            "google" => Ok(Self::Google),
            other => Err(UnknownAuthProvider(other.to_owned())),
        }
    }
}
