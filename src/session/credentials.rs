//! In-memory credential store for one viewer session.
//!
//! Holds the instance name and developer token entered by the user. Nothing
//! here is ever persisted; a restart always begins with empty credentials.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// A single DNS label: the instance becomes the first label of the API host.
static INSTANCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]*$").expect("valid instance regex"));

/// Instance identifier plus developer token.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    instance: String,
    token: String,
}

/// Why a fetch may not be attempted with the current credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialProblem {
    Missing,
    InvalidInstance,
}

impl Credentials {
    pub fn new(instance: impl Into<String>, token: impl Into<String>) -> Self {
        let mut creds = Self::default();
        creds.set_instance(instance);
        creds.set_token(token);
        creds
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn set_instance(&mut self, instance: impl Into<String>) {
        self.instance = instance.into().trim().to_string();
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into().trim().to_string();
    }

    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    /// Both fields present and the instance usable as a host label.
    pub fn check(&self) -> Result<(), CredentialProblem> {
        if self.instance.is_empty() || self.token.is_empty() {
            return Err(CredentialProblem::Missing);
        }
        if !INSTANCE_RE.is_match(&self.instance) {
            return Err(CredentialProblem::InvalidInstance);
        }
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.check().is_ok()
    }
}

// The token must never reach logs through `{:?}`.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("instance", &self.instance)
            .field("token", &if self.token.is_empty() { "" } else { "***" })
            .finish()
    }
}

impl fmt::Display for CredentialProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "Please provide both instance and developer token."),
            Self::InvalidInstance => write!(
                f,
                "Instance must be a host name label such as 'acme-1' (letters, digits, '-')."
            ),
        }
    }
}
