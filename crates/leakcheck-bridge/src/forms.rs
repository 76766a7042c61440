use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// A saved password entry as handed over by the password store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordForm {
    pub signon_realm: String,
    pub username: String,
    pub password: String,
}

/// How a credential ended up in the compromised-credentials store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompromiseType {
    /// Found in a breach-data corpus by the leak lookup.
    Leaked,
    /// Entered on a known phishing site.
    Phished,
}

/// Persisted record that a (realm, username) pair was found compromised.
/// Written by the storage layer; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompromisedCredentials {
    pub signon_realm: String,
    pub username: String,
    pub create_time: SystemTime,
    pub compromise_type: CompromiseType,
}

/// A compromised record joined with a matching saved password. Ephemeral,
/// rebuilt on every provider refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialWithPassword {
    pub credential: CompromisedCredentials,
    pub password: String,
}
