use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Strongly typed verdict of a single leak lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsLeaked(pub bool);

/// A single username/password pair submitted for a leak check.
///
/// Carries an opaque user-data map so that upper layers can attach their own
/// payloads (e.g. the saved-password forms a credential was derived from)
/// without this crate knowing their type. Payloads are keyed by a static
/// string and typed at every access site.
pub struct LeakCheckCredential {
    username: String,
    password: String,
    user_data: HashMap<&'static str, Box<dyn Any + Send + Sync>>,
}

impl LeakCheckCredential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            user_data: HashMap::new(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Attaches a typed payload under `key`, replacing any previous payload
    /// stored under the same key.
    pub fn set_user_data<T: Send + Sync + 'static>(&mut self, key: &'static str, data: T) {
        self.user_data.insert(key, Box::new(data));
    }

    /// Returns the payload stored under `key`, or `None` if the key is absent
    /// or holds a payload of a different type.
    pub fn user_data<T: Send + Sync + 'static>(&self, key: &'static str) -> Option<&T> {
        self.user_data.get(key).and_then(|data| data.downcast_ref())
    }
}

// Equality is over the checked pair only; user data is a side channel and
// never participates in identity.
impl PartialEq for LeakCheckCredential {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username && self.password == other.password
    }
}

impl Eq for LeakCheckCredential {}

impl fmt::Debug for LeakCheckCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never log the password itself.
        f.debug_struct("LeakCheckCredential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
