use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller identity as handed over by the controller layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: String,
    pub user_email: String,
}

impl UserIdentity {
    pub fn new(user_id: impl Into<String>, user_email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_email: user_email.into(),
        }
    }

    /// Email as stored and compared: trimmed and lowercased
    pub fn normalized_email(&self) -> String {
        self.user_email.trim().to_lowercase()
    }

    pub fn fingerprint(&self) -> OwnerFingerprint {
        OwnerFingerprint::new(&self.user_id, &self.user_email)
    }
}

/// Owner of a thread: user id plus lowercased email
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerFingerprint(String);

impl OwnerFingerprint {
    pub fn new(user_id: &str, user_email: &str) -> Self {
        Self(format!("{}|{}", user_id.trim(), user_email.trim().to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_ignores_email_case() {
        let a = UserIdentity::new("u1", "Ana@Firm.CO").fingerprint();
        let b = UserIdentity::new("u1", "ana@firm.co ").fingerprint();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_depends_on_user_id() {
        let a = UserIdentity::new("u1", "ana@firm.co").fingerprint();
        let b = UserIdentity::new("u2", "ana@firm.co").fingerprint();
        assert_ne!(a, b);
    }
}
