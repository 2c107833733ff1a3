use log::info;
use sha2::{Digest, Sha256};

use crate::store::StoreError;

/// Admin session state. In remote mode the token lives inside the
/// `RemoteStore` client; this tracks only whether the operator is signed in,
/// so both modes expose the same gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Unauthenticated,
    Authenticated,
}

impl Session {
    pub fn new() -> Self {
        Session::Unauthenticated
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated)
    }

    /// Local-mode login: compare the sha256 hex digest of the supplied
    /// password against the configured digest. The plaintext is never kept.
    pub fn login_local(&mut self, password: &str, expected_digest: &str) -> Result<(), StoreError> {
        if sha256_hex(password) == expected_digest.to_lowercase() {
            *self = Session::Authenticated;
            info!("Local session established");
            Ok(())
        } else {
            Err(StoreError::Validation("Incorrect password".into()))
        }
    }

    /// Record a successful remote login (the token exchange itself happens
    /// in `RemoteStore::login`).
    pub fn mark_authenticated(&mut self) {
        *self = Session::Authenticated;
    }

    pub fn logout(&mut self) {
        *self = Session::Unauthenticated;
    }

    /// Funnel for store errors: an expired session drops the gate so the
    /// operator is asked to sign in again, everything else passes through.
    pub fn absorb(&mut self, err: StoreError) -> StoreError {
        if matches!(err, StoreError::AuthExpired) {
            *self = Session::Unauthenticated;
        }
        err
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    // sha256("admin123")
    const ADMIN123_DIGEST: &str =
        "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9";

    #[test]
    fn test_sha256_hex_known_vector() {
        assert_eq!(sha256_hex("admin123"), ADMIN123_DIGEST);
    }

    #[test]
    fn test_local_login_accepts_matching_digest() {
        let mut session = Session::new();
        assert!(!session.is_authenticated());
        session.login_local("admin123", ADMIN123_DIGEST).unwrap();
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_local_login_rejects_wrong_password() {
        let mut session = Session::new();
        let err = session.login_local("letmein", ADMIN123_DIGEST).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_digest_comparison_is_case_insensitive_on_config_side() {
        let mut session = Session::new();
        session
            .login_local("admin123", &ADMIN123_DIGEST.to_uppercase())
            .unwrap();
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_auth_expired_resets_session() {
        let mut session = Session::new();
        session.mark_authenticated();
        let err = session.absorb(StoreError::AuthExpired);
        assert!(matches!(err, StoreError::AuthExpired));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_other_errors_keep_session() {
        let mut session = Session::new();
        session.mark_authenticated();
        session.absorb(StoreError::NotFound);
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_logout() {
        let mut session = Session::new();
        session.mark_authenticated();
        session.logout();
        assert!(!session.is_authenticated());
    }
}
