//! Session store implementations

pub mod file_store;
pub mod memory_store;

pub use file_store::FileSessionStore;
pub use memory_store::InMemorySessionStore;

use forge_application::ports::session_store::SessionStoreError;

/// Session ids become file names, so only a conservative character set is allowed.
pub(crate) fn validate_session_id(id: &str) -> Result<(), SessionStoreError> {
    let valid = !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SessionStoreError::InvalidId(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_validation() {
        assert!(validate_session_id("3f2a9c1e-0b7d-4c55-9e61-2d8f0a4b7c13").is_ok());
        assert!(validate_session_id("my_session").is_ok());
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("../etc/passwd").is_err());
        assert!(validate_session_id("a b").is_err());
    }
}
