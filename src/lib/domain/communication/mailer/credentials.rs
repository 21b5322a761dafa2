//! Relay credentials

use std::fmt;

use crate::domain::communication::errors::MailError;

/// Username and password used to authenticate with the SMTP relay
#[derive(Clone, PartialEq, Eq)]
pub struct RelayCredentials {
    username: String,
    password: String,
}

impl RelayCredentials {
    /// Create new relay credentials
    ///
    /// # Errors
    /// [`MailError::ConfigurationError`] if either value is empty or blank.
    pub fn new(username: &str, password: &str) -> Result<Self, MailError> {
        if username.trim().is_empty() {
            return Err(MailError::ConfigurationError(
                "relay username must not be empty".to_string(),
            ));
        }

        if password.trim().is_empty() {
            return Err(MailError::ConfigurationError(
                "relay password must not be empty".to_string(),
            ));
        }

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// The relay username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The relay password
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for RelayCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayCredentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_credentials() -> TestResult {
        let credentials = RelayCredentials::new("u1", "p1")?;

        assert_eq!(credentials.username(), "u1");
        assert_eq!(credentials.password(), "p1");

        Ok(())
    }

    #[test]
    fn test_empty_username_is_rejected() {
        let result = RelayCredentials::new("", "p1");
        assert!(matches!(result, Err(MailError::ConfigurationError(_))));
    }

    #[test]
    fn test_empty_password_is_rejected() {
        let result = RelayCredentials::new("u1", "");
        assert!(matches!(result, Err(MailError::ConfigurationError(_))));
    }

    #[test]
    fn test_blank_credentials_are_rejected() {
        let result = RelayCredentials::new("  ", "\t");
        assert!(matches!(result, Err(MailError::ConfigurationError(_))));
    }

    #[test]
    fn test_debug_hides_password() -> TestResult {
        let credentials = RelayCredentials::new("u1", "hunter2")?;

        let debug = format!("{:?}", credentials);

        assert!(debug.contains("u1"));
        assert!(!debug.contains("hunter2"));

        Ok(())
    }
}
