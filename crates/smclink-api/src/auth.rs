use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Basic-auth credential derived from a username / password pair.
///
/// The SMC only checks credentials on state-changing calls, so the token is
/// attached to POST requests. It is always derived, never user-supplied:
/// build a fresh one whenever the configuration changes.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    username: String,
    token: SecretString,
}

impl BasicAuth {
    /// Derive `base64(username:password)`.
    pub fn new(username: &str, password: &SecretString) -> Self {
        let raw = format!("{username}:{}", password.expose_secret());
        Self {
            username: username.to_owned(),
            token: SecretString::from(STANDARD.encode(raw)),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The derived base64 token (without the `Basic ` scheme prefix).
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    /// `Authorization` header value, marked sensitive so it never shows up
    /// in debug output.
    pub fn header_value(&self) -> Result<HeaderValue, Error> {
        let mut value = HeaderValue::from_str(&format!("Basic {}", self.token.expose_secret()))
            .map_err(|e| Error::ClientBuild(format!("invalid authorization header: {e}")))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_base64_of_user_colon_password() {
        let auth = BasicAuth::new("admin", &SecretString::from("secret".to_string()));
        assert_eq!(auth.token().expose_secret(), "YWRtaW46c2VjcmV0");
        assert_eq!(auth.username(), "admin");
    }

    #[test]
    fn empty_credentials_still_produce_a_token() {
        let auth = BasicAuth::new("", &SecretString::from(String::new()));
        assert_eq!(auth.token().expose_secret(), "Og==");
    }

    #[test]
    fn header_value_is_sensitive() {
        let auth = BasicAuth::new("admin", &SecretString::from("secret".to_string()));
        let header = auth.header_value().expect("valid header");
        assert!(header.is_sensitive());
        assert_eq!(header.to_str().expect("ascii"), "Basic YWRtaW46c2VjcmV0");
    }
}
