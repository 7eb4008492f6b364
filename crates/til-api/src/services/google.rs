//! Google OAuth code exchange.
//!
//! Covers only the authorization-code flow the website login needs: build
//! the consent URL, swap the callback code for an access token, and fetch
//! the user's email and display name. Provider trust negotiation beyond
//! that is Google's problem.

use serde::Deserialize;
use tracing::debug;

use til_core::{Error, Result};

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v1/userinfo?alt=json";

/// Identity fields returned by Google's userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUserInfo {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Google OAuth client configured from the environment.
#[derive(Clone)]
pub struct GoogleOAuth {
    client_id: String,
    client_secret: String,
    callback_url: String,
    http: reqwest::Client,
}

impl GoogleOAuth {
    /// Build from `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`, and
    /// `GOOGLE_CALLBACK_URL`. Returns None when the integration is not
    /// configured, which disables the Google login routes.
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID").ok()?;
        let client_secret = std::env::var("GOOGLE_CLIENT_SECRET").ok()?;
        let callback_url = std::env::var("GOOGLE_CALLBACK_URL").ok()?;

        Some(Self {
            client_id,
            client_secret,
            callback_url,
            http: reqwest::Client::new(),
        })
    }

    #[cfg(test)]
    fn for_test(client_id: &str, callback_url: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: "secret".to_string(),
            callback_url: callback_url.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Consent-screen URL carrying the anti-forgery `state` value.
    pub fn auth_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&scope=profile%20email&response_type=code&state={}",
            AUTH_ENDPOINT,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.callback_url),
            urlencoding::encode(state),
        )
    }

    /// Exchange the callback authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<String> {
        debug!(
            subsystem = "auth",
            component = "google_oauth",
            op = "exchange_code",
            "Exchanging authorization code"
        );

        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Unauthorized(format!(
                "Google token exchange failed with status {}",
                response.status()
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Fetch the authenticated user's email and name.
    pub async fn fetch_user(&self, access_token: &str) -> Result<GoogleUserInfo> {
        let response = self
            .http
            .get(USERINFO_ENDPOINT)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Unauthorized(format!(
                "Google userinfo request failed with status {}",
                response.status()
            )));
        }

        let info: GoogleUserInfo = response.json().await?;
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_url_encodes_parameters() {
        let google = GoogleOAuth::for_test("client 1", "https://til.example.com/oauth/google/callback");
        let url = google.auth_url("abc/+123");

        assert!(url.starts_with(AUTH_ENDPOINT));
        assert!(url.contains("client_id=client%201"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Ftil.example.com%2Foauth%2Fgoogle%2Fcallback"));
        assert!(url.contains("state=abc%2F%2B123"));
        assert!(url.contains("response_type=code"));
    }

    #[test]
    fn test_userinfo_deserializes() {
        let info: GoogleUserInfo =
            serde_json::from_str(r#"{"email":"tim@example.com","name":"Tim","id":"123"}"#).unwrap();
        assert_eq!(info.email, "tim@example.com");
        assert_eq!(info.name, "Tim");
    }
}
