//! Token login URL ("Option 2" flow).
//!
//! The user logs in on Tradera's page, which redirects back with the user id.
//! The secret key embedded in the URL is later redeemed with `FetchToken`.

use serde::Serialize;
use uuid::Uuid;

/// Tradera's authorization page.
pub const TOKEN_LOGIN_URL: &str = "https://api.tradera.com/tokenlogin.aspx";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginUrl {
    pub url: String,
    /// Must be kept by the caller to redeem the token.
    pub secret_key: String,
}

/// Upper-cased UUID v4, the format Tradera recommends for secret keys.
pub fn generate_secret_key() -> String {
    Uuid::new_v4().to_string().to_uppercase()
}

pub fn generate_login_url(app_id: &str, public_key: &str, secret_key: Option<&str>) -> LoginUrl {
    let secret_key = secret_key
        .map(String::from)
        .unwrap_or_else(generate_secret_key);
    let url = format!(
        "{}?appId={}&pkey={}&skey={}",
        TOKEN_LOGIN_URL, app_id, public_key, secret_key
    );
    LoginUrl { url, secret_key }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_keys_differ() {
        let a = generate_login_url("1234", "pub", None);
        let b = generate_login_url("1234", "pub", None);
        assert_ne!(a.secret_key, b.secret_key);

        for login in [&a, &b] {
            assert!(login.url.contains("appId=1234"));
            assert!(login.url.contains("pkey=pub"));
            assert!(login.url.ends_with(&format!("skey={}", login.secret_key)));
        }
    }

    #[test]
    fn test_generated_key_is_uppercase_uuid() {
        let key = generate_secret_key();
        assert_eq!(key.len(), 36);
        assert_eq!(key, key.to_uppercase());
        assert!(Uuid::parse_str(&key).is_ok());
    }

    #[test]
    fn test_supplied_key_is_used_verbatim() {
        let login = generate_login_url("1234", "pub", Some("X"));
        assert_eq!(login.secret_key, "X");
        assert_eq!(
            login.url,
            "https://api.tradera.com/tokenlogin.aspx?appId=1234&pkey=pub&skey=X"
        );
    }
}
