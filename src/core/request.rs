//! Request Construction
//!
//! Builds token endpoint and protected resource requests.

use base64::Engine;
use std::collections::HashMap;

use crate::core::{HttpMethod, HttpRequest};
use crate::types::{
    AccessToken, GrantType, OAuth2Config, JSON_CONTENT, URL_ENCODED_CONTENT, XML_CONTENT,
};

pub const CLIENT_ID: &str = "client_id";
pub const CLIENT_SECRET: &str = "client_secret";
pub const GRANT_TYPE: &str = "grant_type";
pub const USERNAME: &str = "username";
pub const PASSWORD: &str = "password";
pub const REFRESH_TOKEN: &str = "refresh_token";
pub const SCOPE: &str = "scope";

/// Form fields for a token request, in wire order.
///
/// The password grant adds the resource owner credentials, the refresh grant
/// adds `refresh_token` when one is given, and `scope` is only sent when it
/// is not blank.
pub fn token_form_fields(
    config: &OAuth2Config,
    refresh_token: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        (CLIENT_ID, config.client_id().to_string()),
        (CLIENT_SECRET, config.client_secret().to_string()),
        (GRANT_TYPE, config.grant_type().as_str().to_string()),
    ];

    match config.grant_type() {
        GrantType::Password => {
            fields.push((USERNAME, config.username().unwrap_or_default().to_string()));
            fields.push((PASSWORD, config.password().unwrap_or_default().to_string()));
        }
        GrantType::RefreshToken => {
            if let Some(token) = refresh_token {
                fields.push((REFRESH_TOKEN, token.to_string()));
            }
        }
        GrantType::ClientCredentials => {}
    }

    if let Some(scope) = config.scope().filter(|s| !s.trim().is_empty()) {
        fields.push((SCOPE, scope.to_string()));
    }

    fields
}

/// URL-encode form fields.
pub fn encode_form(fields: &[(&str, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields.iter().map(|(k, v)| (*k, v.as_str())))
        .finish()
}

/// `Basic base64(user:pass)` header value.
pub fn basic_authorization(username: &str, password: &str) -> String {
    let credentials = format!("{}:{}", username, password);
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(credentials)
    )
}

/// `POST` to the token endpoint with an optional Authorization header.
pub fn token_request(
    config: &OAuth2Config,
    refresh_token: Option<&str>,
    authorization: Option<String>,
) -> HttpRequest {
    let mut headers = HashMap::new();
    headers.insert("content-type".to_string(), URL_ENCODED_CONTENT.to_string());
    headers.insert("accept".to_string(), accept_header());
    if let Some(value) = authorization {
        headers.insert("authorization".to_string(), value);
    }

    HttpRequest {
        method: HttpMethod::Post,
        url: config.token_endpoint().to_string(),
        headers,
        body: Some(encode_form(&token_form_fields(config, refresh_token))),
        timeout: Some(config.timeout()),
    }
}

/// `GET` with `Authorization: Bearer <token>`.
pub fn resource_request(
    token: &AccessToken,
    url: &str,
    timeout: Option<std::time::Duration>,
) -> HttpRequest {
    let mut headers = HashMap::new();
    headers.insert("authorization".to_string(), token.authorization_header());

    HttpRequest {
        method: HttpMethod::Get,
        url: url.to_string(),
        headers,
        body: None,
        timeout,
    }
}

fn accept_header() -> String {
    format!("{}, {}, {}", JSON_CONTENT, URL_ENCODED_CONTENT, XML_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::oauth2_config;

    fn password_config() -> OAuth2Config {
        oauth2_config()
            .grant_type(GrantType::Password)
            .client_id("client1id")
            .client_secret("client1secret")
            .credentials("oauth_user", "oauth user&pw")
            .token_endpoint("http://localhost/api/oauth/access_token")
            .build()
            .unwrap()
    }

    fn keys(fields: &[(&'static str, String)]) -> Vec<&'static str> {
        fields.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn test_password_fields() {
        let fields = token_form_fields(&password_config(), None);
        assert_eq!(
            keys(&fields),
            vec![CLIENT_ID, CLIENT_SECRET, GRANT_TYPE, USERNAME, PASSWORD]
        );
        assert_eq!(fields[2].1, "password");
    }

    #[test]
    fn test_refresh_fields_and_blank_scope() {
        let config = oauth2_config()
            .grant_type(GrantType::ClientCredentials)
            .client_id("client1id")
            .client_secret("client1secret")
            .scope("   ")
            .token_endpoint("http://localhost/token")
            .build()
            .unwrap()
            .for_refresh();

        let fields = token_form_fields(&config, Some("ref456"));
        assert_eq!(
            keys(&fields),
            vec![CLIENT_ID, CLIENT_SECRET, GRANT_TYPE, REFRESH_TOKEN]
        );
        assert_eq!(fields[3].1, "ref456");

        // No refresh token: the field is left out.
        let fields = token_form_fields(&config, None);
        assert_eq!(keys(&fields), vec![CLIENT_ID, CLIENT_SECRET, GRANT_TYPE]);
    }

    #[test]
    fn test_client_credentials_scope_is_sent() {
        let config = oauth2_config()
            .grant_type(GrantType::ClientCredentials)
            .client_id("c")
            .client_secret("s")
            .scope("read write")
            .token_endpoint("http://localhost/token")
            .build()
            .unwrap();

        let body = encode_form(&token_form_fields(&config, None));
        assert_eq!(
            body,
            "client_id=c&client_secret=s&grant_type=client_credentials&scope=read+write"
        );
    }

    #[test]
    fn test_form_body_is_encoded() {
        let request = token_request(&password_config(), None, None);
        let body = request.body.as_deref().unwrap();
        assert!(body.contains("password=oauth+user%26pw"));
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.header("content-type"), Some(URL_ENCODED_CONTENT));
        assert!(request.header("authorization").is_none());
    }

    #[test]
    fn test_basic_authorization() {
        // base64("client1id:client1secret")
        assert_eq!(
            basic_authorization("client1id", "client1secret"),
            "Basic Y2xpZW50MWlkOmNsaWVudDFzZWNyZXQ="
        );
        assert_eq!(basic_authorization("", ""), "Basic Og==");
    }

    #[test]
    fn test_resource_request_uses_bearer() {
        let token = AccessToken::new("tok123", "Bearer", None, 3600);
        let request = resource_request(&token, "http://localhost/api/user_info", None);
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.header("Authorization"), Some("Bearer tok123"));
        assert!(request.body.is_none());
    }
}
