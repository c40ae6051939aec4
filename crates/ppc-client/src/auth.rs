use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Two mutually exclusive authorization schemes. Token mode is required for
/// the live log stream, which cannot carry headers.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    Token,
    Basic,
}

/// The single stored credential record. Only one of `token` or `user`+`pass`
/// is active at a time, but the inactive fields are retained across mode
/// switches rather than cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthProfile {
    #[serde(default)]
    pub mode: AuthMode,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub pass: String,
}

/// Derive the outgoing `Authorization` value for a profile.
///
/// Basic mode always yields a header, even with empty credentials: the
/// result is syntactically valid and the server is the one to reject it.
/// Token mode yields nothing until a token is present.
pub fn auth_header(profile: &AuthProfile) -> Option<String> {
    match profile.mode {
        AuthMode::Basic => {
            let raw = format!("{}:{}", profile.user, profile.pass);
            Some(format!("Basic {}", BASE64.encode(raw.as_bytes())))
        }
        AuthMode::Token => {
            if profile.token.is_empty() {
                None
            } else {
                Some(format!("Bearer {}", profile.token))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_mode_with_token_yields_bearer() {
        let profile = AuthProfile {
            token: "abc".to_string(),
            ..AuthProfile::default()
        };
        assert_eq!(auth_header(&profile).as_deref(), Some("Bearer abc"));
    }

    #[test]
    fn token_mode_without_token_yields_none() {
        assert_eq!(auth_header(&AuthProfile::default()), None);
    }

    #[test]
    fn basic_mode_always_yields_header() {
        let profile = AuthProfile {
            mode: AuthMode::Basic,
            user: "admin".to_string(),
            pass: "secret".to_string(),
            ..AuthProfile::default()
        };
        // base64("admin:secret")
        assert_eq!(
            auth_header(&profile).as_deref(),
            Some("Basic YWRtaW46c2VjcmV0")
        );
    }

    #[test]
    fn basic_mode_with_empty_credentials_still_yields_header() {
        let profile = AuthProfile {
            mode: AuthMode::Basic,
            ..AuthProfile::default()
        };
        // base64(":")
        assert_eq!(auth_header(&profile).as_deref(), Some("Basic Og=="));
    }

    #[test]
    fn profile_round_trips_with_short_field_names() {
        let profile = AuthProfile {
            mode: AuthMode::Basic,
            token: "kept".to_string(),
            user: "admin".to_string(),
            pass: "pw".to_string(),
        };
        let raw = serde_json::to_string(&profile).expect("serialize");
        assert!(raw.contains(r#""mode":"basic""#));
        assert!(raw.contains(r#""user":"admin""#));
        let back: AuthProfile = serde_json::from_str(&raw).expect("deserialize");
        assert_eq!(back, profile);
    }
}
