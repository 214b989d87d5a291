//! Tests for authentication types.

use super::*;
use chrono::Duration;

mod id_tests {
    use super::*;

    #[test]
    fn test_app_id_parses_from_string() {
        let app_id: GitHubAppId = "123456".parse().unwrap();

        assert_eq!(app_id, GitHubAppId::new(123456));
        assert_eq!(app_id.to_string(), "123456");
    }

    #[test]
    fn test_app_id_rejects_non_numeric_input() {
        let result = "my-app".parse::<GitHubAppId>();

        match result {
            Err(ValidationError::InvalidFormat { field, .. }) => {
                assert_eq!(field, "github_app_id")
            }
            other => panic!("Expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_installation_id_parses_with_whitespace() {
        let id: InstallationId = " 42 ".parse().unwrap();

        assert_eq!(id.as_u64(), 42);
    }

    #[test]
    fn test_installation_id_rejects_negative_numbers() {
        assert!("-1".parse::<InstallationId>().is_err());
    }

    #[test]
    fn test_zero_ids_are_rejected() {
        assert!(matches!(
            "0".parse::<GitHubAppId>(),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "github_app_id"
        ));
        assert!(matches!(
            " 0 ".parse::<InstallationId>(),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "installation_id"
        ));
    }

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        assert_eq!(serde_json::to_string(&GitHubAppId::new(5)).unwrap(), "5");
        assert_eq!(
            serde_json::from_str::<InstallationId>("42").unwrap(),
            InstallationId::new(42)
        );
    }
}

mod token_tests {
    use super::*;

    #[test]
    fn test_jwt_debug_redacts_token() {
        let now = Utc::now();
        let jwt = JsonWebToken::new(
            "secret.jwt.value".to_string(),
            GitHubAppId::new(1),
            now,
            now + Duration::minutes(10),
        );

        let debug = format!("{:?}", jwt);
        assert!(debug.contains("<REDACTED>"));
        assert!(!debug.contains("secret.jwt.value"));
    }

    #[test]
    fn test_installation_token_debug_redacts_token() {
        let token = InstallationToken::new("ghs_secret".to_string(), InstallationId::new(9), None);

        let debug = format!("{:?}", token);
        assert!(debug.contains("<REDACTED>"));
        assert!(!debug.contains("ghs_secret"));
    }

    #[test]
    fn test_installation_token_keeps_reported_expiry() {
        let expires_at = Utc::now() + Duration::hours(1);
        let token = InstallationToken::new(
            "ghs_x".to_string(),
            InstallationId::new(3),
            Some(expires_at),
        );

        assert_eq!(token.expires_at(), Some(expires_at));
        assert_eq!(token.installation_id(), InstallationId::new(3));
    }

    #[test]
    fn test_jwt_claims_serialize_with_numeric_issuer() {
        let claims = JwtClaims {
            iss: GitHubAppId::new(77),
            iat: 10,
            exp: 610,
        };

        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value, serde_json::json!({"iss": 77, "iat": 10, "exp": 610}));
    }
}
