//! Tests for error types.

use super::*;

/// Verify that only transport-level failures are classified as transient.
#[test]
fn test_api_error_transience() {
    assert!(!ApiError::TokenGenerationFailed(AuthError::InvalidPrivateKey {
        message: "bad key".to_string()
    })
    .is_transient());
    assert!(!ApiError::InvalidRequest(ValidationError::Required {
        field: "name".to_string()
    })
    .is_transient());
    assert!(!ApiError::Configuration {
        message: "no tls".to_string()
    }
    .is_transient());

    let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    assert!(!ApiError::JsonError(json_error).is_transient());
}

/// Verify that key file errors carry the offending path in their message.
#[test]
fn test_key_file_error_mentions_path() {
    let error = AuthError::KeyFile {
        path: PathBuf::from("/etc/app/key.pem"),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
    };

    let message = error.to_string();
    assert!(message.contains("/etc/app/key.pem"));
    assert!(message.contains("no such file"));
}

/// Verify that validation failures while loading a key become key errors.
#[test]
fn test_validation_error_converts_to_invalid_private_key() {
    let error: AuthError = ValidationError::InvalidFormat {
        field: "private_key".to_string(),
        message: "missing BEGIN/END markers".to_string(),
    }
    .into();

    match error {
        AuthError::InvalidPrivateKey { message } => {
            assert!(message.contains("private_key"));
            assert!(message.contains("missing BEGIN/END markers"));
        }
        other => panic!("Expected InvalidPrivateKey, got {:?}", other),
    }
}

/// Verify that signer failures wrap into ApiError with the source preserved.
#[test]
fn test_auth_error_wraps_into_api_error() {
    let error: ApiError = AuthError::JwtGenerationFailed {
        message: "encoding failed".to_string(),
    }
    .into();

    assert!(matches!(error, ApiError::TokenGenerationFailed(_)));
    assert!(error.to_string().contains("encoding failed"));
}
