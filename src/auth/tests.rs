//! Unit tests for authentication module

#[cfg(test)]
mod tests {
    use crate::auth::jwt::{generate_access_token, generate_refresh_token, validate_token};
    use crate::auth::model::{LoginRequest, TokenResponse, User, UserInfo};
    use uuid::Uuid;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_generate_and_validate_access_token() {
        let user_id = Uuid::new_v4().to_string();

        let token = generate_access_token(SECRET, &user_id, "sindico")
            .expect("Failed to generate access token");
        let claims = validate_token(SECRET, &token).expect("Failed to validate token");

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "sindico");
        assert_eq!(claims.token_type, "access");
        assert_eq!(claims.user_id().map(|id| id.to_string()), Some(user_id));
    }

    #[test]
    fn test_generate_and_validate_refresh_token() {
        let user_id = Uuid::new_v4().to_string();

        let token = generate_refresh_token(SECRET, &user_id, "sindico")
            .expect("Failed to generate refresh token");
        let claims = validate_token(SECRET, &token).expect("Failed to validate token");

        assert_eq!(claims.token_type, "refresh");
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let token = generate_access_token(SECRET, "id", "sindico").unwrap();
        assert!(validate_token("another-secret", &token).is_err());
    }

    #[test]
    fn test_invalid_token_returns_error() {
        assert!(validate_token(SECRET, "invalid.token.here").is_err());
    }

    #[test]
    fn test_non_uuid_subject_has_no_user_id() {
        let token = generate_access_token(SECRET, "not-a-uuid", "sindico").unwrap();
        let claims = validate_token(SECRET, &token).unwrap();
        assert!(claims.user_id().is_none());
    }

    #[test]
    fn test_user_to_user_info_hides_secrets() {
        let user = User {
            id: Uuid::new_v4(),
            username: "sindico".to_string(),
            email: Some("sindico@azul.com.br".to_string()),
            password_hash: "hashedpassword".to_string(),
            refresh_token: Some("refresh_token_here".to_string()),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let info: UserInfo = user.clone().into();
        let json = serde_json::to_string(&info).unwrap();

        assert_eq!(info.id, user.id);
        assert!(!json.contains("hashedpassword"));
        assert!(!json.contains("refresh_token_here"));
    }

    #[test]
    fn test_login_request_deserialize() {
        let json = r#"{"username": "sindico", "password": "segredo123"}"#;
        let request: LoginRequest = serde_json::from_str(json).expect("Failed to deserialize");

        assert_eq!(request.username, "sindico");
        assert_eq!(request.password, "segredo123");
    }

    #[test]
    fn test_token_response_serialize() {
        let response = TokenResponse {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 900,
        };

        let json = serde_json::to_string(&response).expect("Failed to serialize");

        assert!(json.contains("access_token"));
        assert!(json.contains("refresh_token"));
        assert!(json.contains("expires_in"));
    }

    #[test]
    fn test_access_token_expiry_is_shorter_than_refresh() {
        let access_token = generate_access_token(SECRET, "id", "sindico").unwrap();
        let refresh_token = generate_refresh_token(SECRET, "id", "sindico").unwrap();

        let access_claims = validate_token(SECRET, &access_token).unwrap();
        let refresh_claims = validate_token(SECRET, &refresh_token).unwrap();

        assert!(refresh_claims.exp > access_claims.exp);
    }
}
