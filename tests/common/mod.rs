//! Shared setup for the HTTP integration tests.
#![allow(dead_code)]

use std::path::PathBuf;

use contrato_server::{AppConfig, AppState};
use serde_json::{json, Value};

pub const PASSWORD: &str = "segredo123";

/// Fresh in-memory database with migrations applied.
pub async fn test_state() -> AppState {
    let config = AppConfig {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "integration-test-secret".to_string(),
        static_dir: PathBuf::from("./no-static-dir"),
        bcrypt_cost: 4,
        ..AppConfig::default()
    };
    AppState::new_with_config(config)
        .await
        .expect("in-memory database")
}

pub fn contract_payload(nome: &str, cnpj: &str) -> Value {
    json!({
        "nome": nome,
        "cnpj": cnpj,
        "endereco": "Avenida Paulista, 1200",
        "cep": "01310-100",
        "estado": "sp",
        "telefone": "(11) 99999-8888",
        "email": "contato@condominio.com.br",
        "valor_contrato": "R$ 1.234,50",
        "inicio_contrato": "2025-01-01",
        "termino_contrato": "",
        "abrangencia_contrato": "Serviços de Automação Predial",
        "tipo_indice": "IPCA"
    })
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// Service with every `/api` route mounted on a fresh database.
macro_rules! test_app {
    () => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(common::test_state().await))
                .configure(contrato_server::api_config),
        )
        .await
    };
}

/// Register `$username` and log in, yielding the token response JSON.
macro_rules! login {
    ($app:expr, $username:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(serde_json::json!({
                "username": $username,
                "password": common::PASSWORD,
            }))
            .to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);

        let req = actix_web::test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({
                "username": $username,
                "password": common::PASSWORD,
            }))
            .to_request();
        let tokens: serde_json::Value = actix_web::test::call_and_read_body_json(&$app, req).await;
        tokens
    }};
}

/// Log in and return only the access token.
macro_rules! access_token {
    ($app:expr, $username:expr) => {{
        let tokens = login!($app, $username);
        tokens["access_token"]
            .as_str()
            .expect("access token")
            .to_string()
    }};
}

/// Create a contract and return the stored record.
macro_rules! create_contract {
    ($app:expr, $token:expr, $payload:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/api/contracts")
            .insert_header(common::bearer(&$token))
            .set_json($payload)
            .to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
        let created: serde_json::Value = actix_web::test::read_body_json(resp).await;
        created
    }};
}
