#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{json, Value};

use common::{bearer, contract_payload};

#[actix_web::test]
async fn test_register_login_refresh_logout_flow() {
    let app = test_app!();

    let tokens = login!(app, "sindico");
    assert_eq!(tokens["token_type"], "Bearer");
    let access = tokens["access_token"].as_str().unwrap().to_string();
    let refresh = tokens["refresh_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer(&access))
        .to_request();
    let me: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["username"], "sindico");
    assert!(me.get("password_hash").is_none());

    let req = test::TestRequest::post()
        .uri("/api/auth/refresh")
        .set_json(json!({ "refresh_token": refresh }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // An access token is not accepted as a refresh token
    let req = test::TestRequest::post()
        .uri("/api/auth/refresh")
        .set_json(json!({ "refresh_token": access }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/logout")
        .insert_header(bearer(&access))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::post()
        .uri("/api/auth/refresh")
        .set_json(json!({ "refresh_token": refresh }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_register_rejects_duplicates_and_weak_input() {
    let app = test_app!();
    let _ = login!(app, "sindico");

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "username": "sindico", "password": "outrasenha" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "username": "ab", "password": "segredo123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "username": "zelador", "password": "123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = test_app!();
    let _ = login!(app, "sindico");

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "sindico", "password": "errada" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Unauthorized");
}

#[actix_web::test]
async fn test_contract_routes_require_token() {
    let app = test_app!();

    let req = test::TestRequest::get().uri("/api/contracts").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/contracts")
        .insert_header(bearer("not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_create_search_and_download_pdf() {
    let app = test_app!();
    let token = access_token!(app, "sindico");

    let created = create_contract!(
        app,
        token,
        contract_payload("Condomínio Edifício Azul", "12.345.678/0001-90")
    );
    assert_eq!(created["nome"], "Condomínio Edifício Azul");
    assert_eq!(created["estado"], "SP");
    assert_eq!(created["valor_contrato"], "1234.50");
    assert!(created["termino_contrato"].is_null());
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/contracts?q=azul")
        .insert_header(bearer(&token))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["id"], id.as_str());

    let req = test::TestRequest::get()
        .uri("/api/contracts?q=01310")
        .insert_header(bearer(&token))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["total"], 1);

    let req = test::TestRequest::get()
        .uri("/api/contracts?q=inexistente")
        .insert_header(bearer(&token))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["total"], 0);
    assert_eq!(page["items"].as_array().unwrap().len(), 0);

    let req = test::TestRequest::get()
        .uri(&format!("/api/contracts/{id}/pdf"))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/pdf"
    );
    let disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("Contrato_Condom"));

    let body = test::read_body(resp).await;
    assert!(body.starts_with(b"%PDF"));
}

#[actix_web::test]
async fn test_search_paginates_newest_first() {
    let app = test_app!();
    let token = access_token!(app, "sindico");

    for i in 0..6 {
        let cnpj = format!("12.345.678/000{i}-90");
        let _ = create_contract!(app, token, contract_payload(&format!("Condomínio {i}"), &cnpj));
    }

    let req = test::TestRequest::get()
        .uri("/api/contracts")
        .insert_header(bearer(&token))
        .to_request();
    let first: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(first["total"], 6);
    assert_eq!(first["per_page"], 5);
    assert_eq!(first["total_pages"], 2);
    assert_eq!(first["items"].as_array().unwrap().len(), 5);
    assert_eq!(first["items"][0]["nome"], "Condomínio 5");

    let req = test::TestRequest::get()
        .uri("/api/contracts?page=2")
        .insert_header(bearer(&token))
        .to_request();
    let second: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(second["items"].as_array().unwrap().len(), 1);
    assert_eq!(second["items"][0]["nome"], "Condomínio 0");
}

#[actix_web::test]
async fn test_other_users_contract_is_not_found() {
    let app = test_app!();
    let owner = access_token!(app, "sindico");
    let other = access_token!(app, "zelador");

    let created = create_contract!(
        app,
        owner,
        contract_payload("Condomínio Edifício Azul", "12.345.678/0001-90")
    );
    let id = created["id"].as_str().unwrap().to_string();

    for uri in [
        format!("/api/contracts/{id}"),
        format!("/api/contracts/{id}/pdf"),
        format!("/api/contracts/{id}/clauses"),
    ] {
        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(&other))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    let req = test::TestRequest::put()
        .uri(&format!("/api/contracts/{id}"))
        .insert_header(bearer(&other))
        .set_json(json!({ "nome": "Invasor" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/contracts/{id}"))
        .insert_header(bearer(&other))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/contracts")
        .insert_header(bearer(&other))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["total"], 0);

    // Still intact for the owner
    let req = test::TestRequest::get()
        .uri(&format!("/api/contracts/{id}"))
        .insert_header(bearer(&owner))
        .to_request();
    let contract: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(contract["nome"], "Condomínio Edifício Azul");
}

#[actix_web::test]
async fn test_duplicate_cnpj_is_conflict_per_user() {
    let app = test_app!();
    let token = access_token!(app, "sindico");
    let other = access_token!(app, "zelador");

    let _ = create_contract!(app, token, contract_payload("Edifício Azul", "12.345.678/0001-90"));

    let req = test::TestRequest::post()
        .uri("/api/contracts")
        .insert_header(bearer(&token))
        .set_json(contract_payload("Edifício Verde", "12.345.678/0001-90"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Conflict");

    // The same CNPJ is fine for another account
    let _ = create_contract!(app, other, contract_payload("Edifício Azul", "12.345.678/0001-90"));

    let second = create_contract!(
        app,
        token,
        contract_payload("Edifício Verde", "98.765.432/0001-10")
    );
    let req = test::TestRequest::put()
        .uri(&format!("/api/contracts/{}", second["id"].as_str().unwrap()))
        .insert_header(bearer(&token))
        .set_json(json!({ "cnpj": "12.345.678/0001-90" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_invalid_fields_are_bad_request() {
    let app = test_app!();
    let token = access_token!(app, "sindico");

    let mut payload = contract_payload("Edifício Azul", "12345678000190");
    payload["email"] = json!("sem-arroba");
    payload["valor_contrato"] = json!("abc");
    payload["inicio_contrato"] = json!("31/02/2025");
    payload["nome"] = json!("Condomínio Residencial ".repeat(60));

    let req = test::TestRequest::post()
        .uri("/api/contracts")
        .insert_header(bearer(&token))
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "BadRequest");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("5 erro(s)"), "{message}");
    assert!(message.contains("Nome deve ter no máximo 100 caracteres"), "{message}");
}

#[actix_web::test]
async fn test_partial_update_and_delete() {
    let app = test_app!();
    let token = access_token!(app, "sindico");

    let created = create_contract!(
        app,
        token,
        contract_payload("Edifício Azul", "12.345.678/0001-90")
    );
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/contracts/{id}"))
        .insert_header(bearer(&token))
        .set_json(json!({
            "nome": "Edifício Azul Anexo",
            "termino_contrato": "31/12/2026",
            "valor_contrato": "2.500"
        }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["nome"], "Edifício Azul Anexo");
    assert_eq!(updated["cnpj"], "12.345.678/0001-90");
    assert_eq!(updated["termino_contrato"], "2026-12-31");
    assert_eq!(updated["valor_contrato"], "2500");

    let req = test::TestRequest::put()
        .uri(&format!("/api/contracts/{id}"))
        .insert_header(bearer(&token))
        .set_json(json!({ "cep": "01310100" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/contracts/{id}"))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/contracts/{id}"))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_clauses_follow_the_record() {
    let app = test_app!();
    let token = access_token!(app, "sindico");

    let mut payload = contract_payload("Edifício Azul", "12.345.678/0001-90");
    payload["clausulas_adicionais"] = json!("Manutenção mensal.\n\nAtendimento 24h.");
    let created = create_contract!(app, token, payload);

    let req = test::TestRequest::get()
        .uri(&format!("/api/contracts/{}/clauses", created["id"].as_str().unwrap()))
        .insert_header(bearer(&token))
        .to_request();
    let clauses: Value = test::call_and_read_body_json(&app, req).await;
    let clauses = clauses.as_array().unwrap();

    assert_eq!(clauses.len(), 7);
    let titles: Vec<&str> = clauses.iter().map(|c| c["title"].as_str().unwrap()).collect();
    assert!(titles[0].contains("PRIMEIRA"));
    assert_eq!(titles[3], "CLÁUSULA QUARTA: DAS OBRIGAÇÕES DAS PARTES");
    assert_eq!(titles[4], "CLÁUSULA QUINTA: DA RESCISÃO");
    assert_eq!(titles[5], "CLÁUSULA SEXTA: DO FORO");
    assert_eq!(titles[6], "CLÁUSULA SÉTIMA: DAS CLÁUSULAS ADICIONAIS");

    let third = clauses[2]["paragraphs"][0].as_str().unwrap();
    assert!(third.contains("1 de janeiro de 2025"));
    assert!(third.contains("Não definido"));

    let obligations = clauses[3]["paragraphs"].as_array().unwrap();
    assert!(obligations[0].as_str().unwrap().contains("M.A. Automatização"));
    assert!(obligations[1].as_str().unwrap().contains("Edifício Azul"));
    let venue = clauses[5]["paragraphs"][0].as_str().unwrap();
    assert!(venue.contains("estado de SP"));

    assert_eq!(clauses[6]["paragraphs"].as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn test_fixed_clauses_without_supplementary_text() {
    let app = test_app!();
    let token = access_token!(app, "sindico");
    let created = create_contract!(
        app,
        token,
        contract_payload("Edifício Azul", "12.345.678/0001-90")
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/contracts/{}/clauses", created["id"].as_str().unwrap()))
        .insert_header(bearer(&token))
        .to_request();
    let clauses: Value = test::call_and_read_body_json(&app, req).await;
    let clauses = clauses.as_array().unwrap();

    assert_eq!(clauses.len(), 6);
    assert_eq!(clauses[5]["title"], "CLÁUSULA SEXTA: DO FORO");
}
