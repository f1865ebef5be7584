use actix_web::http::header::{
    Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue,
};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use uuid::Uuid;

use super::model::{
    Contract, ContractFields, ContractPage, CreateContractRequest, SearchQuery,
    UpdateContractRequest,
};
use crate::auth::authenticated_user;
use crate::document::common::find_logo;
use crate::document::{contract_clauses, Clause, ContractGenerator, Generator, RenderOptions};
use crate::{AppState, ErrorResponse};

const DUPLICATE_CNPJ: &str = "Já existe um contrato com este CNPJ";
const NOT_FOUND: &str = "Contrato não encontrado";

fn db_error(context: &str, e: sqlx::Error) -> HttpResponse {
    log::error!("{}: {:?}", context, e);
    HttpResponse::InternalServerError().json(ErrorResponse::internal_error(context))
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::not_found(NOT_FOUND))
}

/// Header value offering a plain ASCII name plus the UTF-8 original.
fn attachment(filename: &str) -> ContentDisposition {
    let ascii: String = filename
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '_' })
        .collect();
    let mut parameters = vec![DispositionParam::Filename(ascii)];
    if !filename.is_ascii() {
        parameters.push(DispositionParam::FilenameExt(ExtendedValue {
            charset: Charset::Ext("UTF-8".to_string()),
            language_tag: None,
            value: filename.as_bytes().to_vec(),
        }));
    }
    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters,
    }
}

/// Insert or update, turning a CNPJ clash into 409.
async fn save_contract(
    state: &AppState,
    user_id: &Uuid,
    contract_id: Option<&Uuid>,
    fields: &ContractFields,
) -> HttpResponse {
    match state.cnpj_in_use(user_id, &fields.cnpj, contract_id).await {
        Ok(true) => {
            return HttpResponse::Conflict().json(ErrorResponse::conflict(DUPLICATE_CNPJ));
        }
        Ok(false) => {}
        Err(e) => return db_error("Falha ao salvar o contrato", e),
    }

    let result = match contract_id {
        None => state.create_contract(user_id, fields).await.map(Some),
        Some(id) => state.update_contract(user_id, id, fields).await,
    };

    match result {
        Ok(Some(contract)) if contract_id.is_none() => {
            log::info!("Created contract {} for user {}", contract.id, user_id);
            HttpResponse::Created().json(contract)
        }
        Ok(Some(contract)) => {
            log::info!("Updated contract {}", contract.id);
            HttpResponse::Ok().json(contract)
        }
        Ok(None) => not_found(),
        // The count above races with concurrent inserts; the index has the last word
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            HttpResponse::Conflict().json(ErrorResponse::conflict(DUPLICATE_CNPJ))
        }
        Err(e) => db_error("Falha ao salvar o contrato", e),
    }
}

/// Load one of the caller's contracts or build the error response.
async fn owned_contract(
    state: &AppState,
    user_id: &Uuid,
    contract_id: &Uuid,
) -> Result<Contract, HttpResponse> {
    match state.get_contract(user_id, contract_id).await {
        Ok(Some(contract)) => Ok(contract),
        Ok(None) => Err(not_found()),
        Err(e) => Err(db_error("Falha ao carregar o contrato", e)),
    }
}

/// List and search the caller's contracts
#[utoipa::path(
    context_path = "/api",
    tag = "Contracts",
    get,
    path = "/contracts",
    security(("bearer_auth" = [])),
    params(SearchQuery),
    responses(
        (status = 200, description = "One page of contracts, newest first", body = ContractPage),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_contracts(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> impl Responder {
    let user_id = match authenticated_user(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(e) => return e.error_response(),
    };

    let (page, per_page) = (query.page(), query.per_page());
    match state
        .search_contracts(&user_id, query.term(), page, per_page)
        .await
    {
        Ok((items, total)) => {
            HttpResponse::Ok().json(ContractPage::new(items, page, per_page, total))
        }
        Err(e) => db_error("Falha ao buscar contratos", e),
    }
}

/// Create a contract
#[utoipa::path(
    context_path = "/api",
    tag = "Contracts",
    post,
    path = "/contracts",
    security(("bearer_auth" = [])),
    request_body = CreateContractRequest,
    responses(
        (status = 201, description = "Contract created", body = Contract),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "CNPJ already registered", body = ErrorResponse)
    )
)]
pub async fn create_contract(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CreateContractRequest>,
) -> impl Responder {
    let user_id = match authenticated_user(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(e) => return e.error_response(),
    };

    let fields = match body.validate() {
        Ok(fields) => fields,
        Err(errors) => {
            return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&errors.to_message()));
        }
    };

    save_contract(&state, &user_id, None, &fields).await
}

/// Get a contract by id
#[utoipa::path(
    context_path = "/api",
    tag = "Contracts",
    get,
    path = "/contracts/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Contract id")),
    responses(
        (status = 200, description = "Contract found", body = Contract),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Contract not found", body = ErrorResponse)
    )
)]
pub async fn get_contract(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let user_id = match authenticated_user(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(e) => return e.error_response(),
    };

    match owned_contract(&state, &user_id, &path.into_inner()).await {
        Ok(contract) => HttpResponse::Ok().json(contract),
        Err(response) => response,
    }
}

/// Update a contract; omitted fields keep their value
#[utoipa::path(
    context_path = "/api",
    tag = "Contracts",
    put,
    path = "/contracts/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Contract id")),
    request_body = UpdateContractRequest,
    responses(
        (status = 200, description = "Contract updated", body = Contract),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Contract not found", body = ErrorResponse),
        (status = 409, description = "CNPJ already registered", body = ErrorResponse)
    )
)]
pub async fn update_contract(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateContractRequest>,
) -> impl Responder {
    let user_id = match authenticated_user(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(e) => return e.error_response(),
    };
    let contract_id = path.into_inner();

    let current = match owned_contract(&state, &user_id, &contract_id).await {
        Ok(contract) => contract,
        Err(response) => return response,
    };

    let fields = match body.apply(&current) {
        Ok(fields) => fields,
        Err(errors) => {
            return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&errors.to_message()));
        }
    };

    save_contract(&state, &user_id, Some(&contract_id), &fields).await
}

/// Delete a contract
#[utoipa::path(
    context_path = "/api",
    tag = "Contracts",
    delete,
    path = "/contracts/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Contract id")),
    responses(
        (status = 204, description = "Contract deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Contract not found", body = ErrorResponse)
    )
)]
pub async fn delete_contract(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let user_id = match authenticated_user(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(e) => return e.error_response(),
    };
    let contract_id = path.into_inner();

    match state.delete_contract(&user_id, &contract_id).await {
        Ok(true) => {
            log::info!("Deleted contract {}", contract_id);
            HttpResponse::NoContent().finish()
        }
        Ok(false) => not_found(),
        Err(e) => db_error("Falha ao excluir o contrato", e),
    }
}

/// Download the contract as PDF
#[utoipa::path(
    context_path = "/api",
    tag = "Contracts",
    get,
    path = "/contracts/{id}/pdf",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Contract id")),
    responses(
        (status = 200, description = "PDF document", content_type = "application/pdf"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Contract not found", body = ErrorResponse),
        (status = 500, description = "Rendering failed", body = ErrorResponse)
    )
)]
pub async fn download_pdf(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let user_id = match authenticated_user(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(e) => return e.error_response(),
    };

    let contract = match owned_contract(&state, &user_id, &path.into_inner()).await {
        Ok(contract) => contract,
        Err(response) => return response,
    };

    let options = RenderOptions::new(
        state.config.page_size,
        chrono::Local::now().date_naive(),
    )
    .with_logo(find_logo(&state.config.static_dir));

    let rendered = web::block(move || ContractGenerator::new(options).generate(&contract)).await;

    match rendered {
        Ok(Ok(document)) => {
            log::info!(
                "Generated {} ({} page(s))",
                document.filename,
                document.page_count
            );
            HttpResponse::Ok()
                .content_type("application/pdf")
                .insert_header(attachment(&document.filename))
                .body(document.pdf)
        }
        Ok(Err(e)) => {
            log::error!("Failed to render contract PDF: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Erro ao gerar o PDF"))
        }
        Err(e) => {
            log::error!("PDF rendering task failed: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Erro ao gerar o PDF"))
        }
    }
}

/// Clause texts as they appear in the document
#[utoipa::path(
    context_path = "/api",
    tag = "Contracts",
    get,
    path = "/contracts/{id}/clauses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Contract id")),
    responses(
        (status = 200, description = "Interpolated clauses", body = [Clause]),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Contract not found", body = ErrorResponse)
    )
)]
pub async fn get_clauses(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let user_id = match authenticated_user(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(e) => return e.error_response(),
    };

    match owned_contract(&state, &user_id, &path.into_inner()).await {
        Ok(contract) => HttpResponse::Ok().json(contract_clauses(&contract)),
        Err(response) => response,
    }
}

/// Configure contract routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/contracts")
            .route("", web::get().to(list_contracts))
            .route("", web::post().to(create_contract))
            .route("/{id}", web::get().to(get_contract))
            .route("/{id}", web::put().to(update_contract))
            .route("/{id}", web::delete().to(delete_contract))
            .route("/{id}/pdf", web::get().to(download_pdf))
            .route("/{id}/clauses", web::get().to(get_clauses)),
    );
}
