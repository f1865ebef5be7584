use actix_web::{web, HttpRequest, HttpResponse, Responder};
use bcrypt::{hash, verify};

use super::jwt::{
    generate_access_token, generate_refresh_token, get_access_token_expiry, validate_token,
    REFRESH_TOKEN,
};
use super::middleware::authenticated_user;
use super::model::{LoginRequest, RefreshRequest, RegisterRequest, TokenResponse, User, UserInfo};
use crate::{AppState, ErrorResponse};

const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 80;
const MIN_PASSWORD_LEN: usize = 6;

fn token_error(e: jsonwebtoken::errors::Error) -> HttpResponse {
    log::error!("Failed to generate token: {:?}", e);
    HttpResponse::InternalServerError().json(ErrorResponse::internal_error(
        "Falha ao gerar o token",
    ))
}

/// Issue a fresh token pair and remember the refresh token (one session per user).
async fn issue_tokens(state: &AppState, user: &User) -> HttpResponse {
    let secret = &state.config.jwt_secret;
    let user_id = user.id.to_string();

    let access_token = match generate_access_token(secret, &user_id, &user.username) {
        Ok(t) => t,
        Err(e) => return token_error(e),
    };
    let refresh_token = match generate_refresh_token(secret, &user_id, &user.username) {
        Ok(t) => t,
        Err(e) => return token_error(e),
    };

    if let Err(e) = state
        .update_user_refresh_token(&user.id, Some(&refresh_token))
        .await
    {
        log::error!("Failed to store refresh token: {:?}", e);
        return HttpResponse::InternalServerError()
            .json(ErrorResponse::internal_error("Falha no login"));
    }

    HttpResponse::Ok().json(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: get_access_token_expiry(),
    })
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = UserInfo),
        (status = 400, description = "Invalid username or password", body = ErrorResponse),
        (status = 409, description = "Username already exists", body = ErrorResponse)
    )
)]
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> impl Responder {
    let username = body.username.trim();
    let username_len = username.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&username_len) {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!(
            "O usuário deve ter entre {MIN_USERNAME_LEN} e {MAX_USERNAME_LEN} caracteres"
        )));
    }
    if body.password.chars().count() < MIN_PASSWORD_LEN {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!(
            "A senha deve ter pelo menos {MIN_PASSWORD_LEN} caracteres"
        )));
    }

    match state.get_user_by_username(username).await {
        Ok(Some(_)) => {
            return HttpResponse::Conflict()
                .json(ErrorResponse::conflict("Nome de usuário já existe"));
        }
        Ok(None) => {}
        Err(e) => {
            log::error!("Database error during registration: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Falha ao criar o usuário"));
        }
    }

    let password_hash = match hash(&body.password, state.config.bcrypt_cost) {
        Ok(h) => h,
        Err(e) => {
            log::error!("Failed to hash password: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Falha ao criar o usuário"));
        }
    };

    let email = body
        .email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty());

    match state.create_user(username, email, &password_hash).await {
        Ok(user) => {
            log::info!("Registered user {}", user.username);
            HttpResponse::Created().json(UserInfo::from(user))
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            HttpResponse::Conflict().json(ErrorResponse::conflict("Nome de usuário já existe"))
        }
        Err(e) => {
            log::error!("Failed to create user: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Falha ao criar o usuário"))
        }
    }
}

/// Login endpoint
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> impl Responder {
    let user = match state.get_user_by_username(body.username.trim()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::Unauthorized().json(ErrorResponse::unauthorized(
                "Usuário ou senha inválidos",
            ));
        }
        Err(e) => {
            log::error!("Database error during login: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Falha no login"));
        }
    };

    let password_valid = verify(&body.password, &user.password_hash).unwrap_or(false);
    if !password_valid {
        return HttpResponse::Unauthorized()
            .json(ErrorResponse::unauthorized("Usuário ou senha inválidos"));
    }

    issue_tokens(&state, &user).await
}

/// Refresh access token
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "Authentication",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token refreshed", body = TokenResponse),
        (status = 401, description = "Invalid refresh token", body = ErrorResponse)
    )
)]
pub async fn refresh_token(
    state: web::Data<AppState>,
    body: web::Json<RefreshRequest>,
) -> impl Responder {
    let claims = match validate_token(&state.config.jwt_secret, &body.refresh_token) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Invalid refresh token: {:?}", e);
            return HttpResponse::Unauthorized().json(ErrorResponse::unauthorized(
                "Refresh token inválido ou expirado",
            ));
        }
    };

    if claims.token_type != REFRESH_TOKEN {
        return HttpResponse::Unauthorized()
            .json(ErrorResponse::unauthorized("Tipo de token inválido"));
    }

    // Must match the stored token: logging in elsewhere or logging out revokes it
    let user = match state.get_user_by_refresh_token(&body.refresh_token).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::Unauthorized().json(ErrorResponse::unauthorized(
                "Sessão expirada. Faça login novamente.",
            ));
        }
        Err(e) => {
            log::error!("Database error during refresh: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Falha ao renovar o token"));
        }
    };

    let access_token = match generate_access_token(
        &state.config.jwt_secret,
        &user.id.to_string(),
        &user.username,
    ) {
        Ok(t) => t,
        Err(e) => return token_error(e),
    };

    HttpResponse::Ok().json(TokenResponse {
        access_token,
        refresh_token: body.refresh_token.clone(),
        token_type: "Bearer".to_string(),
        expires_in: get_access_token_expiry(),
    })
}

/// Logout: revoke the stored refresh token
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let user_id = match authenticated_user(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(e) => return e.error_response(),
    };

    match state.update_user_refresh_token(&user_id, None).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => {
            log::error!("Failed to clear refresh token: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Falha ao encerrar a sessão"))
        }
    }
}

/// Current user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    )
)]
pub async fn me(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let user_id = match authenticated_user(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(e) => return e.error_response(),
    };

    match state.get_user_by_id(&user_id).await {
        Ok(Some(user)) => HttpResponse::Ok().json(UserInfo::from(user)),
        Ok(None) => {
            HttpResponse::NotFound().json(ErrorResponse::not_found("Usuário não encontrado"))
        }
        Err(e) => {
            log::error!("Failed to load user: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Falha ao carregar o usuário"))
        }
    }
}

/// Configure auth routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh_token))
            .route("/logout", web::post().to(logout))
            .route("/me", web::get().to(me)),
    );
}
