use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use crate::{
    AppService,
    auth::{
        password::verify_password,
        session::{Session, SessionStore, bearer_token},
    },
    error::PayrollError,
    model::role::Role,
    store::RecordStore,
};

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin")]
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionUser {
    pub username: String,
    pub full_name: String,
    #[schema(value_type = String, example = "hr")]
    pub role: Role,
}

impl From<&Session> for SessionUser {
    fn from(session: &Session) -> Self {
        Self {
            username: session.username.clone(),
            full_name: session.full_name.clone(),
            role: session.role,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: SessionUser,
}

/// User login handler
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(service, sessions, body),
    fields(username = %body.username)
)]
pub async fn login(
    body: web::Json<LoginRequest>,
    service: web::Data<AppService>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, PayrollError> {
    info!("Login request received");

    let username = body.username.trim();
    if username.is_empty() || body.password.is_empty() {
        return Err(PayrollError::InvalidInput(
            "Username and password required".into(),
        ));
    }

    let invalid = || PayrollError::Unauthorized("Invalid username or password".into());

    let user = match service.store().find_user(username).await? {
        Some(user) => user,
        None => {
            info!("Invalid credentials: user not found");
            return Err(invalid());
        }
    };

    debug!(user_id = user.id, "Verifying password");
    if !verify_password(&body.password, &user.password_hash) {
        info!("Invalid credentials: password mismatch");
        return Err(invalid());
    }

    let token = sessions.create(&user).await;
    info!(user_id = user.id, role = %user.role, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        token,
        user: SessionUser {
            username: user.username,
            full_name: user.full_name,
            role: user.role,
        },
    }))
}

/// Revokes the caller's session; succeeds even without one.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 200, description = "Logged out")),
    tag = "Auth"
)]
pub async fn logout(req: HttpRequest, sessions: web::Data<SessionStore>) -> HttpResponse {
    if let Some(token) = bearer_token(req.headers()) {
        sessions.revoke(token).await;
    }

    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Logged out successfully"
    }))
}

#[utoipa::path(
    get,
    path = "/auth/verify",
    responses(
        (status = 200, description = "Session is live", body = VerifyResponse),
        (status = 401, description = "Missing, unknown or expired token")
    ),
    tag = "Auth"
)]
pub async fn verify(
    req: HttpRequest,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, PayrollError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| PayrollError::Unauthorized("No token provided".into()))?;

    let session = sessions
        .lookup(token)
        .await
        .ok_or_else(|| PayrollError::Unauthorized("Invalid or expired token".into()))?;

    Ok(HttpResponse::Ok().json(VerifyResponse {
        valid: true,
        user: SessionUser::from(&session),
    }))
}
