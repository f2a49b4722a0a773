use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web::Data,
};
use serde_json::json;
use tracing::debug;

use crate::auth::session::{SessionStore, bearer_token};

fn unauthorized(req: ServiceRequest, message: &str) -> ServiceResponse<BoxBody> {
    let resp = HttpResponse::Unauthorized().json(json!({ "error": message }));
    req.into_response(resp.map_into_boxed_body())
}

/// Resolves the bearer token to a live session and attaches it to the request.
pub async fn session_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let sessions = req
        .app_data::<Data<SessionStore>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Session store missing"))?;

    let Some(token) = bearer_token(req.headers()).map(str::to_owned) else {
        return Ok(unauthorized(req, "Missing or malformed Authorization header"));
    };

    let Some(session) = sessions.lookup(&token).await else {
        debug!("Rejected unknown or expired session token");
        return Ok(unauthorized(req, "Invalid or expired session"));
    };

    req.extensions_mut().insert(session);

    next.call(req).await
}
