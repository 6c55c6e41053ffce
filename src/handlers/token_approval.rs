use crate::error::AppError;
use crate::handlers::authorize_json;
use crate::middlewares::require_same_user;
use crate::models::*;
use crate::services::TokenService;
use crate::utils::parse_wei;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::Value;

#[utoipa::path(
    get,
    path = "/token-approval",
    tag = "token",
    params(
        ("userId" = Option<String>, Query, description = "Authenticated user's id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "UTICK balance and allowance of the user's wallet", body = TokenStatusResponse),
        (status = 400, description = "Missing userId"),
        (status = 401, description = "Unauthorized or userId mismatch"),
        (status = 404, description = "No wallet yet; body carries needsWalletCreation"),
        (status = 500, description = "Chain read failure")
    )
)]
pub async fn get_token_status(
    token_service: web::Data<TokenService>,
    req: HttpRequest,
    query: web::Query<TokenStatusQuery>,
) -> Result<HttpResponse> {
    let user = require_same_user(&req, query.user_id)?;

    match token_service.get_token_status(user.id).await {
        Ok(status) => Ok(HttpResponse::Ok().json(status)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/token-approval",
    tag = "token",
    request_body = TokenApprovalRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Approval confirmed and allowance verified", body = TokenApprovalResponse),
        (status = 400, description = "Missing fields or insufficient balance"),
        (status = 401, description = "Unauthorized or userId mismatch"),
        (status = 404, description = "No wallet yet; body carries needsWalletCreation"),
        (status = 500, description = "Approval failed or allowance still insufficient")
    )
)]
pub async fn approve_tokens(
    token_service: web::Data<TokenService>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> Result<HttpResponse> {
    let (user, request) = match authorize_json::<TokenApprovalRequest>(&req, body.into_inner()) {
        Ok(authorized) => authorized,
        Err(e) => return Ok(e.error_response()),
    };

    let amount = match request.amount.as_deref().map(parse_wei) {
        Some(Ok(amount)) if !amount.is_zero() => amount,
        Some(Ok(_)) => {
            return Ok(
                AppError::ValidationError("amount must be greater than zero".to_string())
                    .error_response(),
            );
        }
        Some(Err(e)) => return Ok(e.error_response()),
        None => {
            return Ok(AppError::ValidationError("amount is required".to_string()).error_response());
        }
    };

    match token_service.approve_tokens(user.id, amount).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn token_approval_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/token-approval")
            .route(web::get().to(get_token_status))
            .route(web::post().to(approve_tokens)),
    );
}
