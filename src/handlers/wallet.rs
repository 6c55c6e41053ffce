use crate::handlers::authorize_json;
use crate::models::*;
use crate::services::TokenService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::Value;

#[utoipa::path(
    post,
    path = "/wallet",
    tag = "token",
    request_body = CreateWalletRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Custodial wallet created", body = CreateWalletResponse),
        (status = 400, description = "Missing userId or wallet already exists"),
        (status = 401, description = "Unauthorized or userId mismatch"),
        (status = 404, description = "Profile not found")
    )
)]
pub async fn create_wallet(
    token_service: web::Data<TokenService>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> Result<HttpResponse> {
    let (user, _request) = match authorize_json::<CreateWalletRequest>(&req, body.into_inner()) {
        Ok(authorized) => authorized,
        Err(e) => return Ok(e.error_response()),
    };

    match token_service.create_wallet(user.id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn wallet_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/wallet", web::post().to(create_wallet));
}
