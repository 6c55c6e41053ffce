use crate::handlers::authorize_json;
use crate::models::*;
use crate::services::SettlementService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::Value;

#[utoipa::path(
    post,
    path = "/payment/process",
    tag = "payment",
    request_body = ProcessPaymentRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Payment settled on-chain and recorded", body = ProcessPaymentResponse),
        (status = 400, description = "Empty cart, missing wallet, invalid gift recipient, insufficient balance or approval required"),
        (status = 401, description = "Unauthorized or userId mismatch"),
        (status = 404, description = "Profile not found"),
        (status = 500, description = "Chain or database failure")
    )
)]
pub async fn process_payment(
    settlement_service: web::Data<SettlementService>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> Result<HttpResponse> {
    let (user, request) = match authorize_json::<ProcessPaymentRequest>(&req, body.into_inner()) {
        Ok(authorized) => authorized,
        Err(e) => return Ok(e.error_response()),
    };

    match settlement_service
        .process_payment(user.id, &request.cart_items, request.use_external_wallet)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn payment_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/payment/process", web::post().to(process_payment));
}
