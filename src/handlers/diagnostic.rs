use crate::handlers::authorize_json;
use crate::models::*;
use crate::services::DiagnosticService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::Value;

#[utoipa::path(
    post,
    path = "/payment-diagnostic",
    tag = "payment",
    request_body = PaymentDiagnosticRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Pre-flight checklist for the cart", body = DiagnosticResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Unauthorized or userId mismatch"),
        (status = 404, description = "Profile or wallet not found")
    )
)]
pub async fn payment_diagnostic(
    diagnostic_service: web::Data<DiagnosticService>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> Result<HttpResponse> {
    let (user, request) = match authorize_json::<PaymentDiagnosticRequest>(&req, body.into_inner())
    {
        Ok(authorized) => authorized,
        Err(e) => return Ok(e.error_response()),
    };

    match diagnostic_service.run(user.id, &request.cart_items).await {
        Ok(diagnostics) => {
            let message = if diagnostics.can_proceed {
                "All checks passed. Payment can proceed.".to_string()
            } else {
                format!(
                    "{} issue(s) must be resolved before payment",
                    diagnostics.issues.len()
                )
            };
            Ok(HttpResponse::Ok().json(DiagnosticResponse {
                success: true,
                diagnostics,
                message,
            }))
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub fn diagnostic_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/payment-diagnostic", web::post().to(payment_diagnostic));
}
