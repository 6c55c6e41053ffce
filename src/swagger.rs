use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;
use crate::utils::pricing::VendorTotal;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::payment::process_payment,
        handlers::diagnostic::payment_diagnostic,
        handlers::token_approval::get_token_status,
        handlers::token_approval::approve_tokens,
        handlers::wallet::create_wallet,
        handlers::cart::get_cart,
        handlers::order::get_orders,
    ),
    components(
        schemas(
            CartListing,
            CartVendor,
            CartItemPayload,
            CartResponse,
            crate::utils::CartTotals,
            VendorTotal,
            ProcessPaymentRequest,
            ProcessPaymentResponse,
            PaymentDiagnosticRequest,
            DiagnosticResponse,
            DiagnosticReport,
            VendorDiagnostic,
            ItemDiagnostic,
            PlatformDiagnostic,
            TokenStatusResponse,
            TokenApprovalRequest,
            TokenApprovalResponse,
            CreateWalletRequest,
            CreateWalletResponse,
            OrderResponse,
            BookingResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "payment", description = "Settlement and pre-flight diagnostics"),
        (name = "token", description = "UTICK wallet, balance and approval"),
        (name = "cart", description = "Cart API"),
        (name = "order", description = "Order history API"),
    ),
    info(
        title = "UniTick Backend API",
        version = "1.0.0",
        description = "UniTick payment and settlement REST API"
    ),
    servers(
        (url = "/api", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
