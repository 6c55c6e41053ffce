pub mod cart;
pub mod diagnostic;
pub mod order;
pub mod payment;
pub mod token_approval;
pub mod wallet;

pub use cart::cart_config;
pub use diagnostic::diagnostic_config;
pub use order::order_config;
pub use payment::payment_config;
pub use token_approval::token_approval_config;
pub use wallet::wallet_config;

use crate::error::{AppError, AppResult};
use crate::middlewares::require_same_user;
use crate::utils::AuthenticatedUser;
use actix_web::{HttpRequest, web};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

/// Malformed JSON bodies and query strings render as regular `AppError` bodies.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(1 << 20)
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

/// Authorizes the body's `userId` before the rest of the body is validated,
/// then deserializes it.
pub(crate) fn authorize_json<T: DeserializeOwned>(
    req: &HttpRequest,
    body: Value,
) -> AppResult<(AuthenticatedUser, T)> {
    let claimed = match body.get("userId") {
        None | Some(Value::Null) => None,
        // An unparseable id can never match the session
        Some(raw) => Some(
            raw.as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .unwrap_or_else(Uuid::nil),
        ),
    };
    let user = require_same_user(req, claimed)?;

    let request = serde_json::from_value(body)
        .map_err(|e| AppError::ValidationError(format!("Invalid request body: {e}")))?;
    Ok((user, request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentDiagnosticRequest;
    use actix_web::HttpMessage;
    use actix_web::test::TestRequest;
    use serde_json::json;

    fn request_for(user_id: Uuid) -> HttpRequest {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(AuthenticatedUser {
            id: user_id,
            email: None,
        });
        req
    }

    #[test]
    fn test_mismatch_wins_over_invalid_body() {
        let user_id = Uuid::new_v4();
        let req = request_for(user_id);

        let body = json!({"userId": Uuid::new_v4(), "cartItems": "garbage"});
        let result = authorize_json::<PaymentDiagnosticRequest>(&req, body);
        assert!(matches!(result, Err(AppError::AuthError(_))));

        let body = json!({"userId": "not-a-uuid"});
        let result = authorize_json::<PaymentDiagnosticRequest>(&req, body);
        assert!(matches!(result, Err(AppError::AuthError(_))));
    }

    #[test]
    fn test_matching_user_then_body_validation() {
        let user_id = Uuid::new_v4();
        let req = request_for(user_id);

        let body = json!({"userId": user_id, "cartItems": "garbage"});
        let result = authorize_json::<PaymentDiagnosticRequest>(&req, body);
        assert!(matches!(result, Err(AppError::ValidationError(_))));

        let body = json!({"userId": user_id, "cartItems": []});
        let (user, request) = authorize_json::<PaymentDiagnosticRequest>(&req, body).unwrap();
        assert_eq!(user.id, user_id);
        assert!(request.cart_items.is_empty());

        let result = authorize_json::<PaymentDiagnosticRequest>(&req, json!({"cartItems": []}));
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}
