use rocket::request::{self, FromRequest, Request, Outcome};
use rocket::http::Status;

// === OpenAPI (compatible with rocket_okapi 0.8.0 / 0.8.1) ===
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use rocket_okapi::r#gen::OpenApiGenerator;

use crate::config::Config;

/// API-key gate. Accepts the `x-api-key` header or an `apiKey` query
/// parameter; 401 when absent, 403 when it does not match the configured key.
pub struct ApiKeyGuard;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ApiKeyGuard {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let provided = req
            .headers()
            .get_one("x-api-key")
            .map(str::to_string)
            .or_else(|| req.query_value::<String>("apiKey").and_then(|v| v.ok()));

        match provided {
            None => Outcome::Error((Status::Unauthorized, ())),
            Some(key) if key == Config::api_key() && !key.is_empty() => {
                Outcome::Success(ApiKeyGuard)
            }
            Some(_) => Outcome::Error((Status::Forbidden, ())),
        }
    }
}

/// === OpenAPI Integration (Fallback for older versions) ===
/// Keeps OpenAPI generation working even without new traits.
impl<'a> OpenApiFromRequest<'a> for ApiKeyGuard {
    fn from_request_input(
        _gen: &mut OpenApiGenerator,
        _name: String,
        _required: bool,
    ) -> rocket_okapi::Result<RequestHeaderInput> {
        // The guard doesn't contribute any special header/parameter for docs
        Ok(RequestHeaderInput::None)
    }
}
