use rocket_okapi::okapi::Map;
use serde::{Deserialize, Serialize};
use rocket::http::Status;
use rocket::response::{self, Responder, Response};
use rocket::Request;
use std::io::Cursor;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::response::OpenApiResponderInner;
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{MediaType, Response as OpenApiResponse, Responses};

/// -----------------------------
/// Generic API response
/// -----------------------------
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            message: None,
            code: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(message: String, data: T) -> Self {
        ApiResponse {
            success: true,
            message: Some(message),
            code: None,
            data: Some(data),
        }
    }

    pub fn success_with_code(code: &str, message: String, data: T) -> Self {
        ApiResponse {
            success: true,
            message: Some(message),
            code: Some(code.to_string()),
            data: Some(data),
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            message: Some(message),
            code: None,
            data: None,
        }
    }
}

/// -----------------------------
/// API Error
/// -----------------------------
/// `code` is a stable machine-readable tag; `fields` are extra top-level
/// members of the error body (e.g. `intentosRestantes`).
#[derive(Debug, Serialize, JsonSchema)]
pub struct ApiError {
    #[schemars(skip)]
    #[serde(skip_serializing)]
    pub status: Status,
    pub message: String,
    pub code: Option<&'static str>,
    #[schemars(skip)]
    #[serde(skip_serializing)]
    pub fields: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ApiError {
    fn new(status: Status, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
            code: None,
            fields: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(Status::BadRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(Status::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(Status::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Status::NotFound, message)
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(Status::TooManyRequests, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(Status::InternalServerError, message)
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.fields
            .get_or_insert_with(serde_json::Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn body(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "success": false,
            "message": self.message,
        });
        if let Some(obj) = body.as_object_mut() {
            if let Some(code) = self.code {
                obj.insert("code".to_string(), code.into());
            }
            if let Some(fields) = &self.fields {
                for (key, value) in fields {
                    obj.insert(key.clone(), value.clone());
                }
            }
        }
        body
    }
}

/// -----------------------------
/// Rocket Responder
/// -----------------------------
impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let body = self.body().to_string();

        Response::build()
            .status(self.status)
            .header(rocket::http::ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

/// -----------------------------
/// OpenAPI integration
/// -----------------------------
impl OpenApiResponderInner for ApiError {
    fn responses(generator: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        let schema = generator.json_schema::<ApiResponse<()>>();

        let mut content = Map::new();
        content.insert(
            "application/json".to_owned(),
            MediaType {
                schema: Some(schema),
                ..Default::default()
            },
        );

        let mut responses = Responses::default();

        for (code, description) in [
            ("400", "Bad request"),
            ("401", "Unauthorized"),
            ("403", "Forbidden"),
            ("404", "Not found"),
            ("429", "Too many requests"),
            ("500", "Internal server error"),
        ] {
            responses.responses.insert(
                code.to_string(),
                rocket_okapi::okapi::openapi3::RefOr::Object(OpenApiResponse {
                    description: description.to_string(),
                    content: content.clone(),
                    ..Default::default()
                }),
            );
        }

        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_carries_code_and_extra_fields() {
        let err = ApiError::bad_request("Código incorrecto")
            .with_code("INCORRECT_CODE")
            .with_field("intentosRestantes", 2);

        let body = err.body();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Código incorrecto");
        assert_eq!(body["code"], "INCORRECT_CODE");
        assert_eq!(body["intentosRestantes"], 2);
    }

    #[test]
    fn plain_error_body_has_no_code_member() {
        let body = ApiError::not_found("Usuario no encontrado").body();
        assert!(body.get("code").is_none());
        assert_eq!(body["success"], false);
    }

    #[test]
    fn success_response_skips_absent_code_and_data() {
        let json =
            serde_json::to_value(ApiResponse::success(serde_json::json!({"ok": true}))).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("code").is_none());

        let json = serde_json::to_value(ApiResponse::<()>::error("boom".to_string())).unwrap();
        assert!(json.get("data").is_none());
    }
}
