use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;

/// One outstanding (or recently verified) deletion-code challenge.
/// At most one record exists per email; `deletion_token` is set only
/// once `verified` is true.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OtpRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub code: String,
    pub expires_at: DateTime,
    pub attempts: i32,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime>,
    pub created_at: DateTime,
}

impl OtpRecord {
    pub fn is_expired(&self, now: DateTime) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SolicitarCodigoDto {
    pub email: Option<String>,
    pub forzar_reenvio: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct VerificarCodigoDto {
    pub email: Option<String>,
    pub codigo: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EliminarConCodigoDto {
    pub email: Option<String>,
    pub token_eliminacion: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(expires_at: DateTime) -> OtpRecord {
        OtpRecord {
            id: None,
            email: "a@x.com".to_string(),
            code: "123456".to_string(),
            expires_at,
            attempts: 0,
            verified: false,
            deletion_token: None,
            verified_at: None,
            created_at: DateTime::now(),
        }
    }

    #[test]
    fn record_at_or_past_expiry_is_expired() {
        let now = DateTime::now();
        assert!(record(now).is_expired(now));
        assert!(record(DateTime::from_millis(now.timestamp_millis() - 1)).is_expired(now));
        assert!(!record(DateTime::from_millis(now.timestamp_millis() + 1)).is_expired(now));
    }

    #[test]
    fn dtos_accept_camel_case_fields() {
        let dto: SolicitarCodigoDto =
            serde_json::from_str(r#"{"email":"a@x.com","forzarReenvio":true}"#).unwrap();
        assert_eq!(dto.email.as_deref(), Some("a@x.com"));
        assert_eq!(dto.forzar_reenvio, Some(true));

        let dto: EliminarConCodigoDto =
            serde_json::from_str(r#"{"email":"a@x.com","tokenEliminacion":"t1"}"#).unwrap();
        assert_eq!(dto.token_eliminacion.as_deref(), Some("t1"));
    }

    #[test]
    fn unverified_record_serializes_without_token_fields() {
        let doc = mongodb::bson::to_document(&record(DateTime::now())).unwrap();
        assert!(!doc.contains_key("deletion_token"));
        assert!(!doc.contains_key("verified_at"));
        assert_eq!(doc.get_i32("attempts").unwrap(), 0);
    }
}
