use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use mongodb::bson::doc;
use serde::Serialize;
use log::{info, warn};

use crate::db::DbConn;
use crate::models::Usuario;
use crate::services::directory::DirectoryService;
use crate::services::error::DeletionError;
use crate::services::otp::OtpService;

/// Collections owned by a user and destroyed with it. Adding a new owned
/// subcollection means extending this list.
pub const OWNED_SUBCOLLECTIONS: [&str; 2] = ["favoritos", "vistos"];

pub const CONFIRMATION_WORD: &str = "CONFIRMAR";

/// Proof presented alongside a deletion request.
#[derive(Debug)]
pub enum DeletionAuth {
    /// Trusted-caller path, no proof beyond the API key.
    Direct,
    /// The literal confirmation word, case-sensitive.
    ConfirmationWord(String),
    /// A token minted by a verified deletion code, redeemable once.
    OtpToken(String),
}

/// Per-step result of the best-effort cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "estado", content = "detalle", rename_all = "camelCase")]
pub enum StepOutcome {
    Success,
    Skipped,
    Failed(String),
}

/// What actually happened during a deletion. The main record is gone whenever
/// this value exists; every other step is advisory cleanup.
#[derive(Debug, Serialize)]
pub struct DeletionOutcome {
    pub user_id: String,
    pub email: String,
    pub deleted_at: DateTime<Utc>,
    pub identity_provider: StepOutcome,
    pub subcollections: IndexMap<String, StepOutcome>,
    pub otp_cleanup: StepOutcome,
}

impl DeletionOutcome {
    /// Ordered step report for the response body.
    pub fn pasos(&self) -> serde_json::Value {
        serde_json::json!({
            "proveedorIdentidad": self.identity_provider,
            "subcolecciones": self.subcollections,
            "codigosOtp": self.otp_cleanup,
        })
    }
}

pub fn confirmation_matches(word: &str) -> bool {
    word == CONFIRMATION_WORD
}

pub struct DeletionService;

impl DeletionService {
    /// Cascading account deletion.
    ///
    /// Hard failures are the user lookup, the proof check and the main
    /// document removal; identity provider, subcollections and OTP residue
    /// are each best-effort and recorded in the outcome.
    pub async fn delete_account(
        db: &DbConn,
        email: &str,
        auth: DeletionAuth,
    ) -> Result<DeletionOutcome, DeletionError> {
        let usuario = DirectoryService::find_by_email(db, email)
            .await
            .map_err(DeletionError::Store)?
            .ok_or_else(|| DeletionError::UserNotFound {
                email: email.to_string(),
            })?;

        let consumed = match auth {
            DeletionAuth::Direct => None,
            DeletionAuth::ConfirmationWord(word) => {
                if !confirmation_matches(&word) {
                    return Err(DeletionError::BadConfirmation);
                }
                None
            }
            DeletionAuth::OtpToken(token) => {
                Some(OtpService::consume(db, email, &token).await?)
            }
        };

        let identity_provider =
            DirectoryService::remove_from_identity_provider(&usuario.id).await;

        let mut subcollections = IndexMap::new();
        for name in OWNED_SUBCOLLECTIONS {
            subcollections.insert(name.to_string(), Self::purge_subcollection(db, name, &usuario).await);
        }

        // The authoritative step: a store failure here is the only one that
        // surfaces as a request failure.
        DirectoryService::collection(db)
            .delete_one(doc! { "_id": &usuario.id }, None)
            .await
            .map_err(DeletionError::Store)?;
        info!("User document removed: {}", usuario.id);

        let otp_cleanup = match consumed {
            // Single-use token: drop exactly the consumed record.
            Some(record) => match OtpService::discard(db, &record).await {
                Ok(()) => StepOutcome::Success,
                Err(e) => {
                    warn!("Could not discard consumed deletion code for {}: {}", email, e);
                    StepOutcome::Failed(e.to_string())
                }
            },
            // Residual cleanup for the code-less paths.
            None => match OtpService::delete_for_email(db, email).await {
                Ok(n) => {
                    if n > 0 {
                        info!("✓ {} deletion codes removed for {}", n, email);
                    }
                    StepOutcome::Success
                }
                Err(e) => {
                    warn!("Could not clean deletion codes for {}: {}", email, e);
                    StepOutcome::Failed(e.to_string())
                }
            },
        };

        Ok(DeletionOutcome {
            user_id: usuario.id,
            email: usuario.email,
            deleted_at: Utc::now(),
            identity_provider,
            subcollections,
            otp_cleanup,
        })
    }

    async fn purge_subcollection(db: &DbConn, name: &str, usuario: &Usuario) -> StepOutcome {
        match db
            .collection::<mongodb::bson::Document>(name)
            .delete_many(doc! { "usuario_id": &usuario.id }, None)
            .await
        {
            Ok(result) => {
                if result.deleted_count > 0 {
                    info!(
                        "✓ Subcollection '{}' cleared for {} ({} documents)",
                        name, usuario.id, result.deleted_count
                    );
                }
                StepOutcome::Success
            }
            Err(e) => {
                warn!("Could not clear subcollection '{}' for {}: {}", name, usuario.id, e);
                StepOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_word_is_case_sensitive() {
        assert!(confirmation_matches("CONFIRMAR"));
        assert!(!confirmation_matches("confirmar"));
        assert!(!confirmation_matches("Confirmar"));
        assert!(!confirmation_matches(""));
        assert!(!confirmation_matches("CONFIRMAR "));
    }

    #[test]
    fn step_outcomes_serialize_as_tagged_spanish_fields() {
        let ok = serde_json::to_value(StepOutcome::Success).unwrap();
        assert_eq!(ok["estado"], "success");

        let failed = serde_json::to_value(StepOutcome::Failed("sin conexión".to_string())).unwrap();
        assert_eq!(failed["estado"], "failed");
        assert_eq!(failed["detalle"], "sin conexión");

        let skipped = serde_json::to_value(StepOutcome::Skipped).unwrap();
        assert_eq!(skipped["estado"], "skipped");
        assert!(skipped.get("detalle").is_none());
    }

    #[test]
    fn pasos_report_keeps_subcollection_order() {
        let mut subcollections = IndexMap::new();
        for name in OWNED_SUBCOLLECTIONS {
            subcollections.insert(name.to_string(), StepOutcome::Success);
        }
        let outcome = DeletionOutcome {
            user_id: "uid-1".to_string(),
            email: "a@x.com".to_string(),
            deleted_at: Utc::now(),
            identity_provider: StepOutcome::Skipped,
            subcollections,
            otp_cleanup: StepOutcome::Success,
        };

        let pasos = outcome.pasos();
        let names: Vec<&String> = pasos["subcolecciones"]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(names, ["favoritos", "vistos"]);
        assert_eq!(pasos["proveedorIdentidad"]["estado"], "skipped");
    }
}
