use mongodb::bson::doc;
use mongodb::Collection;
use log::{info, warn};

use crate::config::Config;
use crate::db::DbConn;
use crate::models::Usuario;
use crate::services::deletion::StepOutcome;
use crate::services::IdentityService;

pub const USERS_COLLECTION: &str = "usuarios";

pub struct DirectoryService;

impl DirectoryService {
    pub fn collection(db: &DbConn) -> Collection<Usuario> {
        db.collection::<Usuario>(USERS_COLLECTION)
    }

    /// Filtered scan on the `email` field, not a point-read by id. If
    /// duplicates ever exist the first match wins.
    pub async fn find_by_email(
        db: &DbConn,
        email: &str,
    ) -> Result<Option<Usuario>, mongodb::error::Error> {
        Self::collection(db).find_one(doc! { "email": email }, None).await
    }

    /// Best-effort removal from the identity provider. The document store is
    /// the authoritative deleted signal, so a failure here is logged and
    /// reported but never aborts the cascade.
    pub async fn remove_from_identity_provider(user_id: &str) -> StepOutcome {
        if !Config::is_identity_enabled() {
            warn!("Identity provider not configured, skipping removal of {}", user_id);
            return StepOutcome::Skipped;
        }

        match IdentityService::delete_user(user_id).await {
            Ok(()) => {
                info!("Identity provider account removed: {}", user_id);
                StepOutcome::Success
            }
            Err(e) => {
                warn!("Could not remove {} from identity provider: {}", user_id, e);
                StepOutcome::Failed(e)
            }
        }
    }
}
