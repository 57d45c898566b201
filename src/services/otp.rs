use mongodb::bson::{doc, DateTime};
use mongodb::options::{FindOneAndUpdateOptions, ReplaceOptions, ReturnDocument};
use mongodb::Collection;
use rocket::fairing::AdHoc;
use std::time::Duration;
use log::{debug, warn};

use crate::db::DbConn;
use crate::models::OtpRecord;
use crate::services::error::OtpError;
use crate::services::EmailService;
use crate::utils::{generate_deletion_token, generate_otp_code};

pub const OTP_COLLECTION: &str = "otp";
pub const OTP_TTL_MINUTES: i64 = 30;
pub const MAX_ATTEMPTS: i32 = 3;

const REAPER_INTERVAL_SECS: u64 = 300;

/// Outcome of `issue`: either a fresh code went out, or an unexpired one is
/// still standing and no email was sent.
#[derive(Debug)]
pub enum IssueOutcome {
    Sent { valid_for_minutes: i64 },
    AlreadyActive { minutes_remaining: i64 },
}

pub struct OtpService;

impl OtpService {
    fn collection(db: &DbConn) -> Collection<OtpRecord> {
        db.collection::<OtpRecord>(OTP_COLLECTION)
    }

    /// Issue a deletion code for `email` and send it out.
    ///
    /// The record is upserted keyed by email, so at most one record per email
    /// exists in the store and a force-resend simply replaces it. If the
    /// email cannot be delivered the operation fails; the freshly written
    /// record is left for the reaper.
    pub async fn issue(
        db: &DbConn,
        email: &str,
        force_resend: bool,
    ) -> Result<IssueOutcome, OtpError> {
        let collection = Self::collection(db);
        let now = DateTime::now();

        if !force_resend {
            let active = collection
                .find_one(doc! { "email": email, "expires_at": { "$gt": now } }, None)
                .await?;

            if let Some(existing) = active {
                return Ok(IssueOutcome::AlreadyActive {
                    minutes_remaining: minutes_remaining(existing.expires_at, now),
                });
            }
        }

        let code = generate_otp_code();
        let record = OtpRecord {
            id: None,
            email: email.to_string(),
            code: code.clone(),
            expires_at: DateTime::from_millis(
                now.timestamp_millis() + OTP_TTL_MINUTES * 60 * 1000,
            ),
            attempts: 0,
            verified: false,
            deletion_token: None,
            verified_at: None,
            created_at: now,
        };

        collection
            .replace_one(
                doc! { "email": email },
                &record,
                ReplaceOptions::builder().upsert(true).build(),
            )
            .await?;

        EmailService::send_verification_code(email, &code)
            .await
            .map_err(OtpError::Notifier)?;

        Ok(IssueOutcome::Sent {
            valid_for_minutes: OTP_TTL_MINUTES,
        })
    }

    /// Check a submitted code. A match promotes the record to verified and
    /// returns a fresh deletion token; a mismatch burns an attempt, and the
    /// third failure deletes the record outright.
    pub async fn verify(
        db: &DbConn,
        email: &str,
        submitted_code: &str,
    ) -> Result<String, OtpError> {
        let collection = Self::collection(db);
        let now = DateTime::now();

        let record = collection
            .find_one(doc! { "email": email, "expires_at": { "$gt": now } }, None)
            .await?
            .ok_or_else(|| OtpError::NoPendingCode {
                email: email.to_string(),
            })?;

        if record.code != submitted_code {
            // Atomic increment; the returned document carries the
            // authoritative count even under concurrent submissions.
            let updated = collection
                .find_one_and_update(
                    doc! { "_id": record.id, "attempts": { "$lt": MAX_ATTEMPTS } },
                    doc! { "$inc": { "attempts": 1 } },
                    FindOneAndUpdateOptions::builder()
                        .return_document(ReturnDocument::After)
                        .build(),
                )
                .await?;

            return match updated {
                Some(r) if r.attempts < MAX_ATTEMPTS => Err(OtpError::IncorrectCode {
                    email: email.to_string(),
                    attempts_remaining: MAX_ATTEMPTS - r.attempts,
                }),
                _ => {
                    collection
                        .delete_one(doc! { "_id": record.id }, None)
                        .await?;
                    Err(OtpError::TooManyAttempts {
                        email: email.to_string(),
                    })
                }
            };
        }

        let token = generate_deletion_token();
        collection
            .update_one(
                doc! { "_id": record.id },
                doc! { "$set": {
                    "verified": true,
                    "deletion_token": &token,
                    "verified_at": now,
                } },
                None,
            )
            .await?;

        Ok(token)
    }

    /// Redeem a deletion token. Returns the backing record; the caller owns
    /// its physical deletion once the cascade succeeds (single-use token).
    pub async fn consume(db: &DbConn, email: &str, token: &str) -> Result<OtpRecord, OtpError> {
        let collection = Self::collection(db);

        let record = collection
            .find_one(doc! { "email": email, "deletion_token": token }, None)
            .await?
            .ok_or_else(|| OtpError::InvalidToken {
                email: email.to_string(),
            })?;

        if !record.verified {
            // Unreachable as long as tokens are only written alongside
            // verified=true.
            return Err(OtpError::NotVerified {
                email: email.to_string(),
            });
        }

        if record.is_expired(DateTime::now()) {
            collection
                .delete_one(doc! { "_id": record.id }, None)
                .await?;
            return Err(OtpError::TokenExpired {
                email: email.to_string(),
            });
        }

        Ok(record)
    }

    /// Delete a consumed record.
    pub async fn discard(db: &DbConn, record: &OtpRecord) -> Result<(), OtpError> {
        Self::collection(db)
            .delete_one(doc! { "_id": record.id }, None)
            .await?;
        Ok(())
    }

    /// Delete every record for `email`, active or not.
    pub async fn delete_for_email(db: &DbConn, email: &str) -> Result<u64, OtpError> {
        let result = Self::collection(db)
            .delete_many(doc! { "email": email }, None)
            .await?;
        Ok(result.deleted_count)
    }

    async fn reap_expired(db: &DbConn) -> Result<u64, OtpError> {
        let result = Self::collection(db)
            .delete_many(doc! { "expires_at": { "$lte": DateTime::now() } }, None)
            .await?;
        Ok(result.deleted_count)
    }
}

/// Background reaper for expired records. Read paths only filter expiry;
/// this task is the single place that physically purges.
pub fn reaper() -> AdHoc {
    AdHoc::on_liftoff("OTP reaper", |rocket| {
        Box::pin(async move {
            let Some(db) = rocket.state::<DbConn>().cloned() else {
                warn!("OTP reaper not started: no database connection");
                return;
            };

            tokio::spawn(async move {
                let mut interval =
                    tokio::time::interval(Duration::from_secs(REAPER_INTERVAL_SECS));
                loop {
                    interval.tick().await;
                    match OtpService::reap_expired(&db).await {
                        Ok(0) => {}
                        Ok(n) => debug!("✓ {} expired deletion codes removed", n),
                        Err(e) => warn!("Failed to reap expired deletion codes: {}", e),
                    }
                }
            });
        })
    })
}

/// Whole minutes until `expires_at`, rounded up. Callers only ask this for
/// unexpired records, so the result is at least 1.
pub fn minutes_remaining(expires_at: DateTime, now: DateTime) -> i64 {
    let ms = expires_at.timestamp_millis() - now.timestamp_millis();
    if ms <= 0 {
        return 0;
    }
    (ms + 59_999) / 60_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_remaining_rounds_up() {
        let now = DateTime::now();
        let at = |ms: i64| DateTime::from_millis(now.timestamp_millis() + ms);

        assert_eq!(minutes_remaining(at(30 * 60 * 1000), now), 30);
        assert_eq!(minutes_remaining(at(60_000), now), 1);
        assert_eq!(minutes_remaining(at(60_001), now), 2);
        assert_eq!(minutes_remaining(at(1), now), 1);
        assert_eq!(minutes_remaining(at(0), now), 0);
        assert_eq!(minutes_remaining(at(-5_000), now), 0);
    }
}
