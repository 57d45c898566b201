use thiserror::Error;

use crate::utils::ApiError;

/// Failures of the OTP lifecycle. Business-rule variants are terminal for the
/// current attempt; `Store`/`Notifier` are dependency failures.
#[derive(Debug, Error)]
pub enum OtpError {
    #[error("no pending code for {email}")]
    NoPendingCode { email: String },

    #[error("incorrect code for {email}, {attempts_remaining} attempts remaining")]
    IncorrectCode {
        email: String,
        attempts_remaining: i32,
    },

    #[error("too many failed attempts for {email}")]
    TooManyAttempts { email: String },

    #[error("deletion token not found for {email}")]
    InvalidToken { email: String },

    #[error("code for {email} was never verified")]
    NotVerified { email: String },

    #[error("deletion token for {email} has expired")]
    TokenExpired { email: String },

    #[error("otp store error: {0}")]
    Store(#[from] mongodb::error::Error),

    #[error("could not send verification email: {0}")]
    Notifier(String),
}

/// Failures of the account-deletion orchestrator. Only these abort before any
/// destructive action; best-effort cleanup failures are reported per step.
#[derive(Debug, Error)]
pub enum DeletionError {
    #[error("user {email} not found")]
    UserNotFound { email: String },

    #[error("confirmation word mismatch")]
    BadConfirmation,

    #[error(transparent)]
    Otp(#[from] OtpError),

    #[error("user store error: {0}")]
    Store(mongodb::error::Error),
}

impl From<OtpError> for ApiError {
    fn from(err: OtpError) -> Self {
        match err {
            OtpError::NoPendingCode { .. } => {
                ApiError::bad_request("No hay código pendiente o ha expirado")
                    .with_code("NO_PENDING_CODE")
            }
            OtpError::IncorrectCode {
                attempts_remaining, ..
            } => ApiError::bad_request("Código incorrecto")
                .with_code("INCORRECT_CODE")
                .with_field("intentosRestantes", attempts_remaining),
            OtpError::TooManyAttempts { .. } => {
                ApiError::too_many_requests("Demasiados intentos fallidos. Solicita un nuevo código.")
                    .with_code("TOO_MANY_ATTEMPTS")
            }
            OtpError::InvalidToken { .. } => {
                ApiError::bad_request("Token inválido o no encontrado").with_code("INVALID_TOKEN")
            }
            OtpError::NotVerified { .. } => {
                ApiError::bad_request("El código no ha sido verificado").with_code("NOT_VERIFIED")
            }
            OtpError::TokenExpired { .. } => {
                ApiError::bad_request("El token ha expirado").with_code("TOKEN_EXPIRED")
            }
            OtpError::Store(e) => {
                ApiError::internal_error(format!("Error de base de datos: {}", e))
                    .with_code("INTERNAL_ERROR")
            }
            OtpError::Notifier(msg) => {
                ApiError::internal_error(format!("No se pudo enviar el correo: {}", msg))
                    .with_code("EMAIL_SEND_FAILED")
            }
        }
    }
}

impl From<DeletionError> for ApiError {
    fn from(err: DeletionError) -> Self {
        match err {
            DeletionError::UserNotFound { .. } => {
                ApiError::not_found("Usuario no encontrado").with_code("USER_NOT_FOUND")
            }
            DeletionError::BadConfirmation => {
                ApiError::bad_request("Confirmación incorrecta. Debes escribir 'CONFIRMAR'")
                    .with_code("BAD_CONFIRMATION")
            }
            DeletionError::Otp(e) => e.into(),
            DeletionError::Store(e) => {
                ApiError::internal_error(format!("Error de base de datos: {}", e))
                    .with_code("INTERNAL_ERROR")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::http::Status;

    #[test]
    fn otp_errors_map_to_http_statuses() {
        let email = || "a@x.com".to_string();

        let err: ApiError = OtpError::NoPendingCode { email: email() }.into();
        assert_eq!(err.status, Status::BadRequest);

        let err: ApiError = OtpError::TooManyAttempts { email: email() }.into();
        assert_eq!(err.status, Status::TooManyRequests);
        assert_eq!(err.code, Some("TOO_MANY_ATTEMPTS"));

        let err: ApiError = OtpError::TokenExpired { email: email() }.into();
        assert_eq!(err.status, Status::BadRequest);
        assert_eq!(err.code, Some("TOKEN_EXPIRED"));
    }

    #[test]
    fn incorrect_code_reports_attempts_remaining() {
        let err: ApiError = OtpError::IncorrectCode {
            email: "a@x.com".to_string(),
            attempts_remaining: 2,
        }
        .into();
        assert_eq!(err.body()["intentosRestantes"], 2);
    }

    #[test]
    fn deletion_errors_map_to_http_statuses() {
        let err: ApiError = DeletionError::UserNotFound {
            email: "a@x.com".to_string(),
        }
        .into();
        assert_eq!(err.status, Status::NotFound);
        assert_eq!(err.code, Some("USER_NOT_FOUND"));

        let err: ApiError = DeletionError::BadConfirmation.into();
        assert_eq!(err.status, Status::BadRequest);

        let err: ApiError = DeletionError::Otp(OtpError::InvalidToken {
            email: "a@x.com".to_string(),
        })
        .into();
        assert_eq!(err.status, Status::BadRequest);
        assert_eq!(err.code, Some("INVALID_TOKEN"));
    }
}
