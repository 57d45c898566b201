use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;
use crate::db::DbConn;
use crate::models::{
    EliminarConCodigoDto, EliminarDto, EliminarSeguroDto, SolicitarCodigoDto,
    VerificarCodigoDto, VerificarEliminacionDto,
};
use crate::guards::ApiKeyGuard;
use crate::services::deletion::{DeletionAuth, DeletionOutcome, OWNED_SUBCOLLECTIONS};
use crate::services::otp::{IssueOutcome, OtpService};
use crate::services::{DeletionService, DirectoryService};
use crate::utils::{validate_email, ApiError, ApiResponse};

fn require_email(email: &Option<String>) -> Result<&str, ApiError> {
    let email = email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| {
            ApiError::bad_request("Email es requerido").with_code("EMAIL_REQUIRED")
        })?;

    if !validate_email(email) {
        return Err(ApiError::bad_request("Email inválido").with_code("EMAIL_INVALID"));
    }

    Ok(email)
}

fn store_error(e: mongodb::error::Error) -> ApiError {
    ApiError::internal_error(format!("Error de base de datos: {}", e)).with_code("INTERNAL_ERROR")
}

fn user_not_found() -> ApiError {
    ApiError::not_found("Usuario no encontrado").with_code("USER_NOT_FOUND")
}

fn deletion_data(outcome: &DeletionOutcome) -> serde_json::Value {
    serde_json::json!({
        "usuarioId": outcome.user_id,
        "email": outcome.email,
        "eliminadoEn": outcome.deleted_at.to_rfc3339(),
        "pasos": outcome.pasos(),
    })
}

/// --------------------
/// Get user by email
/// --------------------
#[openapi(tag = "Usuarios")]
#[get("/obtener/<email>")]
pub async fn obtener_usuario(
    db: &State<DbConn>,
    _api_key: ApiKeyGuard,
    email: String,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    if !validate_email(&email) {
        return Err(ApiError::bad_request("Email inválido").with_code("EMAIL_INVALID"));
    }

    let usuario = DirectoryService::find_by_email(db, &email)
        .await
        .map_err(store_error)?
        .ok_or_else(user_not_found)?;

    let id = usuario.id.clone();
    let mut data = serde_json::to_value(&usuario)
        .map_err(|e| ApiError::internal_error(format!("Error de serialización: {}", e)))?;
    if let Some(obj) = data.as_object_mut() {
        obj.remove("_id");
        obj.insert("id".to_string(), id.into());
    }

    Ok(Json(ApiResponse::success(data)))
}

/// --------------------
/// Verify the account exists before deletion
/// --------------------
#[openapi(tag = "Usuarios")]
#[post("/verificar-eliminacion", data = "<dto>")]
pub async fn verificar_eliminacion(
    db: &State<DbConn>,
    _api_key: ApiKeyGuard,
    dto: Json<VerificarEliminacionDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let email = require_email(&dto.email)?;

    let usuario = DirectoryService::find_by_email(db, email)
        .await
        .map_err(store_error)?
        .ok_or_else(user_not_found)?;

    Ok(Json(ApiResponse::success_with_message(
        "Usuario verificado".to_string(),
        serde_json::json!({
            "id": usuario.id,
            "email": usuario.email,
            "nombre": usuario.display_name(),
        }),
    )))
}

/// --------------------
/// Request a deletion code by email
/// --------------------
#[openapi(tag = "Códigos")]
#[post("/solicitar-codigo", data = "<dto>")]
pub async fn solicitar_codigo(
    db: &State<DbConn>,
    _api_key: ApiKeyGuard,
    dto: Json<SolicitarCodigoDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let email = require_email(&dto.email)?;

    // The code is only worth sending for accounts that exist.
    DirectoryService::find_by_email(db, email)
        .await
        .map_err(store_error)?
        .ok_or_else(user_not_found)?;

    let force_resend = dto.forzar_reenvio.unwrap_or(false);

    match OtpService::issue(db, email, force_resend).await? {
        IssueOutcome::AlreadyActive { minutes_remaining } => {
            Ok(Json(ApiResponse::success_with_message(
                "Ya tienes un código activo. Usa el código enviado anteriormente.".to_string(),
                serde_json::json!({
                    "email": email,
                    "tiempoRestanteMinutos": minutes_remaining,
                    "puedeVerificar": true,
                }),
            )))
        }
        IssueOutcome::Sent { valid_for_minutes } => {
            Ok(Json(ApiResponse::success_with_message(
                "Código enviado al correo electrónico".to_string(),
                serde_json::json!({
                    "email": email,
                    "validoPor": valid_for_minutes,
                }),
            )))
        }
    }
}

/// --------------------
/// Verify a deletion code
/// --------------------
#[openapi(tag = "Códigos")]
#[post("/verificar-codigo", data = "<dto>")]
pub async fn verificar_codigo(
    db: &State<DbConn>,
    _api_key: ApiKeyGuard,
    dto: Json<VerificarCodigoDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let email = require_email(&dto.email)?;
    let codigo = dto
        .codigo
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| {
            ApiError::bad_request("Email y código son requeridos").with_code("CODE_REQUIRED")
        })?;

    let token = OtpService::verify(db, email, codigo).await?;

    Ok(Json(ApiResponse::success_with_message(
        "Código verificado correctamente".to_string(),
        serde_json::json!({
            "email": email,
            "tokenEliminacion": token,
        }),
    )))
}

/// --------------------
/// Delete with a verified code token
/// --------------------
#[openapi(tag = "Eliminación")]
#[post("/eliminar-con-codigo", data = "<dto>")]
pub async fn eliminar_con_codigo(
    db: &State<DbConn>,
    _api_key: ApiKeyGuard,
    dto: Json<EliminarConCodigoDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let email = require_email(&dto.email)?;
    let token = dto
        .token_eliminacion
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            ApiError::bad_request("Email y token son requeridos").with_code("TOKEN_REQUIRED")
        })?;

    let outcome =
        DeletionService::delete_account(db, email, DeletionAuth::OtpToken(token.to_string()))
            .await?;

    Ok(Json(ApiResponse::success_with_message(
        "Usuario eliminado correctamente".to_string(),
        deletion_data(&outcome),
    )))
}

/// --------------------
/// Delete with the confirmation word
/// --------------------
#[openapi(tag = "Eliminación")]
#[post("/eliminar-seguro", data = "<dto>")]
pub async fn eliminar_seguro(
    db: &State<DbConn>,
    _api_key: ApiKeyGuard,
    dto: Json<EliminarSeguroDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    if dto.email.is_none() || dto.confirmacion.is_none() {
        return Err(ApiError::bad_request("Email y confirmación son requeridos")
            .with_code("CONFIRMATION_REQUIRED"));
    }
    let email = require_email(&dto.email)?;
    let confirmacion = dto.confirmacion.clone().unwrap_or_default();

    let outcome =
        DeletionService::delete_account(db, email, DeletionAuth::ConfirmationWord(confirmacion))
            .await?;

    Ok(Json(ApiResponse::success_with_message(
        "Usuario y todos sus datos han sido eliminados permanentemente".to_string(),
        deletion_data(&outcome),
    )))
}

/// --------------------
/// Direct delete (trusted caller)
/// --------------------
#[openapi(tag = "Eliminación")]
#[delete("/eliminar", data = "<dto>")]
pub async fn eliminar_directo(
    db: &State<DbConn>,
    _api_key: ApiKeyGuard,
    dto: Json<EliminarDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let email = require_email(&dto.email)?;

    let outcome = DeletionService::delete_account(db, email, DeletionAuth::Direct).await?;

    Ok(Json(ApiResponse::success_with_message(
        "Usuario y todos sus datos eliminados correctamente".to_string(),
        deletion_data(&outcome),
    )))
}

/// --------------------
/// Direct delete for the Android client
/// --------------------
#[openapi(tag = "Eliminación")]
#[post("/android/eliminar", data = "<dto>")]
pub async fn eliminar_android(
    db: &State<DbConn>,
    _api_key: ApiKeyGuard,
    dto: Json<EliminarDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let email = require_email(&dto.email)?;

    let outcome = DeletionService::delete_account(db, email, DeletionAuth::Direct).await?;

    Ok(Json(ApiResponse::success_with_code(
        "ACCOUNT_DELETED",
        "Cuenta eliminada exitosamente".to_string(),
        serde_json::json!({
            "email": outcome.email,
            "userId": outcome.user_id,
            "deletedAt": outcome.deleted_at.to_rfc3339(),
            "subcollectionsDeleted": OWNED_SUBCOLLECTIONS,
            "pasos": outcome.pasos(),
        }),
    )))
}
