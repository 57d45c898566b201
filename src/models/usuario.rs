use mongodb::bson::Document;
use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;

/// User document in the `usuarios` collection. The `_id` is the identity
/// provider UID, not an ObjectId: both stores share the same id for a user.
/// Profile fields beyond `email`/`nombre` are kept opaque.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Usuario {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(flatten)]
    pub extra: Document,
}

impl Usuario {
    pub fn display_name(&self) -> &str {
        self.nombre.as_deref().unwrap_or("Sin nombre registrado")
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct VerificarEliminacionDto {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EliminarDto {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EliminarSeguroDto {
    pub email: Option<String>,
    pub confirmacion: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn deserializes_uid_and_keeps_unknown_fields() {
        let doc = doc! {
            "_id": "uid-123",
            "email": "a@x.com",
            "nombre": "Ana",
            "fotoPerfil": "https://cdn.example/a.png",
        };
        let usuario: Usuario = mongodb::bson::from_document(doc).unwrap();
        assert_eq!(usuario.id, "uid-123");
        assert_eq!(usuario.display_name(), "Ana");
        assert_eq!(
            usuario.extra.get_str("fotoPerfil").unwrap(),
            "https://cdn.example/a.png"
        );
    }

    #[test]
    fn display_name_falls_back_when_missing() {
        let usuario: Usuario =
            mongodb::bson::from_document(doc! { "_id": "u", "email": "a@x.com" }).unwrap();
        assert_eq!(usuario.display_name(), "Sin nombre registrado");
    }
}
