#[macro_use]
extern crate rocket;

mod config;
mod db;
mod guards;
mod models;
mod routes;
mod services;
mod utils;

use dotenvy::dotenv;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::{Build, Request, Response, Rocket};
use rocket_okapi::swagger_ui::{SwaggerUIConfig, make_swagger_ui};

/* ----------------------------- CORS ----------------------------- */

pub struct CORS;

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        if let Some(origin) = request.headers().get_one("Origin") {
            response.set_header(Header::new("Access-Control-Allow-Origin", origin));
        }

        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, DELETE, OPTIONS",
        ));

        response.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "Content-Type, x-api-key",
        ));

        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

/* ----------------------------- OPTIONS ----------------------------- */

#[options("/<_..>")]
fn options_handler() {}

/* ----------------------------- ROOT ----------------------------- */

#[get("/")]
fn index() -> rocket::serde::json::Value {
    rocket::serde::json::json!({
        "message": "WatchMe - API de Eliminación de Cuenta",
        "version": "1.0.0",
        "endpoints": {
            "api": "/api/usuarios",
            "android": "/api/usuarios/android/eliminar"
        }
    })
}

/* ----------------------------- ERRORS ----------------------------- */

#[catch(401)]
fn missing_api_key() -> rocket::serde::json::Value {
    rocket::serde::json::json!({
        "success": false,
        "message": "API Key requerida"
    })
}

#[catch(403)]
fn invalid_api_key() -> rocket::serde::json::Value {
    rocket::serde::json::json!({
        "success": false,
        "message": "API Key inválida"
    })
}

#[catch(404)]
fn not_found() -> rocket::serde::json::Value {
    rocket::serde::json::json!({
        "success": false,
        "message": "Resource not found (check /api/usuarios prefix)"
    })
}

#[catch(500)]
fn internal_error() -> rocket::serde::json::Value {
    rocket::serde::json::json!({
        "success": false,
        "message": "Internal server error"
    })
}

/* ----------------------------- SWAGGER ----------------------------- */

fn swagger_config() -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: "/openapi.json".to_string(),
        ..Default::default()
    }
}

/* ----------------------------- LAUNCH ----------------------------- */

#[launch]
fn rocket() -> Rocket<Build> {
    dotenv().ok();
    env_logger::init();

    println!("🚀 WatchMe deletion API running");
    println!("📚 Swagger UI → http://localhost:8000/api/docs");

    rocket::build()
        .attach(db::init())
        .attach(services::otp::reaper())
        .attach(CORS)
        .mount("/", routes![index, options_handler])
        .mount(
            "/api/usuarios",
            routes![
                // Usuarios
                routes::usuario::obtener_usuario,
                routes::usuario::verificar_eliminacion,
                // Códigos
                routes::usuario::solicitar_codigo,
                routes::usuario::verificar_codigo,
                // Eliminación
                routes::usuario::eliminar_con_codigo,
                routes::usuario::eliminar_seguro,
                routes::usuario::eliminar_directo,
                routes::usuario::eliminar_android,
            ],
        )
        .mount("/api/docs", make_swagger_ui(&swagger_config()))
        .register(
            "/",
            catchers![missing_api_key, invalid_api_key, not_found, internal_error],
        )
}
