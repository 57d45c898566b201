use rocket::figment::{Figment, providers::{Env, Format, Toml}};
use rocket::Config as RocketConfig;
use std::env;

pub struct Config;

impl Config {
    fn figment() -> Figment {
        // Get the current profile
        let profile = env::var("ROCKET_PROFILE").unwrap_or_else(|_| "development".to_string());

        Figment::from(RocketConfig::default())
            .merge(Toml::file("Rocket.toml").nested())
            .select(&profile)
            .merge(Env::prefixed("ROCKET_").split("_"))
    }

    pub fn api_key() -> String {
        Self::figment()
            .extract_inner("api_key")
            .unwrap_or_default()
    }

    pub fn mongodb_uri() -> String {
        Self::figment()
            .extract_inner("mongodb_uri")
            .unwrap_or_else(|_| "mongodb://localhost:27017/watchme".to_string())
    }

    pub fn mail_host() -> String {
        Self::figment()
            .extract_inner("mail_host")
            .unwrap_or_else(|_| "smtp.zoho.com".to_string())
    }

    pub fn mail_user() -> String {
        Self::figment()
            .extract_inner("mail_user")
            .unwrap_or_default()
    }

    pub fn mail_password() -> String {
        Self::figment()
            .extract_inner("mail_password")
            .unwrap_or_default()
    }

    pub fn mail_from() -> String {
        Self::figment()
            .extract_inner("mail_from")
            .unwrap_or_else(|_| "WatchMe <noreply@watchme.app>".to_string())
    }

    pub fn identity_api_url() -> Option<String> {
        Self::figment()
            .extract_inner("identity_api_url")
            .ok()
    }

    pub fn identity_api_key() -> Option<String> {
        Self::figment()
            .extract_inner("identity_api_key")
            .ok()
    }

    pub fn is_identity_enabled() -> bool {
        Self::identity_api_url().is_some()
            && Self::identity_api_key().is_some()
    }
}
