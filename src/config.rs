// src/config.rs

use std::env;
use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub port: u16,
    /// Lower-cased emails allowed onto the admin routes.
    pub admin_emails: Vec<String>,
    /// When set, only `@<domain>` accounts may submit answers.
    pub allowed_email_domain: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let admin_emails = parse_email_list(&env::var("ADMIN_EMAILS").unwrap_or_default());

        let allowed_email_domain = env::var("ALLOWED_EMAIL_DOMAIN")
            .ok()
            .map(|d| d.trim().trim_start_matches('@').to_lowercase())
            .filter(|d| !d.is_empty());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            port,
            admin_emails,
            allowed_email_domain,
        }
    }

    /// Case-insensitive membership test against the admin allowlist.
    pub fn is_admin(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.admin_emails.iter().any(|a| *a == email)
    }

    /// True when no domain restriction is configured or `email` belongs to it.
    pub fn email_domain_allowed(&self, email: &str) -> bool {
        match &self.allowed_email_domain {
            None => true,
            Some(domain) => email
                .trim()
                .to_lowercase()
                .ends_with(&format!("@{}", domain)),
        }
    }
}

/// Splits a comma-separated list, trimming and lower-casing each entry.
pub fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
