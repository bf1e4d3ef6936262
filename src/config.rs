use std::path::PathBuf;

use crate::errors::AppError;

/// Runtime configuration, loaded once at startup and injected through
/// `GlobalState` so handlers and tests never reach for the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Env: `DATABASE_URL` (required)
    pub database_url: String,
    /// Env: `BIND_ADDR`, default `127.0.0.1:8080`
    pub bind_addr: String,
    /// Secret for signing admin tokens. Env: `JWT_SECRET` (required)
    pub jwt_secret: String,
    /// Root of the served `public/` directory. Env: `PUBLIC_DIR`
    pub public_dir: PathBuf,
    /// Base url used when building password-reset links. Env: `PUBLIC_BASE_URL`
    pub public_base_url: String,
    /// Address that receives contact-form relays and cleanup escalations.
    /// Env: `OPERATOR_EMAIL`
    pub operator_email: String,
    /// Env: `EMAIL_FROM`
    pub email_from: String,
    /// Env: `SMTP_HOST`
    pub smtp_host: String,
    /// Env: `SMTP_USERNAME`
    pub smtp_username: String,
    /// Env: `SMTP_PASSWORD`
    pub smtp_password: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            bind_addr: or_default("BIND_ADDR", "127.0.0.1:8080"),
            jwt_secret: required("JWT_SECRET")?,
            public_dir: PathBuf::from(or_default("PUBLIC_DIR", "./public")),
            public_base_url: or_default("PUBLIC_BASE_URL", "https://www.basic.am"),
            operator_email: or_default("OPERATOR_EMAIL", "contacts@basic.am"),
            email_from: or_default("EMAIL_FROM", "contacts@basic.am"),
            smtp_host: or_default("SMTP_HOST", "smtp.gmail.com"),
            smtp_username: or_default("SMTP_USERNAME", ""),
            smtp_password: or_default("SMTP_PASSWORD", ""),
        })
    }
}

fn required(name: &'static str) -> Result<String, AppError> {
    std::env::var(name).map_err(|_| AppError::Config(name))
}

fn or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_var_is_reported_by_name() {
        let err = required("BASIC_BACKEND_UNSET_VAR").unwrap_err();
        assert_eq!(err.to_string(), "BASIC_BACKEND_UNSET_VAR must be set");
    }

    #[test]
    fn defaults_fill_optional_vars() {
        std::env::set_var("DATABASE_URL", "postgres://localhost/basic_am");
        std::env::set_var("JWT_SECRET", "secret");
        let config = Config::from_env().unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.smtp_host, "smtp.gmail.com");
        assert_eq!(config.public_dir, PathBuf::from("./public"));
    }
}
