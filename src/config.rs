use std::env;
use dotenvy::dotenv;
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,

    // SARH webservice base URL, e.g. http://sarh.exemplo.com
    pub sarh_base_url: String,

    // Outbound e-mail
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub email_from: String,

    // Substitutes fabricated leave/manager data when SARH is unreachable.
    // Test aid only, must stay off in production.
    pub allow_synthetic_fallback: bool,

    // Rate limiting
    pub rate_trigger_per_min: u32,

    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            sarh_base_url: env::var("SARH_BASE_URL").expect("SARH_BASE_URL must be set"),

            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "25".to_string())
                .parse()
                .unwrap(),
            smtp_username: env::var("SMTP_USERNAME").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "aviso.ferias@exemplo.com".to_string()),

            allow_synthetic_fallback: env::var("ALLOW_SYNTHETIC_FALLBACK")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),

            rate_trigger_per_min: env::var("RATE_TRIGGER_PER_MIN")
                .unwrap_or_else(|_| "6".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
        }
    }
}
