use std::env;

use dotenvy::dotenv;

use crate::auth::password::hash_password;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    /// Token lifetime in seconds.
    pub token_ttl: usize,

    /// The single HR account of the MVP credential scheme.
    pub hr_username: String,
    pub hr_password_hash: String,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        // Prefer a pre-hashed credential; otherwise hash the plaintext one at
        // startup so the verify path is uniform.
        let hr_password_hash = env::var("HR_PASSWORD_HASH").unwrap_or_else(|_| {
            let plain = env::var("HR_PASSWORD").unwrap_or_else(|_| "hr123".to_string());
            hash_password(&plain)
        });

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            token_ttl: env::var("TOKEN_TTL")
                .unwrap_or_else(|_| "1800".to_string()) // default 30 min
                .parse()
                .unwrap(),

            hr_username: env::var("HR_USERNAME").unwrap_or_else(|_| "hr@company.com".to_string()),
            hr_password_hash,

            rate_login_per_min: env::var("RATE_LOGIN_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),
        }
    }
}
