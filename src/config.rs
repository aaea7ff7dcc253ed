use serde::Deserialize;

use crate::store::TransitionPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub transitions: TransitionPolicy,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "mentormatch".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "mentormatch-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        let transitions = match std::env::var("MATCH_TRANSITION_POLICY").ok().as_deref() {
            None | Some("lenient") => TransitionPolicy::Lenient,
            Some("strict") => TransitionPolicy::Strict,
            Some(other) => anyhow::bail!("unknown MATCH_TRANSITION_POLICY: {other}"),
        };
        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
            jwt,
            transitions,
        })
    }
}
