use std::sync::Arc;

use crate::config::AppConfig;
use crate::store::{MemoryStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        Ok(Self::from_parts(Arc::new(MemoryStore::new()), config))
    }

    pub fn from_parts(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::JwtConfig;
        use crate::store::TransitionPolicy;

        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
            transitions: TransitionPolicy::Lenient,
        });
        Self::from_parts(Arc::new(MemoryStore::new()), config)
    }
}
