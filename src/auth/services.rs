use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use tracing::{error, info, warn};

use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;
use crate::store::{Role, Store, User};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Canonical form used as the identity key and the token subject.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Creates the account. Only the argon2 hash of the password is stored.
pub async fn register(
    store: &dyn Store,
    email: &str,
    password: &str,
    name: &str,
    role: Role,
) -> Result<User, ApiError> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        warn!(email = %email, "signup with invalid email");
        return Err(ApiError::validation("invalid email"));
    }
    if password.len() < 8 {
        return Err(ApiError::validation("password must be at least 8 characters"));
    }
    if name.trim().is_empty() {
        return Err(ApiError::validation("name must not be empty"));
    }

    let hash = hash_password(password).map_err(ApiError::Internal)?;
    let user = store.create_user(&email, &hash, name, role).await?;
    info!(user_id = user.id, email = %user.email, role = %role, "user registered");
    Ok(user)
}

/// Checks credentials and issues a session token whose subject is the email.
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn authenticate(
    store: &dyn Store,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> Result<String, ApiError> {
    let email = normalize_email(email);
    let user = match store.user_by_email(&email).await {
        Some(user) => user,
        None => {
            warn!(email = %email, "login with unknown email");
            return Err(ApiError::Unauthenticated("invalid credentials".into()));
        }
    };

    let ok = verify_password(password, &user.password_hash).map_err(ApiError::Internal)?;
    if !ok {
        warn!(user_id = user.id, "login with wrong password");
        return Err(ApiError::Unauthenticated("invalid credentials".into()));
    }

    let token = keys.sign(&user.email).map_err(ApiError::Internal)?;
    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(token)
}

/// Token verification composed with the identity lookup.
pub async fn resolve(store: &dyn Store, keys: &JwtKeys, token: &str) -> Result<User, ApiError> {
    let claims = keys
        .verify(token)
        .map_err(|e| ApiError::Unauthenticated(e.to_string()))?;
    store
        .user_by_email(&claims.sub)
        .await
        .ok_or_else(|| ApiError::Unauthenticated("unknown token subject".into()))
}


#[cfg(test)]
mod account_tests {
    use axum::extract::FromRef;

    use super::*;
    use crate::state::AppState;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("user@example.com"));
        assert!(!is_valid_email("userexample.com"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("us er@example.com"));
    }

    #[tokio::test]
    async fn register_then_authenticate_then_resolve() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);

        let user = register(
            state.store.as_ref(),
            "  Alice@Example.com ",
            "password123",
            "Alice",
            Role::Mentor,
        )
        .await
        .expect("register");
        assert_eq!(user.email, "alice@example.com");

        let token = authenticate(
            state.store.as_ref(),
            &keys,
            "alice@example.com",
            "password123",
        )
        .await
        .expect("authenticate");

        let resolved = resolve(state.store.as_ref(), &keys, &token)
            .await
            .expect("resolve");
        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.role(), Role::Mentor);
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let state = AppState::fake();
        register(
            state.store.as_ref(),
            "bob@example.com",
            "password123",
            "Bob",
            Role::Mentee,
        )
        .await
        .expect("first signup");

        let err = register(
            state.store.as_ref(),
            "bob@example.com",
            "password456",
            "Bobby",
            Role::Mentor,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn authenticate_rejects_wrong_password_and_unknown_email() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        register(
            state.store.as_ref(),
            "carol@example.com",
            "password123",
            "Carol",
            Role::Mentee,
        )
        .await
        .expect("signup");

        let err = authenticate(state.store.as_ref(), &keys, "carol@example.com", "nope1234")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated(_)));

        let err = authenticate(state.store.as_ref(), &keys, "nobody@example.com", "whatever1")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn resolve_rejects_token_for_absent_user() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let token = keys.sign("ghost@example.com").expect("sign");
        let err = resolve(state.store.as_ref(), &keys, &token)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated(_)));
    }
}
