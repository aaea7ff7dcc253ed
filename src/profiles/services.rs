use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use tracing::info;

use crate::error::ApiError;
use crate::images::validate::{validate_profile_image, ImageRejection};
use crate::profiles::dto::{ProfileUpdate, UserView};
use crate::store::{Profile, ProfileChanges, Role, Store, User};

/// Applies a profile update for the authenticated `user`. A supplied image
/// goes through the validation pipeline before anything is written.
pub async fn update_profile(
    store: &dyn Store,
    user: &User,
    update: ProfileUpdate,
) -> Result<UserView, ApiError> {
    if update.role() != user.role() {
        return Err(ApiError::validation(
            "profile role does not match the authenticated user",
        ));
    }

    let (name, bio, image_b64, skills) = match update {
        ProfileUpdate::Mentor {
            name,
            bio,
            image,
            skills,
        } => (name, bio, image, Some(skills)),
        ProfileUpdate::Mentee { name, bio, image } => (name, bio, image, None),
    };

    let image = match image_b64 {
        Some(b64) => Some(decode_and_validate(b64).await?),
        None => None,
    };

    let updated = store
        .update_profile(
            user.id,
            ProfileChanges {
                name,
                bio,
                image,
                skills,
            },
        )
        .await?;
    info!(user_id = user.id, "profile updated");
    Ok(UserView::from_user(&updated))
}

/// Base64 boundary decode plus the validation pipeline. Container decoding is
/// CPU-bound, so the whole step runs off the async dispatch path.
async fn decode_and_validate(b64: String) -> Result<Bytes, ApiError> {
    let validated = tokio::task::spawn_blocking(move || {
        let raw = BASE64
            .decode(b64.as_bytes())
            .map_err(|_| ImageRejection::MalformedEncoding)?;
        validate_profile_image(Bytes::from(raw))
    })
    .await
    .map_err(|e| ApiError::Internal(e.into()))??;
    Ok(validated)
}

/// Stored image bytes for the user with the given role and id.
pub async fn profile_image(store: &dyn Store, role: Role, id: i64) -> Result<Bytes, ApiError> {
    let user = store
        .user_by_id(id)
        .await
        .filter(|u| u.role() == role)
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
    user.profile
        .image()
        .cloned()
        .ok_or_else(|| ApiError::NotFound("no image stored".into()))
}

/// Mentor directory for mentees: optional exact skill filter, then a stable
/// sort keyed by `order_by` ("skill" sorts by the first skill, "name" by
/// name, anything else keeps ascending id). Ties keep insertion order.
pub async fn list_mentors(
    store: &dyn Store,
    skill: Option<&str>,
    order_by: Option<&str>,
) -> Vec<UserView> {
    let mut mentors = store.users_by_role(Role::Mentor).await;

    if let Some(skill) = skill {
        mentors.retain(|u| match &u.profile {
            Profile::Mentor(p) => p.skills.iter().any(|s| s == skill),
            Profile::Mentee(_) => false,
        });
    }

    match order_by {
        Some("skill") => mentors.sort_by(|a, b| first_skill(a).cmp(first_skill(b))),
        Some("name") => mentors.sort_by(|a, b| a.profile.name().cmp(b.profile.name())),
        _ => {}
    }

    mentors.iter().map(UserView::from_user).collect()
}

fn first_skill(user: &User) -> &str {
    match &user.profile {
        Profile::Mentor(p) => p.skills.first().map(String::as_str).unwrap_or(""),
        Profile::Mentee(_) => "",
    }
}
