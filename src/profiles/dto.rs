use serde::{Deserialize, Serialize};

use crate::store::{Profile, Role, User};

/// Role-shaped profile fields as serialized to clients. `skills` appears for
/// mentors only.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub name: String,
    pub bio: String,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
}

/// Public user representation returned by /me, /profile and /mentors.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub profile: ProfileView,
}

impl UserView {
    /// The one place where role-specific shaping happens.
    pub fn from_user(user: &User) -> Self {
        let image_url = format!("/images/{}/{}", user.role(), user.id);
        let profile = match &user.profile {
            Profile::Mentor(p) => ProfileView {
                name: p.name.clone(),
                bio: p.bio.clone(),
                image_url,
                skills: Some(p.skills.clone()),
            },
            Profile::Mentee(p) => ProfileView {
                name: p.name.clone(),
                bio: p.bio.clone(),
                image_url,
                skills: None,
            },
        };
        UserView {
            id: user.id,
            email: user.email.clone(),
            role: user.role(),
            profile,
        }
    }
}

/// Body for PUT /profile, resolved into a role variant at the boundary. The
/// tag must match the caller's role; each variant carries only its valid
/// fields. `image` is base64 and optional.
#[derive(Debug, Deserialize)]
#[serde(tag = "role")]
pub enum ProfileUpdate {
    #[serde(rename = "mentor")]
    Mentor {
        name: String,
        #[serde(default)]
        bio: String,
        image: Option<String>,
        #[serde(default)]
        skills: Vec<String>,
    },
    #[serde(rename = "mentee")]
    Mentee {
        name: String,
        #[serde(default)]
        bio: String,
        image: Option<String>,
    },
}

impl ProfileUpdate {
    pub fn role(&self) -> Role {
        match self {
            ProfileUpdate::Mentor { .. } => Role::Mentor,
            ProfileUpdate::Mentee { .. } => Role::Mentee,
        }
    }
}

/// Query for GET /mentors.
#[derive(Debug, Deserialize)]
pub struct MentorQuery {
    pub skill: Option<String>,
    pub order_by: Option<String>,
}
