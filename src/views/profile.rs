use askama::Template;
use axum::extract::State;
use axum::response::Html;
use axum::Form;
use serde::Deserialize;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::Profile;
use crate::routes::profile::save_profile;
use crate::state::SharedState;
use crate::views::{role_label, Nav};

#[derive(Template)]
#[template(path = "profile/index.html")]
#[allow(dead_code)]
struct ProfileTemplate {
    nav: Nav,
    email: String,
    name: String,
    role_label: String,
    message: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: String,
}

fn render(
    auth: &AuthUser,
    profile: Option<&Profile>,
    name: String,
    message: Option<String>,
    error: Option<String>,
) -> Html<String> {
    let template = ProfileTemplate {
        nav: Nav::new(auth, profile),
        email: auth.email.clone(),
        name,
        role_label: role_label(profile.and_then(Profile::role)).to_string(),
        message,
        error,
    };
    Html(template.render().unwrap_or_default())
}

pub async fn show(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Html<String>, AppError> {
    let profile = db::profiles::find_by_user(&state.pool, auth.user_id).await?;
    let name = profile.as_ref().map(|p| p.name.clone()).unwrap_or_default();
    Ok(render(&auth, profile.as_ref(), name, None, None))
}

pub async fn save(
    auth: AuthUser,
    State(state): State<SharedState>,
    Form(form): Form<ProfileForm>,
) -> Result<Html<String>, AppError> {
    match save_profile(&state.pool, auth.user_id, &form.name).await {
        Ok(profile) => {
            let name = profile.name.clone();
            Ok(render(
                &auth,
                Some(&profile),
                name,
                Some("Profile updated".to_string()),
                None,
            ))
        }
        Err(e) => {
            let profile = db::profiles::find_by_user(&state.pool, auth.user_id).await?;
            Ok(render(&auth, profile.as_ref(), form.name, None, Some(e.user_message())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn rendered_page_outlives_the_borrowed_user() {
        let auth = AuthUser {
            user_id: Uuid::now_v7(),
            email: "dana@example.com".to_string(),
        };
        let profile = Profile {
            id: Uuid::now_v7(),
            user_id: auth.user_id,
            name: "Dana".to_string(),
            role: "admin".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let Html(page) = render(
            &auth,
            Some(&profile),
            profile.name.clone(),
            Some("Profile updated".to_string()),
            None,
        );
        drop(profile);
        drop(auth);

        assert!(page.contains("dana@example.com"));
        assert!(page.contains("Administrator"));
        assert!(page.contains("Profile updated"));
    }

    #[test]
    fn missing_profile_renders_without_a_role() {
        let auth = AuthUser {
            user_id: Uuid::now_v7(),
            email: "new@example.com".to_string(),
        };
        let Html(page) = render(&auth, None, String::new(), None, Some("Name is required".to_string()));
        assert!(page.contains("No role"));
        assert!(page.contains("Name is required"));
    }
}
