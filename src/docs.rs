use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::api::controller::ErrorResponse;
use quiz_models::{ApiLoginRequest, ApiTokenResponse, AttachmentMeta, User};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::api::controller::login,
        crate::modules::api::controller::list_users,
        crate::modules::api::controller::show_user,
        crate::modules::api::controller::token_owner,
    ),
    components(
        schemas(
            User,
            AttachmentMeta,
            ApiLoginRequest,
            ApiTokenResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "API token issuing"),
        (name = "Users", description = "Read access to users")
    ),
    info(
        title = "Quiz API",
        version = "0.1.0",
        description = "JSON API of the Quiz application. Tokens come from `POST /api/login`.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_api_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/api/login"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/users/{userId}"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/users/tokenOwner"));
    }
}
