use anyhow::anyhow;
use axum::{
    Form, Json,
    extract::{
        FromRequest, Request,
        rejection::{FormRejection, JsonRejection},
    },
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use quiz_core::AppError;

fn format_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn validate<T: Validate>(value: &T) -> Result<(), AppError> {
    value.validate().map_err(|errors| {
        AppError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            anyhow!("{}", format_errors(&errors)),
        )
    })
}

/// Missing fields are reported by name; anything else as a generic message.
fn missing_field(error_msg: &str) -> Option<&str> {
    error_msg
        .split("missing field `")
        .nth(1)
        .and_then(|s| s.split('`').next())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let error_msg = rejection.body_text();

                if let Some(field) = missing_field(&error_msg) {
                    return AppError::bad_request(anyhow!("{} is required", field));
                }

                if error_msg.contains("invalid type") {
                    return AppError::bad_request(anyhow!("Invalid field type in request"));
                }

                if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
                    return AppError::bad_request(anyhow!(
                        "Missing 'Content-Type: application/json' header"
                    ));
                }

                AppError::bad_request(anyhow!("Invalid request body"))
            })?;

        validate(&value)?;

        Ok(ValidatedJson(value))
    }
}

/// URL-encoded form body, validated. HTML forms post these.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedForm<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedForm<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let error_msg = rejection.body_text();

                if let Some(field) = missing_field(&error_msg) {
                    return AppError::bad_request(anyhow!("{} is required", field));
                }

                if matches!(rejection, FormRejection::InvalidFormContentType(_)) {
                    return AppError::bad_request(anyhow!(
                        "Missing 'Content-Type: application/x-www-form-urlencoded' header"
                    ));
                }

                AppError::bad_request(anyhow!("Invalid form body"))
            })?;

        validate(&value)?;

        Ok(ValidatedForm(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use quiz_models::CreateUserDto;

    fn form_request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/users")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_form() {
        let ValidatedForm(dto) =
            ValidatedForm::<CreateUserDto>::from_request(form_request("username=pepe&password=567890"), &())
                .await
                .unwrap();
        assert_eq!(dto.username, "pepe");
    }

    #[tokio::test]
    async fn test_invalid_form_is_unprocessable() {
        let err =
            ValidatedForm::<CreateUserDto>::from_request(form_request("username=pepe&password=1"), &())
                .await
                .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.message(), "Password must have at least 6 characters");
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let err = ValidatedForm::<CreateUserDto>::from_request(form_request("username=pepe"), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "password is required");
    }
}
