use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::validation::{
    self, LoginBody, LoginCredentials, Registration, RegistrationBody, ValidationError,
    ValidationResult,
};

/// A payload type that can be checked from its raw, lenient body form
pub trait Validate: Sized {
    type Raw: DeserializeOwned + Default;

    fn validate(raw: Self::Raw) -> ValidationResult<Self>;
}

impl Validate for Registration {
    type Raw = RegistrationBody;

    fn validate(raw: RegistrationBody) -> ValidationResult<Self> {
        validation::validate_registration(raw)
    }
}

impl Validate for LoginCredentials {
    type Raw = LoginBody;

    fn validate(raw: LoginBody) -> ValidationResult<Self> {
        validation::validate_login(raw)
    }
}

/// JSON body that has passed its validator.
///
/// A missing or unparseable body is validated as an empty object, so it fails
/// on the first rule rather than with a framework rejection.
#[derive(Debug)]
pub struct Validated<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Validated<T>
where
    T: Validate + Send,
    T::Raw: Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let raw = match Json::<T::Raw>::from_request(req, state).await {
            Ok(Json(raw)) => raw,
            Err(JsonRejection::MissingJsonContentType(_)) => {
                tracing::info!(
                    "Body ignored: Content-Type is not application/json, validating as empty"
                );
                T::Raw::default()
            }
            Err(rejection) => {
                tracing::debug!("Unreadable JSON body, validating as empty: {}", rejection);
                T::Raw::default()
            }
        };

        match T::validate(raw) {
            Ok(value) => Ok(Validated(value)),
            Err(err) => {
                tracing::info!("Payload rejected: {} ({})", err, err.field());
                Err(err.into())
            }
        }
    }
}

/// Positive integer `:id` path parameter
#[derive(Debug, Clone, Copy)]
pub struct ValidUserId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for ValidUserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::from(ValidationError::InvalidId))?;

        validation::validate_identifier(&raw).map(ValidUserId).map_err(|err| {
            tracing::info!("Rejected user id {:?}", raw);
            err.into()
        })
    }
}
