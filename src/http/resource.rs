use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use super::ApiError;
use crate::clients::ResourceClient;
use crate::domain::{Order, Product};
use crate::store::{Entity, EntityId, StoreError, Version};

/// An entity exposed over HTTP under `/api/{PATH}`.
pub trait Resource: Entity + Serialize + DeserializeOwned {
    const PATH: &'static str;
}

impl Resource for Product {
    const PATH: &'static str = "products";
}

impl Resource for Order {
    const PATH: &'static str = "orders";
}

pub fn routes<T: Resource>(client: ResourceClient<T>) -> Router {
    let collection = format!("/api/{}", T::PATH);
    let member = format!("{collection}/{{id}}");

    Router::new()
        .route(&collection, get(list::<T>).post(create::<T>))
        .route(
            &member,
            get(fetch::<T>)
                .head(check_exists::<T>)
                .put(update::<T>)
                .delete(remove::<T>),
        )
        .with_state(client)
}

async fn list<T: Resource>(State(client): State<ResourceClient<T>>) -> Json<Vec<T>> {
    Json(client.list().await)
}

async fn fetch<T: Resource>(
    State(client): State<ResourceClient<T>>,
    path: Result<Path<EntityId>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = path.map_err(bad_id)?;
    let found = client.get(id).await?;
    Ok(([(header::ETAG, etag(found.version))], Json(found.entity)).into_response())
}

async fn create<T: Resource>(
    State(client): State<ResourceClient<T>>,
    body: Result<Json<T>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(entity) = body.map_err(malformed)?;
    let created = client.create(entity).await?;

    let location = format!("/api/{}/{}", T::PATH, created.entity.id());
    Ok((
        StatusCode::CREATED,
        [
            (header::LOCATION, location),
            (header::ETAG, etag(created.version)),
        ],
        Json(created.entity),
    )
        .into_response())
}

async fn update<T: Resource>(
    State(client): State<ResourceClient<T>>,
    path: Result<Path<EntityId>, PathRejection>,
    headers: HeaderMap,
    body: Result<Json<T>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = path.map_err(bad_id)?;
    let expected = if_match(&headers)?;
    let Json(entity) = body.map_err(malformed)?;
    let version = client.update(id, entity, expected).await?;

    Ok((
        [(header::ETAG, etag(version))],
        Json(json!({ "message": "Updated successfully" })),
    )
        .into_response())
}

async fn remove<T: Resource>(
    State(client): State<ResourceClient<T>>,
    path: Result<Path<EntityId>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = path.map_err(bad_id)?;
    client.delete(id).await?;
    Ok(Json(json!({ "message": "Deleted successfully" })).into_response())
}

/// `HEAD /api/{PATH}/{id}`: 200 when the entity exists, 404 otherwise.
async fn check_exists<T: Resource>(
    State(client): State<ResourceClient<T>>,
    path: Result<Path<EntityId>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path.map_err(bad_id)?;
    if client.exists(id).await {
        Ok(StatusCode::OK)
    } else {
        Err(StoreError::NotFound {
            entity: T::NAME,
            id,
        }
        .into())
    }
}

fn malformed(rejection: JsonRejection) -> ApiError {
    ApiError::MalformedBody(rejection.body_text())
}

fn bad_id(rejection: PathRejection) -> ApiError {
    ApiError::InvalidPath(rejection.body_text())
}

fn etag(version: Version) -> String {
    format!("\"{version}\"")
}

/// Reads the expected version from `If-Match`. Every update must name one;
/// `*` names no version and is refused.
fn if_match(headers: &HeaderMap) -> Result<Version, ApiError> {
    let value = headers
        .get(header::IF_MATCH)
        .ok_or(ApiError::PreconditionRequired)?;
    let invalid = || {
        ApiError::InvalidPrecondition(format!("If-Match must be a version ETag, got {value:?}"))
    };

    let raw = value.to_str().map_err(|_| invalid())?.trim();
    let tag = raw.strip_prefix("W/").unwrap_or(raw);
    tag.trim_matches('"')
        .parse::<u64>()
        .map(Version::new)
        .map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use rstest::rstest;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::IF_MATCH, HeaderValue::from_static(value));
        headers
    }

    #[rstest]
    #[case("\"3\"", 3)]
    #[case("W/\"3\"", 3)]
    #[case("12", 12)]
    fn if_match_yields_expected_version(#[case] raw: &'static str, #[case] expected: u64) {
        assert_eq!(if_match(&headers_with(raw)).unwrap(), Version::new(expected));
    }

    #[test]
    fn missing_if_match_is_required() {
        assert!(matches!(
            if_match(&HeaderMap::new()),
            Err(ApiError::PreconditionRequired)
        ));
    }

    #[rstest]
    #[case("\"abc\"")]
    #[case("*")]
    fn unusable_if_match_is_rejected(#[case] raw: &'static str) {
        assert!(matches!(
            if_match(&headers_with(raw)),
            Err(ApiError::InvalidPrecondition(_))
        ));
    }

    #[test]
    fn etag_quotes_the_version() {
        assert_eq!(etag(Version::new(5)), "\"5\"");
    }
}
