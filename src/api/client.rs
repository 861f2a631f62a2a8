//! Minimal JSON-over-HTTP client that dispatches into an in-process router.

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{Method, Request, header};
use http_body_util::BodyExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tower::ServiceExt;
use tracing::debug;

use crate::api::ApiError;

/// HTTP client whose "network" is an axum [`Router`].
///
/// URLs are relative to the API root (`api/heroes`, `api/heroes/12`).
#[derive(Clone)]
pub struct HttpClient {
    router: Router,
}

impl HttpClient {
    pub const fn new(router: Router) -> Self {
        Self { router }
    }

    /// GET `url` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let bytes = self.send(Method::GET, url, None).await?;
        decode(url, &bytes)
    }

    /// PUT `body` as JSON, ignoring any response body.
    pub async fn put_json<B: Serialize>(&self, url: &str, body: &B) -> Result<(), ApiError> {
        let payload = encode(url, body)?;
        self.send(Method::PUT, url, Some(payload)).await?;
        Ok(())
    }

    /// POST `body` as JSON and decode the JSON response.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let payload = encode(url, body)?;
        let bytes = self.send(Method::POST, url, Some(payload)).await?;
        decode(url, &bytes)
    }

    /// POST without a body, ignoring any response body.
    pub async fn post(&self, url: &str) -> Result<(), ApiError> {
        self.send(Method::POST, url, None).await?;
        Ok(())
    }

    pub async fn delete(&self, url: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }

    async fn send(&self, method: Method, url: &str, body: Option<Vec<u8>>) -> Result<Bytes, ApiError> {
        let transport = |message: String| ApiError::Transport {
            url: url.to_string(),
            message,
        };

        let builder = Request::builder()
            .method(method.clone())
            .uri(format!("/{url}"));
        let request = match body {
            Some(payload) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload)),
            None => builder.body(Body::empty()),
        }
        .map_err(|e| transport(e.to_string()))?;

        debug!(%method, url, "Sending request");
        let response = match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| transport(e.to_string()))?
            .to_bytes();

        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(bytes)
    }
}

fn encode<B: Serialize>(url: &str, body: &B) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(body).map_err(|source| ApiError::Encode {
        url: url.to_string(),
        source,
    })
}

fn decode<T: DeserializeOwned>(url: &str, bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::routing::get;

    use super::*;

    fn client() -> HttpClient {
        HttpClient::new(
            Router::new()
                .route("/ok", get(|| async { r#"{"value":1}"# }))
                .route("/garbage", get(|| async { "<html>" }))
                .route("/teapot", get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout") })),
        )
    }

    #[derive(Debug, serde::Deserialize)]
    struct Payload {
        value: u32,
    }

    #[tokio::test]
    async fn test_get_json() {
        let payload: Payload = client().get_json("ok").await.unwrap();
        assert_eq!(payload.value, 1);
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let error = client().get_json::<Payload>("teapot").await.unwrap_err();
        assert_eq!(error.status(), Some(StatusCode::IM_A_TEAPOT));
        match error {
            ApiError::Status { body, .. } => assert_eq!(body, "short and stout"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let error = client().delete("missing").await.unwrap_err();
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn test_decode_failure() {
        let error = client().get_json::<Payload>("garbage").await.unwrap_err();
        assert!(matches!(error, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_invalid_uri_is_transport_error() {
        let error = client().get_json::<Payload>("has space").await.unwrap_err();
        assert!(matches!(error, ApiError::Transport { .. }));
    }
}
