//! Request extraction
//!
//! [`ActionRequest`] collects everything an action reads from an HTTP
//! request: the matched route template plus path, query and JSON body
//! parameters merged into one [`RawParams`] map.

use axum::{
    body::Bytes,
    extract::{
        rejection::PathRejection, FromRequest, FromRequestParts, MatchedPath, Path, Query, Request,
    },
};
use serde_json::Value;

use super::error::ActionError;
use super::params::RawParams;

/// Parameters and route of one request
#[derive(Debug, Clone, Default)]
pub struct ActionRequest {
    /// Route template that matched, e.g. `/orders/{id}`
    pub matched_path: Option<String>,
    /// Path, query and body parameters merged
    pub raw: RawParams,
}

impl<St> FromRequest<St> for ActionRequest
where
    St: Send + Sync,
{
    type Rejection = ActionError;

    async fn from_request(req: Request, state: &St) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        let matched_path = parts
            .extensions
            .get::<MatchedPath>()
            .map(|path| path.as_str().to_string());

        // Routes without parameters have nothing to extract
        let path = match Path::<Vec<(String, String)>>::from_request_parts(&mut parts, state).await
        {
            Ok(Path(params)) => params,
            Err(PathRejection::MissingPathParams(_)) => Vec::new(),
            Err(e) => return Err(ActionError::invalid_input(e.body_text())),
        };

        let Query(query) = Query::<Vec<(String, String)>>::from_request_parts(&mut parts, state)
            .await
            .map_err(|e| ActionError::invalid_input(e.body_text()))?;

        let req = Request::from_parts(parts, body);
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ActionError::invalid_input(e.body_text()))?;

        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            let value: Value = serde_json::from_slice(&bytes)
                .map_err(|e| ActionError::invalid_input(format!("Invalid JSON body: {e}")))?;
            Some(value)
        };

        let raw = RawParams::merge(path, query, body)?;
        Ok(Self { matched_path, raw })
    }
}
