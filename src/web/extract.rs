//! Building a [`RequestContext`] from axum request parts.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::request::RequestContext;

/// Header carrying a caller-supplied request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(context_from_headers(&parts.headers))
    }
}

pub(crate) fn context_from_headers(headers: &HeaderMap) -> RequestContext {
    let mut ctx = RequestContext::new(request_id(headers));

    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        if name == COOKIE {
            ctx.add_cookie_header(value);
        } else {
            ctx.add_header(name.as_str(), value);
        }
    }

    ctx
}

fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_REQUEST_ID_LEN
                && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}
