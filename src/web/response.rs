//! Mapping gateway results to HTTP responses.

use axum::http::header::SET_COOKIE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;

use crate::envelope::Envelope;
use crate::gateway::Outcome;

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Outcome::Redirect(path) => Redirect::to(&path).into_response(),
            Outcome::Respond(envelope) => envelope.into_response(),
        }
    }
}

/// Appends each value as its own `Set-Cookie` header.
pub(crate) fn with_cookies(mut response: Response, cookies: &[String]) -> Response {
    for cookie in cookies {
        match HeaderValue::from_str(cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(error = %e, "dropping unencodable Set-Cookie value"),
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;
    use serde_json::json;

    #[test]
    fn envelope_status_becomes_response_status() {
        let response = Envelope::failure(404, "Not Found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = Envelope::success(201, json!({"id": 1})).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn invalid_status_falls_back_to_500() {
        let response = Envelope::failure(1000, "odd").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn redirect_outcome_sets_location() {
        let response = Outcome::Redirect("/login".into()).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/login");
    }

    #[test]
    fn cookies_are_appended_not_replaced() {
        let response = with_cookies(
            Envelope::success(200, json!({})).into_response(),
            &["a=; Max-Age=0".to_string(), "b=; Max-Age=0".to_string()],
        );
        assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 2);
    }
}
