//! axum binding for the gateway.
//!
//! This module is the only place that knows about a web framework. It:
//! - builds a [`RequestContext`](crate::RequestContext) from request parts
//!   (cookies, headers, request id)
//! - maps [`Envelope`](crate::Envelope) and [`Outcome`](crate::Outcome) to
//!   HTTP responses
//! - declares each route's [`RouteRequirement`](crate::RouteRequirement)
//!
//! Authorization still happens in [`Gateway::guard`](crate::Gateway::guard);
//! handlers only act on the decision.
//!
//! # Example
//!
//! ```no_run
//! use tribute_gateway::{Gateway, GatewayConfig};
//! use tribute_gateway::web::{router, AppState};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::new("https://example.com/wp-json");
//! let app = router(AppState::new(Gateway::new(config)?));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

mod extract;
mod response;
mod routes;

pub use extract::REQUEST_ID_HEADER;
pub use routes::{router, AppState};
