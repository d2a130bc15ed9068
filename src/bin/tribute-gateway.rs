//! Tributestream gateway binary.
//!
//! Serves the guarded routes from [`tribute_gateway::web`] and forwards them to
//! the WordPress API at `TRIBUTE_BASE_URL`.
//!
//! # Environment variables
//!
//! | Variable                         | Default            | Description                          |
//! |----------------------------------|--------------------|--------------------------------------|
//! | `TRIBUTE_BASE_URL`               | (required)         | WordPress REST root, e.g. `https://host/wp-json` |
//! | `TRIBUTE_NAMESPACE`              | `tributestream/v1` | Namespace for tribute endpoints      |
//! | `TRIBUTE_AUTH_NAMESPACE`         | `jwt-auth/v1`      | Namespace for token endpoints        |
//! | `TRIBUTE_LOGIN_PATH`             | `/login`           | Redirect target for anonymous users  |
//! | `TRIBUTE_COOKIE_KEYS`            | `auth_token,jwt`   | Session cookie names, in lookup order |
//! | `TRIBUTE_UPSTREAM_TIMEOUT_SECS`  | `10`               | Per-call upstream timeout            |
//! | `TRIBUTE_NETWORK_FAILURE_STATUS` | `500`              | Status reported when upstream is unreachable |
//! | `TRIBUTE_LISTEN_PORT`            | `8080`             | TCP port to listen on                |
//! | `RUST_LOG`                       | `info`             | Log filter (tracing-subscriber)      |

use std::process::ExitCode;

use tribute_gateway::web::{router, AppState};
use tribute_gateway::{logging, Gateway, GatewayConfig};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    let port = config.listen_port();

    tracing::info!(
        base_url = %config.base_url(),
        namespace = %config.namespace(),
        timeout_secs = config.upstream_timeout().as_secs(),
        "gateway starting"
    );

    let gateway = match Gateway::new(config) {
        Ok(gateway) => gateway,
        Err(e) => {
            tracing::error!(error = %e, "failed to build gateway");
            return ExitCode::FAILURE;
        }
    };

    let app = router(AppState::new(gateway));
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(port, error = %e, "failed to bind TCP listener");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(port, "listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
