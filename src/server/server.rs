use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use tracing::{error, info};

use super::state::ServerState;
use crate::analysis::analyze_playlist;
use crate::config::AppConfig;
use crate::spotify::{
    auth::new_login_state, AccountsClient, LoginStateStore, SpotifyApi, SpotifyError,
};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    Json(stats)
}

async fn login(State(state): State<ServerState>) -> Response {
    let login_state = new_login_state();
    state.login_states.store(login_state.clone()).await;
    let url = state.accounts.authorize_url(&login_state);
    Redirect::temporary(&url).into_response()
}

#[derive(Deserialize)]
struct CallbackQuery {
    code: String,
    state: String,
}

async fn callback(
    State(state): State<ServerState>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if !state.login_states.take(&query.state).await {
        return error_response(StatusCode::BAD_REQUEST, "unknown or expired login state");
    }

    match state.accounts.exchange_code(&query.code).await {
        Ok(tokens) => {
            info!("Authorization code exchanged");
            Json(tokens).into_response()
        }
        Err(err) => spotify_error_response(err),
    }
}

#[derive(Deserialize)]
struct RefreshBody {
    refresh_token: String,
}

/// The refresh grant needs the client secret, so it has to run server-side;
/// the frontend posts the refresh token here and gets fresh tokens back.
async fn refresh(
    State(state): State<ServerState>,
    Json(body): Json<RefreshBody>,
) -> Response {
    if body.refresh_token.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "refresh_token must not be empty");
    }

    match state.accounts.refresh_access_token(&body.refresh_token).await {
        Ok(tokens) => {
            info!("Access token refreshed");
            Json(tokens).into_response()
        }
        Err(err) => spotify_error_response(err),
    }
}

#[derive(Deserialize)]
struct OutlierQuery {
    threshold: Option<f64>,
}

async fn get_playlist_outliers(
    State(state): State<ServerState>,
    Path(playlist_id): Path<String>,
    Query(query): Query<OutlierQuery>,
    headers: HeaderMap,
) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return error_response(StatusCode::UNAUTHORIZED, "missing bearer token");
    };

    let threshold = query.threshold.unwrap_or(state.default_threshold);
    if !threshold.is_finite() || threshold <= 0.0 {
        return error_response(StatusCode::BAD_REQUEST, "threshold must be positive");
    }

    match analyze_playlist(state.spotify.as_ref(), &playlist_id, token, threshold).await {
        // An empty list is a valid outcome: nothing unusual in the playlist.
        Ok(outliers) => Json(outliers).into_response(),
        Err(err) => spotify_error_response(err),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn spotify_error_response(err: SpotifyError) -> Response {
    let status = match &err {
        SpotifyError::MissingCredential | SpotifyError::Unauthorized => StatusCode::UNAUTHORIZED,
        SpotifyError::Forbidden => StatusCode::FORBIDDEN,
        SpotifyError::NotFound(_) => StatusCode::NOT_FOUND,
        SpotifyError::Upstream(_) => StatusCode::BAD_GATEWAY,
    };
    if status == StatusCode::BAD_GATEWAY {
        error!("Upstream failure: {}", err);
    }
    error_response(status, &err.to_string())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

pub fn make_app(state: ServerState, frontend_dir_path: Option<String>) -> Router {
    let auth_routes: Router = Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/refresh", post(refresh))
        .with_state(state.clone());

    let playlist_routes: Router = Router::new()
        .route("/{id}/outliers", get(get_playlist_outliers))
        .with_state(state.clone());

    let mut app: Router = Router::new()
        .route("/", get(home))
        .with_state(state)
        .nest("/api/auth", auth_routes)
        .nest("/api/playlists", playlist_routes);

    if let Some(dir) = frontend_dir_path {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

pub async fn run_server(
    config: &AppConfig,
    spotify: Arc<dyn SpotifyApi>,
    accounts: Arc<AccountsClient>,
    login_states: Arc<LoginStateStore>,
) -> anyhow::Result<()> {
    let state = ServerState::new(
        spotify,
        accounts,
        login_states,
        config.default_threshold,
    );
    let app = make_app(state, config.frontend_dir_path.clone());

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", config.port)).await?;

    Ok(axum::serve(listener, app).await?)
}
