//! HTTP API of the license validation service.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::{error, info, warn};
use tuneup_db::LicenseDb;
use tuneup_types::{ActivationKey, CheckResponse, Fingerprint, Verdict};

/// Shared state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub db: LicenseDb,
}

/// Query string of `GET /check_license`.
///
/// Both fields are optional at the extractor level so that a missing value
/// is answered with the service's own 400 body rather than axum's rejection.
#[derive(Debug, Default, Deserialize)]
pub struct CheckQuery {
    pub key: Option<String>,
    pub hash: Option<String>,
}

impl CheckQuery {
    /// Values are compared exactly as sent; `hash=" h1"` is not `h1`.
    fn parse(&self) -> Option<(ActivationKey, Fingerprint)> {
        let key = ActivationKey::from_wire(self.key.as_deref()?).ok()?;
        let fingerprint = Fingerprint::from_wire(self.hash.as_deref()?).ok()?;
        Some((key, fingerprint))
    }

    fn key_for_log(&self) -> String {
        self.key
            .as_deref()
            .and_then(|k| ActivationKey::from_wire(k).ok())
            .map_or_else(|| "-".to_string(), |k| k.redacted())
    }
}

/// Evaluates one check request against the database.
///
/// The database call runs on the blocking pool; it holds a SQLite write
/// transaction for its whole duration.
pub async fn evaluate(db: LicenseDb, query: &CheckQuery) -> Verdict {
    let Some((key, fingerprint)) = query.parse() else {
        return Verdict::MissingParameter;
    };

    let joined = tokio::task::spawn_blocking({
        let key = key.clone();
        move || db.check_and_bind(&key, &fingerprint)
    })
    .await;

    match joined {
        Ok(Ok(verdict)) => verdict,
        Ok(Err(e)) => {
            error!(key = %key.redacted(), error = %e, "license check failed");
            Verdict::InternalError
        }
        Err(e) => {
            error!(key = %key.redacted(), error = %e, "license check task failed");
            Verdict::InternalError
        }
    }
}

async fn check_license_handler(
    State(state): State<AppState>,
    Query(query): Query<CheckQuery>,
) -> (StatusCode, Json<CheckResponse>) {
    let verdict = evaluate(state.db, &query).await;
    let key = query.key_for_log();
    if verdict.is_valid() {
        info!(%key, %verdict, "license check");
    } else {
        warn!(%key, %verdict, "license check");
    }

    let status = StatusCode::from_u16(verdict.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(CheckResponse::from(verdict)))
}

/// Build the HTTP API router over the given license database.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/check_license", get(check_license_handler))
        .with_state(state)
}
