use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};

use super::render::DashboardPage;
use crate::errors::MemoryError;
use crate::memory::MemoryBank;

pub const OPEN_WORK_LIMIT: usize = 50;
pub const CRITICAL_LIMIT: usize = 20;
pub const LANDMINE_LIMIT: usize = 20;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub bank: MemoryBank,
    /// Store path as shown on the index page.
    pub db_label: String,
}

pub type SharedState = Arc<AppState>;

// ── Error handling ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

impl From<MemoryError> for ApiError {
    fn from(err: MemoryError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Run a store query on the blocking pool. Each call opens and closes its
/// own connection inside the closure.
async fn query<T, F>(state: &SharedState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&MemoryBank) -> crate::errors::Result<T> + Send + 'static,
{
    let bank = state.bank.clone();
    let result = tokio::task::spawn_blocking(move || f(&bank))
        .await
        .map_err(|e| ApiError::Internal(format!("query task failed: {e}")))?;
    result.map_err(|e| {
        tracing::warn!(error = %e, "dashboard query failed");
        ApiError::from(e)
    })
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/open-work", get(open_work))
        .route("/api/defects/critical", get(critical_defects))
        .route("/api/landmines", get(landmines))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn index(State(state): State<SharedState>) -> Result<Html<String>, ApiError> {
    let (work, critical, landmines) = query(&state, |bank| {
        Ok((
            bank.open_work(OPEN_WORK_LIMIT)?,
            bank.critical_open_defects(CRITICAL_LIMIT)?,
            bank.recent_landmines(LANDMINE_LIMIT, None)?,
        ))
    })
    .await?;

    let page = DashboardPage {
        db_label: &state.db_label,
        open_work: &work,
        critical_defects: &critical,
        landmines: &landmines,
    };
    Ok(Html(page.render()))
}

async fn open_work(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let work = query(&state, |bank| bank.open_work(OPEN_WORK_LIMIT)).await?;
    Ok(Json(work))
}

async fn critical_defects(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    let defects = query(&state, |bank| bank.critical_open_defects(CRITICAL_LIMIT)).await?;
    Ok(Json(defects))
}

async fn landmines(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let landmines = query(&state, |bank| bank.recent_landmines(LANDMINE_LIMIT, None)).await?;
    Ok(Json(landmines))
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::db::test_bank;
    use crate::memory::{NewDefect, NewLandmine, NewStory, Severity};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_app() -> (TempDir, MemoryBank, Router) {
        let (dir, bank) = test_bank();
        let state = Arc::new(AppState {
            bank: bank.clone(),
            db_label: bank.path().display().to_string(),
        });
        (dir, bank, api_router().with_state(state))
    }

    async fn get_uri(app: Router, uri: &str) -> Response {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app.oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (_dir, _bank, app) = test_app();
        let response = get_uri(app, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_open_work_json() {
        let (_dir, bank, app) = test_app();
        bank.create_story(NewStory::new("Ship").priority(1)).unwrap();
        bank.create_defect(NewDefect::new("Crash", Severity::Major))
            .unwrap();

        let response = get_uri(app, "/api/open-work").await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let items = json.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["kind"], "story");
        assert_eq!(items[1]["kind"], "defect");
        assert_eq!(items[1]["priority"], 2);
    }

    #[tokio::test]
    async fn test_critical_defects_json() {
        let (_dir, bank, app) = test_app();
        bank.create_defect(NewDefect::new("Minor", Severity::Minor))
            .unwrap();
        bank.create_defect(NewDefect::new("Outage", Severity::Critical))
            .unwrap();

        let json = body_json(get_uri(app, "/api/defects/critical").await).await;
        let items = json.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "Outage");
        assert_eq!(items[0]["severity"], "critical");
    }

    #[tokio::test]
    async fn test_landmines_json() {
        let (_dir, bank, app) = test_app();
        bank.create_landmine(NewLandmine::new("Lock contention"))
            .unwrap();
        let json = body_json(get_uri(app, "/api/landmines").await).await;
        assert_eq!(json[0]["summary"], "Lock contention");
    }

    #[tokio::test]
    async fn test_index_renders_escaped_html() {
        let (_dir, bank, app) = test_app();
        bank.create_story(NewStory::new("<b>bold</b>")).unwrap();

        let response = get_uri(app, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Clide Dashboard"));
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(html.contains("memory_bank.db"));
    }

    #[tokio::test]
    async fn test_store_failure_is_internal_error() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be opened as a database file.
        let state = Arc::new(AppState {
            bank: MemoryBank::new(dir.path()),
            db_label: "broken".into(),
        });
        let app = api_router().with_state(state);
        let response = get_uri(app, "/api/open-work").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(json["error"].is_string());
    }
}
