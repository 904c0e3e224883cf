//! HTTP surface of the site.
//!
//! Routes:
//! - `GET /`, `/about`, `/visit`, `/ministries`, `/ministries/{slug}`,
//!   `/missions`, `/sermons`, `/contact`: rendered pages, served from the
//!   [`PageCache`] until their revalidation interval passes
//! - `POST /contact`: urlencoded form submit, answers with the contact page
//!   and an inline result line
//! - `POST /api/contact`: JSON submit, answers `{success, message | error}`
//! - `GET /api/events`: carousel slides as JSON
//! - `GET /static/style.css`, `/static/carousel.js`: embedded assets
//! - `GET /healthz`: liveness and whether store credentials are set
//!
//! Anything else gets the 404 page. Read failures never surface here; the
//! renderers fall back to compiled content on their own.

use crate::cache::{CachedPage, PageCache};
use crate::contact::{self, ContactError, ContactForm, ContactResponse, SUCCESS_MESSAGE, ValidationError};
use crate::naming::is_slug;
use crate::pages::FormNotice;
use crate::render::{CAROUSEL_JS, SiteContext};
use crate::store::RecordStore;
use crate::types::Page;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Form, Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, ETAG, IF_NONE_MATCH};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

/// Shared state for request handlers.
pub struct ApiState {
    pub site: SiteContext,
    pub cache: PageCache,
}

impl ApiState {
    pub fn new(site: SiteContext) -> Self {
        Self {
            site,
            cache: PageCache::new(),
        }
    }

    fn store(&self) -> Option<&dyn RecordStore> {
        let store: &dyn RecordStore = self.site.resolver.store()?.as_ref();
        Some(store)
    }

    fn phone(&self) -> &str {
        &self.site.config.church.phone
    }
}

/// Build the router with all routes.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/visit", get(visit))
        .route("/ministries", get(ministries))
        .route("/ministries/{slug}", get(ministry))
        .route("/missions", get(missions))
        .route("/sermons", get(sermons))
        .route("/contact", get(contact_page).post(contact_submit))
        .route("/api/contact", post(api_contact))
        .route("/api/events", get(api_events))
        .route("/static/{file}", get(static_asset))
        .route("/healthz", get(healthz))
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                // Only log client and server errors
                .on_request(())
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: Duration,
                     _span: &tracing::Span| {
                        let status = response.status();
                        if status.is_client_error() || status.is_server_error() {
                            tracing::warn!(
                                status = %status,
                                latency_ms = latency.as_millis(),
                                "request failed"
                            );
                        }
                    },
                ),
        )
        .with_state(state)
}

/// Start the server and run until Ctrl-C.
pub async fn serve(state: Arc<ApiState>, bind_addr: &str) -> std::io::Result<()> {
    let app = router(state.clone());
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    tracing::info!(
        store_configured = state.site.resolver.is_configured(),
        "{} listening on {}",
        state.site.config.church.short_name,
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("page cache: {}", state.cache.stats());
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

// ============================================================================
// Caching helpers
// ============================================================================

pub fn cache_control(revalidate_secs: u64) -> String {
    format!("public, max-age=0, s-maxage={revalidate_secs}")
}

fn if_none_match(headers: &HeaderMap) -> Option<&str> {
    headers.get(IF_NONE_MATCH).and_then(|v| v.to_str().ok())
}

fn cached_response(
    page: &CachedPage,
    content_type: &'static str,
    revalidate_secs: u64,
    headers: &HeaderMap,
) -> Response {
    let cache_headers = [
        (ETAG, page.etag.clone()),
        (CACHE_CONTROL, cache_control(revalidate_secs)),
    ];
    if if_none_match(headers).is_some_and(|tag| page.matches(tag)) {
        return (StatusCode::NOT_MODIFIED, cache_headers).into_response();
    }
    (
        cache_headers,
        [(CONTENT_TYPE, content_type)],
        page.html.clone(),
    )
        .into_response()
}

const HTML: &str = "text/html; charset=utf-8";

async fn serve_page(state: &ApiState, page: Page, headers: &HeaderMap) -> Response {
    let path = page.path();
    let revalidate = page.revalidate(&state.site.config.revalidate);
    let max_age = Duration::from_secs(revalidate);

    let cached = match state.cache.get_fresh(&path, max_age).await {
        Some(cached) => cached,
        None => match state.site.render_page(&page).await {
            Some(rendered) => state.cache.store(&path, rendered.html).await,
            None => return not_found_response(state),
        },
    };
    cached_response(&cached, HTML, revalidate, headers)
}

fn not_found_response(state: &ApiState) -> Response {
    (StatusCode::NOT_FOUND, Html(state.site.render_not_found())).into_response()
}

// ============================================================================
// Page handlers
// ============================================================================

async fn home(State(state): State<Arc<ApiState>>, headers: HeaderMap) -> Response {
    serve_page(&state, Page::Home, &headers).await
}

async fn about(State(state): State<Arc<ApiState>>, headers: HeaderMap) -> Response {
    serve_page(&state, Page::About, &headers).await
}

async fn visit(State(state): State<Arc<ApiState>>, headers: HeaderMap) -> Response {
    serve_page(&state, Page::Visit, &headers).await
}

async fn ministries(State(state): State<Arc<ApiState>>, headers: HeaderMap) -> Response {
    serve_page(&state, Page::Ministries, &headers).await
}

async fn ministry(
    State(state): State<Arc<ApiState>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !is_slug(&slug) {
        return not_found_response(&state);
    }
    serve_page(&state, Page::Ministry(slug), &headers).await
}

async fn missions(State(state): State<Arc<ApiState>>, headers: HeaderMap) -> Response {
    serve_page(&state, Page::Missions, &headers).await
}

async fn sermons(State(state): State<Arc<ApiState>>, headers: HeaderMap) -> Response {
    serve_page(&state, Page::Sermons, &headers).await
}

async fn contact_page(State(state): State<Arc<ApiState>>, headers: HeaderMap) -> Response {
    serve_page(&state, Page::Contact, &headers).await
}

async fn not_found(State(state): State<Arc<ApiState>>) -> Response {
    not_found_response(&state)
}

// ============================================================================
// Contact submission
// ============================================================================

async fn contact_submit(
    State(state): State<Arc<ApiState>>,
    Form(form): Form<ContactForm>,
) -> Response {
    let outcome = contact::submit(state.store(), &form, Utc::now()).await;
    let html = match &outcome {
        Ok(_) => state.site.render_contact(
            &ContactForm::default(),
            Some(&FormNotice::Success(SUCCESS_MESSAGE.to_string())),
        ),
        Err(err) => state
            .site
            .render_contact(&form, Some(&FormNotice::Error(err.user_message(state.phone())))),
    };
    ([(CACHE_CONTROL, "no-store")], Html(html)).into_response()
}

async fn api_contact(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<ContactForm>, JsonRejection>,
) -> Response {
    let outcome = match body {
        Ok(Json(form)) => contact::submit(state.store(), &form, Utc::now()).await,
        Err(rejection) => {
            tracing::warn!("malformed contact body: {rejection}");
            Err(ContactError::Validation(ValidationError::MissingField))
        }
    };
    let status = match &outcome {
        Ok(_) => StatusCode::OK,
        Err(ContactError::Validation(_)) => StatusCode::BAD_REQUEST,
        Err(ContactError::SubmissionFailed) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let response = ContactResponse::from_outcome(&outcome, state.phone());
    (status, [(CACHE_CONTROL, "no-store")], Json(response)).into_response()
}

// ============================================================================
// Feeds and assets
// ============================================================================

const EVENTS_PATH: &str = "/api/events";

async fn api_events(State(state): State<Arc<ApiState>>, headers: HeaderMap) -> Response {
    let revalidate = state.site.config.revalidate.events;
    let max_age = Duration::from_secs(revalidate);

    let cached = match state.cache.get_fresh(EVENTS_PATH, max_age).await {
        Some(cached) => cached,
        None => {
            let (items, _) = state.site.events(Utc::now()).await;
            let body = match serde_json::to_string(&items) {
                Ok(body) => body,
                Err(e) => {
                    tracing::error!("failed to encode events feed: {e}");
                    "[]".to_string()
                }
            };
            state.cache.store(EVENTS_PATH, body).await
        }
    };
    cached_response(&cached, "application/json", revalidate, &headers)
}

const ASSET_CACHE: &str = "public, max-age=31536000, immutable";

async fn static_asset(State(state): State<Arc<ApiState>>, Path(file): Path<String>) -> Response {
    let (content_type, body) = match file.as_str() {
        "style.css" => ("text/css; charset=utf-8", state.site.style_css().to_string()),
        "carousel.js" => ("text/javascript; charset=utf-8", CAROUSEL_JS.to_string()),
        _ => return not_found_response(&state),
    };
    ([(CONTENT_TYPE, content_type), (CACHE_CONTROL, ASSET_CACHE)], body).into_response()
}

async fn healthz(State(state): State<Arc<ApiState>>) -> Response {
    Json(serde_json::json!({
        "status": "ok",
        "store_configured": state.site.resolver.is_configured(),
    }))
    .into_response()
}
