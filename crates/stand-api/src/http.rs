use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use stand_model::{ActionToken, ArtifactReference, Requester, ResourceKey};

use crate::{error::ApiError, handler::ApiHandler};

/// HTTP API service builder.
pub struct HttpApi<H> {
    handler: Arc<H>,
    #[cfg(feature = "metrics")]
    registry: Option<stand_prometheus::Registry>,
}

impl<H> HttpApi<H>
where
    H: ApiHandler,
{
    pub fn new(handler: Arc<H>) -> Self {
        Self {
            handler,
            #[cfg(feature = "metrics")]
            registry: None,
        }
    }

    /// Also serve `GET /metrics` from `registry`.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, registry: stand_prometheus::Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Build axum router with mounted endpoints.
    ///
    /// Routes:
    /// - GET /api/v1/session - Session snapshot
    /// - POST /api/v1/artifacts - Submit archive
    /// - POST /api/v1/queue/join, /leave, /advance - Queue actions
    /// - POST /api/v1/session/reset - Forget session and queue
    /// - POST /api/v1/resources/{key}/delete - Remove a deployed resource
    /// - POST /api/v1/actions - Pressed action button
    pub fn router(self) -> Router {
        let router = Router::new()
            .route("/api/v1/session", get(get_session::<H>))
            .route("/api/v1/artifacts", post(submit_artifact::<H>))
            .route("/api/v1/queue/join", post(join_queue::<H>))
            .route("/api/v1/queue/leave", post(leave_queue::<H>))
            .route("/api/v1/queue/advance", post(advance_queue::<H>))
            .route("/api/v1/session/reset", post(reset_session::<H>))
            .route("/api/v1/resources/{key}/delete", post(delete_resource::<H>))
            .route("/api/v1/actions", post(handle_action::<H>));

        #[cfg(feature = "metrics")]
        let router = match self.registry {
            Some(registry) => router.route(
                "/metrics",
                get(move || {
                    let registry = registry.clone();
                    async move { render_metrics(&registry) }
                }),
            ),
            None => router,
        };

        router.with_state(self.handler)
    }
}

#[cfg(feature = "metrics")]
fn render_metrics(registry: &stand_prometheus::Registry) -> Result<impl IntoResponse + use<>, ApiError> {
    use stand_prometheus::{Encoder, TextEncoder};

    let encoder = TextEncoder::new();
    let mut buf = Vec::new();
    encoder
        .encode(&registry.gather(), &mut buf)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let content_type = encoder.format_type().to_string();
    Ok(([(axum::http::header::CONTENT_TYPE, content_type)], buf))
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionQuery {
    requester_id: Option<String>,
    requester_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RequesterBody {
    requester: Requester,
}

#[derive(Debug, Deserialize)]
struct SubmitArtifactRequest {
    requester: Requester,
    #[serde(flatten)]
    artifact: ArtifactReference,
}

#[derive(Debug, Deserialize)]
struct ActionRequest {
    requester: Requester,
    token: String,
}

#[derive(Debug, Serialize)]
struct AcceptedResponse {
    accepted: bool,
}

#[derive(Debug, Serialize)]
struct JoinQueueResponse {
    position: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AdvanceQueueResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    handed_off_to: Option<Requester>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetSessionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    stale_resource: Option<ResourceKey>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/session
async fn get_session<H>(
    State(handler): State<Arc<H>>,
    Query(query): Query<SessionQuery>,
) -> impl IntoResponse
where
    H: ApiHandler,
{
    let requester = query.requester_id.map(|id| {
        let name = query.requester_name.unwrap_or_else(|| id.clone());
        Requester::new(id, name)
    });
    Json(handler.session(requester).await)
}

/// POST /api/v1/artifacts
async fn submit_artifact<H>(
    State(handler): State<Arc<H>>,
    Json(req): Json<SubmitArtifactRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    handler.submit_artifact(req.requester, req.artifact).await?;
    Ok((StatusCode::ACCEPTED, Json(AcceptedResponse { accepted: true })))
}

/// POST /api/v1/queue/join
async fn join_queue<H>(
    State(handler): State<Arc<H>>,
    Json(req): Json<RequesterBody>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let position = handler.join_queue(req.requester).await?;
    Ok(Json(JoinQueueResponse { position }))
}

/// POST /api/v1/queue/leave
async fn leave_queue<H>(
    State(handler): State<Arc<H>>,
    Json(req): Json<RequesterBody>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    handler.leave_queue(req.requester).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/queue/advance
async fn advance_queue<H>(
    State(handler): State<Arc<H>>,
    Json(req): Json<RequesterBody>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let handed_off_to = handler.advance_queue(req.requester).await?;
    Ok(Json(AdvanceQueueResponse { handed_off_to }))
}

/// POST /api/v1/session/reset
async fn reset_session<H>(
    State(handler): State<Arc<H>>,
    Json(req): Json<RequesterBody>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let stale_resource = handler.reset_session(req.requester).await?;
    Ok(Json(ResetSessionResponse { stale_resource }))
}

/// POST /api/v1/resources/:key/delete
async fn delete_resource<H>(
    State(handler): State<Arc<H>>,
    Path(key): Path<String>,
    Json(req): Json<RequesterBody>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    handler.delete_resource(req.requester, key).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/actions
async fn handle_action<H>(
    State(handler): State<Arc<H>>,
    Json(req): Json<ActionRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let token = ActionToken::parse(&req.token)
        .ok_or_else(|| ApiError::InvalidRequest(format!("unknown action token `{}`", req.token)))?;
    handler.handle_action(req.requester, token).await?;
    Ok(StatusCode::NO_CONTENT)
}
