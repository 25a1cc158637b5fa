use crate::models::api::{ ChatRequest, ChatResponse, ErrorResponse, HistoryResponse };
use crate::relay::{ ChatRelay, RelayError };
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    Json,
    extract::{ State, rejection::JsonRejection },
    response::{ Html, IntoResponse, Response },
    http::StatusCode,
};
use tower_http::cors::{ Any, CorsLayer };
use log::warn;

const INDEX_HTML: &str = include_str!("../../static/index.html");

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<ChatRelay>,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match &self {
            RelayError::EmptyMessage => StatusCode::BAD_REQUEST,
            RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

pub fn router(relay: Arc<ChatRelay>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/chat", post(chat_handler))
        .route("/history", get(history_handler))
        .layer(cors)
        .with_state(AppState { relay })
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>
) -> Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            warn!("Rejected chat request body: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse { error: rejection.body_text() }),
            ).into_response();
        }
    };

    match state.relay.chat(req).await {
        Ok(response) => Json(ChatResponse { response }).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn history_handler(State(state): State<AppState>) -> Json<HistoryResponse> {
    Json(HistoryResponse { turns: state.relay.history().all().await })
}
