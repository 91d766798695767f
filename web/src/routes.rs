//! JSON API handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use suncoin_network::{BuildInfo, Gateway, NodeStatus};
use suncoin_types::{Address, Output, OutputHash};

use crate::csrf::CsrfTokens;

/// State shared by every API handler.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub csrf: Arc<CsrfTokens>,
}

#[derive(Serialize)]
pub struct CsrfResponse {
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct LockedRequest {
    pub addresses: Vec<String>,
}

#[derive(Serialize)]
pub struct LockedResponse {
    pub locked: bool,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn bad_request(error: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { error })).into_response()
}

pub async fn version(State(state): State<AppState>) -> Json<BuildInfo> {
    Json(state.gateway.build_info().clone())
}

pub async fn status(State(state): State<AppState>) -> Json<NodeStatus> {
    Json(state.gateway.status())
}

pub async fn csrf_token(State(state): State<AppState>) -> Json<CsrfResponse> {
    Json(CsrfResponse {
        csrf_token: state.csrf.issue(),
    })
}

pub async fn outputs_locked(
    State(state): State<AppState>,
    Json(req): Json<LockedRequest>,
) -> Response {
    let mut spent = Vec::with_capacity(req.addresses.len());
    for s in &req.addresses {
        match s.parse::<Address>() {
            Ok(address) => spent.push(Output::new(OutputHash::ZERO, address, 0, 0)),
            Err(e) => return bad_request(format!("{s}: {e}")),
        }
    }
    Json(LockedResponse {
        locked: state.gateway.is_spend_locked(&spent),
    })
    .into_response()
}
