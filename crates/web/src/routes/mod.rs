use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use infinite_chess_core::service::{HealthStatus, MoveRequest, MoveResponse};
use infinite_chess_core::BoardState;
use tracing::{info, warn};

use crate::proposer;

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::healthy())
}

pub async fn ai_move(
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> (StatusCode, Json<MoveResponse>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(%rejection, "rejected move request body");
            return (
                StatusCode::BAD_REQUEST,
                Json(MoveResponse::failed("invalid_json")),
            );
        }
    };

    let board = match request
        .validate()
        .map_err(|e| e.to_string())
        .and_then(|_| BoardState::from_snapshot(&request).map_err(|e| e.to_string()))
    {
        Ok(board) => board,
        Err(e) => {
            warn!(error = %e, "invalid board snapshot");
            return (StatusCode::BAD_REQUEST, Json(MoveResponse::failed(e)));
        }
    };

    match proposer::propose(&board, &mut rand::rng()) {
        Some(san) => {
            info!(side = %request.side_to_move, %san, "proposed move");
            (StatusCode::OK, Json(MoveResponse::proposed(san)))
        }
        None => (StatusCode::OK, Json(MoveResponse::failed("no_legal_moves"))),
    }
}
