use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, warn};

use super::cookies::UserToken;
use super::error::ApiError;
use crate::backend::{Ack, Reply};
use crate::models::{MessageReply, ScratchCardsReply};
use crate::AppState;

/// GET /api/scratch-cards
pub async fn list_cards(
    State(state): State<Arc<AppState>>,
    UserToken(token): UserToken,
) -> Result<Json<ScratchCardsReply>, ApiError> {
    let reply = state.backend.coupons(&token).await?;
    if !reply.body.success {
        warn!(status = %reply.status, "Coupon list rejected");
        return Err(ApiError::rejected("Failed to fetch user Coupon"));
    }

    Ok(Json(ScratchCardsReply {
        success: true,
        message: None,
        data: reply.body.coupon,
    }))
}

fn card_action(reply: Reply<Ack>, done: &str, fallback: &str) -> Result<Json<MessageReply>, ApiError> {
    if !reply.body.success {
        return Err(ApiError::upstream(
            reply.body.message,
            reply.body.status.or(Some(reply.status.as_u16())),
            fallback,
        ));
    }
    Ok(Json(MessageReply {
        success: true,
        message: reply.body.message.or_else(|| Some(done.to_string())),
    }))
}

/// POST /api/scratch-cards/{id}/scratch
pub async fn scratch_card(
    State(state): State<Arc<AppState>>,
    UserToken(token): UserToken,
    Path(id): Path<String>,
) -> Result<Json<MessageReply>, ApiError> {
    let reply = state.backend.scratch_coupon(&token, &id).await?;
    let result = card_action(reply, "Card scratched", "Failed to scratch card");
    if result.is_ok() {
        info!(card_id = %id, "Scratch card revealed");
    }
    result
}

/// POST /api/scratch-cards/{id}/redeem
pub async fn redeem_card(
    State(state): State<Arc<AppState>>,
    UserToken(token): UserToken,
    Path(id): Path<String>,
) -> Result<Json<MessageReply>, ApiError> {
    let reply = state.backend.redeem_coupon(&token, &id).await?;
    let result = card_action(reply, "Card redeemed", "Failed to redeem card");
    if result.is_ok() {
        info!(card_id = %id, "Scratch card redeemed");
    }
    result
}
