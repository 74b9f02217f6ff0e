use super::{ApiJson, AppState};
use crate::domain::identity::Identity;
use crate::domain::order::{OrderDraft, OrderView};
use crate::error::Result;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    status: Option<String>,
}

pub async fn place(
    State(state): State<AppState>,
    identity: Identity,
    ApiJson(draft): ApiJson<OrderDraft>,
) -> Result<(StatusCode, Json<OrderView>)> {
    let view = state.shop.place_order(&identity, draft).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn list(State(state): State<AppState>, identity: Identity) -> Result<Json<Vec<OrderView>>> {
    state.shop.list_orders(&identity).await.map(Json)
}

pub async fn get(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<OrderView>> {
    state.shop.get_order(&identity, &id).await.map(Json)
}

pub async fn set_status(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> Result<Json<OrderView>> {
    state
        .shop
        .set_order_status(&identity, &id, update.status.as_deref())
        .await
        .map(Json)
}
