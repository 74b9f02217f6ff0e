use super::{ApiJson, AppState};
use crate::domain::identity::Identity;
use crate::domain::item::{Item, ItemDraft, ItemPatch};
use crate::domain::order::{CheckoutDraft, CheckoutReceipt};
use crate::error::Result;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Item>>> {
    state.shop.list_items().await.map(Json)
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Item>> {
    state.shop.get_item(&id).await.map(Json)
}

pub async fn create(
    State(state): State<AppState>,
    identity: Identity,
    ApiJson(draft): ApiJson<ItemDraft>,
) -> Result<(StatusCode, Json<Item>)> {
    let item = state.shop.create_item(&identity, draft).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ItemPatch>,
) -> Result<Json<Item>> {
    state.shop.update_item(&identity, &id, patch).await.map(Json)
}

pub async fn remove(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<Item>> {
    state.shop.delete_item(&identity, &id).await.map(Json)
}

/// Public batch checkout; no authentication.
pub async fn checkout(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<CheckoutDraft>,
) -> Result<Json<CheckoutReceipt>> {
    state.shop.checkout(draft).await.map(Json)
}
