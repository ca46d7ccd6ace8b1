//! Delivery API routes
//!
//! - `GET /api/v1/deliveries` - List deliveries (optionally for one ingredient)
//! - `POST /api/v1/deliveries` - Accept a delivery and restock the ingredient
//! - `GET /api/v1/deliveries/:id` - Fetch one delivery
//! - `DELETE /api/v1/deliveries/:id` - Take a delivery back out of stock

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::shared::ValidatedQuery;
use crate::middleware::auth::CurrentUser;
use crate::store::EntityStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::commands::{
    CreateDeliveryCommand, CreateDeliveryError, DeleteDeliveryCommand, DeleteDeliveryError,
};
use super::queries::{GetDeliveryError, GetDeliveryQuery, ListDeliveriesError, ListDeliveriesQuery};

pub fn deliveries_routes() -> Router<EntityStore> {
    Router::new()
        .route("/", get(list_deliveries).post(create_delivery))
        .route("/:id", get(get_delivery).delete(delete_delivery))
}

#[tracing::instrument(skip(store))]
async fn list_deliveries(
    State(store): State<EntityStore>,
    ValidatedQuery(query): ValidatedQuery<ListDeliveriesQuery>,
) -> Result<Response, DeliveryApiError> {
    let response = super::queries::list::handle(store.pool().clone(), query).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(store, command), fields(user_id = user.user_id))]
async fn create_delivery(
    State(store): State<EntityStore>,
    CurrentUser(user): CurrentUser,
    Json(mut command): Json<CreateDeliveryCommand>,
) -> Result<Response, DeliveryApiError> {
    command.accepted = user.user_id;

    let response = super::commands::create::handle(store, command).await?;

    tracing::info!(
        delivery_id = response.delivery.id,
        ingredient_id = response.delivery.ingredient_id,
        weight = response.delivery.weight,
        "Delivery accepted via API"
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(store))]
async fn get_delivery(
    State(store): State<EntityStore>,
    Path(id): Path<i64>,
) -> Result<Response, DeliveryApiError> {
    let query = GetDeliveryQuery { id };
    let delivery = super::queries::get::handle(store.pool().clone(), query).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(delivery))).into_response())
}

#[tracing::instrument(skip(store), fields(user_id = user.user_id))]
async fn delete_delivery(
    State(store): State<EntityStore>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, DeliveryApiError> {
    let response = super::commands::delete::handle(store, DeleteDeliveryCommand { id }).await?;

    tracing::info!(delivery_id = id, ingredient_weight = response.ingredient_weight, "Delivery deleted via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[derive(Debug, thiserror::Error)]
enum DeliveryApiError {
    #[error(transparent)]
    Create(#[from] CreateDeliveryError),
    #[error(transparent)]
    List(#[from] ListDeliveriesError),
    #[error(transparent)]
    Get(#[from] GetDeliveryError),
    #[error(transparent)]
    Delete(#[from] DeleteDeliveryError),
}

impl IntoResponse for DeliveryApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, code) = match self {
            DeliveryApiError::Create(CreateDeliveryError::InvalidWeight)
            | DeliveryApiError::List(ListDeliveriesError::InvalidPagination(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            },
            DeliveryApiError::Create(CreateDeliveryError::IngredientNotFound(_))
            | DeliveryApiError::Get(GetDeliveryError::NotFound(_))
            | DeliveryApiError::Delete(DeleteDeliveryError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            },
            DeliveryApiError::Delete(DeleteDeliveryError::StockAlreadyUsed { .. }) => {
                (StatusCode::CONFLICT, "CONFLICT")
            },
            DeliveryApiError::Create(CreateDeliveryError::Store(_))
            | DeliveryApiError::List(ListDeliveriesError::Database(_))
            | DeliveryApiError::Get(GetDeliveryError::Database(_))
            | DeliveryApiError::Delete(DeleteDeliveryError::Store(_)) => {
                tracing::error!("Database error in delivery API: {}", message);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                return error.into_response_with(StatusCode::INTERNAL_SERVER_ERROR);
            },
        };

        ErrorResponse::new(code, message).into_response_with(status)
    }
}
