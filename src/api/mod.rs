/*
 * REST API module for the swap service
 */

use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{get, post, routes, State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::error;
use crate::metrics::SwapMetrics;
use crate::models::{Asset, SwapError, SwapOutcome, SwapRequest};
use crate::rpc::ChainClient;
use crate::service::SwapEngine;

type ApiResult<T> = std::result::Result<T, Custom<String>>;

pub struct ApiState {
    pub engine: Arc<SwapEngine<dyn ChainClient>>,
    pub metrics: Arc<SwapMetrics>,
}

#[derive(Debug, Deserialize)]
pub struct SwapRequestBody {
    pub token_in: String,
    pub token_out: String,
    /// Decimal string; zero or negative sweeps the whole balance.
    pub amount: String,
    #[serde(default)]
    pub preview_only: bool,
    #[serde(default)]
    pub need_approval: bool,
    #[serde(default)]
    pub approval_max: bool,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub token: String,
    pub balance: Decimal,
}

fn bad_request(e: impl std::fmt::Display) -> Custom<String> {
    Custom(Status::BadRequest, e.to_string())
}

fn engine_error(e: &SwapError) -> Custom<String> {
    error!(error = %e, "Request failed");
    let status = match e {
        SwapError::PoolNotFound { .. } | SwapError::ConfigError(_) => Status::UnprocessableEntity,
        _ => Status::InternalServerError,
    };
    Custom(status, e.to_string())
}

impl SwapRequestBody {
    fn into_request(self) -> crate::models::Result<SwapRequest> {
        let amount = Decimal::from_str(self.amount.trim())
            .map_err(|e| SwapError::ConfigError(format!("Invalid amount {}: {e}", self.amount)))?;

        Ok(SwapRequest {
            token_in: Asset::from_str(&self.token_in)?,
            token_out: Asset::from_str(&self.token_out)?,
            amount,
            preview_only: self.preview_only,
            need_approval: self.need_approval,
            approval_max: self.approval_max,
        })
    }
}

#[get("/health")]
pub async fn health_check() -> &'static str {
    "OK"
}

#[get("/api/v1/balance/<token>")]
pub async fn get_balance(token: &str, state: &State<ApiState>) -> ApiResult<Json<BalanceResponse>> {
    let asset = Asset::from_str(token).map_err(bad_request)?;
    let balance = state.engine.balance(asset).await.map_err(|e| engine_error(&e))?;

    Ok(Json(BalanceResponse {
        token: asset.to_string(),
        balance,
    }))
}

#[post("/api/v1/swap", data = "<body>")]
pub async fn post_swap(body: Json<SwapRequestBody>, state: &State<ApiState>) -> ApiResult<Json<SwapOutcome>> {
    let request = body.into_inner().into_request().map_err(bad_request)?;
    let outcome = state
        .engine
        .execute_swap(request)
        .await
        .map_err(|e| engine_error(&e))?;

    Ok(Json(outcome))
}

#[get("/metrics")]
pub async fn get_metrics(state: &State<ApiState>) -> ApiResult<String> {
    state.metrics.render().map_err(|e| engine_error(&e))
}

#[must_use]
pub fn create_rocket(state: ApiState) -> rocket::Rocket<rocket::Build> {
    rocket::build()
        .manage(state)
        .mount("/", routes![health_check, get_balance, post_swap, get_metrics])
}
