use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Json, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    ComputationResult, InputState, OutcomeMode, PlanType, RawInputState, Report, decode, encode,
    estimate, resolve_target_salary, summary_text,
};
use crate::error::RoiError;
use crate::share::share_link;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiOutcomeMode {
    #[serde(alias = "TYPICAL")]
    Typical,
    #[serde(alias = "CUSTOM")]
    Custom,
}

impl From<ApiOutcomeMode> for OutcomeMode {
    fn from(value: ApiOutcomeMode) -> Self {
        match value {
            ApiOutcomeMode::Typical => OutcomeMode::Typical,
            ApiOutcomeMode::Custom => OutcomeMode::Custom,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiPlanType {
    #[serde(alias = "MONTHLY")]
    Monthly,
    #[serde(
        alias = "annualUpfront",
        alias = "annual_upfront",
        alias = "ANNUAL_UPFRONT"
    )]
    AnnualUpfront,
    #[serde(
        alias = "installments",
        alias = "annualInstallments",
        alias = "annual_installments",
        alias = "ANNUAL_INSTALLMENTS"
    )]
    AnnualInstallments,
}

impl From<ApiPlanType> for PlanType {
    fn from(value: ApiPlanType) -> Self {
        match value {
            ApiPlanType::Monthly => PlanType::Monthly,
            ApiPlanType::AnnualUpfront => PlanType::AnnualUpfront,
            ApiPlanType::AnnualInstallments => PlanType::AnnualInstallments,
        }
    }
}

/// Form fields as posted by a client. Anything missing takes its default.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EstimatePayload {
    current_salary: Option<f64>,
    outcome_mode: Option<ApiOutcomeMode>,
    target_salary: Option<f64>,
    months_to_outcome: Option<i32>,
    plan_type: Option<ApiPlanType>,
    months_in_program: Option<i32>,
    other_costs: Option<f64>,
    usd_to_gbp: Option<f64>,
}

impl From<EstimatePayload> for RawInputState {
    fn from(payload: EstimatePayload) -> Self {
        RawInputState {
            current_salary_annual: payload.current_salary,
            outcome_mode: payload.outcome_mode.map(Into::into),
            custom_target_annual: payload.target_salary,
            months_to_outcome: payload.months_to_outcome,
            plan_type: payload.plan_type.map(Into::into),
            months_in_program: payload.months_in_program,
            other_costs_annual: payload.other_costs,
            usd_to_gbp_rate: payload.usd_to_gbp,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    loaded_from_link: bool,
    state: InputState,
    target_salary_annual: Option<f64>,
    result: ComputationResult,
    report: Report,
    share_query: String,
}

impl EstimateResponse {
    pub fn new(state: InputState, loaded_from_link: bool) -> Self {
        let result = estimate(&state);
        Self {
            loaded_from_link,
            target_salary_annual: resolve_target_salary(&state),
            report: Report::build(&state, &result),
            share_query: encode(&state).to_query_string(),
            result,
            state,
        }
    }
}

#[derive(Debug, Serialize)]
struct ShareResponse {
    query: String,
    link: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    /// Base for generated share links; defaults to the bind address.
    pub public_url: Option<String>,
}

#[derive(Debug, Clone)]
struct AppState {
    public_url: Arc<str>,
}

pub fn router(public_url: &str) -> Router {
    Router::new()
        .route(
            "/api/estimate",
            get(estimate_get_handler).post(estimate_post_handler),
        )
        .route("/api/share", post(share_post_handler))
        .route("/api/summary", get(summary_get_handler))
        .route("/api/defaults", get(defaults_handler))
        .fallback(not_found_handler)
        .with_state(AppState {
            public_url: Arc::from(public_url),
        })
}

pub async fn run_http_server(config: ServerConfig) -> Result<(), RoiError> {
    let addr = SocketAddr::new(config.bind, config.port);
    let public_url = config
        .public_url
        .unwrap_or_else(|| format!("http://{addr}/"));
    // Fail at startup rather than on the first share request.
    let base_link = share_link(&public_url, &Default::default())?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| RoiError::Bind { addr, source })?;
    info!(%addr, share_base = %base_link, "ROI HTTP API listening");

    axum::serve(listener, router(&public_url)).await?;
    Ok(())
}

type QueryPairs = Query<Vec<(String, String)>>;

fn pairs_or_reject(
    query: Result<QueryPairs, QueryRejection>,
) -> Result<Vec<(String, String)>, Response> {
    match query {
        Ok(Query(pairs)) => Ok(pairs),
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected query string");
            Err(error_response(StatusCode::BAD_REQUEST, &rejection.body_text()))
        }
    }
}

fn payload_or_reject(
    payload: Result<Json<EstimatePayload>, JsonRejection>,
) -> Result<EstimatePayload, Response> {
    match payload {
        Ok(Json(payload)) => Ok(payload),
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected JSON payload");
            Err(error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid API JSON payload: {}", rejection.body_text()),
            ))
        }
    }
}

/// Decodes a shared link's query. An empty query yields the defaults with
/// `loadedFromLink: false`.
async fn estimate_get_handler(query: Result<QueryPairs, QueryRejection>) -> Response {
    let pairs = match pairs_or_reject(query) {
        Ok(pairs) => pairs,
        Err(response) => return response,
    };
    let decoded = decode(&pairs);
    let loaded_from_link = decoded.is_some();
    debug!(params = pairs.len(), loaded_from_link, "estimate from query");
    json_response(
        StatusCode::OK,
        EstimateResponse::new(decoded.unwrap_or_default(), loaded_from_link),
    )
}

async fn estimate_post_handler(payload: Result<Json<EstimatePayload>, JsonRejection>) -> Response {
    let payload = match payload_or_reject(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let state = InputState::normalize(payload.into());
    debug!(?state, "estimate from form payload");
    json_response(StatusCode::OK, EstimateResponse::new(state, false))
}

async fn share_post_handler(
    State(app): State<AppState>,
    payload: Result<Json<EstimatePayload>, JsonRejection>,
) -> Response {
    let payload = match payload_or_reject(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let params = encode(&InputState::normalize(payload.into()));
    match share_link(&app.public_url, &params) {
        Ok(link) => json_response(
            StatusCode::OK,
            ShareResponse {
                query: params.to_query_string(),
                link,
            },
        ),
        Err(err) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string()),
    }
}

async fn summary_get_handler(query: Result<QueryPairs, QueryRejection>) -> Response {
    let pairs = match pairs_or_reject(query) {
        Ok(pairs) => pairs,
        Err(response) => return response,
    };
    let state = decode(&pairs).unwrap_or_default();
    let summary = summary_text(&state, &estimate(&state));
    with_cache_control((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        summary,
    ))
}

async fn defaults_handler() -> Response {
    json_response(StatusCode::OK, InputState::default())
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
