use axum::{
    Router,
    extract::{Json, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use uuid::Uuid;

use crate::core::{
    AssetAllocation, Fund, Holding, ImpactSummary, InvestmentPlan, InvestorProfile, PLANS,
    PlanSimulation, RebalancingRecommendation, RebalancingTransaction, RetirementInputs,
    RetirementPlan, RiskLevel, RiskTolerance, ScenarioSeries, build_transaction,
    current_allocation, find_plan, funds_from_holdings, project_retirement,
    recommend_rebalancing, scenario_bands, simulate_plans, summarize_impact, target_allocation,
};
use crate::ledger::{LedgerError, TransactionLedger};

/// Longest horizon accepted for projections and plan simulations.
const MAX_PROJECTION_YEARS: u32 = 100;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CliRiskTolerance {
    #[serde(alias = "low")]
    Conservative,
    #[serde(alias = "medium")]
    Moderate,
    #[serde(alias = "high")]
    Aggressive,
}

impl From<CliRiskTolerance> for RiskTolerance {
    fn from(value: CliRiskTolerance) -> Self {
        match value {
            CliRiskTolerance::Conservative => RiskTolerance::Conservative,
            CliRiskTolerance::Moderate => RiskTolerance::Moderate,
            CliRiskTolerance::Aggressive => RiskTolerance::Aggressive,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CliRiskLevel {
    Low,
    Medium,
    High,
}

impl From<CliRiskLevel> for RiskLevel {
    fn from(value: CliRiskLevel) -> Self {
        match value {
            CliRiskLevel::Low => RiskLevel::Low,
            CliRiskLevel::Medium => RiskLevel::Medium,
            CliRiskLevel::High => RiskLevel::High,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "GPF_PORT", default_value_t = 8080)]
    pub port: u16,
    #[arg(
        long,
        env = "GPF_LEDGER_PATH",
        default_value = "gpf-transactions.jsonl",
        help = "Append-only file that stores executed rebalancing transactions"
    )]
    pub ledger: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    #[arg(long, default_value_t = 35)]
    pub current_age: u32,
    #[arg(long, default_value_t = 60)]
    pub retirement_age: u32,
    #[arg(long, value_enum, default_value_t = CliRiskTolerance::Moderate)]
    pub risk_tolerance: CliRiskTolerance,
}

#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    #[arg(long, default_value_t = 35)]
    pub current_age: u32,
    #[arg(long, default_value_t = 60)]
    pub retirement_age: u32,
    #[arg(long, default_value_t = 500_000.0)]
    pub current_savings: f64,
    #[arg(long, default_value_t = 10_000.0)]
    pub monthly_contribution: f64,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Expected annual return in percent, e.g. 7"
    )]
    pub expected_return: f64,
    #[arg(
        long,
        value_enum,
        default_value_t = CliRiskLevel::Medium,
        help = "Risk level that sets the bull/bear band width"
    )]
    pub risk_level: CliRiskLevel,
}

#[derive(Args, Debug, Clone)]
pub struct RebalanceArgs {
    #[arg(long, help = "JSON file with an array of {fundCode, fundName, value, units}")]
    pub holdings: PathBuf,
    #[command(flatten)]
    pub profile: ProfileArgs,
}

#[derive(Args, Debug, Clone)]
pub struct PlanSimulationArgs {
    #[arg(long, default_value_t = 100_000.0)]
    pub initial: f64,
    #[arg(long, default_value_t = 5_000.0)]
    pub monthly: f64,
    #[arg(long, default_value_t = 20)]
    pub years: u32,
    #[arg(
        long = "plan",
        help = "Plan id to simulate; repeat for several, defaults to every plan"
    )]
    pub plans: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProfilePayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    risk_tolerance: Option<CliRiskTolerance>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RebalancePayload {
    holdings: Option<Vec<Holding>>,
    funds: Option<Vec<Fund>>,
    total_value: Option<f64>,
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    risk_tolerance: Option<CliRiskTolerance>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RetirementPayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    current_savings: Option<f64>,
    monthly_contribution: Option<f64>,
    expected_return: Option<f64>,
    risk_level: Option<CliRiskLevel>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanSimulationPayload {
    initial: Option<f64>,
    monthly: Option<f64>,
    years: Option<u32>,
    /// Comma-separated plan ids.
    plans: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionPayload {
    recommendations: Vec<RebalancingRecommendation>,
}

#[derive(Debug)]
struct RebalanceRequest {
    funds: Vec<Fund>,
    total_value: f64,
    profile: InvestorProfile,
}

#[derive(Debug)]
struct RetirementRequest {
    inputs: RetirementInputs,
    risk: RiskLevel,
}

#[derive(Debug)]
struct PlanSimulationRequest {
    plans: Vec<&'static InvestmentPlan>,
    initial: f64,
    monthly: f64,
    years: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RebalanceResponse {
    profile: InvestorProfile,
    total_value: f64,
    target_allocation: AssetAllocation,
    current_allocation: AssetAllocation,
    funds: Vec<Fund>,
    recommendations: Vec<RebalancingRecommendation>,
    impact: ImpactSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetirementResponse {
    plan: RetirementPlan,
    scenarios: ScenarioSeries,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanSimulationResponse {
    initial: f64,
    monthly: f64,
    years: u32,
    results: Vec<PlanSimulation>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<String> for ApiError {
    fn from(value: String) -> Self {
        ApiError::Validation(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(msg) => {
                tracing::warn!(error = %msg, "rejected request");
                error_response(StatusCode::BAD_REQUEST, &msg)
            }
            ApiError::Ledger(err) => {
                tracing::error!(error = %err, "transaction ledger failure");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Transaction ledger unavailable",
                )
            }
            ApiError::Task(err) => {
                tracing::error!(error = %err, "blocking task failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    ledger: Arc<TransactionLedger>,
}

impl AppState {
    pub fn new(ledger: TransactionLedger) -> Self {
        Self {
            ledger: Arc::new(ledger),
        }
    }
}

fn build_profile(args: &ProfileArgs) -> Result<InvestorProfile, String> {
    if args.retirement_age <= args.current_age {
        return Err("--retirement-age must be > --current-age".to_string());
    }

    Ok(InvestorProfile {
        current_age: args.current_age,
        retirement_age: args.retirement_age,
        risk_tolerance: args.risk_tolerance.into(),
    })
}

fn build_retirement_request(args: &ProjectArgs) -> Result<RetirementRequest, String> {
    if args.retirement_age <= args.current_age {
        return Err("--retirement-age must be > --current-age".to_string());
    }

    if args.retirement_age - args.current_age > MAX_PROJECTION_YEARS {
        return Err(format!(
            "--retirement-age must be within {MAX_PROJECTION_YEARS} years of --current-age"
        ));
    }

    if !args.current_savings.is_finite() || args.current_savings < 0.0 {
        return Err("--current-savings must be >= 0".to_string());
    }

    if !args.monthly_contribution.is_finite() || args.monthly_contribution < 0.0 {
        return Err("--monthly-contribution must be >= 0".to_string());
    }

    if !args.expected_return.is_finite() || args.expected_return <= -100.0 {
        return Err("--expected-return must be > -100".to_string());
    }

    Ok(RetirementRequest {
        inputs: RetirementInputs {
            current_age: args.current_age,
            retirement_age: args.retirement_age,
            current_savings: args.current_savings,
            monthly_contribution: args.monthly_contribution,
            expected_return: args.expected_return,
        },
        risk: args.risk_level.into(),
    })
}

fn build_plan_simulation_request(
    args: &PlanSimulationArgs,
) -> Result<PlanSimulationRequest, String> {
    if !args.initial.is_finite() || args.initial < 0.0 {
        return Err("--initial must be >= 0".to_string());
    }

    if !args.monthly.is_finite() || args.monthly < 0.0 {
        return Err("--monthly must be >= 0".to_string());
    }

    if args.years > MAX_PROJECTION_YEARS {
        return Err(format!("--years must be <= {MAX_PROJECTION_YEARS}"));
    }

    let plans = if args.plans.is_empty() {
        PLANS.iter().collect()
    } else {
        args.plans
            .iter()
            .map(|id| find_plan(id).ok_or_else(|| format!("unknown plan: {id}")))
            .collect::<Result<Vec<_>, _>>()?
    };

    Ok(PlanSimulationRequest {
        plans,
        initial: args.initial,
        monthly: args.monthly,
        years: args.years,
    })
}

fn validate_holdings(holdings: &[Holding]) -> Result<(), String> {
    for holding in holdings {
        if !holding.value.is_finite() || holding.value < 0.0 {
            return Err(format!("holding {} must have a value >= 0", holding.fund_code));
        }
        if !holding.units.is_finite() || holding.units < 0.0 {
            return Err(format!("holding {} must have units >= 0", holding.fund_code));
        }
    }
    Ok(())
}

fn validate_funds(funds: &[Fund]) -> Result<(), String> {
    for fund in funds {
        if !fund.value.is_finite() || fund.value < 0.0 {
            return Err(format!("fund {} must have a value >= 0", fund.id));
        }
        if !fund.allocation.is_finite() {
            return Err(format!("fund {} must have a finite allocation", fund.id));
        }
    }
    Ok(())
}

fn validate_recommendations(recommendations: &[RebalancingRecommendation]) -> Result<(), String> {
    for rec in recommendations {
        if !rec.amount.is_finite() || rec.amount < 0.0 {
            return Err(format!(
                "recommendation for {} must have an amount >= 0",
                rec.fund_id
            ));
        }
    }
    Ok(())
}

fn build_transaction_record(
    recommendations: &[RebalancingRecommendation],
    id: String,
    executed_at: DateTime<Utc>,
) -> Result<RebalancingTransaction, String> {
    validate_recommendations(recommendations)?;

    let transaction = build_transaction(recommendations, id, executed_at);
    if transaction.actions.is_empty() {
        return Err("recommendations contain no buy or sell actions".to_string());
    }
    if !transaction.total_amount.is_finite() {
        return Err("transaction total amount must be finite".to_string());
    }
    Ok(transaction)
}

fn default_profile_args_for_api() -> ProfileArgs {
    ProfileArgs {
        current_age: 35,
        retirement_age: 60,
        risk_tolerance: CliRiskTolerance::Moderate,
    }
}

fn default_project_args_for_api() -> ProjectArgs {
    ProjectArgs {
        current_age: 35,
        retirement_age: 60,
        current_savings: 500_000.0,
        monthly_contribution: 10_000.0,
        expected_return: 7.0,
        risk_level: CliRiskLevel::Medium,
    }
}

fn default_plan_simulation_args_for_api() -> PlanSimulationArgs {
    PlanSimulationArgs {
        initial: 100_000.0,
        monthly: 5_000.0,
        years: 20,
        plans: Vec::new(),
    }
}

fn overlay_profile(
    args: &mut ProfileArgs,
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    risk_tolerance: Option<CliRiskTolerance>,
) {
    if let Some(v) = current_age {
        args.current_age = v;
    }
    if let Some(v) = retirement_age {
        args.retirement_age = v;
    }
    if let Some(v) = risk_tolerance {
        args.risk_tolerance = v;
    }
}

fn profile_from_payload(payload: ProfilePayload) -> Result<InvestorProfile, String> {
    let mut args = default_profile_args_for_api();
    overlay_profile(
        &mut args,
        payload.current_age,
        payload.retirement_age,
        payload.risk_tolerance,
    );
    build_profile(&args)
}

fn rebalance_request_from_payload(payload: RebalancePayload) -> Result<RebalanceRequest, String> {
    let mut args = default_profile_args_for_api();
    overlay_profile(
        &mut args,
        payload.current_age,
        payload.retirement_age,
        payload.risk_tolerance,
    );
    let profile = build_profile(&args)?;

    let (funds, derived_total) = match (payload.funds, payload.holdings) {
        (Some(_), Some(_)) => {
            return Err("provide either funds or holdings, not both".to_string());
        }
        (Some(funds), None) => {
            validate_funds(&funds)?;
            let total = funds.iter().map(|f| f.value).sum();
            (funds, total)
        }
        (None, Some(holdings)) => {
            validate_holdings(&holdings)?;
            funds_from_holdings(&holdings)
        }
        (None, None) => return Err("either funds or holdings is required".to_string()),
    };

    let total_value = payload.total_value.unwrap_or(derived_total);
    if !total_value.is_finite() || total_value < 0.0 {
        return Err("totalValue must be >= 0".to_string());
    }

    Ok(RebalanceRequest {
        funds,
        total_value,
        profile,
    })
}

fn retirement_request_from_payload(
    payload: RetirementPayload,
) -> Result<RetirementRequest, String> {
    let mut args = default_project_args_for_api();
    if let Some(v) = payload.current_age {
        args.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        args.retirement_age = v;
    }
    if let Some(v) = payload.current_savings {
        args.current_savings = v;
    }
    if let Some(v) = payload.monthly_contribution {
        args.monthly_contribution = v;
    }
    if let Some(v) = payload.expected_return {
        args.expected_return = v;
    }
    if let Some(v) = payload.risk_level {
        args.risk_level = v;
    }
    build_retirement_request(&args)
}

fn plan_simulation_request_from_payload(
    payload: PlanSimulationPayload,
) -> Result<PlanSimulationRequest, String> {
    let mut args = default_plan_simulation_args_for_api();
    if let Some(v) = payload.initial {
        args.initial = v;
    }
    if let Some(v) = payload.monthly {
        args.monthly = v;
    }
    if let Some(v) = payload.years {
        args.years = v;
    }
    if let Some(v) = payload.plans {
        args.plans = v
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();
    }
    build_plan_simulation_request(&args)
}

fn build_rebalance_response(request: RebalanceRequest) -> RebalanceResponse {
    let recommendations =
        recommend_rebalancing(&request.funds, request.total_value, &request.profile);
    let impact = summarize_impact(&recommendations);
    RebalanceResponse {
        profile: request.profile,
        total_value: request.total_value,
        target_allocation: target_allocation(&request.profile),
        current_allocation: current_allocation(&request.funds),
        funds: request.funds,
        recommendations,
        impact,
    }
}

fn build_retirement_response(request: &RetirementRequest) -> RetirementResponse {
    let inputs = &request.inputs;
    let plan = project_retirement(inputs);
    let scenarios = scenario_bands(
        inputs.current_age,
        inputs.current_savings,
        inputs.monthly_contribution,
        inputs.expected_return / 100.0,
        request.risk,
        inputs.retirement_age.saturating_sub(inputs.current_age),
    );
    RetirementResponse { plan, scenarios }
}

fn build_plan_simulation_response(request: &PlanSimulationRequest) -> PlanSimulationResponse {
    PlanSimulationResponse {
        initial: request.initial,
        monthly: request.monthly,
        years: request.years,
        results: simulate_plans(
            &request.plans,
            request.initial,
            request.monthly,
            request.years,
        ),
    }
}

pub fn run_project_command(args: ProjectArgs) -> Result<String, String> {
    let request = build_retirement_request(&args)?;
    to_pretty_json(&build_retirement_response(&request))
}

pub fn run_rebalance_command(args: RebalanceArgs) -> Result<String, String> {
    let raw = fs::read_to_string(&args.holdings)
        .map_err(|e| format!("failed to read {}: {e}", args.holdings.display()))?;
    let holdings: Vec<Holding> = serde_json::from_str(&raw)
        .map_err(|e| format!("invalid holdings JSON in {}: {e}", args.holdings.display()))?;
    validate_holdings(&holdings)?;

    let profile = build_profile(&args.profile)?;
    let (funds, total_value) = funds_from_holdings(&holdings);
    to_pretty_json(&build_rebalance_response(RebalanceRequest {
        funds,
        total_value,
        profile,
    }))
}

pub fn run_plans_command(args: PlanSimulationArgs) -> Result<String, String> {
    let request = build_plan_simulation_request(&args)?;
    to_pretty_json(&build_plan_simulation_response(&request))
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("failed to encode output: {e}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/allocation/target", get(target_allocation_handler))
        .route("/api/rebalance", post(rebalance_handler))
        .route(
            "/api/retirement",
            get(retirement_get_handler).post(retirement_post_handler),
        )
        .route("/api/plans", get(plans_handler))
        .route(
            "/api/plans/simulate",
            get(plan_simulation_get_handler).post(plan_simulation_post_handler),
        )
        .route(
            "/api/transactions",
            get(transactions_list_handler).post(transactions_create_handler),
        )
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(args: ServeArgs) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let ledger = TransactionLedger::new(args.ledger);
    tracing::info!(ledger = %ledger.path().display(), "using transaction ledger");
    let app = build_router(AppState::new(ledger));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("GPF planner HTTP API listening on http://{addr}");
    tracing::info!("Local access: http://127.0.0.1:{}/", args.port);

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, serde_json::json!({ "status": "ok" }))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn target_allocation_handler(
    Query(payload): Query<ProfilePayload>,
) -> Result<Response, ApiError> {
    let profile = profile_from_payload(payload)?;
    Ok(json_response(StatusCode::OK, target_allocation(&profile)))
}

async fn rebalance_handler(Json(payload): Json<RebalancePayload>) -> Result<Response, ApiError> {
    let request = rebalance_request_from_payload(payload)?;
    tracing::debug!(
        funds = request.funds.len(),
        total_value = request.total_value,
        current_age = request.profile.current_age,
        "computing rebalancing recommendations"
    );
    Ok(json_response(
        StatusCode::OK,
        build_rebalance_response(request),
    ))
}

async fn retirement_get_handler(
    Query(payload): Query<RetirementPayload>,
) -> Result<Response, ApiError> {
    retirement_handler_impl(payload)
}

async fn retirement_post_handler(
    Json(payload): Json<RetirementPayload>,
) -> Result<Response, ApiError> {
    retirement_handler_impl(payload)
}

fn retirement_handler_impl(payload: RetirementPayload) -> Result<Response, ApiError> {
    let request = retirement_request_from_payload(payload)?;
    tracing::debug!(
        current_age = request.inputs.current_age,
        retirement_age = request.inputs.retirement_age,
        "projecting retirement savings"
    );
    Ok(json_response(
        StatusCode::OK,
        build_retirement_response(&request),
    ))
}

async fn plans_handler() -> Response {
    json_response(StatusCode::OK, PLANS)
}

async fn plan_simulation_get_handler(
    Query(payload): Query<PlanSimulationPayload>,
) -> Result<Response, ApiError> {
    plan_simulation_handler_impl(payload)
}

async fn plan_simulation_post_handler(
    Json(payload): Json<PlanSimulationPayload>,
) -> Result<Response, ApiError> {
    plan_simulation_handler_impl(payload)
}

fn plan_simulation_handler_impl(payload: PlanSimulationPayload) -> Result<Response, ApiError> {
    let request = plan_simulation_request_from_payload(payload)?;
    tracing::debug!(
        plans = request.plans.len(),
        years = request.years,
        "simulating plans"
    );
    Ok(json_response(
        StatusCode::OK,
        build_plan_simulation_response(&request),
    ))
}

async fn transactions_list_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let ledger = Arc::clone(&state.ledger);
    let history = tokio::task::spawn_blocking(move || ledger.history()).await??;
    Ok(json_response(StatusCode::OK, history))
}

async fn transactions_create_handler(
    State(state): State<AppState>,
    Json(payload): Json<TransactionPayload>,
) -> Result<Response, ApiError> {
    let transaction = build_transaction_record(
        &payload.recommendations,
        Uuid::new_v4().to_string(),
        Utc::now(),
    )?;

    let ledger = Arc::clone(&state.ledger);
    let record = transaction.clone();
    tokio::task::spawn_blocking(move || ledger.append(&record)).await??;
    Ok(json_response(StatusCode::CREATED, transaction))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn rebalance_request_from_json(json: &str) -> Result<RebalanceRequest, String> {
    let payload = serde_json::from_str::<RebalancePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    rebalance_request_from_payload(payload)
}

#[cfg(test)]
fn retirement_request_from_json(json: &str) -> Result<RetirementRequest, String> {
    let payload = serde_json::from_str::<RetirementPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    retirement_request_from_payload(payload)
}
