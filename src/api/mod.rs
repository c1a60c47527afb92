mod args;

use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{MethodRouter, get},
};
use serde::Serialize;
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use args::{
    AffordabilityArgs, AmortizationArgs, AutoLoanArgs, Calculation, CapitalGainsArgs,
    CompoundInterestArgs, CreditCardArgs, DebtArg, DebtPayoffArgs, FilingStatusArg,
    HomeEquityArgs, IncomeTaxArgs, InvestmentArg, InvestmentComparisonArgs, InvestmentReturnArgs,
    IraArgs, LoanPayoffArgs, LotArg, MortgageArgs, RefinanceArgs, Retirement401kArgs,
    RetirementArgs, RetirementIncomeArgs, SelfEmploymentArgs, SocialSecurityArgs,
    StockReturnArgs, TaxDeferredArgs, TaxRefundArgs,
};

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Every calculator answers `GET` (query string) and `POST` (JSON body).
pub fn router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/mortgage", calculator::<MortgageArgs>())
        .route("/api/affordability", calculator::<AffordabilityArgs>())
        .route("/api/amortization", calculator::<AmortizationArgs>())
        .route("/api/loan-payoff", calculator::<LoanPayoffArgs>())
        .route("/api/credit-card", calculator::<CreditCardArgs>())
        .route("/api/auto-loan", calculator::<AutoLoanArgs>())
        .route("/api/refinance", calculator::<RefinanceArgs>())
        .route("/api/home-equity", calculator::<HomeEquityArgs>())
        .route("/api/debt-payoff", calculator::<DebtPayoffArgs>())
        .route("/api/compound-interest", calculator::<CompoundInterestArgs>())
        .route("/api/tax-deferred", calculator::<TaxDeferredArgs>())
        .route("/api/401k", calculator::<Retirement401kArgs>())
        .route("/api/ira", calculator::<IraArgs>())
        .route("/api/retirement", calculator::<RetirementArgs>())
        .route("/api/retirement-income", calculator::<RetirementIncomeArgs>())
        .route("/api/investment-return", calculator::<InvestmentReturnArgs>())
        .route("/api/investment-comparison", calculator::<InvestmentComparisonArgs>())
        .route("/api/stock-return", calculator::<StockReturnArgs>())
        .route("/api/income-tax", calculator::<IncomeTaxArgs>())
        .route("/api/capital-gains", calculator::<CapitalGainsArgs>())
        .route("/api/self-employment-tax", calculator::<SelfEmploymentArgs>())
        .route("/api/tax-refund", calculator::<TaxRefundArgs>())
        .route("/api/social-security", calculator::<SocialSecurityArgs>())
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_http_server(bind: IpAddr, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::new(bind, port);
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "fincalc HTTP API listening");

    axum::serve(listener, router()).await
}

fn calculator<C: Calculation>() -> MethodRouter {
    get(query_handler::<C>).post(json_handler::<C>)
}

async fn health_handler() -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn query_handler<C: Calculation>(payload: Result<Query<C>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(args)) => calculate(args),
        Err(rejection) => error_response(rejection.status(), &rejection.body_text()),
    }
}

async fn json_handler<C: Calculation>(payload: Result<Json<C>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(args)) => calculate(args),
        Err(rejection) => error_response(rejection.status(), &rejection.body_text()),
    }
}

fn calculate<C: Calculation>(args: C) -> Response {
    match args.calculate() {
        Ok(output) => json_response(StatusCode::OK, output),
        Err(err) => {
            warn!(error = %err, "rejected calculator input");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
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
