use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use hireboard::config::AppConfig;
use hireboard::error::AppError;
use hireboard::infra::{
    InMemoryApplicationStore, InMemoryJobPostRepository, InMemoryOutbox, InMemoryReferenceStore,
    RecordingNotifier, RecordingSyndication,
};
use hireboard::telemetry;
use hireboard::workflows::applications::{application_router, ApplicationTracker};
use hireboard::workflows::billing::{invoice_breakdown, Paise};
use hireboard::workflows::consolidation::{consolidation_router, ConsolidationEngine};
use hireboard::workflows::jobs::{jobs_router, JobWorkflowService, SyndicationRelay};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "hireboard",
    about = "Job-board workflow service: post lifecycle, candidate pipeline, consolidation, billing",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Billing utilities
    Billing {
        #[command(subcommand)]
        command: BillingCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum BillingCommand {
    /// Print the invoice breakdown for an agency amount
    Invoice(InvoiceArgs),
}

#[derive(Args, Debug)]
struct InvoiceArgs {
    /// Agency amount in whole rupees
    #[arg(long)]
    amount: u64,
    /// Agreed percentage for the agency category (0-100)
    #[arg(long)]
    percentage: f64,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Billing {
            command: BillingCommand::Invoice(args),
        } => run_invoice(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let repository = Arc::new(InMemoryJobPostRepository::default());
    let store = Arc::new(InMemoryApplicationStore::default());
    let reference_store = Arc::new(InMemoryReferenceStore::default());
    let syndication = Arc::new(RecordingSyndication::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let outbox = Arc::new(InMemoryOutbox::default());

    let workflow = Arc::new(JobWorkflowService::new(
        repository.clone(),
        syndication.clone(),
        outbox.clone(),
    ));
    let tracker = Arc::new(ApplicationTracker::new(
        store,
        repository.clone(),
        outbox.clone(),
    ));
    let engine = Arc::new(ConsolidationEngine::new(reference_store));

    let relay = SyndicationRelay::new(syndication, notifier);
    let relay_outbox = outbox.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        loop {
            ticker.tick().await;
            let events = relay_outbox.drain();
            relay.deliver_all(&events);
        }
    });

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(jobs_router(workflow))
        .merge(application_router(tracker))
        .merge(consolidation_router(engine))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "job-board workflow service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_invoice(args: InvoiceArgs) -> Result<(), AppError> {
    let breakdown = invoice_breakdown(Paise::from_rupees(args.amount), args.percentage)?;

    println!("Invoice breakdown for {} at {}%", breakdown.amount, args.percentage);
    println!("- service tax (14%):        {}", breakdown.service_tax);
    println!("- swachh bharat cess (0.5%): {}", breakdown.swachh_bharat_cess);
    println!("- krishi kalyan cess (0.5%): {}", breakdown.krishi_kalyan_cess);
    println!("- agreed amount:            {}", breakdown.agreed_percentage_amount);
    println!("- total deducted:           {}", breakdown.deducted);
    println!("- total invoice:            {}", breakdown.total_invoice);
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
