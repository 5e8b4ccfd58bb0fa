use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use estimator_ai::config::AppConfig;
use estimator_ai::error::AppError;
use chrono::{Local, NaiveDate};
use estimator_ai::pricing::{
    compute_breakdown, estimate_router, lineitems, rates, CommissionStructure, ComplexityClass,
    CostInputs, CostTemplate, EstimateBreakdown, EstimateRecomputeCoordinator,
    InMemoryEstimateRepository, InMemoryRateSource, RegionZone, RepAssignment, RepId,
    RepRateProfile, Season, SplitShares,
};
use estimator_ai::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::fs::File;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Estimate Pricing Engine",
    about = "Price job estimates with guaranteed margin and commission allocation",
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
    /// Price an estimate from the command line
    Estimate {
        #[command(subcommand)]
        command: EstimateCommand,
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
    /// JSON file of representative rate profiles to serve lookups from
    #[arg(long)]
    rates_json: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum EstimateCommand {
    /// Compute a full pricing breakdown for one job
    Price(PriceArgs),
}

#[derive(Args, Debug)]
struct PriceArgs {
    /// Material base cost in dollars
    #[arg(long, default_value_t = 0.0)]
    material: f64,
    /// Labor base cost in dollars
    #[arg(long, default_value_t = 0.0)]
    labor: f64,
    /// Line-item CSV (Description, Category, Quantity, Unit Cost); overrides
    /// --material and --labor when given
    #[arg(long)]
    line_items_csv: Option<PathBuf>,
    /// Price from the standard per-square template at this complexity tier
    /// instead of --material/--labor
    #[arg(long, value_parser = parse_complexity)]
    complexity: Option<ComplexityClass>,
    /// Region zone for template pricing (defaults to suburban)
    #[arg(long, value_parser = parse_region)]
    region: Option<RegionZone>,
    /// Job date (YYYY-MM-DD) picking the seasonal labor window; defaults to
    /// today
    #[arg(long, value_parser = parse_job_date)]
    job_date: Option<NaiveDate>,
    /// Fixed pass-through costs (permits, dumpsters)
    #[arg(long, default_value_t = 0.0)]
    fixed_costs: f64,
    /// Measured job size in squares
    #[arg(long, default_value_t = 0.0)]
    area: f64,
    /// Material waste buffer percent (defaults from configuration)
    #[arg(long)]
    waste: Option<f64>,
    /// Labor contingency buffer percent (defaults from configuration)
    #[arg(long)]
    contingency: Option<f64>,
    /// Overhead percent of selling price (defaults from configuration)
    #[arg(long)]
    overhead: Option<f64>,
    /// Guaranteed net margin percent (defaults from configuration)
    #[arg(long)]
    target_margin: Option<f64>,
    /// Primary representative commission percent
    #[arg(long)]
    commission: Option<f64>,
    /// Primary commission structure
    #[arg(long, value_parser = parse_structure)]
    structure: Option<CommissionStructure>,
    /// Primary representative's personal overhead override percent
    #[arg(long)]
    personal_overhead: Option<f64>,
    /// Secondary representative commission percent (enables a second rep)
    #[arg(long)]
    secondary_commission: Option<f64>,
    /// Secondary commission structure
    #[arg(long, value_parser = parse_structure)]
    secondary_structure: Option<CommissionStructure>,
    /// Secondary representative's personal overhead override percent
    #[arg(long)]
    secondary_personal_overhead: Option<f64>,
    /// Primary share of a profit-split pool (requires --split-secondary)
    #[arg(long)]
    split_primary: Option<f64>,
    /// Secondary share of a profit-split pool (requires --split-primary)
    #[arg(long)]
    split_secondary: Option<f64>,
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
        Command::Estimate {
            command: EstimateCommand::Price(args),
        } => run_price(args),
    }
}

fn parse_complexity(raw: &str) -> Result<ComplexityClass, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "simple" => Ok(ComplexityClass::Simple),
        "standard" => Ok(ComplexityClass::Standard),
        "complex" => Ok(ComplexityClass::Complex),
        "custom" => Ok(ComplexityClass::Custom),
        other => Err(format!(
            "unknown complexity '{other}' (expected simple, standard, complex, or custom)"
        )),
    }
}

fn parse_region(raw: &str) -> Result<RegionZone, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "metro" => Ok(RegionZone::Metro),
        "suburban" => Ok(RegionZone::Suburban),
        "rural" => Ok(RegionZone::Rural),
        other => Err(format!(
            "unknown region '{other}' (expected metro, suburban, or rural)"
        )),
    }
}

fn parse_job_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|err| err.to_string())
}

fn parse_structure(raw: &str) -> Result<CommissionStructure, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "profit_split" | "profit-split" => Ok(CommissionStructure::ProfitSplit),
        "sales_percentage" | "sales-percentage" | "percentage_of_contract" => {
            Ok(CommissionStructure::SalesPercentage)
        }
        other => Err(format!(
            "unknown commission structure '{other}' (expected profit_split or sales_percentage)"
        )),
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

    let rate_source = Arc::new(load_rate_source(args.rates_json.take())?);
    let repository = Arc::new(InMemoryEstimateRepository::new());
    let coordinator = Arc::new(EstimateRecomputeCoordinator::new(repository, rate_source));

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
        .merge(estimate_router(coordinator))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "estimate pricing engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn load_rate_source(path: Option<PathBuf>) -> Result<InMemoryRateSource, AppError> {
    let Some(path) = path else {
        return Ok(InMemoryRateSource::default());
    };

    let file = File::open(path)?;
    let profiles: Vec<RepRateProfile> = serde_json::from_reader(file)
        .map_err(|err| AppError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))?;
    Ok(InMemoryRateSource::from_profiles(profiles))
}

fn run_price(args: PriceArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let defaults = config.pricing;

    let (mut costs, job_class) = match (args.complexity, &args.line_items_csv) {
        (Some(complexity), _) => {
            let region = args.region.unwrap_or(RegionZone::Suburban);
            let season =
                Season::from_date(args.job_date.unwrap_or_else(|| Local::now().date_naive()));
            let costs = CostTemplate::standard().cost_inputs(
                args.area,
                complexity,
                season,
                region,
                args.fixed_costs,
            );
            (costs, Some((complexity, season, region)))
        }
        (None, Some(path)) => {
            let file = File::open(path)?;
            let totals = lineitems::totals_from_reader(file)?;
            (
                CostInputs {
                    material_base_cost: totals.material_base_cost,
                    labor_base_cost: totals.labor_base_cost,
                    waste_factor_percent: defaults.waste_factor_percent,
                    contingency_percent: defaults.contingency_percent,
                    fixed_costs: args.fixed_costs,
                    measured_area: args.area,
                },
                None,
            )
        }
        (None, None) => (
            CostInputs {
                material_base_cost: args.material,
                labor_base_cost: args.labor,
                waste_factor_percent: defaults.waste_factor_percent,
                contingency_percent: defaults.contingency_percent,
                fixed_costs: args.fixed_costs,
                measured_area: args.area,
            },
            None,
        ),
    };
    if let Some(waste) = args.waste {
        costs.waste_factor_percent = waste;
    }
    if let Some(contingency) = args.contingency {
        costs.contingency_percent = contingency;
    }
    let mut targets = defaults.target_percentages();
    if let Some(overhead) = args.overhead {
        targets.overhead_percent = overhead;
    }
    if let Some(margin) = args.target_margin {
        targets.target_margin_percent = margin;
    }

    let primary = rates::resolve(&RepRateProfile {
        rep_id: RepId("cli-primary".to_string()),
        overhead_percent: Some(targets.overhead_percent),
        personal_overhead_percent: args.personal_overhead,
        commission_percent: args.commission,
        commission_structure: args.structure,
    });

    let secondary = args.secondary_commission.map(|commission| {
        rates::resolve(&RepRateProfile {
            rep_id: RepId("cli-secondary".to_string()),
            overhead_percent: Some(targets.overhead_percent),
            personal_overhead_percent: args.secondary_personal_overhead,
            commission_percent: Some(commission),
            commission_structure: args.secondary_structure,
        })
    });

    let primary_structure = primary.commission_structure;
    let assignment = match (secondary, args.split_primary, args.split_secondary) {
        (Some(secondary), Some(primary_percent), Some(secondary_percent)) => {
            RepAssignment::profit_split(
                primary,
                secondary,
                SplitShares {
                    primary_percent,
                    secondary_percent,
                },
            )?
        }
        (Some(secondary), _, _) => RepAssignment::Dual { primary, secondary },
        (None, _, _) => RepAssignment::Single { primary },
    };

    let breakdown = compute_breakdown(&costs, &targets, &assignment)?;
    render_breakdown(&costs, &breakdown, job_class, primary_structure);
    Ok(())
}

fn render_breakdown(
    costs: &CostInputs,
    breakdown: &EstimateBreakdown,
    job_class: Option<(ComplexityClass, Season, RegionZone)>,
    primary_structure: CommissionStructure,
) {
    println!("Estimate pricing breakdown");
    if let Some((complexity, season, region)) = job_class {
        println!(
            "Template job: {} complexity, {} season, {} region",
            complexity.label(),
            season.label(),
            region.label()
        );
    }
    println!(
        "Base costs: material ${:.2}, labor ${:.2}, fixed ${:.2}",
        costs.material_base_cost, costs.labor_base_cost, costs.fixed_costs
    );

    println!("\nSelling price: ${:.2}", breakdown.selling_price);
    if breakdown.price_per_unit_area > 0.0 {
        println!("Price per square: ${:.2}", breakdown.price_per_unit_area);
    }

    println!("\nCustomer-facing lines");
    println!(
        "- Material: ${:.2} ({:+.1}% markup)",
        breakdown.material_total, breakdown.material_markup_percent
    );
    println!(
        "- Labor: ${:.2} ({:+.1}% markup)",
        breakdown.labor_total, breakdown.labor_markup_percent
    );

    println!("\nAllocation");
    println!("- Overhead: ${:.2}", breakdown.overhead_amount);
    println!(
        "- Primary commission ({}): ${:.2}",
        primary_structure.label(),
        breakdown.primary_commission_amount
    );
    if breakdown.secondary_commission_amount > 0.0 {
        println!(
            "- Secondary commission: ${:.2}",
            breakdown.secondary_commission_amount
        );
    }
    println!("- Target profit: ${:.2}", breakdown.target_profit_amount);
    println!("- Company net: ${:.2}", breakdown.company_net);
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
