//! AgriWatch operations CLI.
//!
//! Thin command-line front over `agriwatch-client`: list and inspect
//! farms, submit an analysis job and poll it to completion, and query
//! the advanced analysis endpoints.

use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use agriwatch_client::poller::{JobWatcher, PollConfig, PollState};
use agriwatch_client::{ApiClient, ClientConfig};
use agriwatch_core::analysis::AnalysisRequest;
use agriwatch_core::farm::Farm;
use agriwatch_core::indices::NdviCategory;

#[derive(Parser)]
#[command(name = "agriwatch")]
#[command(about = "AgriWatch farm monitoring CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Farm inventory operations.
    Farms {
        #[command(subcommand)]
        command: FarmsCommand,
    },
    /// Submit an analysis job for a farm and poll it to completion.
    Analyze {
        farm_id: Uuid,
        /// Window start (default: 90 days before the end date).
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Window end (default: today).
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Synchronous comprehensive analysis for a farm.
    Comprehensive {
        farm_id: Uuid,
        #[arg(long, default_value = "wheat")]
        crop_type: String,
    },
    /// Risk factor breakdown and alerts for a farm.
    Risk { farm_id: Uuid },
    /// Historical values of one index for a farm.
    TimeSeries {
        farm_id: Uuid,
        #[arg(long, default_value = "NDVI")]
        index: String,
        #[arg(long, default_value_t = 90)]
        days: u32,
    },
}

#[derive(Subcommand)]
enum FarmsCommand {
    /// List farms, optionally filtered by substring search.
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one farm.
    Show { id: Uuid },
    /// Delete a farm.
    Delete { id: Uuid },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agriwatch=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env();

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), Box<dyn Error>> {
    let client = Arc::new(ApiClient::new(&config)?);

    match cli.command {
        Commands::Farms { command } => match command {
            FarmsCommand::List { search } => {
                let farms = client.list_farms(search.as_deref(), None, None).await?;
                if farms.is_empty() {
                    println!("No farms found");
                }
                for farm in &farms {
                    print_farm_line(farm);
                }
            }
            FarmsCommand::Show { id } => {
                let farm = client.get_farm(id).await?;
                print_farm_detail(&farm);
            }
            FarmsCommand::Delete { id } => {
                client.delete_farm(id).await?;
                println!("Farm {id} deleted");
            }
        },

        Commands::Analyze {
            farm_id,
            start,
            end,
        } => {
            let farm = client.get_farm(farm_id).await?;
            let end = end.unwrap_or_else(|| chrono::Utc::now().date_naive());
            let start = start.unwrap_or(end - chrono::Duration::days(90));

            let mut request = AnalysisRequest::new(farm.geometry.clone(), start, end);
            request.farm_id = Some(farm_id);

            let job = client.submit_analysis(&request).await?;
            println!(
                "Job {} submitted ({}), polling every {} ms",
                job.job_id,
                job.status.label(),
                config.poll_interval_ms
            );

            poll_to_completion(Arc::clone(&client), &config, job.job_id).await?;
        }

        Commands::Comprehensive { farm_id, crop_type } => {
            let farm = client.get_farm(farm_id).await?;
            let request = agriwatch_core::advanced::ComprehensiveRequest {
                farm_id,
                geometry: farm.geometry.clone(),
                crop_type,
                start_date: None,
                end_date: None,
            };
            let analysis = client.comprehensive_analysis(&request).await?;

            println!("Comprehensive analysis for {} ({})", farm.name, analysis.analysis_date);
            if let Some(ndvi) = analysis.indices.ndvi {
                println!(
                    "  NDVI {ndvi:.3} ({})",
                    NdviCategory::from_value(ndvi).label()
                );
            }
            println!(
                "  Health {:.1} ({})",
                analysis.health_score.overall_score,
                analysis.health_score.status().label()
            );
            println!(
                "  Yield {:.2} t/ha ({:.2}-{:.2}, {:.0}% confidence)",
                analysis.yield_estimation.estimated_yield_tha,
                analysis.yield_estimation.yield_min,
                analysis.yield_estimation.yield_max,
                analysis.yield_estimation.confidence
            );
            println!("  Stage: {}", analysis.crop_stage.current_stage);
            for rec in &analysis.recommendations {
                println!("  - {rec}");
            }
        }

        Commands::Risk { farm_id } => {
            let assessment = client.risk_assessment(farm_id).await?;
            println!(
                "Overall risk {:.1} ({})",
                assessment.overall_risk, assessment.risk_status
            );
            let mut factors: Vec<_> = assessment.factors.iter().collect();
            factors.sort_by(|a, b| a.0.cmp(b.0));
            for (kind, factor) in factors {
                println!(
                    "  {kind}: {:.1} ({}): {}",
                    factor.level,
                    factor.band().label(),
                    factor.description
                );
            }
            for alert in &assessment.alerts {
                println!("  [{}] {}", alert.severity, alert.message);
            }
        }

        Commands::TimeSeries {
            farm_id,
            index,
            days,
        } => {
            let series = client.advanced_time_series(farm_id, &index, days).await?;
            println!(
                "{} over the last {} days ({} samples)",
                series.index,
                series.period_days,
                series.data.len()
            );
            for point in &series.data {
                println!("  {}  {:.3}", point.date, point.value);
            }
            if let Some(summary) = agriwatch_core::timeseries::summarize(&series.data) {
                println!(
                    "min {:.3}  max {:.3}  latest {:.3}",
                    summary.min, summary.max, summary.latest
                );
            }
        }
    }

    Ok(())
}

/// Watch a submitted job until it settles, printing each transition.
async fn poll_to_completion(
    client: Arc<ApiClient>,
    config: &ClientConfig,
    job_id: Uuid,
) -> Result<(), Box<dyn Error>> {
    let poll_config = PollConfig {
        interval: config.poll_interval(),
        ..PollConfig::default()
    };
    let watcher = JobWatcher::new(client, poll_config);
    let mut rx = watcher.subscribe();
    watcher.watch(Some(job_id));

    loop {
        rx.changed().await?;
        let state = rx.borrow().clone();
        match state {
            PollState::Idle => {}
            PollState::Active(job) => {
                println!(
                    "  {} {}%{}",
                    job.status.label(),
                    job.progress,
                    job.message.map(|m| format!(": {m}")).unwrap_or_default()
                );
            }
            PollState::Retrying { error, attempt, .. } => {
                println!("  poll failed (attempt {attempt}), retrying: {error}");
            }
            PollState::Completed { result, .. } => {
                println!("Completed ({} images processed)", result.images_processed);
                let mut indices: Vec<_> = result.indices.iter().collect();
                indices.sort_by(|a, b| a.0.cmp(b.0));
                for (name, value) in indices {
                    if name == "ndvi" {
                        println!(
                            "  {name}: {value:.3} ({})",
                            NdviCategory::from_value(*value).label()
                        );
                    } else {
                        println!("  {name}: {value:.3}");
                    }
                }
                return Ok(());
            }
            PollState::Failed(job) => {
                let message = job.message.unwrap_or_else(|| "no message".to_string());
                return Err(format!("job failed: {message}").into());
            }
            PollState::Stalled { error, .. } => {
                return Err(format!("polling stalled: {error}").into());
            }
        }
    }
}

fn print_farm_line(farm: &Farm) {
    let ndvi = match farm.latest_ndvi {
        Some(v) => format!("NDVI {v:.2} ({})", NdviCategory::from_value(v).label()),
        None => "no analysis yet".to_string(),
    };
    println!(
        "{}  {}  {:.2} ha  {}",
        farm.id,
        farm.name,
        farm.area_sqm / 10_000.0,
        ndvi
    );
}

fn print_farm_detail(farm: &Farm) {
    println!("{}", farm.name);
    println!("  id: {}", farm.id);
    if let Some(farmer) = &farm.farmer_name {
        println!("  farmer: {farmer}");
    }
    if let Some(location) = &farm.location {
        println!("  location: {location}");
    }
    if let Some(crop) = &farm.crop_type {
        println!("  crop: {crop}");
    }
    println!("  area: {:.2} ha (backend)", farm.area_sqm / 10_000.0);
    println!(
        "  area: {:.2} ha (planar estimate)",
        farm.geometry.area_hectares()
    );
    if let Some(c) = farm.geometry.centroid() {
        println!("  centroid: {:.4}, {:.4}", c[1], c[0]);
    }
    if let Some(ndvi) = farm.latest_ndvi {
        println!(
            "  latest NDVI: {ndvi:.3} ({})",
            NdviCategory::from_value(ndvi).label()
        );
    }
}
