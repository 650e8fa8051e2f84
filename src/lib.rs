pub mod api;
pub mod cache;
pub mod config;
pub mod constants;
pub mod db;
pub mod entities;
pub mod scheduler;
pub mod services;
pub mod state;

use anyhow::Context;
pub use config::Config;
use scheduler::Scheduler;
use state::SharedState;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "stride")?
            .extra_field("env", "production")?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "serve" | "daemon" | "-d" | "--daemon" => run_daemon(config, prometheus_handle).await,

        "evaluate" | "e" => {
            if args.len() < 4 {
                println!("Usage: stride evaluate <team_id> <YYYY-MM-DD>");
                println!("Example: stride evaluate 3f0e21ab 2026-08-05");
                return Ok(());
            }
            cmd_evaluate(&config, &args[2], &args[3]).await
        }

        "sweep" => cmd_sweep(config).await,

        "teams" | "t" => cmd_teams(&config).await,

        "leaderboard" | "lb" => cmd_leaderboard(&config).await,

        "init" | "--init" => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }

        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        _ => {
            println!("Unknown command: {}", args[1]);
            println!();
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!("Stride - Team Wellness Challenge Server");
    println!("Daily activity logging, team points, and the weekly team bonus");
    println!();
    println!("USAGE:");
    println!("  stride <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("  serve             Run the HTTP API with the background scheduler");
    println!("  evaluate <t> <d>  Run the team bonus check for one team and date");
    println!("  sweep             Evaluate today's bonus for every full team");
    println!("  teams             List teams with points and roster size");
    println!("  leaderboard, lb   Show team and individual leaderboards");
    println!("  init              Create default config file");
    println!("  help              Show this help message");
    println!();
    println!("EXAMPLES:");
    println!("  stride serve                          # Start the server");
    println!("  stride evaluate 3f0e21ab 2026-08-05   # Check one team for a date");
    println!("  stride sweep                          # Manual Wednesday sweep");
    println!();
    println!("CONFIG:");
    println!("  Edit config.toml (or set STRIDE_CONFIG) to configure the server.");
}

async fn run_daemon(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!(
        "Stride v{} starting in server mode...",
        env!("CARGO_PKG_VERSION")
    );

    let shared = SharedState::new(config.clone()).await?;
    let api_state = api::create_app_state(shared.clone(), prometheus_handle).await?;

    let scheduler = Scheduler::new(shared, config.scheduler.clone());
    let scheduler_handle = tokio::spawn(async move {
        if let Err(e) = scheduler.start().await {
            error!("Scheduler error: {}", e);
        }
    });

    let port = config.server.port;
    let app = api::router(api_state).await;
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server_handle = tokio::spawn(async move {
        info!("🌐 Web Server running at http://0.0.0.0:{}", port);
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server error: {}", e);
        }
    });

    info!("Server running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    scheduler_handle.abort();
    server_handle.abort();
    info!("Server stopped");

    Ok(())
}

async fn cmd_evaluate(config: &Config, team_id: &str, date: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;

    let team = match state.store.get_team(team_id).await? {
        Some(t) => t,
        None => {
            println!("Team with ID {} not found.", team_id);
            println!("Use 'stride teams' to see team IDs.");
            return Ok(());
        }
    };

    println!("Evaluating '{}' for {}", team.name, date);
    println!("{:-<60}", "");

    match state.bonus_service.evaluate(team_id, date).await {
        Ok(outcome) => {
            let marker = if outcome.achieved { "✓" } else { "✗" };
            println!("{} {}", marker, outcome.message);

            if let Some(t) = state.store.get_team(team_id).await? {
                println!("  Team points: {}", t.total_points);
            }
        }
        Err(e) => {
            println!("Evaluation failed: {}", e);
        }
    }

    Ok(())
}

async fn cmd_sweep(config: Config) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;
    let scheduler = Scheduler::new(state, config.scheduler);

    let stats = scheduler.run_once().await?;

    println!();
    println!(
        "Sweep complete. {} evaluated, {} awarded, {} skipped (not full).",
        stats.evaluated, stats.awarded, stats.skipped
    );

    Ok(())
}

async fn cmd_teams(config: &Config) -> anyhow::Result<()> {
    use constants::bonus::REQUIRED_TEAM_SIZE;

    let state = SharedState::new(config.clone()).await?;
    let teams = state.store.list_teams().await?;

    if teams.is_empty() {
        println!("No teams yet.");
        println!();
        println!("Teams are created through the API: POST /api/teams");
        return Ok(());
    }

    println!("Teams ({} total)", teams.len());
    println!("{:-<70}", "");

    for team in teams {
        let members = state.store.team_member_count(&team.id).await.unwrap_or(0);
        let full_marker = if members == REQUIRED_TEAM_SIZE as u64 {
            "●"
        } else {
            "○"
        };

        println!("{} {} [{} pts]", full_marker, team.name, team.total_points);
        println!(
            "  ID: {} | Members: {}/{}",
            team.id, members, REQUIRED_TEAM_SIZE
        );
    }

    println!();
    println!("Legend: ● Full roster | ○ Open");

    Ok(())
}

async fn cmd_leaderboard(config: &Config) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;

    let teams = state
        .leaderboard_service
        .teams(constants::limits::DEFAULT_LEADERBOARD_LIMIT)
        .await?;
    let users = state
        .leaderboard_service
        .users(constants::limits::DEFAULT_LEADERBOARD_LIMIT)
        .await?;

    println!("Team Leaderboard");
    println!("{:-<60}", "");
    if teams.is_empty() {
        println!("No teams yet.");
    }
    for row in teams {
        println!("{:>3}. {} [{} pts]", row.rank, row.name, row.total_points);
    }

    println!();
    println!("Individual Leaderboard");
    println!("{:-<60}", "");
    if users.is_empty() {
        println!("No users yet.");
    }
    for row in users {
        println!("{:>3}. {} [{} pts]", row.rank, row.name, row.total_points);
    }

    Ok(())
}
