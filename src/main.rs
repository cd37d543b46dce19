use actix_web::{web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use std::time::Duration;

mod api;
mod cli;
mod metrics;
mod models;
mod services;
mod state;

use api::{get_metrics, health};
use cli::CommandArgs;
use state::new_state;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CommandArgs::parse();
    let bind_address = format!("{}:{}", args.address, args.port);
    let interval = Duration::from_secs(args.interval);

    let state = new_state();

    actix_rt::spawn(services::run_poller(state.clone(), interval));

    print_banner(&args);
    log::info!(
        "Starting PM2 exporter on {}, scraping every {}s",
        bind_address,
        args.interval
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .route("/metrics", web::get().to(get_metrics))
            .route("/health", web::get().to(health))
    })
    .bind(&bind_address)
    .with_context(|| format!("failed to bind {bind_address}"))?
    .run()
    .await?;

    Ok(())
}

fn print_banner(args: &CommandArgs) {
    println!("╔═══════════════════════════════════════════════════════════╗");
    println!("║      PM2 Exporter v0.1.0                                  ║");
    println!("║      Prometheus metrics for PM2-managed processes         ║");
    println!("╚═══════════════════════════════════════════════════════════╝");
    println!();
    println!("🚀 Server starting on http://{}:{}", args.address, args.port);
    println!();
    println!("📋 Available endpoints:");
    println!("  GET  /metrics  - Prometheus metrics");
    println!("  GET  /health   - Health check");
    println!();
    println!("💡 Runs `pm2 jlist` every {}s in the background", args.interval);
    println!("═══════════════════════════════════════════════════════════");
}
