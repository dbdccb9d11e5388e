use anyhow::{Context, Result};
use chain_stats::config::{self, Args};
use chain_stats::report::{self, RunStats};
use chain_stats::{Pipeline, RpcClient};
use clap::Parser;
use log::{info, warn};
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<()> {
    let started = Instant::now();

    // Pick up RPC settings from a local .env before parsing arguments
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let args = Args::parse();
    if args.user.is_none() {
        warn!("No RPC user given, calling the node without credentials");
    }

    let client = RpcClient::new(args.rpc_url(), args.timeout())
        .context("failed to build HTTP client")?
        .with_auth(args.user.clone(), args.password.clone());
    info!("Using node at {}", client.url());

    let since = args.since_or_default(config::now());

    let pipeline = Pipeline::new(client).with_concurrency(args.concurrency);
    let stats = pipeline
        .run(since, config::now)
        .await
        .context("failed to collect chain statistics")?;

    if let Some(dir) = &args.output_dir {
        report::write_csv(&stats, dir)?;
    }

    let run = RunStats::capture(started);
    print!("{}", report::render(&stats, &run));

    Ok(())
}
