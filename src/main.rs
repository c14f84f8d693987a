use std::process::ExitCode;
use std::sync::Arc;

use tracing::info;

use marksift::core::types::{FetchOptions, OutputFormat};
use marksift::fetch::batch::{fetch_batch, DEFAULT_MAX_CONCURRENT};
use marksift::metrics::MemoryCounter;
use marksift::AppState;

struct CliArgs {
    options: FetchOptions,
    concurrency: usize,
    urls: Vec<String>,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut options = FetchOptions::default();
    let mut concurrency = DEFAULT_MAX_CONCURRENT;
    let mut urls = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(a) = args.next() {
        match a.as_str() {
            "--raw" => options.format = OutputFormat::Raw,
            "--summary" => options.format = OutputFormat::Summary,
            "--external" => options.use_external = true,
            "--save-debug" => options.save_debug = true,
            "--concurrency" => {
                let v = args.next().ok_or("--concurrency needs a value")?;
                concurrency = v
                    .parse()
                    .map_err(|_| format!("invalid --concurrency value: {v}"))?;
            }
            other if other.starts_with("--concurrency=") => {
                let v = &other["--concurrency=".len()..];
                concurrency = v
                    .parse()
                    .map_err(|_| format!("invalid --concurrency value: {v}"))?;
            }
            "--help" | "-h" => return Err(usage()),
            other if other.starts_with("--") => {
                return Err(format!("unknown flag: {other}\n{}", usage()));
            }
            url => urls.push(url.to_string()),
        }
    }

    if urls.is_empty() {
        return Err(usage());
    }
    Ok(CliArgs {
        options,
        concurrency,
        urls,
    })
}

fn usage() -> String {
    "usage: marksift [--raw|--summary] [--external] [--save-debug] [--concurrency N] URL..."
        .to_string()
}

#[tokio::main]
async fn main() -> ExitCode {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let counters = Arc::new(MemoryCounter::new());
    let state = Arc::new(AppState::new().with_counters(counters.clone()));
    info!(urls = args.urls.len(), concurrency = args.concurrency, "starting batch fetch");

    let results = fetch_batch(&state, &args.urls, args.options, args.concurrency).await;

    for (backend, (ok, err)) in counters.totals() {
        info!(backend, ok, err, "backend totals");
    }

    let mut any_ok = false;
    // Report in input order, not map order.
    for url in &args.urls {
        match results.get(url).and_then(|r| r.as_deref()) {
            Some(content) => {
                any_ok = true;
                println!("==> {url}\n{content}\n");
            }
            None => eprintln!("==> {url}\n(fetch failed, see logs)\n"),
        }
    }

    if any_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
