use std::env;
use std::error::Error;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use futures::future::join_all;
use skewer::{BatchSubmitter, SubmitterConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

const CALLERS: u64 = 100;

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn config_from_env() -> SubmitterConfig {
    let defaults = SubmitterConfig::default();
    SubmitterConfig::default()
        .with_min_batch_size(env_or("SKEWER_MIN_BATCH", defaults.min_batch_size))
        .with_max_batch_size(env_or("SKEWER_MAX_BATCH", defaults.max_batch_size))
        .with_timeout(Duration::from_millis(env_or("SKEWER_TIMEOUT_MS", 10)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config_from_env();
    info!(?config, "starting batch submit demo");

    let submitter = Arc::new(BatchSubmitter::from_async_fn(
        |inputs: Vec<u64>| async move {
            info!(size = inputs.len(), first = ?inputs.first(), "backend received batch");
            // one second per call, however many inputs it carries
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok::<_, std::io::Error>(inputs.into_iter().map(|x| x * 3).collect::<Vec<u64>>())
        },
        config,
    )?);

    let start = Instant::now();
    for round in 0..2 {
        let callers = (0..CALLERS)
            .map(|x| {
                let submitter = submitter.clone();
                tokio::spawn(async move { submitter.submit(x).await })
            })
            .collect::<Vec<_>>();

        for (x, joined) in (0..CALLERS).zip(join_all(callers).await) {
            let output = joined??;
            if output != x * 3 {
                return Err(format!("caller {x} received {output}").into());
            }
        }
        info!(round, callers = CALLERS, "every caller received its own result");
    }

    submitter.stop().await;
    info!(elapsed = ?start.elapsed(), "batch submit ran to completion");
    Ok(())
}
