use std::convert::Infallible;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use futures::future::join_all;
use skewer::{suspending, AsyncCallable, ParallelLimit, PeriodicConfig, PeriodicTask};
use tracing::info;
use tracing_subscriber::EnvFilter;

const MAX_PARALLEL: usize = 3;
const JOBS: u32 = 12;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let limited = Arc::new(ParallelLimit::new(
        suspending(|job: u32| async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            job * job
        }),
        MAX_PARALLEL,
    )?);

    let mut monitor = PeriodicTask::from_fn(
        {
            let limited = limited.clone();
            move |()| {
                info!(active = limited.active(), max = limited.max_parallel(), "jobs running");
                Ok::<_, Infallible>(())
            }
        },
        PeriodicConfig::default().with_delay(Duration::from_millis(100)),
    );

    info!(jobs = JOBS, max_parallel = MAX_PARALLEL, "starting limited jobs");
    let squares = monitor
        .scoped(|| join_all((0..JOBS).map(|job| limited.call(job))))
        .await?;

    info!(?squares, "all jobs finished");
    Ok(())
}
