use slotpipe::config::PipelineConfig;
use slotpipe::error::PipelineError;
use slotpipe::pipeline::Pipeline;
use slotpipe::timer::PeriodicTimer;
use std::convert::Infallible;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Process entry point: build the pool, start the periodic producer, drain forever.
fn main() {
    let config = match PipelineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("slotpipe: {e}");
            std::process::exit(2);
        }
    };
    init_tracing(&config.log_filter);

    if let Err(e) = run(&config) {
        error!(error = %e, "slotpipe: fatal");
        std::process::exit(1);
    }
}

fn init_tracing(default_filter: &str) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_names(true)
        .compact();
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();
}

fn run(config: &PipelineConfig) -> Result<Infallible, PipelineError> {
    let (mut producer, mut consumer) = Pipeline::from_config(config)?.split();

    info!(
        capacity = config.capacity,
        half = config.half(),
        period_ms = config.period_ms,
        "slotpipe running"
    );

    let _timer = PeriodicTimer::start(config.initial_delay(), config.period(), move || {
        producer.tick();
    })?;

    consumer.run_forever()
}
