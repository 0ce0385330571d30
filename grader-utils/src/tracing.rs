use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Filtering follows `RUST_LOG`.
///
/// Logs go to stderr so that stdout stays free for verdict output.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_timer(ChronoLocal::rfc3339())
        .with_writer(std::io::stderr)
        .finish()
        .with(ErrorLayer::default())
        .init();
}

/// Test variant of [`setup_tracing`]: output is captured by the test harness
/// and an already installed subscriber is not an error.
pub fn setup_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .finish()
        .with(ErrorLayer::default())
        .try_init();
}
