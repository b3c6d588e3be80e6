use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter for library logs, e.g. `DUALPACK_LOG=dualpack=debug`.
const LOG_ENV: &str = "DUALPACK_LOG";

pub fn init_logger(silent: bool) {
  let filter = if silent {
    EnvFilter::new("error")
  } else {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
  };

  let fmt_layer =
    fmt::layer().with_writer(std::io::stderr).with_target(false).without_time().compact();

  tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
