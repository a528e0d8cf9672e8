use anyhow::Result;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "DYNFORM_LOG";

fn main() -> Result<()> {
    // stdout belongs to the terminal UI, so logs only go to stderr and only on request.
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    dynform::ui::run()
}
