//! helm CLI binary entry point.

use helm::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("helm=error")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();

    if let Err(e) = helm::cli::run(cli).await {
        eprintln!("Error: {e}");
        eprintln!("Hint: {}", e.recovery_suggestion().hint());
        std::process::exit(1);
    }
}
