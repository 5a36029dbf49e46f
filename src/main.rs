//! ticket-summarizer CLI
//!
//! Collects context from Slack, Confluence and GitHub, summarizes it in
//! two generation stages and writes the result to a Jira ticket.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ticket_summarizer::cli::{parse_args, run_cli_mode};

fn main() {
    // Usage errors, --help and --version exit here with clap's status
    let args = match parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    // RUST_LOG wins over --log-level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let exit_code = run_cli_mode(args);
    std::process::exit(exit_code);
}
