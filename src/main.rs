use clap::Parser;
use ers_session::cli::{Args, build_config, init_logging};
use ers_session::{commands, create_session};
use tracing::error;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(config) = build_config(&args) else {
        std::process::exit(1);
    };

    let mut session = create_session(config);
    session.controller.restore();

    if let Err(e) = commands::run(&mut session, args.command).await {
        error!(error = %e, "Command failed");
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
