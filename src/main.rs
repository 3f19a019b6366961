use agenda::cli::Cli;
use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::{error, info};

fn main() -> Result<()> {
    // Initialize logging with custom format
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use chrono::Local;
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    let cli = Cli::parse();
    info!("Starting agenda: {:?}", cli.command);

    if let Err(err) = agenda::commands::run(cli) {
        error!("{:#}", err);
        std::process::exit(1);
    }
    Ok(())
}
