use clap::Parser;
use tokio::runtime::Runtime;

use buildchime::cli::{Cli, Commands};
use buildchime::config::Config;
use buildchime::context::BuildContext;
use buildchime::notifier;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let rt = Runtime::new()?;
    rt.block_on(async {
        match cli.command {
            Commands::Notify { profile } => {
                let config = Config::load(cli.config.clone())?;
                let prof = config.profile(&profile)?;

                let ctx = BuildContext::from_env();
                notifier::execute(&ctx, prof).await?;
            }
            Commands::Version { json } => {
                if json {
                    let info = serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION"),
                        "commit": option_env!("GIT_SHA").unwrap_or("unknown"),
                        "build_date": option_env!("BUILD_DATE").unwrap_or("unknown"),
                    });
                    println!("{}", serde_json::to_string_pretty(&info)?);
                } else {
                    println!(
                        "buildchime {} (commit: {}, built: {})",
                        env!("CARGO_PKG_VERSION"),
                        option_env!("GIT_SHA").unwrap_or("unknown"),
                        option_env!("BUILD_DATE").unwrap_or("unknown"),
                    );
                }
            }
        }
        Ok(())
    })
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.to_string()))
        .with_writer(std::io::stderr)
        .init();
}
