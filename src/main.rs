use clap::Parser;

use relaylink::cli::Cli;
use relaylink::config::{StaticConfig, init_config};
use relaylink::runtime::run_server;
use relaylink::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.generate_config {
        match StaticConfig::generate_sample_config() {
            Ok(sample) => println!("{}", sample),
            Err(e) => {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let config = match init_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    // guard 必须存活到进程结束，否则日志不会被刷新
    let _log_guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    run_server(config).await
}
