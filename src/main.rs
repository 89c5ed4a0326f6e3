use std::fs::File;
use std::io;
use std::sync::Arc;

use clap::Parser;
use simplelog::{ConfigBuilder, WriteLogger};

use querybox::backend::HttpBackend;
use querybox::core::config::{self, CliOverrides};
use querybox::tui;

#[derive(Parser)]
#[command(name = "querybox", about = "Terminal chat client for a query/summary backend")]
struct Args {
    /// Backend base URL (overrides QUERYBOX_BASE_URL / API_BASE_URL and the config file)
    #[arg(short, long)]
    base_url: Option<String>,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let (file_config, config_source) = config::load_config()?;
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            base_url: args.base_url,
            log_level: args.log_level,
        },
    );

    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    // Loading ran before the logger existed
    config_source.log();
    log::debug!("Config: {:?}", file_config);

    log::info!(
        "querybox starting up against {}{} (log level {})",
        resolved.base_url,
        resolved.query_path,
        resolved.log_level
    );

    let backend = HttpBackend::new(
        &resolved.base_url,
        &resolved.query_path,
        &resolved.feedback_path,
    )
    .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?
    .with_resummarize_path(&resolved.resummarize_path);

    tui::run(Arc::new(backend))
}
