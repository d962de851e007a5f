use clap::Parser;
use tracing_subscriber::EnvFilter;

use video_link_parser::{Dispatcher, ExtractorConfig};

/// Extract a playable video URL from a share link or pasted text
#[derive(Debug, Parser)]
#[command(name = "video-link-parser", version)]
struct Cli {
    /// Share text or link (words are joined with spaces)
    #[arg(required = true)]
    text: Vec<String>,

    /// Fetch pages directly instead of through the proxy endpoint
    #[arg(long, conflicts_with = "proxy_base")]
    no_proxy: bool,

    /// Override the proxy endpoint prepended to outbound URLs
    #[arg(long)]
    proxy_base: Option<String>,

    /// HTTP or SOCKS5 proxy for the HTTP client
    #[arg(long)]
    http_proxy: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u32>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "info,video_link_parser=debug"
    } else {
        "warn,video_link_parser=info"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = ExtractorConfig::from_env();
    if cli.no_proxy {
        config = config.with_proxy_base(None);
    } else if let Some(base) = cli.proxy_base {
        config = config.with_proxy_base(Some(base));
    }
    if cli.http_proxy.is_some() {
        config = config.with_http_proxy(cli.http_proxy);
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(secs);
    }

    let dispatcher = Dispatcher::with_config(config);
    match dispatcher.parse(&cli.text.join(" ")).await {
        Ok(metadata) => match serde_json::to_string_pretty(&metadata) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize result: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
