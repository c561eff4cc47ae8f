use clap::{Parser, Subcommand};
use commands::resolve::ResolveOptions;
use httpdns_domain::{CliOverrides, NetworkStack};
use tracing::info;

mod bootstrap;
mod commands;
mod di;

#[derive(Parser)]
#[command(name = "httpdns")]
#[command(version)]
#[command(about = "HTTPDNS client - resolve domains over HTTPS with caching and server failover")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Primary HTTPDNS server (host, ip or URL)
    #[arg(short = 's', long, value_name = "ADDRESS")]
    server: Option<String>,

    /// Per-exchange timeout in milliseconds
    #[arg(short = 't', long)]
    timeout_ms: Option<u64>,

    /// Client IP the service should route answers for
    #[arg(long, value_name = "IP")]
    route_ip: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve domains through the HTTPDNS service
    Resolve {
        #[arg(required = true)]
        domains: Vec<String>,

        /// Use this stack instead of detecting it (ipv4, ipv6, dual)
        #[arg(long)]
        stack: Option<NetworkStack>,

        /// Report unresolved domains instead of asking the system resolver
        #[arg(long)]
        no_fallback: bool,

        /// Resolve again every SECS seconds until interrupted
        #[arg(short = 'w', long, value_name = "SECS")]
        watch: Option<u64>,
    },
    /// Detect which IP families this host can use
    Detect,
    /// Resolve hosts, then answer them from the cache only
    Lookup {
        #[arg(required = true)]
        hosts: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        primary_server: cli.server.clone(),
        timeout_ms: cli.timeout_ms,
        route_ip: cli.route_ip.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!(
        config_file = cli.config.as_deref().unwrap_or("default"),
        primary = %config.httpdns.primary_server,
        https_only = config.httpdns.https_only,
        "httpdns v{} configuration loaded",
        env!("CARGO_PKG_VERSION")
    );

    match cli.command {
        Command::Detect => commands::detect::run(cli.json).await,
        Command::Resolve {
            domains,
            stack,
            no_fallback,
            watch,
        } => {
            let services = di::HttpDnsServices::new(&config)?;
            let options = ResolveOptions {
                stack,
                system_fallback: !no_fallback,
                json: cli.json,
                watch,
            };
            commands::resolve::run(&services, &config, &domains, &options).await
        }
        Command::Lookup { hosts } => {
            let services = di::HttpDnsServices::new(&config)?;
            commands::lookup::run(&services, &hosts, cli.json).await
        }
    }
}
