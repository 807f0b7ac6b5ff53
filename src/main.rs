use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::exit;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ocspchecker::config::{CheckConfig, Config, PrometheusConfig, DEFAULT_CONFIG_FILE};
use ocspchecker::report::render;
use ocspchecker::{OCSPCheckError, OutputFormat, Report};

mod metrics;

#[derive(Parser, Debug)]
#[command(name = "ocspchecker", author, version, about, long_about = None)]
struct Cli {
    /// Hostname to connect to [default: localhost]
    #[arg(long)]
    host: Option<String>,

    /// Port to connect to [default: 443]
    #[arg(long)]
    port: Option<u16>,

    /// Skip verifying the certificate chain and hostname during the handshake
    #[arg(long)]
    skip_host_verify: bool,

    /// Print out summary of certs, including expiration dates
    #[arg(long)]
    verbose: bool,

    /// Output format [default: text]
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Fail when the OCSP response is past its next update
    #[arg(long)]
    strict_freshness: bool,

    /// Path to a TOML configuration file [default: ocspchecker.toml if present]
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Push the result to a Prometheus Push Gateway
    #[arg(long)]
    prometheus: bool,

    /// Prometheus Push Gateway address [default: http://localhost:9091]
    #[arg(long, value_name = "URL")]
    prometheus_address: Option<String>,

    /// Print an example configuration file and exit
    #[arg(long)]
    generate_config: bool,
}

impl Cli {
    fn as_config(&self) -> Config {
        Config {
            host: self.host.clone(),
            port: self.port,
            skip_host_verify: self.skip_host_verify.then_some(true),
            verbose: self.verbose.then_some(true),
            output: self.output,
            strict_freshness: self.strict_freshness.then_some(true),
            prometheus: Some(PrometheusConfig {
                enabled: self.prometheus.then_some(true),
                address: self.prometheus_address.clone(),
            }),
        }
    }
}

fn load_file_config(cli: &Cli) -> Config {
    let path = match &cli.config {
        Some(path) => path.as_path(),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => Path::new(DEFAULT_CONFIG_FILE),
        None => return Config::empty(),
    };
    match Config::from_file(path) {
        Ok(config) => {
            debug!(path = %path.display(), "loaded configuration file");
            config
        }
        Err(e) => {
            eprintln!("Error loading configuration from {}: {}", path.display(), e);
            exit(1);
        }
    }
}

/// Turns the result of a check into what gets printed. `Ok` goes to stdout
/// and exits 0, whatever the verdict. `Err` goes to stderr and exits 1.
fn conclude(
    result: Result<Report, OCSPCheckError>,
    check_config: &CheckConfig,
    config: &Config,
) -> Result<(Report, String), String> {
    let report = result.map_err(|e| {
        error!(host = %check_config.host, port = check_config.port, "revocation check failed");
        format!("Error checking {}:{}: {}", check_config.host, check_config.port, e)
    })?;

    let format = config.output.unwrap_or_default();
    let output = render(&report, format, config.verbose.unwrap_or(false))
        .map_err(|e| format!("Error rendering report: {}", e))?;
    Ok((report, output))
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.generate_config {
        println!("{}", Config::example_toml());
        exit(0);
    }

    let config = Config::default()
        .merge_with(load_file_config(&cli))
        .merge_with(cli.as_config());

    let check_config = match config.resolve() {
        Ok(check_config) => check_config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            exit(1);
        }
    };

    let report = match conclude(ocspchecker::check(&check_config), &check_config, &config) {
        Ok((report, output)) => {
            println!("{}", output);
            report
        }
        Err(message) => {
            eprintln!("{}", message);
            exit(1);
        }
    };

    if let Some(address) = config.prometheus_address() {
        metrics::prom::prometheus_metrics(&report, address);
    }

    exit(0);
}
