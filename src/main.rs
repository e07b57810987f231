use anyhow::Context;
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vigia::cli::{self, Args};
use vigia::config::AppSettings;
use vigia::output;
use vigia::scanner::{self, RawSocketProbe, ScanOptions};
use vigia::types::{PortRange, Target};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    output::print_banner();

    if let Err(e) = run(args).await {
        output::print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let settings = AppSettings::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not load settings, using defaults");
        AppSettings::default()
    });

    let ports_spec = args.ports.as_deref().unwrap_or(&settings.default_ports);
    let range: PortRange = ports_spec
        .parse()
        .with_context(|| format!("invalid port range '{ports_spec}'"))?;
    let target = Target::resolve(&args.target).await?;

    if !cli::is_root() {
        output::print_warning(
            "Detecção de SO requer privilégios de root; o palpite pode degradar para \"Sem resposta\".",
        );
    }

    output::print_scan_header(&target, &range);

    let opts = match args.timeout {
        Some(ms) => ScanOptions {
            connect_timeout: Duration::from_millis(ms),
            read_timeout: Duration::from_millis(ms),
        },
        None => ScanOptions {
            connect_timeout: Duration::from_millis(settings.connect_timeout_ms),
            read_timeout: Duration::from_millis(settings.read_timeout_ms),
        },
    };
    let os_probe = RawSocketProbe::new(Duration::from_millis(settings.fingerprint_timeout_ms));

    // Racing the scan against Ctrl-C drops every in-flight probe task and
    // its socket; interrupted runs exit without writing the CSV.
    let report = tokio::select! {
        report = scanner::scan(&target, range, &opts, &os_probe, output::print_outcome) => report,
        _ = tokio::signal::ctrl_c() => {
            output::print_interrupted();
            return Ok(());
        }
    };

    output::print_os_guess(report.os_guess);

    if !args.no_export {
        let path = args.output.unwrap_or(settings.export_path);
        output::export_csv(&report, &path)
            .with_context(|| format!("failed to export results to '{}'", path.display()))?;
        output::print_info(&format!(
            "Resultados exportados para '{}'.",
            path.display()
        ));
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
