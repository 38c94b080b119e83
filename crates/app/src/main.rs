//! Wrestle binary: runs a declarative API test suite.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wrestle_application::{DisplayOptions, RunState};
use wrestle_domain::Selection;
use wrestle_infrastructure::{ConsoleReporter, ReqwestTransport, load_suite, write_report};

#[derive(Parser, Debug)]
#[command(name = "wrestle")]
#[command(version, about = "Run a declarative API test suite")]
struct Args {
    /// Suite file (YAML or JSON)
    suite: PathBuf,

    /// Base URL, overriding the suite file
    #[arg(long, env = "WRESTLE_BASE_URL")]
    base_url: Option<String>,

    /// Per-request timeout in milliseconds, overriding the suite file
    #[arg(long, env = "WRESTLE_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Run only these tests (1-based, comma separated)
    #[arg(long, value_delimiter = ',', conflicts_with_all = ["from", "to"])]
    only: Vec<NonZeroUsize>,

    /// First test to run (1-based)
    #[arg(long)]
    from: Option<NonZeroUsize>,

    /// Last test to run (1-based, inclusive)
    #[arg(long)]
    to: Option<NonZeroUsize>,

    /// Write the JSON report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Print nothing but the final summary
    #[arg(short, long)]
    quiet: bool,
}

/// Converts a 1-based test number to a queue index.
const fn index(n: NonZeroUsize) -> usize {
    n.get() - 1
}

impl Args {
    fn selection(&self) -> Selection {
        if !self.only.is_empty() {
            return Selection::indices(self.only.iter().copied().map(index));
        }
        match (self.from, self.to) {
            (None, None) => Selection::All,
            (from, to) => Selection::Range {
                lo: from.map_or(0, index),
                hi: to.map_or(usize::MAX, index),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    tracing::info!("wrestle v{}", env!("CARGO_PKG_VERSION"));

    let mut file = load_suite(&args.suite).await?;
    if let Some(base_url) = &args.base_url {
        file.config.base_url = Some(base_url.clone());
    }
    if let Some(timeout_ms) = args.timeout_ms {
        file.config.timeout_ms = timeout_ms;
    }
    if args.quiet {
        file.config.display = DisplayOptions {
            report: true,
            ..DisplayOptions::quiet()
        };
    }

    let transport = ReqwestTransport::new(file.config.timeout_ms)?;
    let mut suite = file.into_suite(transport)?;
    ConsoleReporter::new(suite.config().display).attach(&mut suite);

    let state = suite.begin(args.selection()).await?;
    if state != RunState::Completed {
        tracing::warn!(?state, "suite did not complete");
        return Ok(ExitCode::FAILURE);
    }

    let Some(report) = suite.report() else {
        return Ok(ExitCode::FAILURE);
    };
    if let Some(path) = &args.report {
        write_report(path, report).await?;
        tracing::info!(path = %path.display(), "report written");
    }

    if report.failed_count() == 0 {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
