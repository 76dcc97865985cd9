use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use pwnck::{Checker, Error, check_passwords};
use pwned_range::{HttpConfig, HttpTransport, RANGE_URL, RangeClient, Retry};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pwnck", version)]
#[command(about = "Check passwords read from stdin, one per line, against Have I Been Pwned")]
#[command(
    long_about = "Check passwords read from stdin, one per line, against Have I Been Pwned.\n\n\
                  Pwned passwords are echoed to stdout as <password>:<count>. Only the first \
                  5 hex characters of each password's SHA1 digest are sent to the server.\n\n\
                  Exits with status 1 if any password could not be checked."
)]
struct Args {
    /// Request timeout in seconds, including reading the response
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Connection timeout in seconds
    #[arg(long, default_value_t = 10)]
    connect_timeout: u64,

    /// Extra attempts for a query that failed with a transient error
    #[arg(long, default_value_t = 0)]
    retries: u32,

    /// Base delay in milliseconds for exponential backoff between retries
    #[arg(long, default_value_t = 100)]
    retry_delay_ms: u64,

    /// Number of passwords checked concurrently
    #[arg(short = 'j', long, default_value_t = 1)]
    jobs: usize,

    /// Request padded responses so response size does not reveal the prefix
    #[arg(long)]
    padding: bool,

    /// Range API endpoint; the 5 character prefix is appended to it
    #[arg(long, default_value = RANGE_URL)]
    range_url: String,
}

fn main() -> Result<ExitCode, Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.jobs == 0 {
        return Err(Error::InvalidArgs("--jobs must be at least 1"));
    }

    let config = HttpConfig {
        timeout: Duration::from_secs(args.timeout),
        connect_timeout: Duration::from_secs(args.connect_timeout),
        add_padding: args.padding,
        ..HttpConfig::default()
    };

    // The blocking client has to be built and dropped outside the runtime.
    let transport = HttpTransport::new(&config)?;
    let client = RangeClient::new(transport).with_base_url(args.range_url);
    let checker: Checker = Arc::new(
        Retry::new(client)
            .max_retries(args.retries)
            .base_delay(Duration::from_millis(args.retry_delay_ms)),
    );

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let summary = runtime.block_on(async {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = std::io::stdout().lock();
        check_passwords(Arc::clone(&checker), stdin, &mut stdout, args.jobs).await
    })?;
    drop(runtime);

    if summary.is_success() { Ok(ExitCode::SUCCESS) } else { Ok(ExitCode::FAILURE) }
}
