use std::io::{self, Write};
use std::sync::Arc;

use futures_util::{StreamExt, pin_mut};
use pwned_range::RangeQuery;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinError;
use tracing::{debug, error};

use crate::error::Error;

/// Shared range query used by every check.
pub type Checker = Arc<dyn RangeQuery + Send + Sync>;

/// Totals for one run over the input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub checked: u64,
    pub pwned: u64,
    pub failed: u64,
}

impl Summary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

enum Outcome {
    Checked { password: Vec<u8>, count: u64 },
    CheckFailed(pwned_range::Error),
    TaskFailed(JoinError),
    ReadFailed(io::Error),
}

/// Checks every line of `input` as a password and writes pwned ones to `output`.
///
/// Lines are raw bytes; they need not be UTF-8 and are echoed back unchanged
/// apart from a stripped trailing `\r`. Up to `jobs` range queries run at once
/// on the blocking thread pool, but results are written in input order. A
/// failed check is logged and counted without stopping the run. A read error
/// on `input` ends the run. Only a write error on `output` is returned as `Err`.
pub async fn check_passwords<R, W>(
    checker: Checker,
    input: R,
    output: &mut W,
    jobs: usize,
) -> Result<Summary, Error>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let lines = async_stream::stream! {
        let mut lines = input.split(b'\n');
        loop {
            match lines.next_segment().await {
                Ok(Some(mut line)) => {
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                    yield Ok(line);
                }
                Ok(None) => break,
                Err(e) => {
                    yield Err(e);
                    break;
                }
            }
        }
    };

    let outcomes = lines
        .map(|line| {
            let checker = Arc::clone(&checker);
            async move {
                let password = match line {
                    Ok(password) => password,
                    Err(e) => return Outcome::ReadFailed(e),
                };
                let task = tokio::task::spawn_blocking(move || {
                    let result = checker.pwned_count(&password);
                    (password, result)
                });
                match task.await {
                    Ok((password, Ok(count))) => Outcome::Checked { password, count },
                    Ok((_, Err(e))) => Outcome::CheckFailed(e),
                    Err(e) => Outcome::TaskFailed(e),
                }
            }
        })
        .buffered(jobs.max(1));
    pin_mut!(outcomes);

    let mut summary = Summary::default();
    while let Some(outcome) = outcomes.next().await {
        match outcome {
            Outcome::Checked { password, count } => {
                summary.checked += 1;
                if count > 0 {
                    summary.pwned += 1;
                    output.write_all(&password)?;
                    writeln!(output, ":{count}")?;
                }
            }
            Outcome::CheckFailed(e) => {
                summary.checked += 1;
                summary.failed += 1;
                error!("{e}");
            }
            Outcome::TaskFailed(e) => {
                summary.failed += 1;
                error!("check task failed: {e}");
            }
            Outcome::ReadFailed(e) => {
                summary.failed += 1;
                error!("reading passwords: {e}");
            }
        }
    }
    output.flush()?;

    debug!(checked = summary.checked, pwned = summary.pwned, failed = summary.failed, "done");
    Ok(summary)
}
