use std::io::{BufRead, Read};

use tracing::debug;

use crate::digest::{PREFIX_LEN, SUFFIX_LEN, Sha1Hex};
use crate::error::{Error, ParseError};
use crate::transport::Transport;

/// Endpoint of the Pwned Passwords range API. The prefix is appended verbatim.
pub const RANGE_URL: &str = "https://api.pwnedpasswords.com/range/";

/// Longest response line accepted, newline excluded. Real lines are ~45 bytes.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// A breach database entry returned by a range query.
///
/// While parsing, `digest` holds only the 35 character suffix. Once the
/// query completes it holds the full 40 character digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub digest: String,
    pub count: u64,
}

/// A k-anonymity range lookup.
///
/// Implemented by [`RangeClient`] and by decorators such as
/// [`Retry`](crate::Retry) that wrap it.
pub trait RangeQuery {
    /// Returns every known digest sharing the first [`PREFIX_LEN`]
    /// characters of `digest`, with its breach count.
    fn range(&self, digest: &str) -> Result<Vec<Match>, Error>;

    /// Returns how many times `secret` appears in known breaches, 0 if never.
    fn pwned_count(&self, secret: &[u8]) -> Result<u64, Error> {
        let digest = Sha1Hex::digest(secret);
        let matches = self.range(digest.as_str())?;
        Ok(count_for(&matches, digest.as_str()))
    }
}

impl<Q: RangeQuery + ?Sized> RangeQuery for std::sync::Arc<Q> {
    fn range(&self, digest: &str) -> Result<Vec<Match>, Error> {
        (**self).range(digest)
    }
}

/// Range API client over an arbitrary [`Transport`].
///
/// Issues exactly one GET per query. Retrying is left to wrappers.
pub struct RangeClient<T> {
    transport: T,
    base_url: String,
}

impl<T: Transport> RangeClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport, base_url: RANGE_URL.to_string() }
    }

    /// Points the client at another range endpoint, e.g. a mirror.
    /// The prefix is appended directly, so `base_url` should end with `/`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl<T: Transport> RangeQuery for RangeClient<T> {
    fn range(&self, digest: &str) -> Result<Vec<Match>, Error> {
        let prefix = match digest.get(..PREFIX_LEN) {
            Some(prefix) => prefix.to_ascii_uppercase(),
            None => return Err(Error::InvalidInput { digest: digest.to_string() }),
        };

        let url = format!("{}{}", self.base_url, prefix);
        debug!(%prefix, "requesting range");

        let response = self
            .transport
            .get(&url)
            .map_err(|e| Error::Transport { prefix: prefix.clone(), source: Box::new(e) })?;

        // The body is dropped unread on a bad status.
        if response.status != 200 {
            return Err(Error::UnexpectedStatus { prefix, status: response.status });
        }

        let mut body = std::io::BufReader::new(response.body);
        let mut matches = match parse_range_response(&mut body) {
            Ok(matches) => matches,
            Err(source) => return Err(Error::MalformedResponse { prefix, source }),
        };

        for m in &mut matches {
            m.digest.insert_str(0, &prefix);
        }

        debug!(%prefix, matches = matches.len(), "parsed range response");
        Ok(matches)
    }
}

/// Parses a range response body into `(suffix, count)` records.
///
/// Each line is `<35 char suffix>:<count>`. The count is read from the fixed
/// offset after the suffix rather than by searching for the separator.
/// Blank lines are skipped and a trailing `\r` is ignored. A line longer than
/// [`MAX_LINE_LEN`] is rejected without reading the rest of it. Reads the
/// stream to the end; on any error nothing parsed so far is returned.
pub fn parse_range_response(mut reader: impl BufRead) -> Result<Vec<Match>, ParseError> {
    let mut matches = Vec::new();
    let mut buf = Vec::with_capacity(64);

    loop {
        buf.clear();
        let limit = MAX_LINE_LEN as u64 + 1;
        if (&mut reader).take(limit).read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        let mut line = buf.as_slice();
        match line.strip_suffix(b"\n") {
            Some(rest) => line = rest,
            None if line.len() > MAX_LINE_LEN => {
                return Err(ParseError::MalformedLine {
                    line: String::from_utf8_lossy(line).into_owned(),
                });
            }
            None => {}
        }
        if let Some(rest) = line.strip_suffix(b"\r") {
            line = rest;
        }
        if line.is_empty() {
            continue;
        }

        matches.push(parse_line(line)?);
    }

    Ok(matches)
}

fn parse_line(line: &[u8]) -> Result<Match, ParseError> {
    let malformed = || ParseError::MalformedLine { line: String::from_utf8_lossy(line).into_owned() };

    // Must be at least the suffix plus ":" plus one digit.
    if line.len() < SUFFIX_LEN + 2 {
        return Err(malformed());
    }
    let text = std::str::from_utf8(line).map_err(|_| malformed())?;

    let suffix = text.get(..SUFFIX_LEN).ok_or_else(malformed)?;
    let count = text
        .get(SUFFIX_LEN + 1..)
        .and_then(|count| count.parse::<u64>().ok())
        .ok_or_else(malformed)?;

    Ok(Match { digest: suffix.to_string(), count })
}

/// Finds the breach count recorded for `digest`, or 0 if it is absent.
///
/// Comparison is exact, so `digest` must already be uppercase.
pub fn count_for(matches: &[Match], digest: &str) -> u64 {
    matches.iter().find(|m| m.digest == digest).map_or(0, |m| m.count)
}
