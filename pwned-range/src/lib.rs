//! Client for the Have I Been Pwned "Pwned Passwords" range API.
//!
//! The range API implements k-anonymity: a password is hashed with SHA1 and
//! only the first 5 hex characters of the digest are sent to the server. The
//! server answers with every known digest suffix sharing that prefix along
//! with its breach count, and the client looks for the full digest locally.
//! The password and its full digest never leave the machine.
//!
//! # Usage
//!
//! ```no_run
//! use pwned_range::{HttpConfig, HttpTransport, RangeClient, RangeQuery};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::new(&HttpConfig::default())?;
//! let client = RangeClient::new(transport);
//!
//! let count = client.pwned_count(b"password123")?;
//! if count > 0 {
//!     println!("seen {count} times in breaches");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The HTTP stack sits behind the [`Transport`] trait, so the protocol logic
//! can run against any client, including in-memory fakes.

pub mod digest;
pub mod error;
pub mod range;
pub mod retry;
pub mod transport;

pub use digest::{DIGEST_LEN, PREFIX_LEN, SUFFIX_LEN, Sha1Hex, sha1_bytes};
pub use error::{BoxError, Error, ParseError};
pub use range::{Match, RANGE_URL, RangeClient, RangeQuery, count_for, parse_range_response};
pub use retry::Retry;
pub use transport::{HttpConfig, HttpTransport, Response, Transport};
