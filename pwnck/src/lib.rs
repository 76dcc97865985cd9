//! Checks passwords against the Have I Been Pwned range API.
//!
//! Passwords are read one per line. Each pwned password is echoed as
//! `<password>:<count>`; passwords that were never seen produce no output.
//! Only the first 5 hex characters of each password's SHA1 digest are sent
//! over the network (see [`pwned_range`]).

pub mod check;
pub mod error;

pub use check::{Checker, Summary, check_passwords};
pub use error::Error;
