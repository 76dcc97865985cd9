use pwned_range::{PREFIX_LEN, Sha1Hex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ALL_CHARS: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Generates a specified number of random passwords with uniform distribution.
/// Uses a fixed seed for reproducible benchmark results.
pub fn generate_random_passwords(count: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|_| {
            let length = rng.gen_range(8..=64);
            (0..length)
                .map(|_| ALL_CHARS[rng.gen_range(0..ALL_CHARS.len())] as char)
                .collect()
        })
        .collect()
}

/// Builds a range response body with `lines` records, the way the API formats
/// them (CRLF line endings, counts of varying width).
pub fn synthetic_range_body(lines: usize) -> String {
    let mut rng = StdRng::seed_from_u64(7);
    let mut body = String::with_capacity(lines * 48);
    for password in generate_random_passwords(lines) {
        let digest = Sha1Hex::digest(&password);
        body.push_str(&digest.as_str()[PREFIX_LEN..]);
        body.push(':');
        body.push_str(&rng.gen_range(1..=10_000_000u64).to_string());
        body.push_str("\r\n");
    }
    body
}
