//! HTTP status code matching for reachability checks

use reqwest::StatusCode;

/// Statuses that count as a reachable stream endpoint
pub const REACHABLE_STATUS_CODES: [&str; 3] = ["200", "301", "302"];

/// Check if a status code equals any of the acceptable codes
pub fn is_status_acceptable<S: AsRef<str>>(status: &StatusCode, acceptable_codes: &[S]) -> bool {
    let status_code = status.as_u16();
    acceptable_codes.iter().any(|code| {
        code.as_ref()
            .parse::<u16>()
            .map(|exact| exact == status_code)
            .unwrap_or(false)
    })
}
