//! Password strength validation
//!
//! Candidate passwords are checked locally against the configured policy
//! before they ever reach the identity provider, so the form layer gets an
//! immediate, human-readable rejection.

use crate::{CoreError, PasswordPolicy, Result};
use photovault_gateway::GatewayError;

impl PasswordPolicy {
    /// Check a candidate password against this policy.
    ///
    /// Passes silently on a match; otherwise fails with
    /// [`GatewayError::WeakPassword`] carrying the full requirement text.
    pub fn check(&self, candidate: &str) -> Result<()> {
        let length = candidate.chars().count();
        let length_ok = length >= self.min_length && length <= self.max_length;
        let lowercase_ok =
            !self.require_lowercase || candidate.chars().any(|c| c.is_ascii_lowercase());
        let uppercase_ok =
            !self.require_uppercase || candidate.chars().any(|c| c.is_ascii_uppercase());
        let numbers_ok = !self.require_numbers || candidate.chars().any(|c| c.is_ascii_digit());
        let symbols_ok = !self.require_special_characters
            || candidate.chars().any(|c| !c.is_ascii_alphanumeric());

        if length_ok && lowercase_ok && uppercase_ok && numbers_ok && symbols_ok {
            return Ok(());
        }

        Err(CoreError::Gateway(GatewayError::WeakPassword(
            self.requirements(),
        )))
    }

    /// The requirement text shown on rejection.
    pub fn requirements(&self) -> String {
        let mut classes = Vec::new();
        if self.require_lowercase {
            classes.push("lower");
        }
        if self.require_uppercase {
            classes.push("upper");
        }
        if self.require_numbers {
            classes.push("number");
        }
        if self.require_special_characters {
            classes.push("symbol");
        }

        if classes.is_empty() {
            format!(
                "Password must be {}-{} chars.",
                self.min_length, self.max_length
            )
        } else {
            format!(
                "Password must be {}-{} chars and include {}.",
                self.min_length,
                self.max_length,
                join_with_and(&classes)
            )
        }
    }
}

fn join_with_and(words: &[&str]) -> String {
    match words {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}
