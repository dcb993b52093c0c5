use crate::error::ValidationError;

/// Pass/fail predicate over captured workload output.
///
/// The output fails if and only if it contains `marker` verbatim. Anything else,
/// including empty or unrelated error text, passes: the generator's self-report is
/// the sole acceptance signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResultValidator {
    marker: &'static str,
    reason: &'static str,
}

impl ResultValidator {
    pub const fn new(marker: &'static str, reason: &'static str) -> Self {
        Self { marker, reason }
    }

    pub fn marker(&self) -> &'static str {
        self.marker
    }

    pub fn check(&self, stdout: &str) -> Result<(), ValidationError> {
        if stdout.contains(self.marker) {
            return Err(ValidationError {
                reason: self.reason.to_string(),
            });
        }
        Ok(())
    }
}
