//! Interpretation of `terraform plan -detailed-exitcode`.

use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::fmt;

use crate::runner::ProcessResult;

/// Plan exit code meaning the infrastructure matches the configuration.
pub const PLAN_NO_CHANGES: i32 = 0;

/// Plan exit code meaning changes are pending.
pub const PLAN_CHANGES_PRESENT: i32 = 2;

/// Raw output of a plan that reported changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    output: Vec<u8>,
}

/// What a plan run means, decided right after it exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    /// Exit code 0: no drift.
    NoChanges,
    /// Exit code 2: drift, with the plan's standard output.
    Changed(Diff),
    /// Any other exit code, including signal-derived ones.
    Failed(ProcessResult),
}

impl Diff {
    /// Wraps plan output.
    #[must_use]
    pub const fn new(output: Vec<u8>) -> Self {
        Self { output }
    }

    /// Returns the raw plan output.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.output
    }

    /// Returns the plan output as text.
    #[must_use]
    pub fn to_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.output)
    }

    /// Consumes the diff, returning the raw output.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.output
    }

    /// Returns the SHA-256 of the plan output, hex encoded.
    ///
    /// Two runs against unchanged infrastructure and state produce the same
    /// fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(&self.output))
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<ProcessResult> for PlanOutcome {
    fn from(result: ProcessResult) -> Self {
        match result.exit_code {
            PLAN_NO_CHANGES => Self::NoChanges,
            PLAN_CHANGES_PRESENT => Self::Changed(Diff::new(result.stdout)),
            _ => Self::Failed(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;

    fn plan_result(exit_code: i32, stdout: &str) -> ProcessResult {
        ProcessResult {
            title: String::from("Terraform plan"),
            command: String::from("terraform plan"),
            exit_code,
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
            started_at: Utc::now(),
            duration: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_exit_zero_is_no_changes() {
        assert_eq!(PlanOutcome::from(plan_result(0, "No changes.")), PlanOutcome::NoChanges);
    }

    #[test]
    fn test_exit_two_carries_stdout() {
        let outcome = PlanOutcome::from(plan_result(2, "+ resource.foo will be created"));
        let PlanOutcome::Changed(diff) = outcome else {
            panic!("expected a diff, got {outcome:?}");
        };
        assert_eq!(diff.as_bytes(), b"+ resource.foo will be created");
        assert_eq!(diff.to_string(), "+ resource.foo will be created");
    }

    #[test]
    fn test_other_codes_fail() {
        for code in [1, 3, 127, -1, -15] {
            let outcome = PlanOutcome::from(plan_result(code, ""));
            assert!(
                matches!(&outcome, PlanOutcome::Failed(r) if r.exit_code == code),
                "exit code {code} should fail"
            );
        }
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = Diff::new(b"~ update".to_vec());
        let b = Diff::new(b"~ update".to_vec());
        let c = Diff::new(b"- destroy".to_vec());

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
        assert_eq!(a.into_bytes(), b"~ update");
    }
}
