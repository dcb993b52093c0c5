use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Team accountable for a registered test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Owner {
    Kv,
    TestEng,
}

impl Owner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Owner::Kv => "kv",
            Owner::TestEng => "test-eng",
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of one test run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum TestOutcome {
    Passed,
    /// `fatal` separates setup defects from benchmark-result defects.
    Failed { reason: String, fatal: bool },
    TimedOut { after: Duration },
}

impl TestOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, TestOutcome::Passed)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            TestOutcome::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_names() {
        assert_eq!(Owner::Kv.to_string(), "kv");
        assert_eq!(Owner::TestEng.to_string(), "test-eng");
        assert_eq!(serde_json::to_string(&Owner::TestEng).unwrap(), r#""test-eng""#);
    }

    #[test]
    fn outcome_is_tagged_by_status() {
        let failed = TestOutcome::Failed {
            reason: "invalid tpsE fraction".into(),
            fatal: false,
        };
        let json = serde_json::to_string(&failed).unwrap();
        assert!(json.contains(r#""status":"failed""#));
        assert_eq!(failed.reason(), Some("invalid tpsE fraction"));
        assert!(!failed.is_passed());
        assert!(TestOutcome::Passed.is_passed());
    }
}
