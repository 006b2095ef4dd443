//! Absence case description and case number policies.
//!
//! The absence insert calls themselves live on the employee call group.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::CaseNumberRule;
use crate::error::NmbrsError;

/// An employee absence case as tracked by the calling application.
///
/// Date fields hold host-formatted text; they are rendered through the
/// client's date formatter before sending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbsenceCase {
    /// Local case identifier
    pub case_id: i64,

    /// Remote employee id
    pub employee_id: i64,

    /// Remote absence type (`Dossier`)
    pub dossier: String,

    pub comment: Option<String>,

    /// Sick percentage
    pub percentage: Option<f64>,

    pub started_at: String,

    pub closed_at: Option<String>,

    /// Start of the latest reopening, if any
    pub reopened_at: Option<String>,

    /// Number of times the case has been opened
    pub frequency: u32,

    /// Remote absence id from an earlier insert
    pub payroll_absence_id: Option<i64>,

    /// Comment sent with a full recovery
    pub recovery_comment: Option<String>,

    /// Start of the latest percentage change (partial recovery)
    pub percentage_changed_at: Option<String>,
}

/// Derives the remote case number (`AbsenceId`/`Dossiernr`) for a case.
pub trait CaseNumberPolicy: Send + Sync {
    fn case_number(&self, case: &AbsenceCase) -> Result<i64, NmbrsError>;
}

/// Uses the case id as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectCaseNumber;

impl CaseNumberPolicy for DirectCaseNumber {
    fn case_number(&self, case: &AbsenceCase) -> Result<i64, NmbrsError> {
        Ok(case.case_id)
    }
}

/// Concatenates the case id, a padding string and the frequency.
///
/// Case 123 opened for the second time becomes `123002`.
#[derive(Debug, Clone)]
pub struct FrequencySuffixedCaseNumber {
    padding: String,
}

impl FrequencySuffixedCaseNumber {
    pub fn new(padding: impl Into<String>) -> Self {
        Self {
            padding: padding.into(),
        }
    }
}

impl Default for FrequencySuffixedCaseNumber {
    fn default() -> Self {
        Self::new("00")
    }
}

impl CaseNumberPolicy for FrequencySuffixedCaseNumber {
    fn case_number(&self, case: &AbsenceCase) -> Result<i64, NmbrsError> {
        let text = format!("{}{}{}", case.case_id, self.padding, case.frequency);
        text.parse()
            .map_err(|_| NmbrsError::new(format!("case number {} does not fit an integer", text)))
    }
}

/// Policy for a built-in rule.
pub fn policy_for(rule: CaseNumberRule) -> Arc<dyn CaseNumberPolicy> {
    match rule {
        CaseNumberRule::Direct => Arc::new(DirectCaseNumber),
        CaseNumberRule::FrequencySuffixed => Arc::new(FrequencySuffixedCaseNumber::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(case_id: i64, frequency: u32) -> AbsenceCase {
        AbsenceCase {
            case_id,
            frequency,
            ..Default::default()
        }
    }

    #[test]
    fn test_direct_case_number() {
        assert_eq!(DirectCaseNumber.case_number(&case(123, 4)).unwrap(), 123);
    }

    #[test]
    fn test_frequency_suffixed_case_number() {
        let policy = FrequencySuffixedCaseNumber::default();
        assert_eq!(policy.case_number(&case(123, 2)).unwrap(), 123002);
        assert_eq!(policy.case_number(&case(5, 11)).unwrap(), 50011);
    }

    #[test]
    fn test_frequency_suffixed_overflow() {
        let policy = FrequencySuffixedCaseNumber::default();
        assert!(policy.case_number(&case(i64::MAX, 1)).is_err());
    }

    #[test]
    fn test_policy_for_rule() {
        let c = case(9, 3);
        assert_eq!(policy_for(CaseNumberRule::Direct).case_number(&c).unwrap(), 9);
        assert_eq!(
            policy_for(CaseNumberRule::FrequencySuffixed).case_number(&c).unwrap(),
            9003
        );
    }
}
