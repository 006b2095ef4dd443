//! Absence reporting on the employee service.
//!
//! Each call has a hard-fail form returning `Result` and a `_soft` form that
//! captures the failure in a [`CallOutcome`].

use serde_json::{json, Value};

use crate::absence::{AbsenceCase, CaseNumberPolicy};
use crate::client::NmbrsClient;
use crate::error::{CallOutcome, NmbrsError};
use crate::session::Service;
use crate::time::atom;

impl NmbrsClient {
    /// Report a new absence case. Returns the remote absence id.
    pub fn insert_absence(&self, case: &AbsenceCase) -> Result<Option<Value>, NmbrsError> {
        let case_number = self.new_case_number().case_number(case)?;
        let start = self.date_value(Some(case.started_at.as_str()));
        self.send_absence(case, case_number, start)
    }

    /// Report a reopened absence case. Returns the remote absence id.
    ///
    /// The case number comes from the reopen policy; the start is the reopen
    /// date, or now when the case has none.
    pub fn insert_reopened_absence(&self, case: &AbsenceCase) -> Result<Option<Value>, NmbrsError> {
        let case_number = self.reopen_case_number().case_number(case)?;
        let start = match case.reopened_at.as_deref() {
            Some(reopened_at) => self.date_value(Some(reopened_at)),
            None => Value::String(atom(self.clock().now())),
        };
        self.send_absence(case, case_number, start)
    }

    /// Report full recovery (`Absence_RecoveryInsert`).
    pub fn insert_absence_recovery(&self, case: &AbsenceCase) -> Result<bool, NmbrsError> {
        let closed_at = self.date_value(case.closed_at.as_deref());
        self.execute(
            Service::Employee,
            "Absence_RecoveryInsert",
            json!({
                "AbsenceID": case.payroll_absence_id,
                "Comment": case.recovery_comment,
                "EmployeeId": case.employee_id,
                "Lastdayabsence": closed_at,
                "Reportdate": closed_at,
            }),
        )
    }

    /// Report a change of absence percentage (`Absence_PartialRecoveryInsert`).
    ///
    /// Returns the remote id of the adjusted absence.
    pub fn insert_partial_absence_recovery(
        &self,
        case: &AbsenceCase,
    ) -> Result<Option<Value>, NmbrsError> {
        let changed_at = self.date_value(case.percentage_changed_at.as_deref());
        self.fetch_result(
            Service::Employee,
            "Absence_PartialRecoveryInsert",
            json!({
                "AbsenceID": case.payroll_absence_id,
                "Comment": null,
                "EmployeeId": case.employee_id,
                "Percent": case.percentage,
                "Reportdate": changed_at,
                "StartDate": changed_at,
            }),
        )
    }

    pub fn insert_absence_soft(&self, case: &AbsenceCase) -> CallOutcome<Option<Value>> {
        self.soft("insert_absence", self.insert_absence(case))
    }

    pub fn insert_reopened_absence_soft(&self, case: &AbsenceCase) -> CallOutcome<Option<Value>> {
        self.soft("insert_reopened_absence", self.insert_reopened_absence(case))
    }

    pub fn insert_absence_recovery_soft(&self, case: &AbsenceCase) -> CallOutcome<bool> {
        self.soft("insert_absence_recovery", self.insert_absence_recovery(case))
    }

    pub fn insert_partial_absence_recovery_soft(
        &self,
        case: &AbsenceCase,
    ) -> CallOutcome<Option<Value>> {
        self.soft(
            "insert_partial_absence_recovery",
            self.insert_partial_absence_recovery(case),
        )
    }

    fn send_absence(
        &self,
        case: &AbsenceCase,
        case_number: i64,
        start: Value,
    ) -> Result<Option<Value>, NmbrsError> {
        let end = self.date_value(case.closed_at.as_deref());
        let percentage = case
            .percentage
            .map(|p| json!(p))
            .unwrap_or_else(|| json!(""));

        self.fetch_result(
            Service::Employee,
            self.absence_operation().as_str(),
            json!({
                "EmployeeId": case.employee_id,
                "NewDossier": true,
                "Absence": {
                    "AbsenceId": case_number,
                    "Comment": case.comment,
                    "Dossier": case.dossier,
                    "Dossiernr": case_number,
                    "End": end,
                    "Percentage": percentage,
                    "RegistrationEndDate": end,
                    "RegistrationStartDate": start,
                    "Start": start,
                },
            }),
        )
    }
}
