//! ReportService operations.

use serde_json::{json, Value};

use crate::client::NmbrsClient;
use crate::error::NmbrsError;
use crate::session::Service;

impl NmbrsClient {
    /// Start a background report of wage codes for one run, filtered by wage code.
    ///
    /// Returns the task id to poll with [`NmbrsClient::background_task`].
    pub fn get_wage_codes_by_run_company(
        &self,
        company_id: i64,
        run_id: i64,
        year: i32,
        wage_code: i32,
    ) -> Result<Option<String>, NmbrsError> {
        let result = self.fetch_result(
            Service::Report,
            "Reports_GetWageCodesByRunCompany_FilterByWageCode_Background",
            json!({
                "companyId": company_id,
                "runId": run_id,
                "year": year,
                "wageCode": wage_code,
            }),
        )?;

        match result {
            None => Ok(None),
            Some(Value::String(task_id)) => Ok(Some(task_id)),
            Some(other) => Err(NmbrsError::malformed(format!(
                "expected a task id, got {}",
                other
            ))),
        }
    }

    /// Status and content of a background report task.
    pub fn background_task(&self, task_id: &str) -> Result<Value, NmbrsError> {
        self.fetch_required(
            Service::Report,
            "Reports_BackgroundTask_Result",
            json!({ "TaskId": task_id }),
        )
    }
}
