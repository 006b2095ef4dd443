//! DebtorService operations.

use serde_json::{json, Map, Value};

use crate::client::NmbrsClient;
use crate::error::NmbrsError;
use crate::session::Service;

impl NmbrsClient {
    /// All debtors visible to the credentials (`List_GetAll`).
    pub fn get_all_debtors(&self) -> Result<Vec<Value>, NmbrsError> {
        self.fetch_list(Service::Debtor, "List_GetAll", Value::Null, &["Debtor"])
    }

    /// Debtors with the given number (`List_GetByNumber`).
    pub fn get_debtors_by_number(&self, number: &str) -> Result<Vec<Value>, NmbrsError> {
        self.fetch_list(
            Service::Debtor,
            "List_GetByNumber",
            json!({ "Number": number }),
            &["Debtor"],
        )
    }

    /// First debtor with the given number, `None` if there is none.
    pub fn get_first_debtor_by_number(&self, number: &str) -> Result<Option<Value>, NmbrsError> {
        Ok(self.get_debtors_by_number(number)?.into_iter().next())
    }

    pub fn get_debtor_by_id(&self, debtor_id: i64) -> Result<Option<Value>, NmbrsError> {
        self.fetch_result(Service::Debtor, "Debtor_Get", json!({ "DebtorId": debtor_id }))
    }

    pub fn get_current_address_by_debtor_id(
        &self,
        debtor_id: i64,
    ) -> Result<Option<Value>, NmbrsError> {
        self.fetch_result(
            Service::Debtor,
            "Address_GetCurrent",
            json!({ "DebtorId": debtor_id }),
        )
    }

    pub fn get_departments_by_debtor_id(&self, debtor_id: i64) -> Result<Vec<Value>, NmbrsError> {
        self.fetch_list(
            Service::Debtor,
            "Department_GetList",
            json!({ "DebtorId": debtor_id }),
            &["Department"],
        )
    }

    pub fn get_functions_by_debtor_id(&self, debtor_id: i64) -> Result<Vec<Value>, NmbrsError> {
        self.fetch_list(
            Service::Debtor,
            "Function_GetList",
            json!({ "DebtorId": debtor_id }),
            &["Function"],
        )
    }

    /// Create a debtor (`Debtor_Insert`). Returns the new id.
    pub fn create_debtor(&self, data: Map<String, Value>) -> Result<Option<Value>, NmbrsError> {
        self.fetch_result(Service::Debtor, "Debtor_Insert", debtor_record(data, 0))
    }

    /// Update a debtor (`Debtor_Update`). No content is returned.
    pub fn update_debtor(
        &self,
        debtor_id: i64,
        data: Map<String, Value>,
    ) -> Result<bool, NmbrsError> {
        self.execute(Service::Debtor, "Debtor_Update", debtor_record(data, debtor_id))
    }
}

fn debtor_record(mut data: Map<String, Value>, id: i64) -> Value {
    data.insert("Id".to_string(), json!(id));
    json!({ "Debtor": data })
}
