//! CompanyService operations.
//!
//! See <https://api.nmbrs.nl/soap/v3/CompanyService.asmx> for the remote
//! contract. Parameter names are the remote ones and differ in casing between
//! operations.

use serde_json::{json, Map, Value};

use crate::client::{decode_companies, NmbrsClient};
use crate::error::NmbrsError;
use crate::models::Company;
use crate::normalize::{descend, is_truthy};
use crate::session::Service;

impl NmbrsClient {
    /// Companies belonging to a debtor (`List_GetByDebtor`).
    pub fn get_all_companies_by_debtor_id(
        &self,
        debtor_id: i64,
    ) -> Result<Vec<Company>, NmbrsError> {
        let items = self.fetch_list(
            Service::Company,
            "List_GetByDebtor",
            json!({ "DebtorId": debtor_id }),
            &["Company"],
        )?;
        decode_companies(items)
    }

    /// First company of a debtor, or `None` when the debtor has none.
    pub fn get_first_company_by_debtor_id(
        &self,
        debtor_id: i64,
    ) -> Result<Option<Company>, NmbrsError> {
        Ok(self
            .get_all_companies_by_debtor_id(debtor_id)?
            .into_iter()
            .next())
    }

    /// Current address of a company (`Address_GetCurrent`).
    pub fn get_current_address_by_company_id(
        &self,
        company_id: i64,
    ) -> Result<Option<Value>, NmbrsError> {
        self.fetch_result(
            Service::Company,
            "Address_GetCurrent",
            json!({ "CompanyId": company_id }),
        )
    }

    /// Wage tax declarations of a year (`WageTax_GetList`).
    pub fn get_all_wage_tax_by_year(
        &self,
        company_id: i64,
        year: i32,
    ) -> Result<Vec<Value>, NmbrsError> {
        self.fetch_list(
            Service::Company,
            "WageTax_GetList",
            json!({ "CompanyId": company_id, "intYear": year }),
            &["WageTax"],
        )
    }

    /// Payroll runs of a year (`Run_GetList`).
    pub fn get_all_runs_by_year(
        &self,
        company_id: i64,
        year: i32,
    ) -> Result<Vec<Value>, NmbrsError> {
        self.fetch_list(
            Service::Company,
            "Run_GetList",
            json!({ "CompanyId": company_id, "Year": year }),
            &["RunInfo"],
        )
    }

    /// Base64 PDF with all payslips of a run.
    pub fn get_payslips_pdf(
        &self,
        company_id: i64,
        year: i32,
        run_id: i64,
    ) -> Result<Option<Value>, NmbrsError> {
        let result = self.fetch_result(
            Service::Company,
            "SalaryDocuments_GetAllPayslipsPDFByRunCompany_v2",
            json!({ "CompanyId": company_id, "intYear": year, "RunID": run_id }),
        )?;
        Ok(descend(result, &["PDF"]).filter(|pdf| !pdf.is_null()))
    }

    /// Wage tax declaration XML (`WageTax_GetXML`).
    pub fn get_wage_tax_xml(
        &self,
        company_id: i64,
        wage_declaration_id: i64,
    ) -> Result<Option<Value>, NmbrsError> {
        self.fetch_result(
            Service::Company,
            "WageTax_GetXML",
            json!({ "CompanyId": company_id, "LoonaangifteID": wage_declaration_id }),
        )
    }

    /// Mark a wage tax declaration as sent externally.
    pub fn set_wage_tax_sent_external(
        &self,
        company_id: i64,
        wage_declaration_id: i64,
    ) -> Result<Option<Value>, NmbrsError> {
        self.fetch_result(
            Service::Company,
            "WageTax_SetSentExternal",
            json!({ "CompanyId": company_id, "LoonaangifteID": wage_declaration_id }),
        )
    }

    /// Highest company number in the directory, 0 when there are no companies.
    pub fn get_highest_company_number(&self) -> Result<i64, NmbrsError> {
        let mut highest = 0;
        for company in self.get_all_companies()? {
            if highest == 0 || company.number > highest {
                highest = company.number;
            }
        }
        Ok(highest)
    }

    /// Company from the directory by id, `None` if absent.
    pub fn get_company_by_id(&self, company_id: i64) -> Result<Option<&Company>, NmbrsError> {
        Ok(self
            .get_all_companies()?
            .iter()
            .find(|company| company.id == company_id))
    }

    /// Create a company for a debtor (`Company_Insert`). Returns the new id.
    pub fn create_company_for_debtor(
        &self,
        debtor_id: i64,
        mut data: Map<String, Value>,
    ) -> Result<Option<Value>, NmbrsError> {
        data.insert("DebtorId".to_string(), json!(debtor_id));
        self.fetch_result(Service::Company, "Company_Insert", Value::Object(data))
    }

    /// Add an address to a company (`Address_Insert`).
    pub fn create_address_for_company(
        &self,
        company_id: i64,
        data: Map<String, Value>,
    ) -> Result<Option<Value>, NmbrsError> {
        self.fetch_result(
            Service::Company,
            "Address_Insert",
            nested_record("Address", data, 0, company_id),
        )
    }

    /// Update a company address (`Address_Update`). No content is returned.
    pub fn update_address_for_company(
        &self,
        company_id: i64,
        address_id: i64,
        data: Map<String, Value>,
    ) -> Result<bool, NmbrsError> {
        self.execute(
            Service::Company,
            "Address_Update",
            nested_record("Address", data, address_id, company_id),
        )
    }

    /// Add a bank account to a company (`BankAccount_Insert`).
    pub fn create_bank_account_for_company(
        &self,
        company_id: i64,
        data: Map<String, Value>,
    ) -> Result<Option<Value>, NmbrsError> {
        self.fetch_result(
            Service::Company,
            "BankAccount_Insert",
            nested_record("BankAccount", data, 0, company_id),
        )
    }

    /// Update a company bank account (`BankAccount_Update`). No content is returned.
    pub fn update_bank_account_for_company(
        &self,
        company_id: i64,
        bank_account_id: i64,
        data: Map<String, Value>,
    ) -> Result<bool, NmbrsError> {
        self.execute(
            Service::Company,
            "BankAccount_Update",
            nested_record("BankAccount", data, bank_account_id, company_id),
        )
    }

    /// Default bank account; `None` unless the record carries an id.
    pub fn get_default_bank_account_for_company(
        &self,
        company_id: i64,
    ) -> Result<Option<Value>, NmbrsError> {
        let result = self.fetch_result(
            Service::Company,
            "BankAccount_GetCurrent",
            json!({ "CompanyId": company_id }),
        )?;
        Ok(result.filter(|account| account.get("Id").is_some_and(is_truthy)))
    }
}

/// `{<record>: {..data, Id}, CompanyId}`; an id of 0 lets the service assign one.
fn nested_record(record: &str, mut data: Map<String, Value>, id: i64, company_id: i64) -> Value {
    data.insert("Id".to_string(), json!(id));
    let mut args = Map::new();
    args.insert(record.to_string(), Value::Object(data));
    args.insert("CompanyId".to_string(), json!(company_id));
    Value::Object(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_record_shape() {
        let mut data = Map::new();
        data.insert("Street".to_string(), json!("Kerkstraat"));
        data.insert("Id".to_string(), json!(99));

        let args = nested_record("Address", data, 0, 12);
        assert_eq!(
            args,
            json!({"Address": {"Street": "Kerkstraat", "Id": 0}, "CompanyId": 12})
        );
        let keys: Vec<_> = args.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["Address", "CompanyId"]);
    }
}
