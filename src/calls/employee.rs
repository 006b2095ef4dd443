//! EmployeeService operations.
//!
//! The `*_AllEmployeesByCompany` calls return one item per employee. Some of
//! them nest the items one level below the result (`EmployeeSalaryItem`,
//! `EmployeeEmploymentItem`, ...); the path passed to `fetch_list` descends
//! to that level before normalizing.

use chrono::Datelike;
use serde_json::{json, Value};

use crate::client::NmbrsClient;
use crate::error::NmbrsError;
use crate::normalize::{descend, id_matches, normalize};
use crate::session::Service;

impl NmbrsClient {
    /// Functions of every employee in a company.
    pub fn get_function_all_employees_by_company(
        &self,
        company_id: i64,
    ) -> Result<Vec<Value>, NmbrsError> {
        self.fetch_list(
            Service::Employee,
            "Function_GetAll_AllEmployeesByCompany_V2",
            json!({ "CompanyID": company_id }),
            &[],
        )
    }

    pub fn get_all_employees_by_company(
        &self,
        company_id: i64,
        employee_type: i32,
    ) -> Result<Vec<Value>, NmbrsError> {
        self.fetch_list(
            Service::Employee,
            "List_GetByCompany",
            json!({ "CompanyID": company_id, "EmployeeType": employee_type }),
            &[],
        )
    }

    pub fn get_all_address_employees_by_company(
        &self,
        company_id: i64,
    ) -> Result<Vec<Value>, NmbrsError> {
        self.fetch_list(
            Service::Employee,
            "Address_GetAll_AllEmployeesByCompany",
            json!({ "CompanyID": company_id }),
            &[],
        )
    }

    pub fn get_current_address_by_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<Value>, NmbrsError> {
        self.employee_list("Address_GetListCurrent", employee_id)
    }

    pub fn get_current_svw_by_employee(&self, employee_id: i64) -> Result<Vec<Value>, NmbrsError> {
        self.employee_list("SVW_GetCurrent", employee_id)
    }

    pub fn get_current_schedule_by_employee(&self, employee_id: i64) -> Result<Value, NmbrsError> {
        self.employee_required("Schedule_GetCurrent", employee_id)
    }

    pub fn get_schedule_list_by_employee_period_year(
        &self,
        employee_id: i64,
        period: i32,
        year: i32,
    ) -> Result<Vec<Value>, NmbrsError> {
        self.fetch_list(
            Service::Employee,
            "Schedule_GetList",
            json!({ "EmployeeId": employee_id, "Period": period, "Year": year }),
            &[],
        )
    }

    pub fn get_current_wage_component_fixed_by_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<Value>, NmbrsError> {
        self.employee_list("WageComponentFixed_GetCurrent", employee_id)
    }

    pub fn get_current_wage_tax_by_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<Value>, NmbrsError> {
        self.employee_list("WageTax_GetList", employee_id)
    }

    pub fn get_current_wage_component_var_by_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<Value>, NmbrsError> {
        self.employee_list("WageComponentVar_GetCurrent", employee_id)
    }

    pub fn get_salaries_by_employee(
        &self,
        employee_id: i64,
        year: i32,
        period: i32,
    ) -> Result<Vec<Value>, NmbrsError> {
        self.fetch_list(
            Service::Employee,
            "Salary_GetList",
            json!({ "EmployeeId": employee_id, "Year": year, "Period": period }),
            &[],
        )
    }

    pub fn get_current_salary_by_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<Value>, NmbrsError> {
        self.employee_list("Salary_GetCurrent", employee_id)
    }

    pub fn get_all_absence_employees_by_company(
        &self,
        company_id: i64,
    ) -> Result<Vec<Value>, NmbrsError> {
        self.fetch_list(
            Service::Employee,
            "Absence_GetAll_AllEmployeesByCompany",
            json!({ "CompanyId": company_id }),
            &[],
        )
    }

    pub fn get_all_personal_info_employees_by_company(
        &self,
        company_id: i64,
    ) -> Result<Vec<Value>, NmbrsError> {
        self.fetch_list(
            Service::Employee,
            "PersonalInfo_GetAll_AllEmployeesByCompany",
            json!({ "CompanyID": company_id }),
            &[],
        )
    }

    pub fn get_all_salary_employees_by_company(
        &self,
        company_id: i64,
    ) -> Result<Vec<Value>, NmbrsError> {
        self.fetch_list(
            Service::Employee,
            "Salary_GetAll_AllEmployeesByCompany",
            json!({ "CompanyID": company_id }),
            &["EmployeeSalaryItem"],
        )
    }

    /// Personal info, contract, salary and address of every employee.
    ///
    /// Uses the inner `PersonalInfoContractSalaryAddress` list when the result
    /// has one; otherwise the result itself is normalized.
    pub fn get_all_personal_info_contract_salary_address_employees_by_company(
        &self,
        company_id: i64,
    ) -> Result<Vec<Value>, NmbrsError> {
        const INNER: &str = "PersonalInfoContractSalaryAddress";

        let result = self.fetch_result(
            Service::Employee,
            "PersonalInfoContractSalaryAddress_GetAll_AllEmployeesByCompany",
            json!({ "CompanyID": company_id }),
        )?;

        match result {
            Some(Value::Object(mut fields)) if fields.contains_key(INNER) => {
                Ok(normalize(fields.remove(INNER)))
            }
            other => Ok(normalize(other)),
        }
    }

    pub fn get_current_department_by_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<Value>, NmbrsError> {
        self.employee_list("Department_GetCurrent", employee_id)
    }

    pub fn get_current_personal_info_by_employee(
        &self,
        employee_id: i64,
    ) -> Result<Value, NmbrsError> {
        self.employee_required("PersonalInfo_GetCurrent", employee_id)
    }

    /// Contract of the current period as a one-element list.
    ///
    /// The element always has an `EmployeeContract` field: an empty list when
    /// there is no contract, the contract itself when there is one, and the
    /// last contract when the period has several.
    pub fn get_current_contract_by_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<Value>, NmbrsError> {
        let result = self.fetch_result(
            Service::Employee,
            "Contract_GetCurrentPeriod",
            json!({ "EmployeeId": employee_id }),
        )?;

        let item = match result {
            Some(Value::Object(mut fields)) if fields.contains_key("EmployeeContractItem") => {
                fields.remove("EmployeeContractItem")
            }
            other => other,
        };

        let contracts = match descend(item, &["EmployeeContracts"]) {
            Some(contracts @ Value::Object(_)) => contracts,
            _ => return Ok(vec![json!({ "EmployeeContract": [] })]),
        };

        match contracts.get("EmployeeContract") {
            None | Some(Value::Null) => Ok(vec![json!({ "EmployeeContract": [] })]),
            Some(Value::Array(items)) => {
                let last = items.last().cloned().unwrap_or_else(|| json!([]));
                Ok(vec![json!({ "EmployeeContract": last })])
            }
            Some(_) => Ok(vec![contracts]),
        }
    }

    pub fn get_all_contracts_by_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<Value>, NmbrsError> {
        self.employee_list("Contract_GetAll", employee_id)
    }

    pub fn get_leave_balance(&self, employee_id: i64) -> Result<Vec<Value>, NmbrsError> {
        self.employee_list("LeaveBalance_Get", employee_id)
    }

    pub fn get_current_labour_agreements_by_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<Value>, NmbrsError> {
        self.employee_list("LabourAgreements_GetCurrent", employee_id)
    }

    pub fn get_all_labour_agreements_by_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<Value>, NmbrsError> {
        self.employee_list("LabourAgreements_Get", employee_id)
    }

    pub fn get_list_of_employee_types(&self) -> Result<Vec<Value>, NmbrsError> {
        self.fetch_list(Service::Employee, "EmployeeType_GetList", Value::Null, &[])
    }

    /// Contracts of every employee in a company.
    pub fn get_all_contracts_by_company(&self, company_id: i64) -> Result<Vec<Value>, NmbrsError> {
        self.fetch_list(
            Service::Employee,
            "Contract_GetAll_AllEmployeesByCompany",
            json!({ "CompanyID": company_id }),
            &["EmployeeContractItem"],
        )
    }

    /// Employments of every employee in a company.
    pub fn get_all_employments_by_company(
        &self,
        company_id: i64,
    ) -> Result<Vec<Value>, NmbrsError> {
        self.fetch_list(
            Service::Employee,
            "Employment_GetAll_AllEmployeesByCompany",
            json!({ "CompanyID": company_id }),
            &["EmployeeEmploymentItem"],
        )
    }

    /// `EmployeeEmployments` of one employee, `None` if the company has no such employee.
    pub fn get_all_employments_by_company_and_employee(
        &self,
        company_id: i64,
        employee_id: i64,
    ) -> Result<Option<Value>, NmbrsError> {
        let employment = self
            .get_all_employments_by_company(company_id)?
            .into_iter()
            .find(|item| id_matches(item.get("EmployeeId"), employee_id));

        Ok(descend(employment, &["EmployeeEmployments"]))
    }

    /// Latest employment of one employee.
    ///
    /// With several employments the first one (the most recent) is returned as
    /// `{"Employment": ..}`; with one, `EmployeeEmployments` is returned as is.
    pub fn get_latest_employment_by_company_and_employee(
        &self,
        company_id: i64,
        employee_id: i64,
    ) -> Result<Option<Value>, NmbrsError> {
        let employments =
            self.get_all_employments_by_company_and_employee(company_id, employee_id)?;

        Ok(employments.map(|employments| match employments.get("Employment") {
            Some(Value::Array(items)) if !items.is_empty() => {
                json!({ "Employment": items[0].clone() })
            }
            _ => employments,
        }))
    }

    /// Absences of an employee (`Absence_GetList`).
    pub fn get_absence_list(&self, employee_id: i64) -> Result<Vec<Value>, NmbrsError> {
        self.fetch_list(
            Service::Employee,
            "Absence_GetList",
            json!({ "EmployeeId": employee_id }),
            &["Absence"],
        )
    }

    /// Wage tax settings for period 1 of the current year.
    pub fn get_wage_tax_settings_by_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<Value>, NmbrsError> {
        let year = self.clock().now().year();
        self.fetch_list(
            Service::Employee,
            "WageTax_Get",
            json!({ "EmployeeId": employee_id, "Period": 1, "Year": year }),
            &[],
        )
    }

    pub fn get_current_function_by_employee(&self, employee_id: i64) -> Result<Value, NmbrsError> {
        self.employee_required("Function_GetCurrent", employee_id)
    }

    fn employee_list(&self, operation: &str, employee_id: i64) -> Result<Vec<Value>, NmbrsError> {
        self.fetch_list(Service::Employee, operation, json!({ "EmployeeId": employee_id }), &[])
    }

    fn employee_required(&self, operation: &str, employee_id: i64) -> Result<Value, NmbrsError> {
        self.fetch_required(Service::Employee, operation, json!({ "EmployeeId": employee_id }))
    }
}
