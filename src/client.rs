//! The client facade: sessions, error translation and the company cache.
//!
//! Operations are grouped by service under [`crate::calls`]; they all go
//! through the helpers here so that every remote failure surfaces as
//! [`NmbrsError`] and every list-valued result is normalized.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::absence::{policy_for, CaseNumberPolicy};
use crate::config::{AbsenceOperation, Credentials, NmbrsConfig};
use crate::error::{CallOutcome, ConnectError, NmbrsError};
use crate::models::Company;
use crate::normalize::{normalize_at, result_field, take_result};
use crate::session::{ChannelFactory, Service, Sessions};
use crate::time::{Clock, DateFormatter, FallbackDateFormatter, SystemClock};
use crate::transport::HttpChannelFactory;

/// Client for the Nmbrs SOAP services.
///
/// Holds one authenticated channel per service. Construction opens all four
/// or fails; there is no partially connected client.
pub struct NmbrsClient {
    sessions: Sessions,
    sandbox: bool,
    clock: Arc<dyn Clock>,
    date_formatter: Arc<dyn DateFormatter>,
    absence_operation: AbsenceOperation,
    new_case_number: Arc<dyn CaseNumberPolicy>,
    reopen_case_number: Arc<dyn CaseNumberPolicy>,
    /// Full company list, fetched once per client.
    company_cache: OnceCell<Vec<Company>>,
}

impl NmbrsClient {
    /// Connect to production (or sandbox) with the default HTTP transport.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        domain: impl Into<String>,
        sandbox: bool,
    ) -> Result<Self, ConnectError> {
        Self::builder()
            .credentials(Credentials::new(username, password, domain))
            .sandbox(sandbox)
            .build()
    }

    /// Connect using a loaded configuration.
    pub fn from_config(config: &NmbrsConfig) -> Result<Self, ConnectError> {
        Self::builder().config(config.clone()).build()
    }

    pub fn builder() -> NmbrsClientBuilder {
        NmbrsClientBuilder::default()
    }

    /// Whether the sessions point at the sandbox environment.
    pub fn is_sandbox(&self) -> bool {
        self.sandbox
    }

    /// Invoke a remote operation, translating any failure into [`NmbrsError`].
    pub fn invoke(
        &self,
        service: Service,
        operation: &str,
        args: Value,
    ) -> Result<Value, NmbrsError> {
        debug!(service = %service, operation, "invoking remote operation");

        self.sessions
            .channel(service)
            .call(operation, args)
            .map_err(|err| {
                let err = NmbrsError::from(err);
                warn!(
                    service = %service,
                    operation,
                    unauthorized = err.is_unauthorized(),
                    error = %err,
                    "remote operation failed"
                );
                err
            })
    }

    /// The `<operation>Result` field, if present and not null.
    pub(crate) fn fetch_result(
        &self,
        service: Service,
        operation: &str,
        args: Value,
    ) -> Result<Option<Value>, NmbrsError> {
        let response = self.invoke(service, operation, args)?;
        Ok(take_result(response, operation))
    }

    /// The `<operation>Result` field, which must be present.
    pub(crate) fn fetch_required(
        &self,
        service: Service,
        operation: &str,
        args: Value,
    ) -> Result<Value, NmbrsError> {
        self.fetch_result(service, operation, args)?
            .ok_or_else(|| NmbrsError::malformed(format!("{} is missing", result_field(operation))))
    }

    /// The `<operation>Result` field below `path`, normalized into a list.
    pub(crate) fn fetch_list(
        &self,
        service: Service,
        operation: &str,
        args: Value,
        path: &[&str],
    ) -> Result<Vec<Value>, NmbrsError> {
        let result = self.fetch_result(service, operation, args)?;
        Ok(normalize_at(result, path))
    }

    /// Run an operation that returns no content.
    pub(crate) fn execute(
        &self,
        service: Service,
        operation: &str,
        args: Value,
    ) -> Result<bool, NmbrsError> {
        self.invoke(service, operation, args)?;
        Ok(true)
    }

    /// Capture a result as a [`CallOutcome`], logging failures.
    pub fn soft<T>(&self, action: &str, result: Result<T, NmbrsError>) -> CallOutcome<T> {
        if let Err(ref err) = result {
            warn!(
                action,
                unauthorized = err.is_unauthorized(),
                error = %err,
                "soft-fail call failed"
            );
        }
        CallOutcome::from(result)
    }

    /// Full company list, fetched on first use and kept for the client's lifetime.
    ///
    /// A failed fetch leaves the cache empty.
    pub fn get_all_companies(&self) -> Result<&[Company], NmbrsError> {
        self.company_cache
            .get_or_try_init(|| {
                let items =
                    self.fetch_list(Service::Company, "List_GetAll", Value::Null, &["Company"])?;
                let companies = decode_companies(items)?;
                debug!(count = companies.len(), "company directory cached");
                Ok(companies)
            })
            .map(Vec::as_slice)
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn absence_operation(&self) -> AbsenceOperation {
        self.absence_operation
    }

    pub(crate) fn new_case_number(&self) -> &dyn CaseNumberPolicy {
        self.new_case_number.as_ref()
    }

    pub(crate) fn reopen_case_number(&self) -> &dyn CaseNumberPolicy {
        self.reopen_case_number.as_ref()
    }

    /// Render a host date for the wire; unparseable or absent dates become null.
    pub(crate) fn date_value(&self, date: Option<&str>) -> Value {
        date.and_then(|d| self.date_formatter.format_xsd(d))
            .map(Value::String)
            .unwrap_or(Value::Null)
    }
}

pub(crate) fn decode_companies(items: Vec<Value>) -> Result<Vec<Company>, NmbrsError> {
    items
        .into_iter()
        .map(|item| Company::from_value(item).map_err(NmbrsError::from))
        .collect()
}

/// Builder for [`NmbrsClient`].
#[derive(Default)]
pub struct NmbrsClientBuilder {
    config: NmbrsConfig,
    factory: Option<Box<dyn ChannelFactory>>,
    clock: Option<Arc<dyn Clock>>,
    date_formatter: Option<Arc<dyn DateFormatter>>,
    new_case_number: Option<Arc<dyn CaseNumberPolicy>>,
    reopen_case_number: Option<Arc<dyn CaseNumberPolicy>>,
}

impl NmbrsClientBuilder {
    /// Replace the whole configuration.
    pub fn config(mut self, config: NmbrsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.config.credentials = credentials;
        self
    }

    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.config.sandbox = sandbox;
        self
    }

    /// Use a custom transport instead of SOAP over HTTP.
    pub fn channel_factory(mut self, factory: impl ChannelFactory + 'static) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn date_formatter(mut self, formatter: impl DateFormatter + 'static) -> Self {
        self.date_formatter = Some(Arc::new(formatter));
        self
    }

    pub fn new_case_number_policy(mut self, policy: impl CaseNumberPolicy + 'static) -> Self {
        self.new_case_number = Some(Arc::new(policy));
        self
    }

    pub fn reopen_case_number_policy(mut self, policy: impl CaseNumberPolicy + 'static) -> Self {
        self.reopen_case_number = Some(Arc::new(policy));
        self
    }

    /// Validate the configuration and open all four sessions.
    pub fn build(self) -> Result<NmbrsClient, ConnectError> {
        let config = self.config;
        config.validate()?;

        let factory = match self.factory {
            Some(factory) => factory,
            None => Box::new(HttpChannelFactory::new(&config.http)?),
        };

        let sessions = Sessions::open(
            factory.as_ref(),
            &config.credentials,
            &config.endpoints,
            config.sandbox,
        )?;

        let date_formatter = self.date_formatter.unwrap_or_else(|| {
            info!("no date formatter supplied, dates limited to YYYY-MM-DD");
            Arc::new(FallbackDateFormatter)
        });

        Ok(NmbrsClient {
            sessions,
            sandbox: config.sandbox,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            date_formatter,
            absence_operation: config.absence.operation,
            new_case_number: self
                .new_case_number
                .unwrap_or_else(|| policy_for(config.absence.new_case_number)),
            reopen_case_number: self
                .reopen_case_number
                .unwrap_or_else(|| policy_for(config.absence.reopen_case_number)),
            company_cache: OnceCell::new(),
        })
    }
}
