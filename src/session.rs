//! Service sessions: endpoint selection, auth header binding and the channel seam.

use std::fmt;

use serde_json::Value;
use tracing::{debug, info};

use crate::config::{Credentials, EndpointsConfig};
use crate::error::{CallError, ConnectError};

/// Default production base URL.
pub const PRODUCTION_BASE_URL: &str = "https://api.nmbrs.nl/soap/v3/";
/// Default sandbox base URL.
pub const SANDBOX_BASE_URL: &str = "https://api-sandbox.nmbrs.nl/soap/v3/";

/// Name of the SOAP header element carrying the credentials.
pub const AUTH_HEADER_NAME: &str = "AuthHeaderWithDomain";

/// The four remote services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Debtor,
    Company,
    Employee,
    Report,
}

impl Service {
    /// Construction order of the client's channels.
    pub const ALL: [Service; 4] = [Self::Debtor, Self::Company, Self::Employee, Self::Report];

    /// Remote service name as used in endpoint URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debtor => "DebtorService",
            Self::Company => "CompanyService",
            Self::Employee => "EmployeeService",
            Self::Report => "ReportService",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location of one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base_url: String,
    service: Service,
}

impl Endpoint {
    pub fn new(base_url: impl Into<String>, service: Service) -> Self {
        Self {
            base_url: base_url.into(),
            service,
        }
    }

    /// Pick the sandbox or production base URL.
    pub fn select(endpoints: &EndpointsConfig, sandbox: bool, service: Service) -> Self {
        let base = if sandbox {
            &endpoints.sandbox
        } else {
            &endpoints.production
        };
        Self::new(base.clone(), service)
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Service namespace, also the XML namespace of the auth header.
    pub fn namespace(&self) -> String {
        format!("{}{}", self.base_url, self.service.as_str())
    }

    /// URL requests are posted to.
    pub fn service_url(&self) -> String {
        format!("{}.asmx", self.namespace())
    }

    /// URL of the service description.
    pub fn wsdl_url(&self) -> String {
        format!("{}.asmx?WSDL", self.namespace())
    }

    /// `SOAPAction` value for an operation.
    pub fn soap_action(&self, operation: &str) -> String {
        format!("{}/{}", self.namespace(), operation)
    }
}

/// The `AuthHeaderWithDomain` bound to every request on a channel.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthHeader {
    pub username: String,
    pub token: String,
    pub domain: String,
}

impl AuthHeader {
    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self {
            username: credentials.username.clone(),
            token: credentials.token.clone(),
            domain: credentials.domain.clone(),
        }
    }

    /// Header fields in wire order.
    pub fn fields(&self) -> [(&'static str, &str); 3] {
        [
            ("Username", self.username.as_str()),
            ("Token", self.token.as_str()),
            ("Domain", self.domain.as_str()),
        ]
    }
}

impl fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthHeader")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .field("domain", &self.domain)
            .finish()
    }
}

/// Authenticated handle to one remote service.
///
/// `call` invokes the named operation with `args` (a JSON object whose keys
/// are the remote parameter names) and returns the `<Operation>Response`
/// object, whose `<Operation>Result` field holds the payload.
pub trait Channel: Send + Sync {
    fn call(&self, operation: &str, args: Value) -> Result<Value, CallError>;
}

/// Builds channels at client construction.
pub trait ChannelFactory {
    fn build(
        &self,
        endpoint: &Endpoint,
        auth: &AuthHeader,
    ) -> Result<Box<dyn Channel>, ConnectError>;
}

/// One channel per service, all sharing the same credentials.
pub(crate) struct Sessions {
    pub debtor: Box<dyn Channel>,
    pub company: Box<dyn Channel>,
    pub employee: Box<dyn Channel>,
    pub report: Box<dyn Channel>,
}

impl Sessions {
    /// Open all four sessions in order. The first failure aborts the rest.
    pub(crate) fn open(
        factory: &dyn ChannelFactory,
        credentials: &Credentials,
        endpoints: &EndpointsConfig,
        sandbox: bool,
    ) -> Result<Self, ConnectError> {
        let auth = AuthHeader::from_credentials(credentials);
        let open = |service: Service| {
            let endpoint = Endpoint::select(endpoints, sandbox, service);
            debug!(service = %service, wsdl = %endpoint.wsdl_url(), "Opening service session");
            factory.build(&endpoint, &auth)
        };

        let sessions = Self {
            debtor: open(Service::Debtor)?,
            company: open(Service::Company)?,
            employee: open(Service::Employee)?,
            report: open(Service::Report)?,
        };

        info!(
            username = %credentials.username,
            domain = %credentials.domain,
            sandbox,
            "Service sessions established"
        );

        Ok(sessions)
    }

    pub(crate) fn channel(&self, service: Service) -> &dyn Channel {
        match service {
            Service::Debtor => self.debtor.as_ref(),
            Service::Company => self.company.as_ref(),
            Service::Employee => self.employee.as_ref(),
            Service::Report => self.report.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let endpoint = Endpoint::new(PRODUCTION_BASE_URL, Service::Company);
        assert_eq!(endpoint.namespace(), "https://api.nmbrs.nl/soap/v3/CompanyService");
        assert_eq!(
            endpoint.wsdl_url(),
            "https://api.nmbrs.nl/soap/v3/CompanyService.asmx?WSDL"
        );
        assert_eq!(
            endpoint.service_url(),
            "https://api.nmbrs.nl/soap/v3/CompanyService.asmx"
        );
        assert_eq!(
            endpoint.soap_action("List_GetAll"),
            "https://api.nmbrs.nl/soap/v3/CompanyService/List_GetAll"
        );
    }

    #[test]
    fn test_endpoint_selection() {
        let endpoints = EndpointsConfig::default();
        let sandbox = Endpoint::select(&endpoints, true, Service::Report);
        assert_eq!(
            sandbox.wsdl_url(),
            "https://api-sandbox.nmbrs.nl/soap/v3/ReportService.asmx?WSDL"
        );
        let production = Endpoint::select(&endpoints, false, Service::Report);
        assert_eq!(production.base_url(), PRODUCTION_BASE_URL);
    }

    #[test]
    fn test_auth_header_debug_redacts_token() {
        let auth = AuthHeader {
            username: "api@example.nl".to_string(),
            token: "secret-token".to_string(),
            domain: "example".to_string(),
        };
        let rendered = format!("{:?}", auth);
        assert!(rendered.contains("api@example.nl"));
        assert!(!rendered.contains("secret-token"));
    }

    #[test]
    fn test_service_names() {
        let names: Vec<_> = Service::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            names,
            ["DebtorService", "CompanyService", "EmployeeService", "ReportService"]
        );
    }
}
