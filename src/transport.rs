//! Default channel: SOAP 1.1 over blocking HTTP.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use serde_json::Value;
use tracing::debug;

use crate::config::HttpConfig;
use crate::envelope::build_request;
use crate::error::{CallError, ConnectError};
use crate::parser::{is_wsdl_document, parse_response};
use crate::session::{AuthHeader, Channel, ChannelFactory, Endpoint};

const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Channel posting SOAP envelopes to one service endpoint.
pub struct HttpChannel {
    client: Client,
    endpoint: Endpoint,
    auth: AuthHeader,
}

impl HttpChannel {
    pub fn new(client: Client, endpoint: Endpoint, auth: AuthHeader) -> Self {
        Self {
            client,
            endpoint,
            auth,
        }
    }
}

impl Channel for HttpChannel {
    fn call(&self, operation: &str, args: Value) -> Result<Value, CallError> {
        let envelope = build_request(&self.endpoint, &self.auth, operation, &args)?;
        let url = self.endpoint.service_url();

        debug!(service = %self.endpoint.service(), operation, %url, "sending SOAP request");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .header("SOAPAction", format!("\"{}\"", self.endpoint.soap_action(operation)))
            .body(envelope)
            .send()
            .map_err(|e| CallError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .map_err(|e| CallError::Transport(e.to_string()))?;

        debug!(
            service = %self.endpoint.service(),
            operation,
            %status,
            bytes = body.len(),
            "received SOAP response"
        );

        // Faults arrive with a 500 status; parse before looking at the status.
        match parse_response(&body, operation) {
            Ok(value) => Ok(value),
            Err(CallError::Malformed(_)) if !status.is_success() => {
                Err(CallError::Transport(format!("HTTP {} from {}", status, url)))
            }
            Err(e) => Err(e),
        }
    }
}

/// Factory that verifies each service's WSDL before handing out a channel.
pub struct HttpChannelFactory {
    client: Client,
}

impl HttpChannelFactory {
    pub fn new(config: &HttpConfig) -> Result<Self, ConnectError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| ConnectError::Http(format!("invalid user agent: {}", e)))?;
        headers.insert(USER_AGENT, agent);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ConnectError::Http(e.to_string()))?;

        Ok(Self { client })
    }

    fn check_wsdl(&self, endpoint: &Endpoint) -> Result<(), ConnectError> {
        let url = endpoint.wsdl_url();
        let wsdl_error = |message: String| ConnectError::Wsdl {
            service: endpoint.service(),
            url: url.clone(),
            message,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| wsdl_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(wsdl_error(format!("HTTP {}", status)));
        }

        let body = response.bytes().map_err(|e| wsdl_error(e.to_string()))?;
        if !is_wsdl_document(&body) {
            return Err(wsdl_error("response is not a WSDL document".to_string()));
        }
        Ok(())
    }
}

impl ChannelFactory for HttpChannelFactory {
    fn build(
        &self,
        endpoint: &Endpoint,
        auth: &AuthHeader,
    ) -> Result<Box<dyn Channel>, ConnectError> {
        self.check_wsdl(endpoint)?;
        Ok(Box::new(HttpChannel::new(
            self.client.clone(),
            endpoint.clone(),
            auth.clone(),
        )))
    }
}
