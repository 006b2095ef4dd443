//! Client for the Nmbrs payroll SOAP API.
//!
//! Opens authenticated sessions to the debtor, company, employee and report
//! services and exposes their operations as typed methods with uniform
//! response normalization and fault translation.
//!
//! # Features
//!
//! - Eager session setup against production or sandbox, failing fast
//! - `AuthHeaderWithDomain` bound to every request
//! - List normalization of single-record and empty replies
//! - Remote faults surfaced as [`NmbrsError`], with an unauthorized predicate
//! - Per-client company directory cache
//! - Absence reporting with pluggable case numbering
//!
//! # Example
//!
//! ```ignore
//! use nmbrs_client::NmbrsClient;
//!
//! let client = NmbrsClient::new("api@example.nl", "token", "example", true)?;
//! let highest = client.get_highest_company_number()?;
//! ```

pub mod absence;
mod calls;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod models;
pub mod normalize;
pub mod parser;
pub mod session;
pub mod time;
pub mod transport;

pub use absence::{AbsenceCase, CaseNumberPolicy, DirectCaseNumber, FrequencySuffixedCaseNumber};
pub use client::{NmbrsClient, NmbrsClientBuilder};
pub use config::{AbsenceOperation, CaseNumberRule, Credentials, NmbrsConfig};
pub use error::{CallError, CallOutcome, ConfigError, ConnectError, NmbrsError};
pub use models::Company;
pub use normalize::{normalize, normalize_at};
pub use session::{AuthHeader, Channel, ChannelFactory, Endpoint, Service};
pub use time::{
    Clock, DateFormatter, FallbackDateFormatter, FixedClock, SystemClock, XsdDateFormatter,
};
pub use transport::HttpChannelFactory;
