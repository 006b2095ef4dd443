//! Remote operations, one module per service.
//!
//! Every operation is a method on [`crate::NmbrsClient`]. List-valued
//! operations always return a `Vec`, even when the service replied with a
//! single record or nothing at all.

mod absence;
mod company;
mod debtor;
mod employee;
mod report;
