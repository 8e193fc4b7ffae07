//! Append-only, hash-linked ledger for SealChain.
//!
//! This crate is the heart of SealChain. It provides:
//! - [`Ledger`], the single-writer append/lookup/verify API over a [`ChainStore`]
//! - [`ChainValidator`] with first-failure and full-report modes
//! - Payment events with identifier masking ([`PaymentEvent`], [`mask_identifier`])
//! - The audit projection ([`AuditView`])
//!
//! [`ChainStore`]: seal_store::ChainStore

pub mod config;
pub mod error;
pub mod ledger;
pub mod payment;
pub mod projection;
pub mod validation;

pub use config::{LedgerConfig, SealPolicy};
pub use error::{LedgerError, LedgerResult};
pub use ledger::Ledger;
pub use payment::{mask_identifier, PaymentEvent, PAYMENT_META_TYPE, PAYMENT_META_VERSION};
pub use projection::{AuditEntry, AuditView};
pub use validation::{ChainValidator, ValidationReport, VerificationResult, Violation, ViolationKind};
