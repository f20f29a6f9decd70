//! Access gateway for attest.
//!
//! Sits between callers and the [`LedgerStore`](attest_ledger::LedgerStore):
//! normalises wallet addresses and fingerprints, relays registrations,
//! revocations and lookups, retries commits that timed out, and maps ledger
//! errors onto the status codes a network boundary reports.

pub mod config;
pub mod error;
pub mod gateway;
pub mod request;
pub mod retry;

pub use config::GatewayConfig;
pub use error::{ErrorBody, ErrorKind, GatewayError, GatewayResult};
pub use gateway::Gateway;
pub use request::{
    DocumentEntry, ListResponse, RegisterRequest, RegisterResponse, RevokeRequest,
    RevokeResponse, VerifyResponse,
};
pub use retry::RetryPolicy;
