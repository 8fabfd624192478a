//! SOAP transport for the Despatch Bay API
//!
//! Each API namespace (account, addressing, shipping, tracking) gets its own
//! [`SoapSession`]. All sessions share one HTTP client and one credential pair.

pub mod envelope;
pub mod session;

pub use session::{Service, SoapSession};
