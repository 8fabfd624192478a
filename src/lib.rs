//! Despatch Bay
//!
//! Typed async client for the Despatch Bay shipping API: account, addressing,
//! shipping and tracking over SOAP, plus label and manifest downloads over
//! plain HTTP.
//!
//! ```no_run
//! use despatch_bay::{DespatchBayClient, LabelOptions};
//!
//! # async fn run() -> despatch_bay::DespatchResult<()> {
//! let client = DespatchBayClient::with_credentials("api-user", "api-key")?;
//!
//! let balance = client.get_account_balance().await?;
//! println!("available: {:?}", balance.available_balance);
//!
//! for key in client.get_address_keys_by_postcode("LS1 1AA").await? {
//!     let address = key.resolve().await?;
//!     println!("{:?}", address.street);
//! }
//!
//! let options = LabelOptions::default().format("pdf");
//! client.download_shipment_labels(["100-1", "100-2"], "labels.pdf", &options).await?;
//! # Ok(())
//! # }
//! ```
//!
//! The library emits `tracing` events but never installs a subscriber.

pub mod client;
pub mod config;
pub mod documents;
pub mod domain;
pub mod error;
pub mod soap;

pub use client::DespatchBayClient;
pub use crate::config::ClientConfig;
pub use documents::{DocumentIds, LabelFormat, LabelOptions, ManifestFormat};
pub use domain::{
    Account, AccountBalance, Address, AddressKey, Bound, CollectionDate, FromWire, Parcel,
    Recipient, Sender, Shipment, ToWire,
};
pub use error::{DespatchError, DespatchResult};
pub use soap::{Service, SoapSession};
