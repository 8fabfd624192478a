//! Shipping domain entities
//!
//! Plain data holders for the carrier's request and response types. Each
//! field is mapped to its wire name explicitly; the SOAP layer never sees
//! these structs, only the `serde_json::Value` they convert to and from.

pub mod account;
pub mod address;
pub mod bound;
pub mod parcel;
pub mod shipment;
pub mod wire;

pub use account::{Account, AccountBalance};
pub use address::{Address, AddressKey, Recipient, Sender};
pub use bound::Bound;
pub use parcel::Parcel;
pub use shipment::{CollectionDate, Shipment};
pub use wire::{FromWire, ToWire};
