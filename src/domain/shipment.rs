//! Shipment requests and collection dates

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::address::{Recipient, Sender};
use super::parcel::Parcel;
use super::wire::{self, FromWire, ToWire};

/// Collection date wrapper (CollectionDateType)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionDate {
    #[serde(rename = "CollectionDate")]
    pub date: NaiveDate,
}

impl From<NaiveDate> for CollectionDate {
    fn from(date: NaiveDate) -> Self {
        CollectionDate { date }
    }
}

/// Shipment request (ShipmentRequestType)
///
/// Used both to quote services (`get_available_services`) and to create a
/// shipment (`add_shipment`). `service_id` and `collection_date` are only
/// needed for the latter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    #[serde(
        rename = "ServiceID",
        default,
        deserialize_with = "wire::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub service_id: Option<i64>,

    #[serde(rename = "Parcels", default, deserialize_with = "wire::list")]
    pub parcels: Vec<Parcel>,

    #[serde(rename = "ClientReference", default, skip_serializing_if = "Option::is_none")]
    pub client_reference: Option<String>,

    #[serde(
        rename = "CollectionDate",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "wire::opt_struct"
    )]
    pub collection_date: Option<CollectionDate>,

    #[serde(
        rename = "SenderAddress",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "wire::opt_struct"
    )]
    pub sender: Option<Sender>,

    #[serde(
        rename = "RecipientAddress",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "wire::opt_struct"
    )]
    pub recipient: Option<Recipient>,

    #[serde(
        rename = "FollowShipment",
        default,
        deserialize_with = "wire::opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub follow_shipment: Option<bool>,
}

impl Shipment {
    /// Append a parcel, keeping insertion order
    pub fn with_parcel(mut self, parcel: Parcel) -> Self {
        self.parcels.push(parcel);
        self
    }
}

impl ToWire for Shipment {}
impl FromWire for Shipment {}
impl FromWire for CollectionDate {}
