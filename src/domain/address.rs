//! Postal addresses, senders, recipients and address lookup keys

use serde::{Deserialize, Serialize};

use super::wire::{self, FromWire, ToWire};

/// Structured postal address (AddressType)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "CompanyName", default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    #[serde(rename = "Street", default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,

    #[serde(rename = "Locality", default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,

    #[serde(rename = "TownCity", default, skip_serializing_if = "Option::is_none")]
    pub town_city: Option<String>,

    #[serde(rename = "County", default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,

    #[serde(rename = "PostalCode", default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    /// ISO 3166-1 alpha-2, e.g. "GB"
    #[serde(rename = "CountryCode", default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

/// Collection address with contact details (SenderAddressType)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sender {
    #[serde(rename = "SenderName", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "SenderTelephone", default, skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,

    #[serde(rename = "SenderEmail", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(
        rename = "SenderAddress",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "wire::opt_struct"
    )]
    pub address: Option<Address>,

    /// Id of a sender address saved on the account. When set, the carrier
    /// uses the stored address and ignores `address`.
    #[serde(
        rename = "SenderAddressID",
        default,
        deserialize_with = "wire::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub sender_address_id: Option<i64>,
}

/// Delivery address with contact details (RecipientAddressType)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(rename = "RecipientName", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "RecipientTelephone", default, skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,

    #[serde(rename = "RecipientEmail", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(
        rename = "RecipientAddress",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "wire::opt_struct"
    )]
    pub address: Option<Address>,
}

/// Opaque lookup key returned by a postcode search (AddressKeyType)
///
/// `address` is a one-line label for display only; exchange the key for a
/// full [`Address`] with `Bound<AddressKey>::resolve`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressKey {
    #[serde(rename = "Key", default, deserialize_with = "wire::opt_string")]
    pub key: Option<String>,

    #[serde(rename = "Address", default)]
    pub address: Option<String>,
}

impl ToWire for Address {}
impl ToWire for Sender {}
impl ToWire for Recipient {}

impl FromWire for Address {}
impl FromWire for Sender {}
impl FromWire for Recipient {}
impl FromWire for AddressKey {}
