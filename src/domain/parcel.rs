//! Parcel dimensions and contents

use serde::{Deserialize, Serialize};

use super::wire::{self, FromWire, ToWire};

/// One parcel in a shipment (ParcelType)
///
/// Weight is in kilograms, dimensions in centimetres, value in GBP.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    #[serde(
        rename = "Weight",
        default,
        deserialize_with = "wire::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub weight: Option<f64>,

    #[serde(
        rename = "Length",
        default,
        deserialize_with = "wire::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub length: Option<f64>,

    #[serde(
        rename = "Width",
        default,
        deserialize_with = "wire::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub width: Option<f64>,

    #[serde(
        rename = "Height",
        default,
        deserialize_with = "wire::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub height: Option<f64>,

    #[serde(rename = "Contents", default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,

    #[serde(
        rename = "Value",
        default,
        deserialize_with = "wire::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<f64>,

    /// Assigned by the carrier once booked; never sent
    #[serde(
        rename = "TrackingNumber",
        default,
        deserialize_with = "wire::opt_string",
        skip_serializing
    )]
    pub tracking_number: Option<String>,
}

impl ToWire for Parcel {}
impl FromWire for Parcel {}
