//! Account snapshots
//!
//! Read-only views of remote account state. These are only ever built from
//! a response; the client never sends them.

use serde::{Deserialize, Serialize};

use super::wire::{self, FromWire};

/// Account details (AccountType)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "AccountID", default, deserialize_with = "wire::opt_i64")]
    pub account_id: Option<i64>,

    #[serde(rename = "AccountName", default)]
    pub account_name: Option<String>,

    #[serde(rename = "AccountBalance", default, deserialize_with = "wire::opt_struct")]
    pub balance: Option<AccountBalance>,
}

/// Account balance (AccountBalanceType)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    #[serde(rename = "Balance", default, deserialize_with = "wire::opt_f64")]
    pub balance: Option<f64>,

    #[serde(rename = "AvailableBalance", default, deserialize_with = "wire::opt_f64")]
    pub available_balance: Option<f64>,
}

impl FromWire for Account {}
impl FromWire for AccountBalance {}
