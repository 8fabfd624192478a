//! Despatch Bay API client
//!
//! One facade over the four SOAP namespaces and the two document endpoints.
//! Every method is a single round trip: build the request, call, decode.

use reqwest::Client;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::documents::{self, DocumentIds, LabelOptions, ManifestFormat};
use crate::domain::{
    Account, AccountBalance, Address, AddressKey, Bound, FromWire, Parcel, Recipient, Sender,
    Shipment, ToWire,
};
use crate::error::DespatchResult;
use crate::soap::{Service, SoapSession};

/// Despatch Bay API client
///
/// Holds one session per SOAP namespace, all created at construction and
/// never replaced. Cloning is cheap and clones share the HTTP connection pool;
/// coordinating concurrent use is left to the caller.
#[derive(Debug, Clone)]
pub struct DespatchBayClient {
    http: Client,
    account: SoapSession,
    addressing: SoapSession,
    shipping: SoapSession,
    tracking: SoapSession,
    labels_url: Url,
    manifest_url: Url,
}

impl DespatchBayClient {
    /// Create a client from a full configuration.
    ///
    /// No request is made here; bad credentials only show up on the first call.
    pub fn new(config: ClientConfig) -> DespatchResult<Self> {
        let base_url = Url::parse(&config.base_url)?;

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("despatch-bay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let session = |service: Service| {
            SoapSession::new(
                http.clone(),
                &base_url,
                &config.soap_version,
                service,
                &config.api_user,
                &config.api_key,
            )
        };
        let account = session(Service::Account)?;
        let addressing = session(Service::Addressing)?;
        let shipping = session(Service::Shipping)?;
        let tracking = session(Service::Tracking)?;

        let documents_base = format!(
            "{}/documents/{}",
            base_url.as_str().trim_end_matches('/'),
            config.documents_version
        );
        let labels_url = Url::parse(&format!("{}/labels", documents_base))?;
        let manifest_url = Url::parse(&format!("{}/manifest", documents_base))?;

        debug!(
            account = %account.endpoint(),
            addressing = %addressing.endpoint(),
            shipping = %shipping.endpoint(),
            tracking = %tracking.endpoint(),
            labels = %labels_url,
            manifest = %manifest_url,
            "Despatch Bay client configured"
        );

        Ok(DespatchBayClient {
            http,
            account,
            addressing,
            shipping,
            tracking,
            labels_url,
            manifest_url,
        })
    }

    /// Create a client against the production API
    pub fn with_credentials(api_user: impl Into<String>, api_key: impl Into<String>) -> DespatchResult<Self> {
        Self::new(ClientConfig::new(api_user, api_key))
    }

    /// The session bound to one SOAP namespace
    pub fn session(&self, service: Service) -> &SoapSession {
        match service {
            Service::Account => &self.account,
            Service::Addressing => &self.addressing,
            Service::Shipping => &self.shipping,
            Service::Tracking => &self.tracking,
        }
    }

    /// Base URL of the labels document endpoint
    pub fn labels_url(&self) -> &Url {
        &self.labels_url
    }

    /// Base URL of the manifest document endpoint
    pub fn manifest_url(&self) -> &Url {
        &self.manifest_url
    }

    // ========================================================================
    // Shipping entities
    // ========================================================================

    /// Bind a parcel to the shipping session
    pub fn parcel(&self, parcel: Parcel) -> Bound<Parcel> {
        Bound::new(self.shipping.clone(), parcel)
    }

    /// Bind an address to the shipping session
    pub fn address(&self, address: Address) -> Bound<Address> {
        Bound::new(self.shipping.clone(), address)
    }

    /// Bind a recipient to the shipping session
    pub fn recipient(&self, recipient: Recipient) -> Bound<Recipient> {
        Bound::new(self.shipping.clone(), recipient)
    }

    /// Bind a sender to the shipping session
    pub fn sender(&self, sender: Sender) -> Bound<Sender> {
        Bound::new(self.shipping.clone(), sender)
    }

    /// Bind a shipment request to the shipping session
    pub fn shipment(&self, shipment: Shipment) -> Bound<Shipment> {
        Bound::new(self.shipping.clone(), shipment)
    }

    // ========================================================================
    // Account services
    // ========================================================================

    /// Details of the authenticated account
    pub async fn get_account(&self) -> DespatchResult<Bound<Account>> {
        let value = self.account.call("GetAccount", &[]).await?;
        decode_bound(&self.account, value)
    }

    /// Current and available balance of the account
    pub async fn get_account_balance(&self) -> DespatchResult<Bound<AccountBalance>> {
        let value = self.account.call("GetAccountBalance", &[]).await?;
        decode_bound(&self.account, value)
    }

    /// Sender addresses saved on the account, in the order returned
    pub async fn get_sender_addresses(&self) -> DespatchResult<Vec<Bound<Sender>>> {
        let value = self.account.call("GetSenderAddresses", &[]).await?;
        decode_bound_list(&self.account, value)
    }

    // ========================================================================
    // Addressing services
    // ========================================================================

    /// Look up the address of `property` (house name or number) at `postcode`
    pub async fn find_address(&self, postcode: &str, property: &str) -> DespatchResult<Bound<Address>> {
        let value = self
            .addressing
            .call(
                "FindAddress",
                &[("Postcode", json!(postcode)), ("Property", json!(property))],
            )
            .await?;
        decode_bound(&self.addressing, value)
    }

    /// Full address for a key from `get_address_keys_by_postcode`
    pub async fn get_address_by_key(&self, key: &str) -> DespatchResult<Bound<Address>> {
        address_by_key(&self.addressing, key).await
    }

    /// Address keys for every property at `postcode`, in the order returned
    pub async fn get_address_keys_by_postcode(&self, postcode: &str) -> DespatchResult<Vec<Bound<AddressKey>>> {
        let value = self
            .addressing
            .call("GetAddressKeysByPostcode", &[("Postcode", json!(postcode))])
            .await?;
        decode_bound_list(&self.addressing, value)
    }

    // ========================================================================
    // Shipping services
    // ========================================================================

    /// Services that can carry `shipment`
    pub async fn get_available_services(&self, shipment: &Shipment) -> DespatchResult<Value> {
        self.shipping
            .call("GetAvailableServices", &[("ShipmentRequest", shipment.to_wire()?)])
            .await
    }

    /// One collection by id
    pub async fn get_collection(&self, collection_id: &str) -> DespatchResult<Value> {
        self.shipping
            .call("GetCollection", &[("CollectionID", json!(collection_id))])
            .await
    }

    /// Every collection on the account
    pub async fn get_collections(&self) -> DespatchResult<Value> {
        self.shipping.call("GetCollections", &[]).await
    }

    /// Dates `courier_id` can collect from `sender`
    pub async fn get_available_collection_dates(&self, sender: &Sender, courier_id: i64) -> DespatchResult<Value> {
        self.shipping
            .call(
                "GetAvailableCollectionDates",
                &[("SenderAddress", sender.to_wire()?), ("CourierID", json!(courier_id))],
            )
            .await
    }

    /// One shipment by id
    pub async fn get_shipment(&self, shipment_id: &str) -> DespatchResult<Value> {
        self.shipping
            .call("GetShipment", &[("ShipmentID", json!(shipment_id))])
            .await
    }

    /// Create a shipment; the response carries the new shipment id
    pub async fn add_shipment(&self, shipment: &Shipment) -> DespatchResult<Value> {
        self.shipping
            .call("AddShipment", &[("Shipment", shipment.to_wire()?)])
            .await
    }

    /// Book the given shipments; ids are sent in the order given
    pub async fn book_shipments<S: AsRef<str>>(&self, shipment_ids: &[S]) -> DespatchResult<Value> {
        let ids: Vec<&str> = shipment_ids.iter().map(|id| id.as_ref()).collect();
        self.shipping
            .call("BookShipments", &[("ShipmentIDs", json!(ids))])
            .await
    }

    /// Cancel a shipment
    pub async fn cancel_shipment(&self, shipment_id: &str) -> DespatchResult<Value> {
        self.shipping
            .call("CancelShipment", &[("ShipmentID", json!(shipment_id))])
            .await
    }

    // ========================================================================
    // Tracking services
    // ========================================================================

    /// Tracking history for a tracking number
    pub async fn get_tracking(&self, tracking_number: &str) -> DespatchResult<Value> {
        self.tracking
            .call("GetTracking", &[("TrackingNumber", json!(tracking_number))])
            .await
    }

    // ========================================================================
    // Documents
    // ========================================================================

    /// Download labels for one or more shipments (or collections) to `path`
    pub async fn download_shipment_labels(
        &self,
        ids: impl Into<DocumentIds>,
        path: impl AsRef<Path>,
        options: &LabelOptions,
    ) -> DespatchResult<()> {
        let url = documents::labels_request_url(&self.labels_url, &ids.into(), options)?;
        let base64_encoded = options.format.as_ref().is_some_and(|f| f.is_base64());
        documents::download(&self.http, url, base64_encoded, path.as_ref()).await
    }

    /// Download the manifest for a collection to `path`
    pub async fn download_manifest(
        &self,
        collection_id: &str,
        path: impl AsRef<Path>,
        format: Option<ManifestFormat>,
    ) -> DespatchResult<()> {
        let url = documents::manifest_request_url(&self.manifest_url, collection_id, format.as_ref())?;
        let base64_encoded = format.as_ref().is_some_and(|f| f.is_base64());
        documents::download(&self.http, url, base64_encoded, path.as_ref()).await
    }
}

// ============================================================================
// Response mapping
// ============================================================================

pub(crate) async fn address_by_key(session: &SoapSession, key: &str) -> DespatchResult<Bound<Address>> {
    let value = session.call("GetAddressByKey", &[("Key", json!(key))]).await?;
    decode_bound(session, value)
}

fn decode_bound<T: FromWire>(session: &SoapSession, value: Value) -> DespatchResult<Bound<T>> {
    Ok(Bound::new(session.clone(), T::from_wire(value)?))
}

/// Decode a SOAP array, keeping the remote order. A nil or empty return is an
/// empty list; a lone struct is treated as a one-item array.
fn decode_bound_list<T: FromWire>(session: &SoapSession, value: Value) -> DespatchResult<Vec<Bound<T>>> {
    let items = match value {
        Value::Null => Vec::new(),
        Value::String(s) if s.trim().is_empty() => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    };
    items
        .into_iter()
        .map(|item| decode_bound(session, item))
        .collect()
}
