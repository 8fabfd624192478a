//! Entities paired with the session they were created against

use std::ops::{Deref, DerefMut};

use super::address::{Address, AddressKey};
use crate::client;
use crate::error::{DespatchError, DespatchResult};
use crate::soap::{Service, SoapSession};

/// An entity bound to the SOAP session it belongs to
///
/// Factories on the client bind to the shipping session; decoded responses
/// are bound to the session that fetched them. Any follow-up call made
/// through the entity goes out on that same session.
#[derive(Debug, Clone)]
pub struct Bound<T> {
    session: SoapSession,
    entity: T,
}

impl<T> Bound<T> {
    pub(crate) fn new(session: SoapSession, entity: T) -> Self {
        Bound { session, entity }
    }

    pub fn session(&self) -> &SoapSession {
        &self.session
    }

    pub fn service(&self) -> Service {
        self.session.service()
    }

    /// Drop the binding and keep the plain entity
    pub fn into_inner(self) -> T {
        self.entity
    }
}

impl<T> Deref for Bound<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.entity
    }
}

impl<T> DerefMut for Bound<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.entity
    }
}

impl<T> AsRef<T> for Bound<T> {
    fn as_ref(&self) -> &T {
        &self.entity
    }
}

impl Bound<AddressKey> {
    /// Exchange this key for the full address on the bound addressing session
    pub async fn resolve(&self) -> DespatchResult<Bound<Address>> {
        let key = self
            .entity
            .key
            .as_deref()
            .ok_or(DespatchError::MissingField("Key"))?;
        client::address_by_key(&self.session, key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parcel::Parcel;
    use url::Url;

    fn shipping_session() -> SoapSession {
        let base = Url::parse("https://api.despatchbay.com").unwrap();
        SoapSession::new(reqwest::Client::new(), &base, "v15", Service::Shipping, "u", "k").unwrap()
    }

    #[test]
    fn test_bound_derefs_to_entity() {
        let mut bound = Bound::new(shipping_session(), Parcel { weight: Some(1.0), ..Default::default() });
        assert_eq!(bound.weight, Some(1.0));

        bound.weight = Some(2.0);
        assert_eq!(bound.service(), Service::Shipping);
        assert_eq!(bound.into_inner().weight, Some(2.0));
    }

    #[tokio::test]
    async fn test_resolve_without_key_fails_locally() {
        let bound = Bound::new(shipping_session(), AddressKey { key: None, address: None });
        let result = bound.resolve().await;
        assert!(matches!(result, Err(DespatchError::MissingField("Key"))));
    }
}
