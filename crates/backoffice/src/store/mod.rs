//! In-process document store with push-based snapshots.
//!
//! The hosted document database behind the original deployment is an
//! external managed service; this module is its seam. Each collection
//! holds its documents in memory and publishes a full snapshot through a
//! `tokio::sync::watch` channel on every write, so subscribers always
//! observe the current state first and every subsequent change - the
//! same contract a document-store `onSnapshot` listener provides.
//!
//! CRUD is write-through: a call mutates the collection and the new
//! snapshot is pushed to subscribers; there is no local cache
//! reconciliation layer.

pub mod sync;

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tokio::sync::watch;

use meridian_core::CustomRole;

use crate::models::{ApiCredential, Booking, Customer, Itinerary, User};

/// Collection names, in subscription order.
pub const COLLECTION_NAMES: &[&str] = &[
    User::COLLECTION,
    Itinerary::COLLECTION,
    Customer::COLLECTION,
    Booking::COLLECTION,
    CustomRole::COLLECTION,
    ApiCredential::COLLECTION,
];

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Requested document was not found.
    #[error("not found")]
    NotFound,

    /// Write conflicts with an existing document (e.g., duplicate ID).
    #[error("conflict: {0}")]
    Conflict(String),
}

/// A document that lives in a named collection.
pub trait Document: Clone + Send + Sync + 'static {
    /// Collection name this document type is stored under.
    const COLLECTION: &'static str;

    /// Storage key for this document.
    fn id(&self) -> &str;
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Document for Itinerary {
    const COLLECTION: &'static str = "itineraries";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Document for Customer {
    const COLLECTION: &'static str = "customers";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Document for Booking {
    const COLLECTION: &'static str = "bookings";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Document for CustomRole {
    const COLLECTION: &'static str = "custom_roles";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Document for ApiCredential {
    const COLLECTION: &'static str = "api_credentials";

    fn id(&self) -> &str {
        self.provider.as_str()
    }
}

/// A full-collection snapshot as delivered to subscribers.
pub type Snapshot<T> = Arc<Vec<T>>;

/// One live collection: documents plus a snapshot publisher.
pub struct Collection<T: Document> {
    documents: RwLock<BTreeMap<String, T>>,
    snapshot: watch::Sender<Snapshot<T>>,
}

impl<T: Document> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Document> Collection<T> {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            documents: RwLock::new(BTreeMap::new()),
            snapshot,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, T>> {
        self.documents.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, T>> {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, documents: &BTreeMap<String, T>) {
        let snapshot = Arc::new(documents.values().cloned().collect::<Vec<_>>());
        // Nothing listening is fine; the next subscriber sees the value.
        let _ = self.snapshot.send(snapshot);
    }

    /// Returns all documents in key order.
    #[must_use]
    pub fn list(&self) -> Vec<T> {
        self.read().values().cloned().collect()
    }

    /// Returns the number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Looks up one document by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<T> {
        self.read().get(id).cloned()
    }

    /// Returns the first document matching a predicate.
    #[must_use]
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.read().values().find(|doc| predicate(doc)).cloned()
    }

    /// Inserts a new document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if a document with the same ID
    /// already exists.
    pub fn insert(&self, document: T) -> Result<T, StoreError> {
        let mut documents = self.write();
        let key = document.id().to_owned();
        if documents.contains_key(&key) {
            return Err(StoreError::Conflict(format!(
                "document '{key}' already exists in '{}'",
                T::COLLECTION
            )));
        }
        documents.insert(key, document.clone());
        self.publish(&documents);
        Ok(document)
    }

    /// Inserts or replaces a document.
    pub fn upsert(&self, document: T) -> T {
        let mut documents = self.write();
        documents.insert(document.id().to_owned(), document.clone());
        self.publish(&documents);
        document
    }

    /// Applies a mutation to an existing document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the document does not exist.
    pub fn update(&self, id: &str, mutate: impl FnOnce(&mut T)) -> Result<T, StoreError> {
        let mut documents = self.write();
        let document = documents.get_mut(id).ok_or(StoreError::NotFound)?;
        mutate(document);
        let updated = document.clone();
        self.publish(&documents);
        Ok(updated)
    }

    /// Removes a document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the document does not exist.
    pub fn delete(&self, id: &str) -> Result<T, StoreError> {
        let mut documents = self.write();
        let removed = documents.remove(id).ok_or(StoreError::NotFound)?;
        self.publish(&documents);
        Ok(removed)
    }

    /// Subscribes to full-collection snapshots.
    ///
    /// The receiver's current value is the present snapshot, so a new
    /// subscriber observes the collection state immediately.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Snapshot<T>> {
        self.snapshot.subscribe()
    }
}

/// All back-office collections.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    users: Collection<User>,
    itineraries: Collection<Itinerary>,
    customers: Collection<Customer>,
    bookings: Collection<Booking>,
    custom_roles: Collection<CustomRole>,
    api_credentials: Collection<ApiCredential>,
}

impl Store {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn users(&self) -> &Collection<User> {
        &self.inner.users
    }

    #[must_use]
    pub fn itineraries(&self) -> &Collection<Itinerary> {
        &self.inner.itineraries
    }

    #[must_use]
    pub fn customers(&self) -> &Collection<Customer> {
        &self.inner.customers
    }

    #[must_use]
    pub fn bookings(&self) -> &Collection<Booking> {
        &self.inner.bookings
    }

    #[must_use]
    pub fn custom_roles(&self) -> &Collection<CustomRole> {
        &self.inner.custom_roles
    }

    #[must_use]
    pub fn api_credentials(&self) -> &Collection<ApiCredential> {
        &self.inner.api_credentials
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use meridian_core::{BookingId, CustomerId, ItineraryId};

    use super::*;

    fn booking(id: &str) -> Booking {
        Booking {
            id: BookingId::from(id),
            customer_id: CustomerId::from("customer-1"),
            itinerary_id: ItineraryId::from("itinerary-1"),
            status: meridian_core::BookingStatus::Pending,
            payment_status: meridian_core::PaymentStatus::Unpaid,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let collection = Collection::<Booking>::new();
        collection.insert(booking("b-1")).expect("first insert");
        assert!(matches!(
            collection.insert(booking("b-1")),
            Err(StoreError::Conflict(_))
        ));
    }

    #[test]
    fn update_is_write_through() {
        let collection = Collection::<Booking>::new();
        collection.insert(booking("b-1")).expect("insert");

        let updated = collection
            .update("b-1", |b| {
                b.status = meridian_core::BookingStatus::Confirmed;
            })
            .expect("update");

        assert_eq!(updated.status, meridian_core::BookingStatus::Confirmed);
        let stored = collection.get("b-1").expect("stored");
        assert_eq!(stored.status, meridian_core::BookingStatus::Confirmed);
    }

    #[test]
    fn delete_missing_document_is_not_found() {
        let collection = Collection::<Booking>::new();
        assert!(matches!(collection.delete("b-404"), Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn watch_delivers_current_snapshot_then_changes() {
        let collection = Collection::<Booking>::new();
        collection.insert(booking("b-1")).expect("insert");

        let mut rx = collection.watch();
        assert_eq!(rx.borrow().len(), 1);

        collection.insert(booking("b-2")).expect("insert");
        rx.changed().await.expect("change notification");
        assert_eq!(rx.borrow().len(), 2);
    }
}
