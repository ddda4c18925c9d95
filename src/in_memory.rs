// In-memory repositories behind the same CRUD contract as the HTTP clients.
// Used for offline runs and as the backend double in tests; supports injected
// failures and latency the same way a flaky service would misbehave.

use crate::api_client::{ApiError, BookingsApi, ClientStats, Repository, Services};
use crate::models::{
    Booking, BookingPayload, BookingStatus, EntityId, Flight, FlightPayload, User, UserPayload,
};
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// An entity that can be built from its create/update payload
pub trait Record<P>: Clone + Send + Sync + 'static {
    fn id(&self) -> &EntityId;

    // `existing` is the stored record on update, None on create
    fn from_payload(id: EntityId, payload: &P, existing: Option<&Self>) -> Self;
}

impl Record<FlightPayload> for Flight {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn from_payload(id: EntityId, payload: &FlightPayload, _existing: Option<&Self>) -> Self {
        Flight {
            id,
            flight_code: payload.flight_code.clone(),
            airline_name: payload.airline_name.clone(),
            from: payload.from.clone(),
            to: payload.to.clone(),
            departure_time: payload.departure_time.clone(),
            arrival_time: payload.arrival_time.clone(),
            price: payload.price,
        }
    }
}

impl Record<UserPayload> for User {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn from_payload(id: EntityId, payload: &UserPayload, existing: Option<&Self>) -> Self {
        User {
            id,
            name: payload.name.clone(),
            email: payload.email.clone(),
            role: payload
                .role
                .clone()
                .or_else(|| existing.and_then(|u| u.role.clone())),
        }
    }
}

impl Record<BookingPayload> for Booking {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn from_payload(id: EntityId, payload: &BookingPayload, existing: Option<&Self>) -> Self {
        let user_id = payload
            .user_id
            .clone()
            .or_else(|| existing.and_then(|b| b.user_id.clone()));
        Booking {
            id,
            user_id,
            flight_id: Some(payload.flight_id.clone()),
            ticket_quantity: payload.ticket_quantity,
            status: existing.map(|b| b.status).unwrap_or_default(),
            order_time: existing
                .map(|b| b.order_time.clone())
                .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
        }
    }
}

// Numeric ids sort numerically, anything else after them by text
fn sort_key(id: &EntityId) -> (bool, u64, String) {
    match id.as_str().parse::<u64>() {
        Ok(n) => (false, n, String::new()),
        Err(_) => (true, 0, id.as_str().to_string()),
    }
}

pub struct InMemoryRepository<E, P> {
    resource: &'static str,
    records: DashMap<EntityId, E>,
    next_id: AtomicU64,
    stats: Mutex<ClientStats>,
    fail_next_requests: AtomicUsize,
    failing_ids: DashSet<EntityId>,
    delay_ms: AtomicU64,
    _marker: std::marker::PhantomData<fn() -> P>,
}

impl<E, P> InMemoryRepository<E, P>
where
    E: Record<P>,
    P: Sync + 'static,
{
    pub fn new(resource: &'static str, seed: Vec<E>) -> Self {
        let records = DashMap::new();
        let mut max_id = 0;
        for record in seed {
            if let Ok(n) = record.id().as_str().parse::<u64>() {
                max_id = max_id.max(n);
            }
            records.insert(record.id().clone(), record);
        }

        Self {
            resource,
            records,
            next_id: AtomicU64::new(max_id + 1),
            stats: Mutex::new(ClientStats::default()),
            fail_next_requests: AtomicUsize::new(0),
            failing_ids: DashSet::new(),
            delay_ms: AtomicU64::new(0),
            _marker: std::marker::PhantomData,
        }
    }

    // The next `count` calls of any kind fail with a 500
    pub fn fail_next_requests(&self, count: usize) {
        self.fail_next_requests.store(count, Ordering::SeqCst);
    }

    // Every call addressing `id` fails with a 500 until cleared
    pub fn fail_id(&self, id: impl Into<EntityId>) {
        self.failing_ids.insert(id.into());
    }

    pub fn clear_failures(&self) {
        self.fail_next_requests.store(0, Ordering::SeqCst);
        self.failing_ids.clear();
    }

    pub fn set_delay(&self, delay_ms: u64) {
        self.delay_ms.store(delay_ms, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.records.contains_key(id)
    }

    pub fn snapshot(&self, id: &EntityId) -> Option<E> {
        self.records.get(id).map(|r| r.value().clone())
    }

    fn not_found(&self, id: &EntityId) -> ApiError {
        ApiError::NotFound {
            resource: self.resource.to_string(),
            id: id.to_string(),
        }
    }

    // Runs one simulated round trip: latency, injected failures, then `op`
    async fn round_trip<T>(
        &self,
        id: Option<&EntityId>,
        op: impl FnOnce() -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        self.stats.lock().record_sent();
        let started = Instant::now();

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let result = if self.take_injected_failure(id) {
            Err(ApiError::Status {
                status_code: 500,
                message: "Internal Server Error".to_string(),
            })
        } else {
            op()
        };

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.stats.lock().record_outcome(result.is_ok(), elapsed_ms);
        result
    }

    fn take_injected_failure(&self, id: Option<&EntityId>) -> bool {
        if id.map_or(false, |id| self.failing_ids.contains(id)) {
            return true;
        }
        self.fail_next_requests
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn allocate_id(&self) -> EntityId {
        EntityId::from(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl<E, P> Repository for InMemoryRepository<E, P>
where
    E: Record<P>,
    P: Sync + 'static,
{
    type Entity = E;
    type Payload = P;

    fn resource(&self) -> &'static str {
        self.resource
    }

    async fn list(&self) -> Result<Vec<E>, ApiError> {
        self.round_trip(None, || {
            let mut all: Vec<E> = self.records.iter().map(|r| r.value().clone()).collect();
            all.sort_by_key(|r| sort_key(r.id()));
            Ok(all)
        })
        .await
    }

    async fn get_by_id(&self, id: &EntityId) -> Result<E, ApiError> {
        self.round_trip(Some(id), || self.snapshot(id).ok_or_else(|| self.not_found(id)))
            .await
    }

    async fn create(&self, payload: &P) -> Result<E, ApiError> {
        self.round_trip(None, || {
            let id = self.allocate_id();
            let record = E::from_payload(id.clone(), payload, None);
            self.records.insert(id, record.clone());
            Ok(record)
        })
        .await
    }

    async fn update(&self, id: &EntityId, payload: &P) -> Result<E, ApiError> {
        self.round_trip(Some(id), || {
            let mut entry = self.records.get_mut(id).ok_or_else(|| self.not_found(id))?;
            let updated = E::from_payload(id.clone(), payload, Some(entry.value()));
            *entry.value_mut() = updated.clone();
            Ok(updated)
        })
        .await
    }

    async fn delete(&self, id: &EntityId) -> Result<(), ApiError> {
        self.round_trip(Some(id), || {
            self.records
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| self.not_found(id))
        })
        .await
    }

    fn stats(&self) -> ClientStats {
        self.stats.lock().clone()
    }
}

#[async_trait]
impl BookingsApi for InMemoryRepository<Booking, BookingPayload> {
    async fn cancel(&self, id: &EntityId) -> Result<(), ApiError> {
        self.round_trip(Some(id), || {
            let mut entry = self.records.get_mut(id).ok_or_else(|| self.not_found(id))?;
            entry.value_mut().status = BookingStatus::Cancelled;
            Ok(())
        })
        .await
    }
}

// Concrete handles to the three in-memory services, kept so callers can inject
// failures or inspect state while views use the `Services` trait objects.
#[derive(Clone)]
pub struct InMemoryBackend {
    pub users: Arc<InMemoryRepository<User, UserPayload>>,
    pub flights: Arc<InMemoryRepository<Flight, FlightPayload>>,
    pub bookings: Arc<InMemoryRepository<Booking, BookingPayload>>,
}

impl InMemoryBackend {
    pub fn new(users: Vec<User>, flights: Vec<Flight>, bookings: Vec<Booking>) -> Self {
        Self {
            users: Arc::new(InMemoryRepository::new("users", users)),
            flights: Arc::new(InMemoryRepository::new("flights", flights)),
            bookings: Arc::new(InMemoryRepository::new("bookings", bookings)),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new())
    }

    pub fn seeded() -> Self {
        Self::new(sample_users(), sample_flights(), sample_bookings())
    }

    pub fn services(&self) -> Services {
        Services {
            users: self.users.clone(),
            flights: self.flights.clone(),
            bookings: self.bookings.clone(),
        }
    }
}

pub fn sample_flights() -> Vec<Flight> {
    let flight = |id: u64, code: &str, airline: &str, from: &str, to: &str, dep: &str, arr: &str, price: f64| Flight {
        id: EntityId::from(id),
        flight_code: code.to_string(),
        airline_name: airline.to_string(),
        from: from.to_string(),
        to: to.to_string(),
        departure_time: dep.to_string(),
        arrival_time: arr.to_string(),
        price: Some(price),
    };

    vec![
        flight(1, "GA-402", "Garuda Indonesia", "Jakarta", "Bali", "2025-06-01T08:00:00", "2025-06-01T10:50:00", 1_250_000.0),
        flight(2, "JT-610", "Lion Air", "Jakarta", "Surabaya", "2025-06-02T06:30:00", "2025-06-02T08:00:00", 650_000.0),
        flight(3, "QG-720", "Citilink", "Bandung", "Medan", "2025-06-03T13:15:00", "2025-06-03T15:45:00", 980_000.0),
        flight(7, "ID-6580", "Batik Air", "Yogyakarta", "Makassar", "2025-06-05T19:00:00", "2025-06-05T22:10:00", 500_000.0),
    ]
}

pub fn sample_users() -> Vec<User> {
    let user = |id: u64, name: &str, email: &str, role: &str| User {
        id: EntityId::from(id),
        name: name.to_string(),
        email: email.to_string(),
        role: Some(role.to_string()),
    };

    vec![
        user(1, "Siti Rahma", "siti@example.com", "admin"),
        user(2, "Andi Pratama", "andi@example.com", "customer"),
        user(3, "Dewi Lestari", "dewi@example.com", "customer"),
    ]
}

pub fn sample_bookings() -> Vec<Booking> {
    let booking = |id: u64, user: u64, flight: u64, qty: u32, status: BookingStatus, at: &str| Booking {
        id: EntityId::from(id),
        user_id: Some(EntityId::from(user)),
        flight_id: Some(EntityId::from(flight)),
        ticket_quantity: qty,
        status,
        order_time: at.to_string(),
    };

    vec![
        booking(40, 2, 1, 1, BookingStatus::Confirmed, "2025-05-20T09:12:00Z"),
        booking(41, 1, 2, 3, BookingStatus::Cancelled, "2025-05-21T14:40:00Z"),
        booking(42, 3, 7, 2, BookingStatus::Pending, "2025-05-22T18:05:00Z"),
    ]
}
