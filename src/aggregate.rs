// Multi-service aggregation.
//
// Bookings only carry references; flights and users live in their own services
// with no server-side join. The detail flow needs all three records or nothing,
// the list flow enriches each row independently and tolerates missing pieces.

use crate::api_client::{ApiError, Repository, Services};
use crate::models::{Booking, EntityId, Flight, User};
use crate::scope::{Cancelled, ScopeToken};
use futures::future::{join_all, OptionFuture};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    #[error("booking {booking} has no {reference} reference")]
    MissingReference {
        booking: String,
        reference: &'static str,
    },
}

impl AggregateError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AggregateError::Cancelled(_))
    }
}

// A booking with both of its related records resolved
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDetail {
    pub booking: Booking,
    pub flight: Flight,
    pub user: User,
}

impl BookingDetail {
    // Derived at render time, never stored
    pub fn total_price(&self) -> Option<f64> {
        total_price(&self.flight, &self.booking)
    }
}

pub fn total_price(flight: &Flight, booking: &Booking) -> Option<f64> {
    flight
        .price
        .map(|price| price * f64::from(booking.ticket_quantity))
}

// A booking list row; absent fields mean the related fetch failed
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRow {
    pub booking: Booking,
    pub flight: Option<Flight>,
    pub user: Option<User>,
}

impl BookingRow {
    pub fn user_name(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.name.as_str())
    }
}

// Booking first, then flight and user concurrently. Any failure fails the whole
// detail; there is no partially populated result.
pub async fn fetch_booking_detail(
    services: &Services,
    booking_id: &EntityId,
    token: &ScopeToken,
) -> Result<BookingDetail, AggregateError> {
    let booking = token
        .guard(services.bookings.get_by_id(booking_id))
        .await??;

    let missing = |reference| AggregateError::MissingReference {
        booking: booking.id.to_string(),
        reference,
    };
    let flight_id = booking.flight_id.clone().ok_or_else(|| missing("flight"))?;
    let user_id = booking.user_id.clone().ok_or_else(|| missing("user"))?;

    debug!(booking = %booking.id, flight = %flight_id, user = %user_id, "resolving booking references");

    let (flight, user) = token
        .guard(futures::future::try_join(
            services.flights.get_by_id(&flight_id),
            services.users.get_by_id(&user_id),
        ))
        .await??;

    Ok(BookingDetail {
        booking,
        flight,
        user,
    })
}

// Flight and user for one booking, each allowed to fail on its own. A reference
// the booking does not carry is never requested.
async fn enrich(services: &Services, booking: Booking) -> BookingRow {
    let (flight, user) = futures::future::join(
        OptionFuture::from(
            booking
                .flight_id
                .as_ref()
                .map(|id| services.flights.get_by_id(id)),
        ),
        OptionFuture::from(
            booking
                .user_id
                .as_ref()
                .map(|id| services.users.get_by_id(id)),
        ),
    )
    .await;

    let flight = match flight {
        Some(Ok(flight)) => Some(flight),
        Some(Err(e)) => {
            warn!(booking = %booking.id, flight = ?booking.flight_id, error = %e, "flight lookup failed");
            None
        }
        None => {
            debug!(booking = %booking.id, "booking has no flight reference");
            None
        }
    };
    let user = match user {
        Some(Ok(user)) => Some(user),
        Some(Err(e)) => {
            warn!(booking = %booking.id, user = ?booking.user_id, error = %e, "user lookup failed");
            None
        }
        None => {
            debug!(booking = %booking.id, "booking has no user reference");
            None
        }
    };

    BookingRow {
        booking,
        flight,
        user,
    }
}

// Enriches every booking concurrently; row order follows `bookings`
pub async fn enrich_bookings(
    services: &Services,
    bookings: Vec<Booking>,
    token: &ScopeToken,
) -> Result<Vec<BookingRow>, Cancelled> {
    let rows = bookings
        .into_iter()
        .map(|booking| enrich(services, booking));
    token.guard(join_all(rows)).await
}

// The bookings list: fetching the collection must succeed, enrichment may not
pub async fn fetch_booking_rows(
    services: &Services,
    token: &ScopeToken,
) -> Result<Vec<BookingRow>, AggregateError> {
    let bookings = token.guard(services.bookings.list()).await??;
    Ok(enrich_bookings(services, bookings, token).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::{sample_bookings, sample_flights, sample_users, InMemoryBackend};
    use crate::models::BookingStatus;
    use crate::scope::ViewScope;
    use std::time::Duration;

    #[tokio::test]
    async fn test_detail_resolves_all_three_records() {
        let backend = InMemoryBackend::seeded();
        let scope = ViewScope::new();

        let detail = fetch_booking_detail(&backend.services(), &EntityId::from("42"), &scope.token())
            .await
            .unwrap();

        assert_eq!(detail.flight.id, EntityId::from("7"));
        assert_eq!(detail.user.id, EntityId::from("3"));
        assert_eq!(detail.booking.status, BookingStatus::Pending);
        assert_eq!(detail.total_price(), Some(1_000_000.0));
    }

    #[tokio::test]
    async fn test_detail_fails_as_a_whole_when_flight_missing() {
        let backend = InMemoryBackend::seeded();
        backend.flights.fail_id("7");
        let scope = ViewScope::new();

        let err = fetch_booking_detail(&backend.services(), &EntityId::from("42"), &scope.token())
            .await
            .unwrap_err();
        assert!(matches!(err, AggregateError::Api(_)));
    }

    #[tokio::test]
    async fn test_detail_does_not_touch_related_services_when_booking_missing() {
        let backend = InMemoryBackend::seeded();
        let scope = ViewScope::new();

        let err = fetch_booking_detail(&backend.services(), &EntityId::from("404"), &scope.token())
            .await
            .unwrap_err();
        assert!(matches!(err, AggregateError::Api(ApiError::NotFound { .. })));
        assert_eq!(backend.flights.stats().requests_sent, 0);
        assert_eq!(backend.users.stats().requests_sent, 0);
    }

    #[tokio::test]
    async fn test_list_isolates_failures_per_row() {
        let backend = InMemoryBackend::seeded();
        backend.users.fail_id("3");
        backend.flights.fail_id("1");
        let scope = ViewScope::new();

        let rows = fetch_booking_rows(&backend.services(), &scope.token())
            .await
            .unwrap();

        assert_eq!(rows.len(), 3);
        // booking 40: flight 1 failed, user 2 fine
        assert!(rows[0].flight.is_none());
        assert_eq!(rows[0].user_name(), Some("Andi Pratama"));
        // booking 41 untouched
        assert!(rows[1].flight.is_some() && rows[1].user.is_some());
        // booking 42: user 3 failed, flight 7 fine
        assert!(rows[2].user.is_none());
        assert_eq!(rows[2].flight.as_ref().map(|f| f.flight_code.as_str()), Some("ID-6580"));
    }

    #[tokio::test]
    async fn test_detail_without_user_reference_fails_without_lookup() {
        let mut bookings = sample_bookings();
        bookings[2].user_id = None;
        let backend = InMemoryBackend::new(sample_users(), sample_flights(), bookings);
        let scope = ViewScope::new();

        let err = fetch_booking_detail(&backend.services(), &EntityId::from("42"), &scope.token())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AggregateError::MissingReference { reference: "user", .. }
        ));
        assert_eq!(backend.flights.stats().requests_sent, 0);
        assert_eq!(backend.users.stats().requests_sent, 0);
    }

    #[tokio::test]
    async fn test_detail_fetches_flight_and_user_concurrently() {
        let backend = InMemoryBackend::seeded();
        backend.flights.set_delay(100);
        backend.users.set_delay(100);
        let scope = ViewScope::new();

        let started = std::time::Instant::now();
        let detail = fetch_booking_detail(&backend.services(), &EntityId::from("42"), &scope.token())
            .await
            .unwrap();

        // Back to back the two lookups would take 200ms
        assert_eq!(detail.flight.id, EntityId::from("7"));
        assert!(started.elapsed() < Duration::from_millis(180));
    }

    #[tokio::test]
    async fn test_list_rows_without_references_are_kept() {
        let mut bookings = sample_bookings();
        bookings[0].user_id = None;
        bookings[1].flight_id = None;
        let backend = InMemoryBackend::new(sample_users(), sample_flights(), bookings);
        let scope = ViewScope::new();

        let rows = fetch_booking_rows(&backend.services(), &scope.token())
            .await
            .unwrap();

        assert_eq!(rows.len(), 3);
        assert!(rows[0].user.is_none() && rows[0].flight.is_some());
        assert!(rows[1].flight.is_none() && rows[1].user.is_some());
        assert!(rows[2].flight.is_some() && rows[2].user.is_some());
        // Only the references that exist were requested
        assert_eq!(backend.users.stats().requests_sent, 2);
        assert_eq!(backend.flights.stats().requests_sent, 2);
    }

    #[tokio::test]
    async fn test_list_fails_when_collection_fetch_fails() {
        let backend = InMemoryBackend::seeded();
        backend.bookings.fail_next_requests(1);
        let scope = ViewScope::new();

        let result = fetch_booking_rows(&backend.services(), &scope.token()).await;
        assert!(matches!(result, Err(AggregateError::Api(_))));
    }

    #[tokio::test]
    async fn test_enrichment_runs_concurrently() {
        let backend = InMemoryBackend::seeded();
        backend.flights.set_delay(100);
        backend.users.set_delay(100);
        let scope = ViewScope::new();

        let started = std::time::Instant::now();
        let rows = fetch_booking_rows(&backend.services(), &scope.token())
            .await
            .unwrap();

        // Six sequential lookups would take 600ms
        assert_eq!(rows.len(), 3);
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_teardown_discards_in_flight_enrichment() {
        let backend = InMemoryBackend::seeded();
        backend.flights.set_delay(5_000);
        let scope = ViewScope::new();
        let token = scope.token();
        let services = backend.services();

        let handle = tokio::spawn(async move { fetch_booking_rows(&services, &token).await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        scope.teardown();

        let result = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(ref e) if e.is_cancelled()));
    }
}
