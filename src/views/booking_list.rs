// Bookings screen: every booking enriched with its flight and passenger
use super::{LoadState, LOADING};
use crate::aggregate::{fetch_booking_rows, BookingRow};
use crate::api_client::{Repository, Services};
use crate::filter::{filter_bookings, SearchQuery};
use crate::format;
use crate::routes::Route;
use crate::scope::ViewScope;
use std::fmt::Write;
use tracing::{debug, warn};

pub const FETCH_FAILED: &str = "Failed to fetch bookings";

pub struct BookingListView {
    services: Services,
    scope: ViewScope,
    state: LoadState<Vec<BookingRow>>,
    query: SearchQuery,
}

impl BookingListView {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            scope: ViewScope::new(),
            state: LoadState::Loading,
            query: SearchQuery::default(),
        }
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn state(&self) -> &LoadState<Vec<BookingRow>> {
        &self.state
    }

    pub async fn load(&mut self) {
        self.state = LoadState::Loading;
        let token = self.scope.token();

        match fetch_booking_rows(&self.services, &token).await {
            Ok(rows) => {
                debug!(count = rows.len(), "bookings loaded");
                self.state = LoadState::Ready(rows);
            }
            Err(e) if e.is_cancelled() => debug!("booking list torn down, result discarded"),
            Err(e) => {
                warn!(error = %e, "booking list fetch failed");
                self.state = LoadState::Failed(FETCH_FAILED.to_string());
            }
        }
    }

    pub fn set_search(&mut self, text: &str) {
        self.query = SearchQuery::new(text);
    }

    pub fn visible(&self) -> Vec<&BookingRow> {
        self.state
            .ready()
            .map(|rows| filter_bookings(rows, &self.query))
            .unwrap_or_default()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Bookings");
        if !self.query.is_empty() {
            let _ = writeln!(out, "Search: {}", self.query.as_str());
        }

        match &self.state {
            LoadState::Loading => {
                let _ = writeln!(out, "{}", LOADING);
            }
            LoadState::Failed(message) => {
                let _ = writeln!(out, "{}", message);
            }
            LoadState::Ready(_) => {
                let rows = self.visible();
                if rows.is_empty() {
                    let _ = writeln!(out, "No bookings found.");
                }
                for row in rows {
                    render_row(&mut out, row);
                }
            }
        }
        out
    }
}

fn render_row(out: &mut String, row: &BookingRow) {
    let booking = &row.booking;
    let user = row.user.as_ref();
    let flight = row.flight.as_ref();

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{}  [{}]",
        format::or_unknown(user.map(|u| u.name.as_str())),
        format::status_badge(booking.status)
    );
    let _ = writeln!(out, "  {}", format::or_na(user.map(|u| u.email.as_str())));
    let _ = writeln!(
        out,
        "  {}: {} → {} ({})",
        format::or_na(flight.map(|f| f.flight_code.as_str())),
        format::or_na(flight.map(|f| f.from.as_str())),
        format::or_na(flight.map(|f| f.to.as_str())),
        format::or_na(flight.map(|f| f.airline_name.as_str())),
    );
    let _ = writeln!(out, "  Tickets: {}", booking.ticket_quantity);
    let _ = writeln!(out, "  Ordered: {}", format::date_time(&booking.order_time));
    let _ = writeln!(
        out,
        "  Details: {}",
        Route::BookingDetail(booking.id.clone()).path()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::{ClientConfig, ServiceConfig};
    use crate::in_memory::InMemoryBackend;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_rows_render_with_related_records() {
        let backend = InMemoryBackend::seeded();
        let mut view = BookingListView::new(backend.services());
        view.load().await;

        let text = view.render();
        assert!(text.contains("Dewi Lestari  [Pending]"));
        assert!(text.contains("ID-6580: Yogyakarta → Makassar (Batik Air)"));
        assert!(text.contains("Andi Pratama  [Confirmed]"));
        assert!(text.contains("Details: /bookings/42"));
    }

    #[tokio::test]
    async fn test_failed_lookups_render_placeholders() {
        let backend = InMemoryBackend::seeded();
        backend.users.fail_id("3");
        backend.flights.fail_id("7");
        let mut view = BookingListView::new(backend.services());
        view.load().await;

        assert_eq!(view.visible().len(), 3);
        let text = view.render();
        assert!(text.contains("Unknown  [Pending]"));
        assert!(text.contains("N/A: N/A → N/A (N/A)"));
        assert!(text.contains("Tickets: 2"));
    }

    #[tokio::test]
    async fn test_search_filters_enriched_rows_without_fetching() {
        let backend = InMemoryBackend::seeded();
        let mut view = BookingListView::new(backend.services());
        view.load().await;
        let sent = backend.bookings.stats().requests_sent
            + backend.flights.stats().requests_sent
            + backend.users.stats().requests_sent;

        view.set_search("SIti");
        let visible = view.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].booking.id.as_str(), "41");
        assert!(view.render().contains("Search: SIti"));

        view.set_search("zzz");
        assert!(view.render().contains("No bookings found."));

        let after = backend.bookings.stats().requests_sent
            + backend.flights.stats().requests_sent
            + backend.users.stats().requests_sent;
        assert_eq!(sent, after);
    }

    #[tokio::test]
    async fn test_collection_failure() {
        let backend = InMemoryBackend::seeded();
        backend.bookings.fail_next_requests(1);
        let mut view = BookingListView::new(backend.services());
        view.load().await;

        assert_eq!(view.state().error(), Some(FETCH_FAILED));
        assert!(view.render().contains(FETCH_FAILED));
    }

    #[tokio::test]
    async fn test_empty_collection() {
        let backend = InMemoryBackend::empty();
        let mut view = BookingListView::new(backend.services());
        view.load().await;
        assert!(view.render().contains("No bookings found."));
    }

    #[tokio::test]
    async fn test_booking_with_null_user_still_lists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/bookings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [
                { "id": 41, "user_id": 3, "flight_id": 7, "ticket_quantity": 1,
                  "status": "pending", "orderTime": "2025-05-22T18:05:00Z" },
                { "id": 42, "user_id": null, "flight_id": 7, "ticket_quantity": 4,
                  "status": "confirmed", "orderTime": "2025-05-23T09:00:00Z" }
            ]})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/flights/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {
                "id": 7, "flight_code": "ID-6580", "airline_name": "Batik Air",
                "from": "Yogyakarta", "to": "Makassar", "price": 500000
            }})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/users/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {
                "id": 3, "name": "Dewi Lestari", "email": "dewi@example.com"
            }})))
            .expect(1)
            .mount(&server)
            .await;

        let base = format!("{}/api", server.uri());
        let services = Services::http(&ClientConfig {
            users: ServiceConfig::new(&base),
            flights: ServiceConfig::new(&base),
            bookings: ServiceConfig::new(&base),
        })
        .unwrap();
        let mut view = BookingListView::new(services);
        view.load().await;

        assert_eq!(view.visible().len(), 2);
        let text = view.render();
        assert!(text.contains("Dewi Lestari  [Pending]"));
        assert!(text.contains("Unknown  [Confirmed]"));
        assert!(text.contains("Tickets: 4"));
    }
}
