// Home screen: every flight, searchable, with delete and book actions
use super::{LoadState, LOADING};
use crate::api_client::{Repository, Services};
use crate::dialogs::Dialogs;
use crate::filter::{filter_flights, SearchQuery};
use crate::format;
use crate::models::{EntityId, Flight};
use crate::routes::Route;
use crate::scope::ViewScope;
use std::fmt::Write;
use tracing::{debug, info, warn};

pub const FETCH_FAILED: &str = "Failed to fetch flights";
pub const DELETE_FAILED: &str = "Failed to delete flight. Please try again.";
pub const DELETE_CONFIRM: &str = "Are you sure you want to delete this flight?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Declined,
    Deleted,
    Failed,
    Discarded,
}

pub struct FlightListView {
    services: Services,
    scope: ViewScope,
    state: LoadState<Vec<Flight>>,
    query: SearchQuery,
    notice: Option<String>,
}

impl FlightListView {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            scope: ViewScope::new(),
            state: LoadState::Loading,
            query: SearchQuery::default(),
            notice: None,
        }
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn state(&self) -> &LoadState<Vec<Flight>> {
        &self.state
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub async fn load(&mut self) {
        self.state = LoadState::Loading;
        let token = self.scope.token();

        match token.guard(self.services.flights.list()).await {
            Ok(Ok(flights)) => {
                debug!(count = flights.len(), "flights loaded");
                self.state = LoadState::Ready(flights);
            }
            Ok(Err(e)) => {
                warn!(error = %e, "flight list fetch failed");
                self.state = LoadState::Failed(FETCH_FAILED.to_string());
            }
            Err(_) => debug!("flight list torn down, result discarded"),
        }
    }

    pub fn set_search(&mut self, text: &str) {
        self.query = SearchQuery::new(text);
    }

    pub fn visible(&self) -> Vec<&Flight> {
        self.state
            .ready()
            .map(|flights| filter_flights(flights, &self.query))
            .unwrap_or_default()
    }

    // One confirmation, one DELETE; only that id leaves the local list
    pub async fn delete(&mut self, flight_id: &EntityId, dialogs: &dyn Dialogs) -> DeleteOutcome {
        let token = self.scope.token();
        match token.guard(dialogs.confirm(DELETE_CONFIRM)).await {
            Ok(true) => {}
            Ok(false) => return DeleteOutcome::Declined,
            Err(_) => return DeleteOutcome::Discarded,
        }

        match token.guard(self.services.flights.delete(flight_id)).await {
            Ok(Ok(())) => {
                info!(flight = %flight_id, "flight deleted");
                if let Some(flights) = self.state.ready_mut() {
                    flights.retain(|f| &f.id != flight_id);
                }
                self.notice = None;
                DeleteOutcome::Deleted
            }
            Ok(Err(e)) => {
                warn!(flight = %flight_id, error = %e, "flight delete failed");
                self.notice = Some(DELETE_FAILED.to_string());
                DeleteOutcome::Failed
            }
            Err(_) => DeleteOutcome::Discarded,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Flight Ticket Point of Sales");
        let _ = writeln!(out, "Available Flights");
        if !self.query.is_empty() {
            let _ = writeln!(out, "Search: {}", self.query.as_str());
        }
        if let Some(notice) = &self.notice {
            let _ = writeln!(out, "Error: {}", notice);
        }

        match &self.state {
            LoadState::Loading => {
                let _ = writeln!(out, "{}", LOADING);
            }
            LoadState::Failed(message) => {
                let _ = writeln!(out, "Error: {}", message);
            }
            LoadState::Ready(_) => {
                let flights = self.visible();
                if flights.is_empty() {
                    let _ = writeln!(out, "No flights found.");
                }
                for flight in flights {
                    render_flight(&mut out, flight);
                }
            }
        }
        out
    }
}

fn render_flight(out: &mut String, flight: &Flight) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{} ({})", flight.airline_name, flight.flight_code);
    let _ = writeln!(out, "  Route: {} → {}", flight.from, flight.to);
    let _ = writeln!(out, "  Price: {}", format::rupiah_or_na(flight.price));
    let _ = writeln!(
        out,
        "  Departure Time: {}",
        format::date_time(&flight.departure_time)
    );
    let _ = writeln!(
        out,
        "  Arrival Time: {}",
        format::date_time(&flight.arrival_time)
    );
    let _ = writeln!(out, "  Book Now: {}", Route::BookFlight(flight.id.clone()).path());
}
