// Booking creation for one flight. Name and email are free text and are not
// validated; empty strings are submitted as they are.
use super::{LoadState, LOADING};
use crate::api_client::{Repository, Services};
use crate::dialogs::Dialogs;
use crate::format;
use crate::models::{BookingPayload, EntityId, Flight};
use crate::routes::Route;
use crate::scope::ViewScope;
use std::fmt::Write;
use tracing::{debug, info, warn};

pub const FLIGHT_NOT_FOUND: &str = "Flight not found";
pub const BOOKING_SUCCESS: &str = "Booking successful!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Navigate(Route),
    Stay,
}

pub struct BookingFormView {
    services: Services,
    scope: ViewScope,
    flight_id: EntityId,
    state: LoadState<Flight>,
    passenger_name: String,
    passenger_email: String,
    ticket_quantity: u32,
}

impl BookingFormView {
    pub fn new(services: Services, flight_id: EntityId) -> Self {
        Self {
            services,
            scope: ViewScope::new(),
            flight_id,
            state: LoadState::Loading,
            passenger_name: String::new(),
            passenger_email: String::new(),
            ticket_quantity: 1,
        }
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn state(&self) -> &LoadState<Flight> {
        &self.state
    }

    pub async fn load(&mut self) {
        self.state = LoadState::Loading;
        let token = self.scope.token();

        match token.guard(self.services.flights.get_by_id(&self.flight_id)).await {
            Ok(Ok(flight)) => self.state = LoadState::Ready(flight),
            Ok(Err(e)) => {
                warn!(flight = %self.flight_id, error = %e, "flight lookup for booking failed");
                self.state = LoadState::Failed(FLIGHT_NOT_FOUND.to_string());
            }
            Err(_) => debug!(flight = %self.flight_id, "booking form torn down, result discarded"),
        }
    }

    pub fn set_passenger_name(&mut self, name: &str) {
        self.passenger_name = name.to_string();
    }

    pub fn set_passenger_email(&mut self, email: &str) {
        self.passenger_email = email.to_string();
    }

    pub fn set_ticket_quantity(&mut self, quantity: u32) {
        self.ticket_quantity = quantity;
    }

    pub fn payload(&self) -> BookingPayload {
        BookingPayload {
            flight_id: self.flight_id.clone(),
            user_id: None,
            name: self.passenger_name.clone(),
            email: self.passenger_email.clone(),
            ticket_quantity: self.ticket_quantity,
        }
    }

    // Success moves to the bookings list, failure raises an alert and stays
    pub async fn submit(&mut self, dialogs: &dyn Dialogs) -> SubmitOutcome {
        if self.state.ready().is_none() {
            return SubmitOutcome::Stay;
        }

        let payload = self.payload();
        let token = self.scope.token();
        match token.guard(self.services.bookings.create(&payload)).await {
            Ok(Ok(booking)) => {
                info!(booking = %booking.id, flight = %self.flight_id, "booking created");
                dialogs.alert(BOOKING_SUCCESS);
                SubmitOutcome::Navigate(Route::Bookings)
            }
            Ok(Err(e)) => {
                warn!(flight = %self.flight_id, error = %e, "booking submission failed");
                dialogs.alert(&e.to_string());
                SubmitOutcome::Stay
            }
            Err(_) => SubmitOutcome::Stay,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        match &self.state {
            LoadState::Loading => {
                let _ = writeln!(out, "{}", LOADING);
            }
            LoadState::Failed(message) => {
                let _ = writeln!(out, "{}", message);
            }
            LoadState::Ready(flight) => {
                let _ = writeln!(out, "Back: {}", Route::Home.path());
                let _ = writeln!(out);
                let _ = writeln!(out, "{} ({})", flight.airline_name, flight.flight_code);
                let _ = writeln!(out, "  {} → {}", flight.from, flight.to);
                let _ = writeln!(out, "  {}", format::rupiah_or_na(flight.price));
                let _ = writeln!(out);
                let _ = writeln!(out, "Passenger Name: {}", self.passenger_name);
                let _ = writeln!(out, "Passenger Email: {}", self.passenger_email);
                let _ = writeln!(out, "Tickets: {}", self.ticket_quantity);
            }
        }
        out
    }
}
