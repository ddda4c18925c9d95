// Booking detail screen: one booking joined with its flight and passenger
use super::{LoadState, LOADING};
use crate::aggregate::{fetch_booking_detail, BookingDetail};
use crate::api_client::{BookingsApi, Repository, Services};
use crate::dialogs::Dialogs;
use crate::format;
use crate::models::EntityId;
use crate::scope::ViewScope;
use std::fmt::Write;
use tracing::{debug, info, warn};

pub const FETCH_FAILED: &str = "Failed to fetch booking details";
pub const CANCEL_FAILED: &str = "Failed to cancel booking";
pub const CANCEL_CONFIRM: &str = "Are you sure you want to cancel this booking?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    // Nothing loaded, or the booking is already cancelled
    NotAvailable,
    Declined,
    Cancelled,
    Failed,
    Discarded,
}

pub struct BookingDetailView {
    services: Services,
    scope: ViewScope,
    booking_id: EntityId,
    state: LoadState<BookingDetail>,
    notice: Option<String>,
}

impl BookingDetailView {
    pub fn new(services: Services, booking_id: EntityId) -> Self {
        Self {
            services,
            scope: ViewScope::new(),
            booking_id,
            state: LoadState::Loading,
            notice: None,
        }
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn state(&self) -> &LoadState<BookingDetail> {
        &self.state
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub async fn load(&mut self) {
        self.state = LoadState::Loading;
        let token = self.scope.token();

        match fetch_booking_detail(&self.services, &self.booking_id, &token).await {
            Ok(detail) => self.state = LoadState::Ready(detail),
            Err(e) if e.is_cancelled() => debug!(booking = %self.booking_id, "detail torn down, result discarded"),
            Err(e) => {
                warn!(booking = %self.booking_id, error = %e, "booking detail fetch failed");
                self.state = LoadState::Failed(FETCH_FAILED.to_string());
            }
        }
    }

    pub fn can_cancel(&self) -> bool {
        self.state
            .ready()
            .map_or(false, |detail| !detail.booking.status.is_cancelled())
    }

    // Status transition first, then a fresh read; local state is never patched
    // ahead of the server.
    pub async fn cancel(&mut self, dialogs: &dyn Dialogs) -> CancelOutcome {
        if !self.can_cancel() {
            return CancelOutcome::NotAvailable;
        }

        let token = self.scope.token();
        match token.guard(dialogs.confirm(CANCEL_CONFIRM)).await {
            Ok(true) => {}
            Ok(false) => return CancelOutcome::Declined,
            Err(_) => return CancelOutcome::Discarded,
        }

        let bookings = self.services.bookings.clone();
        match token.guard(bookings.cancel(&self.booking_id)).await {
            Ok(Ok(())) => info!(booking = %self.booking_id, "booking cancelled"),
            Ok(Err(e)) => {
                warn!(booking = %self.booking_id, error = %e, "booking cancel failed");
                self.notice = Some(CANCEL_FAILED.to_string());
                return CancelOutcome::Failed;
            }
            Err(_) => return CancelOutcome::Discarded,
        }

        // The cancel went through either way; a failed re-read only loses the view
        self.notice = None;
        match token.guard(bookings.get_by_id(&self.booking_id)).await {
            Ok(Ok(booking)) => {
                debug!(booking = %booking.id, status = booking.status.as_str(), "booking refreshed");
                if let Some(detail) = self.state.ready_mut() {
                    detail.booking = booking;
                }
            }
            Ok(Err(e)) => {
                warn!(booking = %self.booking_id, error = %e, "booking refresh after cancel failed");
                self.state = LoadState::Failed(FETCH_FAILED.to_string());
            }
            Err(_) => return CancelOutcome::Discarded,
        }
        CancelOutcome::Cancelled
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        match &self.state {
            LoadState::Loading => {
                let _ = writeln!(out, "{}", LOADING);
            }
            LoadState::Failed(_) => {
                let _ = writeln!(out, "Booking Not Found");
                let _ = writeln!(out, "The booking you're looking for doesn't exist.");
            }
            LoadState::Ready(detail) => self.render_detail(&mut out, detail),
        }
        out
    }

    fn render_detail(&self, out: &mut String, detail: &BookingDetail) {
        let BookingDetail {
            booking,
            flight,
            user,
        } = detail;

        let _ = writeln!(out, "Booking Details");
        if let Some(notice) = &self.notice {
            let _ = writeln!(out, "Error: {}", notice);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Passenger Information");
        let _ = writeln!(out, "  Name: {}", format::or_unknown(Some(user.name.as_str())));
        let _ = writeln!(out, "  Email: {}", format::or_na(Some(user.email.as_str())));

        let _ = writeln!(out);
        let _ = writeln!(out, "Flight Information");
        let _ = writeln!(out, "  Flight Code: {}", flight.flight_code);
        let _ = writeln!(out, "  Airline: {}", flight.airline_name);
        let _ = writeln!(out, "  Route: {} → {}", flight.from, flight.to);
        let _ = writeln!(
            out,
            "  Departure Time: {}",
            format::date_time(&flight.departure_time)
        );
        let _ = writeln!(out, "  Price: {}", format::rupiah_or_na(flight.price));
        let _ = writeln!(out, "  Tickets: {}", booking.ticket_quantity);
        let _ = writeln!(
            out,
            "  Total Price: {}",
            format::rupiah_or_na(detail.total_price())
        );

        let _ = writeln!(out);
        let _ = writeln!(out, "Booking Information");
        let _ = writeln!(out, "  Order Time: {}", format::date_time(&booking.order_time));
        let _ = writeln!(out, "  Status: [{}]", format::status_badge(booking.status));

        let _ = writeln!(out);
        if self.can_cancel() {
            let _ = writeln!(out, "Actions: Print Ticket | Cancel Booking");
        } else {
            let _ = writeln!(out, "Actions: Print Ticket");
        }
    }
}
