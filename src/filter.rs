// Client-side free-text filtering over already fetched collections.
// Matching is a case-insensitive substring test; an empty query keeps everything.
// None of this touches the network.

use crate::aggregate::BookingRow;
use crate::models::{Flight, User};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    // As typed, for echoing back
    text: String,
    needle: String,
}

impl SearchQuery {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            needle: text.to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn matches(&self, haystack: &str) -> bool {
        self.is_empty() || haystack.to_lowercase().contains(&self.needle)
    }

    pub fn matches_any<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        self.is_empty() || fields.into_iter().any(|field| self.matches(field))
    }
}

// Airline, origin, destination, and the raw departure-time text. The departure
// match is plain substring on whatever text the service sent, not a date comparison.
pub fn flight_matches(flight: &Flight, query: &SearchQuery) -> bool {
    query.matches_any([
        flight.airline_name.as_str(),
        flight.from.as_str(),
        flight.to.as_str(),
        flight.departure_time.as_str(),
    ])
}

// User name, flight code, origin, destination. Missing related records contribute
// nothing to match against.
pub fn booking_matches(row: &BookingRow, query: &SearchQuery) -> bool {
    let user_name = row.user.as_ref().map(|u| u.name.as_str());
    let flight_fields = row
        .flight
        .as_ref()
        .map(|f| [f.flight_code.as_str(), f.from.as_str(), f.to.as_str()]);

    query.matches_any(user_name.into_iter().chain(flight_fields.into_iter().flatten()))
}

pub fn user_matches(user: &User, query: &SearchQuery) -> bool {
    query.matches_any([user.name.as_str(), user.email.as_str()])
}

pub fn filter_flights<'a>(flights: &'a [Flight], query: &SearchQuery) -> Vec<&'a Flight> {
    flights.iter().filter(|f| flight_matches(f, query)).collect()
}

pub fn filter_bookings<'a>(rows: &'a [BookingRow], query: &SearchQuery) -> Vec<&'a BookingRow> {
    rows.iter().filter(|r| booking_matches(r, query)).collect()
}

pub fn filter_users<'a>(users: &'a [User], query: &SearchQuery) -> Vec<&'a User> {
    users.iter().filter(|u| user_matches(u, query)).collect()
}
