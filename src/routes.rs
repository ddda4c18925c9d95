// Client-side routes and the navigation bar
use crate::models::EntityId;
use std::fmt;

pub const NOT_FOUND: &str = "Page not found";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    BookFlight(EntityId),
    Bookings,
    BookingDetail(EntityId),
    Users,
    NotFound(String),
}

impl Route {
    // Paths are matched segment by segment; a trailing slash is ignored
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let segments: Vec<&str> = trimmed
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["book", id] => Route::BookFlight(EntityId::from(*id)),
            ["bookings"] => Route::Bookings,
            ["bookings", id] => Route::BookingDetail(EntityId::from(*id)),
            ["users"] => Route::Users,
            _ => Route::NotFound(trimmed.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::BookFlight(id) => format!("/book/{}", id),
            Route::Bookings => "/bookings".to_string(),
            Route::BookingDetail(id) => format!("/bookings/{}", id),
            Route::Users => "/users".to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

pub const NAV_ENTRIES: [(&str, &str); 3] = [("Home", "/"), ("Bookings", "/bookings"), ("Users", "/users")];

// Only an exact path match is active; /bookings/42 highlights nothing
pub fn active_entry(current: &Route) -> Option<&'static str> {
    let path = current.path();
    NAV_ENTRIES
        .iter()
        .find(|(_, target)| *target == path)
        .map(|(label, _)| *label)
}

pub fn render_nav(current: &Route) -> String {
    let active = active_entry(current);
    let entries: Vec<String> = NAV_ENTRIES
        .iter()
        .map(|(label, _)| {
            if Some(*label) == active {
                format!("[{}]", label)
            } else {
                label.to_string()
            }
        })
        .collect();
    format!("Flight Ticket POS | {}", entries.join(" | "))
}
