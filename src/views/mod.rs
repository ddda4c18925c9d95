// Screen view models. Each view owns the data it fetched, a search query where
// the screen has one, and the scope that cancels its in-flight requests when it
// is torn down. `render` produces the text the shell prints.

pub mod booking_detail;
pub mod booking_form;
pub mod booking_list;
pub mod flight_list;
pub mod user_list;

pub use booking_detail::{BookingDetailView, CancelOutcome};
pub use booking_form::{BookingFormView, SubmitOutcome};
pub use booking_list::BookingListView;
pub use flight_list::{DeleteOutcome, FlightListView};
pub use user_list::UserListView;

pub const LOADING: &str = "Loading...";

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Failed(String),
    Ready(T),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Loading
    }
}
