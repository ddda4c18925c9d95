// Main library file for the flight ticket point of sales client

// Service access
pub mod api_client;
pub mod envelope;
pub mod in_memory;
pub mod models;

// Aggregation, filtering and display helpers shared by the views
pub mod aggregate;
pub mod filter;
pub mod format;
pub mod scope;

// Screens and the shell around them
pub mod config;
pub mod dialogs;
pub mod routes;
pub mod views;

// Re-export key types for convenience
pub use aggregate::{AggregateError, BookingDetail, BookingRow};
pub use api_client::{
    ApiError, BookingsApi, ClientConfig, ClientError, ClientStats, HttpRepository, Repository,
    ServiceConfig, Services,
};
pub use filter::SearchQuery;
pub use in_memory::{InMemoryBackend, InMemoryRepository};
pub use models::{
    Booking, BookingPayload, BookingStatus, EntityId, Flight, FlightPayload, User, UserPayload,
};
pub use routes::Route;
pub use scope::{Cancelled, ScopeToken, ViewScope};
