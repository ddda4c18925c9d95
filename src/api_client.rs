// API client layer: one repository per backend service (users, flights, bookings)
// Each call is exactly one HTTP round trip. No retries, no timeout override, no caching.

use crate::envelope;
use crate::models::{
    Booking, BookingPayload, EntityId, Flight, FlightPayload, User, UserPayload,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

// Errors from a single service call
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{resource} {id} not found")]
    NotFound { resource: String, id: String },

    #[error("API error: {status_code} - {message}")]
    Status { status_code: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Empty response payload")]
    EmptyPayload,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}

pub const DEFAULT_USERS_URL: &str = "http://localhost:8001/api";
pub const DEFAULT_FLIGHTS_URL: &str = "http://localhost:8002/api";
pub const DEFAULT_BOOKINGS_URL: &str = "http://localhost:8003/api";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn validated_base(&self) -> Result<Url, ClientError> {
        let url = Url::parse(self.base_url.trim_end_matches('/'))
            .map_err(|e| ClientError::ConfigError(format!("{}: {}", self.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::ConfigError(format!(
                "{}: unsupported scheme {}",
                self.base_url,
                url.scheme()
            )));
        }
        if url.cannot_be_a_base() {
            return Err(ClientError::ConfigError(format!(
                "{}: not a base address",
                self.base_url
            )));
        }
        Ok(url)
    }
}

// Each service has its own base address; there is no shared gateway
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub users: ServiceConfig,
    pub flights: ServiceConfig,
    pub bookings: ServiceConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            users: ServiceConfig::new(DEFAULT_USERS_URL),
            flights: ServiceConfig::new(DEFAULT_FLIGHTS_URL),
            bookings: ServiceConfig::new(DEFAULT_BOOKINGS_URL),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClientStats {
    pub requests_sent: usize,
    pub requests_succeeded: usize,
    pub requests_failed: usize,
    pub average_response_time_ms: f64,
}

impl ClientStats {
    pub(crate) fn record_sent(&mut self) {
        self.requests_sent += 1;
    }

    pub(crate) fn record_outcome(&mut self, succeeded: bool, elapsed_ms: f64) {
        if succeeded {
            self.requests_succeeded += 1;
        } else {
            self.requests_failed += 1;
        }
        let finished = (self.requests_succeeded + self.requests_failed) as f64;
        self.average_response_time_ms += (elapsed_ms - self.average_response_time_ms) / finished;
    }
}

// CRUD contract shared by every backend service
#[async_trait]
pub trait Repository: Send + Sync + 'static {
    type Entity: Send + 'static;
    type Payload: Sync + 'static;

    // Collection name, e.g. "flights"
    fn resource(&self) -> &'static str;

    async fn list(&self) -> Result<Vec<Self::Entity>, ApiError>;

    async fn get_by_id(&self, id: &EntityId) -> Result<Self::Entity, ApiError>;

    async fn create(&self, payload: &Self::Payload) -> Result<Self::Entity, ApiError>;

    async fn update(
        &self,
        id: &EntityId,
        payload: &Self::Payload,
    ) -> Result<Self::Entity, ApiError>;

    async fn delete(&self, id: &EntityId) -> Result<(), ApiError>;

    fn stats(&self) -> ClientStats;
}

pub type UsersApi = dyn Repository<Entity = User, Payload = UserPayload>;
pub type FlightsApi = dyn Repository<Entity = Flight, Payload = FlightPayload>;

// Bookings additionally support a payload-less state transition to cancelled
#[async_trait]
pub trait BookingsApi: Repository<Entity = Booking, Payload = BookingPayload> {
    async fn cancel(&self, id: &EntityId) -> Result<(), ApiError>;
}

// The three service clients every view draws from
#[derive(Clone)]
pub struct Services {
    pub users: Arc<UsersApi>,
    pub flights: Arc<FlightsApi>,
    pub bookings: Arc<dyn BookingsApi>,
}

impl Services {
    pub fn http(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self {
            users: Arc::new(HttpRepository::<User, UserPayload>::new(
                &config.users,
                "users",
            )?),
            flights: Arc::new(HttpRepository::<Flight, FlightPayload>::new(
                &config.flights,
                "flights",
            )?),
            bookings: Arc::new(HttpRepository::<Booking, BookingPayload>::new(
                &config.bookings,
                "bookings",
            )?),
        })
    }

    // One summary line per service, emitted once a command finishes
    pub fn log_stats(&self) {
        let all = [
            (self.users.resource(), self.users.stats()),
            (self.flights.resource(), self.flights.stats()),
            (self.bookings.resource(), self.bookings.stats()),
        ];
        for (resource, stats) in all {
            if stats.requests_sent == 0 {
                continue;
            }
            info!(
                resource,
                sent = stats.requests_sent,
                failed = stats.requests_failed,
                avg_ms = stats.average_response_time_ms,
                "service usage"
            );
        }
    }
}

// reqwest-backed repository for one service collection
pub struct HttpRepository<E, P> {
    client: reqwest::Client,
    base: Url,
    resource: &'static str,
    stats: Mutex<ClientStats>,
    _marker: PhantomData<fn() -> (E, P)>,
}

impl<E, P> HttpRepository<E, P> {
    pub fn new(config: &ServiceConfig, resource: &'static str) -> Result<Self, ClientError> {
        let base = config.validated_base()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::InitError(e.to_string()))?;

        Ok(Self {
            client,
            base,
            resource,
            stats: Mutex::new(ClientStats::default()),
            _marker: PhantomData,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    // Ids go in as single path segments, percent-encoded
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(self.resource).extend(segments);
        }
        url
    }

    fn collection_url(&self) -> Url {
        self.url(&[])
    }

    fn item_url(&self, id: &EntityId) -> Url {
        self.url(&[id.as_str()])
    }

    // Sends one request and returns the raw body of a 2xx response
    async fn send(
        &self,
        request: RequestBuilder,
        id: Option<&EntityId>,
    ) -> Result<Vec<u8>, ApiError> {
        self.stats.lock().record_sent();
        let started = Instant::now();

        let result = self.execute(request, id).await;

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.stats.lock().record_outcome(result.is_ok(), elapsed_ms);
        if let Err(e) = &result {
            warn!(resource = self.resource, error = %e, "service request failed");
        }
        result
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        id: Option<&EntityId>,
    ) -> Result<Vec<u8>, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        debug!(resource = self.resource, status = status.as_u16(), "service responded");

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound {
                resource: self.resource.to_string(),
                id: id.map(|id| id.to_string()).unwrap_or_default(),
            });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status_code: status.as_u16(),
                message,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl<E, P> Repository for HttpRepository<E, P>
where
    E: DeserializeOwned + Send + 'static,
    P: Serialize + Sync + 'static,
{
    type Entity = E;
    type Payload = P;

    fn resource(&self) -> &'static str {
        self.resource
    }

    async fn list(&self) -> Result<Vec<E>, ApiError> {
        debug!(resource = self.resource, "GET collection");
        let body = self
            .send(self.client.get(self.collection_url()), None)
            .await?;
        envelope::decode_bytes(&body)
    }

    async fn get_by_id(&self, id: &EntityId) -> Result<E, ApiError> {
        debug!(resource = self.resource, %id, "GET item");
        let body = self
            .send(self.client.get(self.item_url(id)), Some(id))
            .await?;
        envelope::decode_bytes(&body)
    }

    async fn create(&self, payload: &P) -> Result<E, ApiError> {
        debug!(resource = self.resource, "POST item");
        let body = self
            .send(self.client.post(self.collection_url()).json(payload), None)
            .await?;
        envelope::decode_bytes(&body)
    }

    async fn update(&self, id: &EntityId, payload: &P) -> Result<E, ApiError> {
        debug!(resource = self.resource, %id, "PUT item");
        let body = self
            .send(self.client.put(self.item_url(id)).json(payload), Some(id))
            .await?;
        envelope::decode_bytes(&body)
    }

    async fn delete(&self, id: &EntityId) -> Result<(), ApiError> {
        debug!(resource = self.resource, %id, "DELETE item");
        self.send(self.client.delete(self.item_url(id)), Some(id))
            .await
            .map(|_| ())
    }

    fn stats(&self) -> ClientStats {
        self.stats.lock().clone()
    }
}

#[async_trait]
impl BookingsApi for HttpRepository<Booking, BookingPayload> {
    async fn cancel(&self, id: &EntityId) -> Result<(), ApiError> {
        debug!(resource = self.resource, %id, "PUT cancel");
        let url = self.url(&[id.as_str(), "cancel"]);
        self.send(self.client.put(url), Some(id)).await.map(|_| ())
    }
}
