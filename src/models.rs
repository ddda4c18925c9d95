// Entities exchanged with the users, flights and bookings services
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// Identifier shared by every service. Backends send ids as JSON numbers or
// strings depending on the endpoint, so both decode to the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => EntityId(n.to_string()),
            RawId::Text(s) => EntityId(s),
        })
    }
}

// Numeric ids go back out as numbers so the services see what they sent.
impl Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0.parse::<i64>() {
            Ok(n) => serializer.serialize_i64(n),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Flight {
    pub id: EntityId,
    #[serde(default)]
    pub flight_code: String,
    #[serde(default)]
    pub airline_name: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    // Kept as the raw wire text; the flight search matches against it
    #[serde(default)]
    pub departure_time: String,
    #[serde(default)]
    pub arrival_time: String,
    #[serde(default)]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct User {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Unknown => "unknown",
        }
    }

    // Badge text: the status with its first letter capitalised
    pub fn label(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Unknown => "Unknown",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, BookingStatus::Cancelled)
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Booking {
    pub id: EntityId,
    // References may come back null or be left out entirely
    #[serde(default)]
    pub user_id: Option<EntityId>,
    #[serde(default)]
    pub flight_id: Option<EntityId>,
    #[serde(default)]
    pub ticket_quantity: u32,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(
        default,
        rename = "orderTime",
        alias = "order_time",
        alias = "created_at"
    )]
    pub order_time: String,
}

// Create/update bodies. Ids are assigned by the services.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FlightPayload {
    pub flight_code: String,
    pub airline_name: String,
    pub from: String,
    pub to: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserPayload {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BookingPayload {
    pub flight_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<EntityId>,
    pub name: String,
    pub email: String,
    pub ticket_quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!(7), "7"; "numeric id")]
    #[test_case(json!("7"), "7"; "string id")]
    #[test_case(json!("abc-1"), "abc-1"; "opaque id")]
    fn test_entity_id_accepts_numbers_and_strings(raw: serde_json::Value, expected: &str) {
        let id: EntityId = serde_json::from_value(raw).unwrap();
        assert_eq!(id.as_str(), expected);
    }

    #[test]
    fn test_entity_id_serializes_numeric_ids_as_numbers() {
        assert_eq!(serde_json::to_value(EntityId::from(42u64)).unwrap(), json!(42));
        assert_eq!(
            serde_json::to_value(EntityId::from("abc")).unwrap(),
            json!("abc")
        );
    }

    #[test]
    fn test_booking_decodes_order_time_and_status() {
        let booking: Booking = serde_json::from_value(json!({
            "id": 42,
            "user_id": 3,
            "flight_id": 7,
            "ticket_quantity": 2,
            "status": "pending",
            "orderTime": "2025-06-01T10:30:00Z"
        }))
        .unwrap();

        assert_eq!(booking.id, EntityId::from("42"));
        assert_eq!(booking.flight_id, Some(EntityId::from("7")));
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.order_time, "2025-06-01T10:30:00Z");
    }

    #[test]
    fn test_booking_with_null_or_missing_references() {
        let bookings: Vec<Booking> = serde_json::from_value(json!([
            { "id": 1, "user_id": null, "flight_id": 7, "ticket_quantity": 1 },
            { "id": 2, "ticket_quantity": 1 }
        ]))
        .unwrap();

        assert_eq!(bookings[0].user_id, None);
        assert_eq!(bookings[0].flight_id, Some(EntityId::from("7")));
        assert_eq!(bookings[1].user_id, None);
        assert_eq!(bookings[1].flight_id, None);
    }

    #[test]
    fn test_unknown_status_does_not_fail_decoding() {
        let booking: Booking = serde_json::from_value(json!({
            "id": 1,
            "user_id": 1,
            "flight_id": 1,
            "ticket_quantity": 1,
            "status": "refunded",
            "created_at": "2025-06-01T10:30:00Z"
        }))
        .unwrap();

        assert_eq!(booking.status, BookingStatus::Unknown);
        assert_eq!(booking.status.label(), "Unknown");
        assert_eq!(booking.order_time, "2025-06-01T10:30:00Z");
    }

    #[test]
    fn test_flight_without_price() {
        let flight: Flight = serde_json::from_value(json!({
            "id": 7,
            "flight_code": "GA-404",
            "airline_name": "Garuda Indonesia",
            "from": "CGK",
            "to": "DPS",
            "departure_time": "2025-06-01T08:00:00",
            "arrival_time": "2025-06-01T10:50:00"
        }))
        .unwrap();

        assert_eq!(flight.price, None);
    }
}
