// Command-line and environment configuration for the terminal client
use crate::api_client::{
    ClientConfig, ClientError, ServiceConfig, Services, DEFAULT_BOOKINGS_URL,
    DEFAULT_FLIGHTS_URL, DEFAULT_USERS_URL,
};
use crate::in_memory::InMemoryBackend;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Http,
    Memory,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "flight-pos", about = "Flight ticket point of sales client")]
pub struct Config {
    #[arg(long, env = "USERS_API_URL", default_value = DEFAULT_USERS_URL)]
    pub users_url: String,

    #[arg(long, env = "FLIGHTS_API_URL", default_value = DEFAULT_FLIGHTS_URL)]
    pub flights_url: String,

    #[arg(long, env = "BOOKINGS_API_URL", default_value = DEFAULT_BOOKINGS_URL)]
    pub bookings_url: String,

    // `memory` serves the seeded sample data without any backend running
    #[arg(long, env = "POS_BACKEND", value_enum, default_value_t = Backend::Http)]
    pub backend: Backend,

    /// Answer yes to every confirmation
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Render the view behind a client path such as `/bookings/42`
    Open {
        #[arg(default_value = "/")]
        path: String,

        #[arg(long)]
        search: Option<String>,
    },
    /// Cancel a booking from its detail view
    Cancel { booking_id: String },
    /// Delete a flight from the flight list
    DeleteFlight { flight_id: String },
    /// Book tickets on a flight
    Book {
        flight_id: String,

        #[arg(long, default_value = "")]
        name: String,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, default_value_t = 1)]
        tickets: u32,
    },
}

impl Config {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            users: ServiceConfig::new(&self.users_url),
            flights: ServiceConfig::new(&self.flights_url),
            bookings: ServiceConfig::new(&self.bookings_url),
        }
    }

    pub fn services(&self) -> Result<Services, ClientError> {
        match self.backend {
            Backend::Http => Services::http(&self.client_config()),
            Backend::Memory => Ok(InMemoryBackend::seeded().services()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["flight-pos", "open"]).unwrap();
        assert_eq!(config.backend, Backend::Http);
        assert!(!config.yes);
        assert_eq!(
            config.command,
            Command::Open {
                path: "/".to_string(),
                search: None
            }
        );
        let client = config.client_config();
        assert_eq!(client.users.base_url, DEFAULT_USERS_URL);
        assert_eq!(client.flights.base_url, DEFAULT_FLIGHTS_URL);
        assert_eq!(client.bookings.base_url, DEFAULT_BOOKINGS_URL);
    }

    #[test]
    fn test_subcommands() {
        let config = Config::try_parse_from([
            "flight-pos",
            "--backend",
            "memory",
            "book",
            "7",
            "--name",
            "Rina",
            "--email",
            "rina@example.com",
            "--tickets",
            "2",
            "--yes",
        ])
        .unwrap();

        assert_eq!(config.backend, Backend::Memory);
        assert!(config.yes);
        assert_eq!(
            config.command,
            Command::Book {
                flight_id: "7".to_string(),
                name: "Rina".to_string(),
                email: "rina@example.com".to_string(),
                tickets: 2
            }
        );

        let config = Config::try_parse_from(["flight-pos", "open", "/bookings", "--search", "siti"])
            .unwrap();
        assert_eq!(
            config.command,
            Command::Open {
                path: "/bookings".to_string(),
                search: Some("siti".to_string())
            }
        );
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(Config::try_parse_from(["flight-pos", "--backend", "grpc", "open"]).is_err());
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let config = Config::try_parse_from(["flight-pos", "--users-url", "not a url", "open"])
            .unwrap();
        assert!(matches!(
            config.services(),
            Err(ClientError::ConfigError(_))
        ));
    }

    #[test]
    fn test_memory_backend_ignores_urls() {
        let config = Config::try_parse_from([
            "flight-pos",
            "--backend",
            "memory",
            "--users-url",
            "not a url",
            "cancel",
            "42",
        ])
        .unwrap();
        assert!(config.services().is_ok());
    }
}
