//! dump1090 Client Library
//!
//! This crate fetches the live aircraft list from a dump1090 receiver and
//! normalizes it into typed records:
//!
//! - [`aircraft`] - Wire (`RawAircraft`) and normalized (`Aircraft`) record types
//! - [`client`] - HTTP client for the `/dump1090/data.json` endpoint
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```ignore
//! use dump1090_client::Dump1090Client;
//!
//! let client = Dump1090Client::for_target("192.168.1.20:8080")?;
//! for aircraft in client.fetch_records().await? {
//!     println!("{} at {}, {}", aircraft.flight, aircraft.latitude, aircraft.longitude);
//! }
//! ```

pub mod aircraft;
pub mod client;
pub mod error;

pub use aircraft::{Aircraft, RawAircraft};
pub use client::{DATA_PATH, Dump1090Client, REQUEST_TIMEOUT};
pub use error::{ClientError, Result};
