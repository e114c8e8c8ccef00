//! Mapping from dump1090 aircraft records to Prometheus gauges.

use dump1090_client::Aircraft;
use prometheus_client::encoding::EncodeLabelSet;

/// Prefix shared by every exported metric family.
pub const METRIC_PREFIX: &str = "dump1090";

/// Flight label used when an aircraft reports no callsign.
pub const UNKNOWN_FLIGHT: &str = "UNKNOWN";

/// Label set identifying one aircraft within a gauge family.
///
/// Field order is the label order in the exposition. Values are stored
/// already escaped, since the text encoder writes them verbatim.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct AircraftLabels {
    pub flight: String,
    pub hex: String,
    pub squawk: String,
}

impl From<&Aircraft> for AircraftLabels {
    fn from(aircraft: &Aircraft) -> Self {
        Self {
            flight: escape_label_value(flight_label(&aircraft.flight)),
            hex: escape_label_value(&aircraft.hex),
            squawk: escape_label_value(&aircraft.squawk),
        }
    }
}

/// Callsign label value, never empty.
pub fn flight_label(flight: &str) -> &str {
    if flight.is_empty() {
        UNKNOWN_FLIGHT
    } else {
        flight
    }
}

/// Escape special characters in label values.
pub fn escape_label_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}

/// The gauge families exported for every reportable aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AircraftGauge {
    Latitude,
    Longitude,
    Altitude,
    VerticalRate,
    Track,
    Speed,
    Messages,
    Seen,
}

impl AircraftGauge {
    /// All families, in registration order.
    pub const ALL: [AircraftGauge; 8] = [
        AircraftGauge::Latitude,
        AircraftGauge::Longitude,
        AircraftGauge::Altitude,
        AircraftGauge::VerticalRate,
        AircraftGauge::Track,
        AircraftGauge::Speed,
        AircraftGauge::Messages,
        AircraftGauge::Seen,
    ];

    /// Family name without [`METRIC_PREFIX`].
    pub fn name(&self) -> &'static str {
        match self {
            AircraftGauge::Latitude => "latitude",
            AircraftGauge::Longitude => "longitude",
            AircraftGauge::Altitude => "altitude",
            AircraftGauge::VerticalRate => "vertical_rate",
            AircraftGauge::Track => "track",
            AircraftGauge::Speed => "speed",
            AircraftGauge::Messages => "messages",
            AircraftGauge::Seen => "seen",
        }
    }

    /// Full family name as it appears in the exposition.
    pub fn full_name(&self) -> String {
        format!("{}_{}", METRIC_PREFIX, self.name())
    }

    pub fn help(&self) -> &'static str {
        match self {
            AircraftGauge::Latitude => "Latitude of the aircraft",
            AircraftGauge::Longitude => "Longitude of the aircraft",
            AircraftGauge::Altitude => "Altitude of the aircraft in feet",
            AircraftGauge::VerticalRate => "Vertical rate of the aircraft in feet per minute",
            AircraftGauge::Track => "Track of the aircraft in degrees",
            AircraftGauge::Speed => "Ground speed of the aircraft in knots",
            AircraftGauge::Messages => "Messages received from the aircraft",
            AircraftGauge::Seen => "Seconds since the aircraft was last seen",
        }
    }

    /// Extract this gauge's value from an aircraft record.
    pub fn value(&self, aircraft: &Aircraft) -> f64 {
        match self {
            AircraftGauge::Latitude => aircraft.latitude,
            AircraftGauge::Longitude => aircraft.longitude,
            AircraftGauge::Altitude => aircraft.altitude as f64,
            AircraftGauge::VerticalRate => aircraft.vertical_rate as f64,
            AircraftGauge::Track => aircraft.track as f64,
            AircraftGauge::Speed => aircraft.speed as f64,
            AircraftGauge::Messages => aircraft.messages as f64,
            AircraftGauge::Seen => aircraft.seen as f64,
        }
    }
}
