use serde::{Deserialize, Serialize};

/// One aircraft as reported by dump1090's `data.json`.
///
/// dump1090 encodes the validity flags as integers and pads the callsign
/// with spaces. Field names are accepted both capitalized and in the
/// lowercase form the receiver actually emits. Absent fields decode as zero
/// or empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAircraft {
    /// ICAO 24-bit address, hex encoded.
    #[serde(rename = "Hex", alias = "hex")]
    pub hex: String,

    /// Transponder code.
    #[serde(rename = "Squawk", alias = "squawk")]
    pub squawk: String,

    /// Callsign, usually space padded to 8 characters.
    #[serde(rename = "Flight", alias = "flight")]
    pub flight: String,

    #[serde(rename = "lat")]
    pub latitude: f64,

    #[serde(rename = "lon")]
    pub longitude: f64,

    #[serde(rename = "validposition")]
    pub valid_position: i64,

    /// Altitude in feet.
    #[serde(rename = "Altitude", alias = "altitude")]
    pub altitude: i64,

    /// Vertical rate in feet per minute.
    #[serde(rename = "vert_rate")]
    pub vertical_rate: i64,

    /// Heading in degrees.
    #[serde(rename = "Track", alias = "track")]
    pub track: i64,

    #[serde(rename = "validtrack")]
    pub valid_track: i64,

    /// Ground speed in knots.
    #[serde(rename = "Speed", alias = "speed")]
    pub speed: i64,

    /// Mode S messages received from this aircraft.
    #[serde(rename = "Messages", alias = "messages")]
    pub messages: i64,

    /// Seconds since the last message.
    #[serde(rename = "Seen", alias = "seen")]
    pub seen: i64,
}

/// A normalized aircraft record.
///
/// `latitude`/`longitude` are meaningless unless `valid_position` is set,
/// and `track` is meaningless unless `valid_track` is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aircraft {
    pub hex: String,
    pub squawk: String,
    /// Callsign with surrounding spaces removed. May be empty.
    pub flight: String,
    pub latitude: f64,
    pub longitude: f64,
    pub valid_position: bool,
    pub altitude: i64,
    pub vertical_rate: i64,
    pub track: i64,
    pub valid_track: bool,
    pub speed: i64,
    pub messages: i64,
    pub seen: i64,
}

impl Aircraft {
    /// Whether latitude and longitude carry a real fix.
    pub fn has_position(&self) -> bool {
        self.valid_position
    }

    /// Whether the track heading is valid.
    pub fn has_track(&self) -> bool {
        self.valid_track
    }

    /// Whether both position and track are valid.
    pub fn is_reportable(&self) -> bool {
        self.has_position() && self.has_track()
    }
}

impl From<RawAircraft> for Aircraft {
    fn from(raw: RawAircraft) -> Self {
        Self {
            flight: trim_callsign(&raw.flight).to_string(),
            hex: raw.hex,
            squawk: raw.squawk,
            latitude: raw.latitude,
            longitude: raw.longitude,
            valid_position: flag_is_set(raw.valid_position),
            altitude: raw.altitude,
            vertical_rate: raw.vertical_rate,
            track: raw.track,
            valid_track: flag_is_set(raw.valid_track),
            speed: raw.speed,
            messages: raw.messages,
            seen: raw.seen,
        }
    }
}

/// Integer flag to boolean: any non-zero value is set.
pub fn flag_is_set(flag: i64) -> bool {
    flag != 0
}

/// Strip leading and trailing spaces from a callsign.
///
/// Only the space character is removed; inner spaces are kept.
pub fn trim_callsign(flight: &str) -> &str {
    flight.trim_matches(' ')
}

/// Normalize a decoded payload, keeping the upstream order.
pub fn normalize(raw: Vec<RawAircraft>) -> Vec<Aircraft> {
    raw.into_iter().map(Aircraft::from).collect()
}
