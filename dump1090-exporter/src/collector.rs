//! Request-scoped metric collection.
//!
//! Every scrape builds its own [`AircraftMetrics`]: a fresh registry with one
//! gauge family per [`AircraftGauge`]. Nothing is shared between scrapes, so
//! concurrent scrapes of different receivers cannot see each other's series
//! and aircraft that left coverage never linger.

use std::sync::atomic::AtomicU64;

use dump1090_client::Aircraft;
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use tracing::trace;

use crate::mapping::{AircraftGauge, AircraftLabels, METRIC_PREFIX};

/// Content type of the rendered exposition.
pub const OPENMETRICS_CONTENT_TYPE: &str =
    "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// A gauge family keyed by aircraft labels.
pub type AircraftGaugeFamily = Family<AircraftLabels, Gauge<f64, AtomicU64>>;

/// Outcome of feeding a batch of records into [`AircraftMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObserveSummary {
    /// Records exported as series.
    pub observed: usize,
    /// Records dropped for lacking a valid position or track.
    pub skipped: usize,
}

/// Metrics for a single scrape.
#[derive(Debug)]
pub struct AircraftMetrics {
    registry: Registry,
    families: [(AircraftGauge, AircraftGaugeFamily); 8],
}

impl AircraftMetrics {
    /// Create a registry with every family registered and no series.
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix(METRIC_PREFIX);

        let families = AircraftGauge::ALL.map(|gauge| {
            let family = AircraftGaugeFamily::default();
            registry.register(gauge.name(), gauge.help(), family.clone());
            (gauge, family)
        });

        Self { registry, families }
    }

    /// Record one aircraft.
    ///
    /// An aircraft without both a valid position and a valid track is
    /// skipped entirely, including its non-positional gauges. Returns whether
    /// the aircraft was recorded.
    pub fn observe(&mut self, aircraft: &Aircraft) -> bool {
        if !aircraft.is_reportable() {
            trace!(
                hex = %aircraft.hex,
                valid_position = aircraft.valid_position,
                valid_track = aircraft.valid_track,
                "Skipping aircraft without valid position and track"
            );
            return false;
        }

        let labels = AircraftLabels::from(aircraft);
        for (gauge, family) in &self.families {
            family.get_or_create(&labels).set(gauge.value(aircraft));
        }

        true
    }

    /// Record a batch of aircraft in order.
    pub fn observe_all<'a, I>(&mut self, aircraft: I) -> ObserveSummary
    where
        I: IntoIterator<Item = &'a Aircraft>,
    {
        let mut summary = ObserveSummary::default();
        for a in aircraft {
            if self.observe(a) {
                summary.observed += 1;
            } else {
                summary.skipped += 1;
            }
        }
        summary
    }

    /// Render the OpenMetrics text exposition, consuming the registry.
    pub fn render(self) -> Result<String, std::fmt::Error> {
        let mut body = String::new();
        encode(&mut body, &self.registry)?;
        Ok(body)
    }
}

impl Default for AircraftMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_aircraft(hex: &str, flight: &str, valid_position: bool, valid_track: bool) -> Aircraft {
        Aircraft {
            hex: hex.to_string(),
            squawk: "1200".to_string(),
            flight: flight.to_string(),
            latitude: 40.1,
            longitude: -73.9,
            valid_position,
            altitude: 35000,
            vertical_rate: 0,
            track: 90,
            valid_track,
            speed: 450,
            messages: 10,
            seen: 2,
        }
    }

    fn sample_lines(body: &str) -> Vec<&str> {
        body.lines()
            .filter(|l| !l.starts_with('#') && !l.trim().is_empty())
            .collect()
    }

    #[test]
    fn test_observe_and_render() {
        let mut metrics = AircraftMetrics::new();
        assert!(metrics.observe(&make_aircraft("ABC123", "UAL123", true, true)));

        let body = metrics.render().unwrap();

        assert!(body.contains("# TYPE dump1090_latitude gauge"));
        assert!(body.contains("dump1090_latitude{flight=\"UAL123\",hex=\"ABC123\",squawk=\"1200\"} 40.1"));
        assert!(body.contains("dump1090_longitude{flight=\"UAL123\",hex=\"ABC123\",squawk=\"1200\"} -73.9"));
        assert!(body.contains("dump1090_altitude{flight=\"UAL123\",hex=\"ABC123\",squawk=\"1200\"} 35000"));
        assert!(body.trim_end().ends_with("# EOF"));
        assert_eq!(sample_lines(&body).len(), 8);
    }

    #[test]
    fn test_every_family_registered_when_empty() {
        let body = AircraftMetrics::new().render().unwrap();

        for gauge in AircraftGauge::ALL {
            assert!(
                body.contains(&format!("# TYPE {} gauge", gauge.full_name())),
                "missing family {} in {}",
                gauge.full_name(),
                body
            );
        }
        assert!(sample_lines(&body).is_empty());
    }

    #[test]
    fn test_invalid_position_or_track_skipped_entirely() {
        let mut metrics = AircraftMetrics::new();

        assert!(!metrics.observe(&make_aircraft("NOPOS1", "AAA1", false, true)));
        assert!(!metrics.observe(&make_aircraft("NOTRK1", "BBB2", true, false)));
        assert!(!metrics.observe(&make_aircraft("NONE01", "CCC3", false, false)));

        let body = metrics.render().unwrap();
        assert!(!body.contains("NOPOS1"));
        assert!(!body.contains("NOTRK1"));
        assert!(!body.contains("NONE01"));
    }

    #[test]
    fn test_empty_flight_becomes_unknown() {
        let mut metrics = AircraftMetrics::new();
        metrics.observe(&make_aircraft("3C6444", "", true, true));

        let body = metrics.render().unwrap();
        assert!(body.contains("flight=\"UNKNOWN\""));
        assert!(!body.contains("flight=\"\""));
    }

    #[test]
    fn test_observe_all_summary() {
        let records = vec![
            make_aircraft("A1", "F1", true, true),
            make_aircraft("A2", "F2", false, true),
            make_aircraft("A3", "F3", true, true),
            make_aircraft("A4", "F4", true, false),
        ];

        let mut metrics = AircraftMetrics::new();
        let summary = metrics.observe_all(&records);

        assert_eq!(
            summary,
            ObserveSummary {
                observed: 2,
                skipped: 2
            }
        );

        let body = metrics.render().unwrap();
        assert_eq!(sample_lines(&body).len(), 16);
    }

    #[test]
    fn test_duplicate_labels_keep_last_value() {
        let mut first = make_aircraft("ABC123", "UAL123", true, true);
        first.altitude = 1000;
        let mut second = first.clone();
        second.altitude = 2000;

        let mut metrics = AircraftMetrics::new();
        let summary = metrics.observe_all([&first, &second]);
        assert_eq!(summary.observed, 2);

        let body = metrics.render().unwrap();
        let altitude: Vec<&str> = sample_lines(&body)
            .into_iter()
            .filter(|l| l.starts_with("dump1090_altitude{"))
            .collect();
        assert_eq!(altitude.len(), 1);
        assert!(altitude[0].ends_with(" 2000.0") || altitude[0].ends_with(" 2000"));
    }

    #[test]
    fn test_label_values_cannot_break_exposition() {
        let mut metrics = AircraftMetrics::new();
        metrics.observe(&make_aircraft("ABC123", "EVIL\"} 1\nx{a=\"", true, true));

        let body = metrics.render().unwrap();

        assert!(
            body.contains(
                "dump1090_latitude{flight=\"EVIL\\\"} 1\\nx{a=\\\"\",hex=\"ABC123\",squawk=\"1200\"} 40.1"
            ),
            "unexpected body: {}",
            body
        );
        assert!(!body.lines().any(|l| l.starts_with("x{")));
        assert!(!body.contains("dump1090_latitude{flight=\"EVIL\"} 1"));
        assert_eq!(sample_lines(&body).len(), 8);
    }

    #[test]
    fn test_backslash_in_label_escaped() {
        let mut metrics = AircraftMetrics::new();
        metrics.observe(&make_aircraft("ABC123", "A\\B", true, true));

        let body = metrics.render().unwrap();
        assert!(body.contains("flight=\"A\\\\B\""));
    }

    #[test]
    fn test_builders_are_isolated() {
        let mut first = AircraftMetrics::new();
        first.observe(&make_aircraft("AAAAAA", "ONE", true, true));

        let mut second = AircraftMetrics::new();
        second.observe(&make_aircraft("BBBBBB", "TWO", true, true));

        let first_body = first.render().unwrap();
        let second_body = second.render().unwrap();

        assert!(first_body.contains("AAAAAA") && !first_body.contains("BBBBBB"));
        assert!(second_body.contains("BBBBBB") && !second_body.contains("AAAAAA"));
    }
}
