//! Pass Detector
//!
//! Steps through time at a fixed interval, propagates the satellite at each
//! step and turns the elevation series into pass start/end events.
//!
//! Without an observer every step counts as visible, so the run is a single
//! "pass" that only ends at the end of the window or on decay.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::constants::{DAY, MIN_ORBIT_ALTITUDE_M};
use crate::elements::OrbitalElements;
use crate::propagation::propagate_to_jd;
use crate::time::jd_to_datetime;
use crate::transforms::{
    earth_rotation_angle, ecef_to_geodetic, eci_to_ecef, eci_to_topocentric, GeodeticPosition,
    Observer, Topocentric,
};
use crate::{OrbitalError, Result};

/// Upper bound on steps in one run, about 9.5 years at 30 s
pub const MAX_STEPS: usize = 10_000_000;

/// Loop parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorSettings {
    pub duration_days: f64,
    pub step_seconds: f64,
    /// A step is visible when elevation is strictly above this
    pub min_elevation_deg: f64,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            duration_days: 14.0,
            step_seconds: 30.0,
            min_elevation_deg: 5.0,
        }
    }
}

impl DetectorSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.duration_days.is_finite() && self.duration_days > 0.0) {
            return Err(OrbitalError::InvalidConfig(format!(
                "duration must be a positive number of days, got {}",
                self.duration_days
            )));
        }
        if !(self.step_seconds.is_finite() && self.step_seconds > 0.0) {
            return Err(OrbitalError::InvalidConfig(format!(
                "step must be a positive number of seconds, got {}",
                self.step_seconds
            )));
        }
        let steps = DAY * self.duration_days / self.step_seconds;
        if steps > MAX_STEPS as f64 {
            return Err(OrbitalError::InvalidConfig(format!(
                "{} days at {} s per step exceeds {} steps",
                self.duration_days, self.step_seconds, MAX_STEPS
            )));
        }
        if !self.min_elevation_deg.is_finite() {
            return Err(OrbitalError::InvalidConfig(
                "elevation threshold must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of steps in the window
    pub fn step_count(&self) -> usize {
        (DAY * self.duration_days / self.step_seconds) as usize
    }
}

/// Events emitted to a [`ReportSink`], in time order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PassEvent {
    PassStart {
        timestamp: DateTime<Utc>,
    },
    Sample {
        timestamp: DateTime<Utc>,
        geodetic: GeodeticPosition,
        topocentric: Option<Topocentric>,
    },
    /// Stamped at the last sample inside the pass, whether the pass ends on
    /// an elevation drop, on decay or at the end of the window.
    /// `max_elevation_deg` is `None` when no observer is configured.
    PassEnd {
        timestamp: DateTime<Utc>,
        max_elevation_deg: Option<f64>,
    },
    Decay {
        timestamp: DateTime<Utc>,
    },
}

impl PassEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            PassEvent::PassStart { timestamp }
            | PassEvent::Sample { timestamp, .. }
            | PassEvent::PassEnd { timestamp, .. }
            | PassEvent::Decay { timestamp } => *timestamp,
        }
    }
}

/// Append-only consumer of pass events
pub trait ReportSink {
    fn emit(&mut self, event: PassEvent);
}

impl ReportSink for Vec<PassEvent> {
    fn emit(&mut self, event: PassEvent) {
        self.push(event);
    }
}

/// Visibility state carried from one step to the next
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassState {
    pub in_pass: bool,
    pub max_elevation_deg: f64,
    pub started_at: Option<DateTime<Utc>>,
    /// Last sample of the current (or most recent) pass
    pub ended_at: Option<DateTime<Utc>>,
}

impl PassState {
    fn begin(&mut self, timestamp: DateTime<Utc>) {
        *self = PassState {
            in_pass: true,
            max_elevation_deg: 0.0,
            started_at: Some(timestamp),
            ended_at: None,
        };
    }

    fn record(&mut self, timestamp: DateTime<Utc>, elevation_deg: Option<f64>) {
        if let Some(elevation) = elevation_deg {
            self.max_elevation_deg = self.max_elevation_deg.max(elevation);
        }
        self.ended_at = Some(timestamp);
    }

    fn end(&mut self) {
        self.in_pass = false;
    }

    /// Time from the first to the last sample of the pass
    pub fn duration(&self) -> Option<Duration> {
        Some(self.ended_at? - self.started_at?)
    }
}

/// Ground track and look angles for one time step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepObservation {
    pub timestamp: DateTime<Utc>,
    pub geodetic: GeodeticPosition,
    pub topocentric: Option<Topocentric>,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub steps: usize,
    pub passes: usize,
    /// Sum of pass durations, first to last sample of each pass
    pub pass_seconds: f64,
    pub decayed_at: Option<DateTime<Utc>>,
}

pub struct PassDetector<'a> {
    elements: &'a OrbitalElements,
    observer: Option<Observer>,
    settings: DetectorSettings,
}

impl<'a> PassDetector<'a> {
    pub fn new(
        elements: &'a OrbitalElements,
        observer: Option<Observer>,
        settings: DetectorSettings,
    ) -> Self {
        Self {
            elements,
            observer,
            settings,
        }
    }

    /// Propagate and transform for a single Julian date
    pub fn observe(&self, jd: f64) -> Result<StepObservation> {
        let theta = earth_rotation_angle(jd);
        let eci = propagate_to_jd(self.elements, jd)?;
        let ecef = eci_to_ecef(&eci, theta);
        let geodetic = ecef_to_geodetic(&ecef);
        let topocentric = self
            .observer
            .as_ref()
            .map(|observer| eci_to_topocentric(&eci, observer, theta));

        Ok(StepObservation {
            timestamp: jd_to_datetime(jd)?,
            geodetic,
            topocentric,
        })
    }

    /// Run the detection loop from `start_jd`, emitting events into `sink`.
    ///
    /// Stops early when the altitude drops below the minimum orbit altitude;
    /// an open pass is closed before the decay event. Every pass, including
    /// one still open when the window ends, is closed at its last sample.
    pub fn run<S: ReportSink + ?Sized>(&self, start_jd: f64, sink: &mut S) -> Result<RunSummary> {
        self.settings.validate()?;

        let steps = self.settings.step_count();
        let step_days = self.settings.step_seconds / DAY;
        let mut state = PassState::default();
        let mut summary = RunSummary::default();

        debug!(
            catalog = self.elements.catalog_number,
            steps,
            step_seconds = self.settings.step_seconds,
            "Starting pass detection"
        );

        for i in 0..steps {
            let obs = self.observe(start_jd + i as f64 * step_days)?;
            summary.steps += 1;

            if obs.geodetic.altitude_m < MIN_ORBIT_ALTITUDE_M {
                if state.in_pass {
                    self.close_pass(&mut state, &mut summary, sink);
                }
                warn!(
                    timestamp = %obs.timestamp,
                    altitude_m = obs.geodetic.altitude_m,
                    "Satellite decayed"
                );
                sink.emit(PassEvent::Decay {
                    timestamp: obs.timestamp,
                });
                summary.decayed_at = Some(obs.timestamp);
                return Ok(summary);
            }

            let visible = obs
                .topocentric
                .map_or(true, |topo| topo.elevation_deg > self.settings.min_elevation_deg);

            if visible {
                if !state.in_pass {
                    state.begin(obs.timestamp);
                    info!(timestamp = %obs.timestamp, "Pass started");
                    sink.emit(PassEvent::PassStart {
                        timestamp: obs.timestamp,
                    });
                }
                state.record(
                    obs.timestamp,
                    obs.topocentric.map(|topo| topo.elevation_deg),
                );
                sink.emit(PassEvent::Sample {
                    timestamp: obs.timestamp,
                    geodetic: obs.geodetic,
                    topocentric: obs.topocentric,
                });
            } else if state.in_pass {
                self.close_pass(&mut state, &mut summary, sink);
            }
        }

        if state.in_pass {
            self.close_pass(&mut state, &mut summary, sink);
        }

        Ok(summary)
    }

    fn close_pass<S: ReportSink + ?Sized>(
        &self,
        state: &mut PassState,
        summary: &mut RunSummary,
        sink: &mut S,
    ) {
        state.end();
        let Some(timestamp) = state.ended_at else {
            return;
        };
        let seconds = state
            .duration()
            .map_or(0.0, |d| d.num_milliseconds() as f64 / 1000.0);
        let max_elevation_deg = self.observer.map(|_| state.max_elevation_deg);
        info!(
            timestamp = %timestamp,
            duration_s = seconds,
            max_elevation_deg = ?max_elevation_deg,
            "Pass ended"
        );

        summary.passes += 1;
        summary.pass_seconds += seconds;
        sink.emit(PassEvent::PassEnd {
            timestamp,
            max_elevation_deg,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circular_equatorial(mean_motion_derivative: f64) -> OrbitalElements {
        OrbitalElements {
            catalog_number: 1,
            epoch_year: 24,
            epoch_day: 1.0,
            mean_motion_derivative,
            mean_motion_second_derivative: 0.0,
            bstar: 0.0,
            inclination: 0.0,
            ascending_node: 0.0,
            eccentricity: 0.0,
            argument_of_perigee: 0.0,
            mean_anomaly: 0.0,
            mean_motion: 15.5,
            epoch_revolution: 0,
        }
    }

    fn settings(duration_days: f64) -> DetectorSettings {
        DetectorSettings {
            duration_days,
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let s = DetectorSettings::default();
        assert_eq!(s.duration_days, 14.0);
        assert_eq!(s.step_seconds, 30.0);
        assert_eq!(s.min_elevation_deg, 5.0);
        assert_eq!(s.step_count(), 40_320);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let el = circular_equatorial(0.0);
        let bad = DetectorSettings {
            step_seconds: 0.0,
            ..Default::default()
        };
        let mut events = Vec::new();
        let err = PassDetector::new(&el, None, bad)
            .run(el.epoch_jd(), &mut events)
            .unwrap_err();
        assert!(matches!(err, OrbitalError::InvalidConfig(_)));
        assert!(events.is_empty());
    }

    #[test]
    fn test_step_count_is_bounded() {
        let huge = DetectorSettings {
            duration_days: 1e15,
            ..Default::default()
        };
        assert!(matches!(huge.validate(), Err(OrbitalError::InvalidConfig(_))));

        let fine = DetectorSettings {
            duration_days: 1.0,
            step_seconds: 0.001,
            ..Default::default()
        };
        assert!(fine.validate().is_err());

        let longest = DetectorSettings {
            duration_days: MAX_STEPS as f64 * 30.0 / DAY,
            ..Default::default()
        };
        assert!(longest.validate().is_ok());
    }

    #[test]
    fn test_pass_state_resets_on_begin() {
        let now = Utc::now();
        let later = now + Duration::seconds(90);
        let mut state = PassState::default();
        state.begin(now);
        state.record(now, Some(42.0));
        state.record(later, Some(12.0));
        assert_eq!(state.max_elevation_deg, 42.0);
        state.end();
        assert!(!state.in_pass);
        assert_eq!(state.ended_at, Some(later));
        assert_eq!(state.duration(), Some(Duration::seconds(90)));

        state.begin(now);
        assert!(state.in_pass);
        assert_eq!(state.max_elevation_deg, 0.0);
        assert_eq!(state.ended_at, None);
        assert_eq!(state.duration(), None);
    }

    #[test]
    fn test_pass_end_stamped_at_last_sample() {
        let el = circular_equatorial(0.0);
        let mut events = Vec::new();
        let summary = PassDetector::new(&el, Some(Observer::new(0.0, 0.0, 0.0)), settings(1.0))
            .run(el.epoch_jd(), &mut events)
            .unwrap();
        assert!(summary.passes > 0);

        let mut last_sample = None;
        let mut pass_seconds = 0.0;
        let mut started = None;
        for event in &events {
            match event {
                PassEvent::PassStart { timestamp } => started = Some(*timestamp),
                PassEvent::Sample { timestamp, .. } => last_sample = Some(*timestamp),
                PassEvent::PassEnd { timestamp, .. } => {
                    assert_eq!(Some(*timestamp), last_sample);
                    pass_seconds +=
                        (*timestamp - started.unwrap()).num_milliseconds() as f64 / 1000.0;
                }
                PassEvent::Decay { .. } => panic!("no decay expected"),
            }
        }
        assert!((summary.pass_seconds - pass_seconds).abs() < 1.0);
        assert!(summary.pass_seconds > 0.0);
    }

    #[test]
    fn test_without_observer_every_step_is_visible() {
        let el = circular_equatorial(0.0);
        let mut events = Vec::new();
        let summary = PassDetector::new(&el, None, settings(0.01))
            .run(el.epoch_jd(), &mut events)
            .unwrap();

        let steps = settings(0.01).step_count();
        assert_eq!(summary.steps, steps);
        assert_eq!(summary.passes, 1);
        assert_eq!(summary.decayed_at, None);

        assert!(matches!(events.first(), Some(PassEvent::PassStart { .. })));
        assert!(matches!(
            events.last(),
            Some(PassEvent::PassEnd { max_elevation_deg: None, .. })
        ));
        let samples = events
            .iter()
            .filter(|e| matches!(e, PassEvent::Sample { topocentric: None, .. }))
            .count();
        assert_eq!(samples, steps);
    }

    #[test]
    fn test_events_are_time_ordered() {
        let el = circular_equatorial(0.0);
        let mut events = Vec::new();
        PassDetector::new(&el, Some(Observer::new(0.0, 0.0, 0.0)), settings(0.5))
            .run(el.epoch_jd(), &mut events)
            .unwrap();

        for pair in events.windows(2) {
            assert!(pair[0].timestamp() <= pair[1].timestamp());
        }
    }

    #[test]
    fn test_decay_terminates_run() {
        // Mean motion climbing 2 rev/day per day pulls the orbit below 100 km
        // after a little more than half a day.
        let el = circular_equatorial(2.0);
        let mut events = Vec::new();
        let summary = PassDetector::new(&el, None, settings(2.0))
            .run(el.epoch_jd(), &mut events)
            .unwrap();

        let decayed_at = summary.decayed_at.expect("run should end in decay");
        assert!(summary.steps < settings(2.0).step_count());
        assert_eq!(summary.passes, 1);

        let n = events.len();
        assert!(matches!(events[n - 1], PassEvent::Decay { timestamp } if timestamp == decayed_at));
        let last_sample = events[n - 3].timestamp();
        assert!(matches!(events[n - 3], PassEvent::Sample { .. }));
        assert!(matches!(events[n - 2], PassEvent::PassEnd { timestamp, .. } if timestamp == last_sample));
        assert!(last_sample < decayed_at);

        let days = (decayed_at - events[0].timestamp()).num_seconds() as f64 / DAY;
        assert!(days > 0.5 && days < 0.65, "{}", days);
    }

    #[test]
    fn test_observe_altitude() {
        let el = circular_equatorial(0.0);
        let detector = PassDetector::new(&el, None, DetectorSettings::default());
        let obs = detector.observe(el.epoch_jd()).unwrap();
        assert!(obs.geodetic.latitude_deg.abs() < 1e-6);
        assert!((obs.geodetic.altitude_m - (el.semi_major_axis_m() - 6_378_137.0)).abs() < 1e-3);
        assert!(obs.topocentric.is_none());
    }

    #[test]
    fn test_event_serialization_tag() {
        let event = PassEvent::PassEnd {
            timestamp: jd_to_datetime(2_451_545.0).unwrap(),
            max_elevation_deg: Some(45.5),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"pass_end\""));
        assert!(json.contains("\"max_elevation_deg\":45.5"));
    }
}
