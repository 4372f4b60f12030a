//! Map status tracked across poll cycles.
//!
//! The status machine turns the outcome of one cycle into a new status and
//! decides whether the freshly rendered image replaces the published one.
//! Failures never replace a published image.

use std::fmt;

use serde::Serialize;

/// Camera status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MapStatus {
    /// No cycle has completed yet
    #[default]
    Initializing,
    /// Last cycle produced a map
    Ok,
    /// Device reported no explored area
    EmptyMap,
    /// Transport returned no data
    UnableToRetrieveMap,
    /// Payload could not be decoded or rendered
    UnableToParseMap,
}

impl MapStatus {
    /// Human-readable status
    pub fn as_str(&self) -> &'static str {
        match self {
            MapStatus::Initializing => "Initializing",
            MapStatus::Ok => "OK",
            MapStatus::EmptyMap => "Empty map",
            MapStatus::UnableToRetrieveMap => "Unable to retrieve map",
            MapStatus::UnableToParseMap => "Unable to parse map",
        }
    }

    /// True for the two failure statuses
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            MapStatus::UnableToRetrieveMap | MapStatus::UnableToParseMap
        )
    }
}

impl fmt::Display for MapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one poll cycle, as seen by the status machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Transport returned nothing usable
    NoData,
    /// Decoding or rendering failed
    ParseFailed,
    /// Decoded map has no explored area
    Empty,
    /// Decoded map with explored area
    Map,
}

/// Status change produced by [`StatusMachine::advance`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// New current status
    pub status: MapStatus,
    /// Whether the cycle's image and model replace the published ones
    pub publish: bool,
}

/// Tracks the current status and what has been published so far
#[derive(Clone, Copy, Debug, Default)]
pub struct StatusMachine {
    status: MapStatus,
    has_image: bool,
    published_empty: bool,
}

impl StatusMachine {
    /// Machine in the `Initializing` state with nothing published
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status
    pub fn status(&self) -> MapStatus {
        self.status
    }

    /// True once any image has been published
    pub fn has_image(&self) -> bool {
        self.has_image
    }

    /// Apply the outcome of one cycle
    pub fn advance(&mut self, outcome: CycleOutcome) -> Transition {
        let (status, publish) = match outcome {
            CycleOutcome::NoData => (MapStatus::UnableToRetrieveMap, false),
            CycleOutcome::ParseFailed => (MapStatus::UnableToParseMap, false),
            // An empty map only replaces nothing or another empty map
            CycleOutcome::Empty => (
                MapStatus::EmptyMap,
                !self.has_image || self.published_empty,
            ),
            CycleOutcome::Map => (MapStatus::Ok, true),
        };

        if publish {
            self.has_image = true;
            self.published_empty = outcome == CycleOutcome::Empty;
        }
        if status != self.status {
            log::debug!("Map status {} -> {}", self.status, status);
        }
        self.status = status;
        Transition { status, publish }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_strings() {
        assert_eq!(MapStatus::Initializing.to_string(), "Initializing");
        assert_eq!(MapStatus::Ok.to_string(), "OK");
        assert_eq!(MapStatus::EmptyMap.to_string(), "Empty map");
        assert_eq!(
            MapStatus::UnableToRetrieveMap.to_string(),
            "Unable to retrieve map"
        );
        assert_eq!(
            MapStatus::UnableToParseMap.to_string(),
            "Unable to parse map"
        );
    }

    #[test]
    fn test_initial_state() {
        let machine = StatusMachine::new();
        assert_eq!(machine.status(), MapStatus::Initializing);
        assert!(!machine.has_image());
    }

    #[test]
    fn test_failures_never_publish() {
        let mut machine = StatusMachine::new();
        let t = machine.advance(CycleOutcome::NoData);
        assert_eq!(t.status, MapStatus::UnableToRetrieveMap);
        assert!(!t.publish);

        machine.advance(CycleOutcome::Map);
        let t = machine.advance(CycleOutcome::ParseFailed);
        assert_eq!(t.status, MapStatus::UnableToParseMap);
        assert!(!t.publish);
        assert!(machine.has_image());
    }

    #[test]
    fn test_empty_map_publishing() {
        let mut machine = StatusMachine::new();
        // Nothing published yet
        assert!(machine.advance(CycleOutcome::Empty).publish);
        // Previous published map was empty
        assert!(machine.advance(CycleOutcome::Empty).publish);

        assert!(machine.advance(CycleOutcome::Map).publish);
        // A real map is kept while the device reports empty maps
        let t = machine.advance(CycleOutcome::Empty);
        assert_eq!(t.status, MapStatus::EmptyMap);
        assert!(!t.publish);
        assert!(!machine.advance(CycleOutcome::Empty).publish);
    }

    #[test]
    fn test_status_serializes_screaming() {
        assert_eq!(
            serde_json::to_value(MapStatus::UnableToParseMap).unwrap(),
            serde_json::json!("UNABLE_TO_PARSE_MAP")
        );
    }
}
