//! Typed view of the departure and trip documents.
//!
//! Only the fields the pipeline reads are decoded; everything else stays in
//! the raw document kept by [`DepartureBoard`].

use serde::Deserialize;
use serde_json::Value;

use super::FeedError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemarkKind {
    Status,
    Warning,
    Hint,
    #[serde(other)]
    Other,
}

/// A feed-supplied annotation on a departure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Remark {
    #[serde(rename = "type")]
    pub kind: RemarkKind,
    #[serde(default)]
    pub code: Option<String>,
    /// Free text; the human-readable message for warnings.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl Remark {
    pub fn status(code: &str) -> Self {
        Self {
            kind: RemarkKind::Status,
            code: Some(code.to_string()),
            text: None,
            summary: None,
        }
    }

    pub fn warning(text: &str) -> Self {
        Self {
            kind: RemarkKind::Warning,
            code: None,
            text: Some(text.to_string()),
            summary: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Line {
    #[serde(default)]
    pub name: Option<String>,
}

/// One departure at the polled stop, or the trip record of a trip re-query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    #[serde(default, alias = "id")]
    pub trip_id: String,
    #[serde(default)]
    pub line: Option<Line>,
    #[serde(default)]
    pub remarks: Vec<Remark>,
}

impl Departure {
    pub fn line_name(&self) -> Option<&str> {
        self.line.as_ref()?.name.as_deref()
    }
}

#[derive(Deserialize)]
struct DeparturesDocument {
    #[serde(default)]
    departures: Vec<Departure>,
}

#[derive(Deserialize)]
struct TripDocument {
    trip: Departure,
}

/// The departures of one poll, together with the document they came from.
#[derive(Debug, Clone)]
pub struct DepartureBoard {
    pub departures: Vec<Departure>,
    pub raw: Value,
}

impl DepartureBoard {
    pub fn from_value(raw: Value) -> Result<Self, FeedError> {
        let document = DeparturesDocument::deserialize(&raw)?;
        Ok(Self {
            departures: document.departures,
            raw,
        })
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, FeedError> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }
}

/// Decodes a `{"trip": {...}}` document.
pub fn parse_trip(bytes: &[u8]) -> Result<Departure, FeedError> {
    let document: TripDocument = serde_json::from_slice(bytes)?;
    Ok(document.trip)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_departure_with_remarks() {
        let raw = serde_json::json!({
            "departures": [{
                "tripId": "1|66400|0|86|18102026",
                "line": { "name": "S85", "product": "suburban" },
                "remarks": [
                    { "type": "status", "code": "text.realtime.stop.cancelled", "text": "Halt entfällt" },
                    { "type": "warning", "summary": "Bauarbeiten", "text": "Ersatzverkehr" },
                    { "type": "hint", "code": "FB", "text": "Fahrradmitnahme" },
                    { "type": "foreign-id", "text": "?" }
                ]
            }],
            "realtimeDataUpdatedAt": 1760000000
        });

        let board = DepartureBoard::from_value(raw.clone()).unwrap();
        assert_eq!(board.departures.len(), 1);
        let departure = &board.departures[0];
        assert_eq!(departure.trip_id, "1|66400|0|86|18102026");
        assert_eq!(departure.line_name(), Some("S85"));
        assert_eq!(departure.remarks.len(), 4);
        assert_eq!(departure.remarks[0].kind, RemarkKind::Status);
        assert_eq!(departure.remarks[1].kind, RemarkKind::Warning);
        assert_eq!(departure.remarks[2].kind, RemarkKind::Hint);
        assert_eq!(departure.remarks[3].kind, RemarkKind::Other);
        assert_eq!(board.raw, raw);
    }

    #[test]
    fn test_decode_tolerates_missing_fields() {
        let board = DepartureBoard::from_value(serde_json::json!({
            "departures": [{ "line": null }]
        }))
        .unwrap();
        let departure = &board.departures[0];
        assert_eq!(departure.trip_id, "");
        assert_eq!(departure.line_name(), None);
        assert!(departure.remarks.is_empty());
    }

    #[test]
    fn test_decode_rejects_malformed_body() {
        assert!(DepartureBoard::from_slice(b"<html>502</html>").is_err());
        assert!(DepartureBoard::from_value(serde_json::json!({ "departures": 3 })).is_err());
    }

    #[test]
    fn test_parse_trip_uses_trip_id_field() {
        let trip = parse_trip(
            br#"{"trip": {"id": "1|66400|0|86|18102026", "line": {"name": "S85"}, "remarks": []}}"#,
        )
        .unwrap();
        assert_eq!(trip.trip_id, "1|66400|0|86|18102026");
        assert_eq!(trip.line_name(), Some("S85"));
    }
}
