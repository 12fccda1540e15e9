// Flight legs, itineraries and the records built from them
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::FareError;
use crate::timestamp::Timestamp;
use crate::xml_element::XmlElement;

pub const SOURCE: &str = "Source";
pub const DESTINATION: &str = "Destination";
pub const DEPARTURE_TIMESTAMP: &str = "DepartureTimeStamp";
pub const ARRIVAL_TIMESTAMP: &str = "ArrivalTimeStamp";

/// One flight segment as the feed describes it: child tag name to trimmed
/// text, in document order. Only a handful of fields are read by name; the
/// rest are carried through to the output untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlightLeg {
    fields: Vec<(String, String)>,
}

impl FlightLeg {
    /// Children without any text are skipped. Whitespace-only text is kept
    /// as an empty string.
    pub fn from_element(element: &XmlElement) -> Self {
        let mut leg = FlightLeg::default();
        for child in &element.children {
            if let Some(text) = &child.text {
                leg.insert(&child.name, text.trim());
            }
        }
        leg
    }

    // A repeated tag keeps its first position and takes the latest value.
    pub fn insert(&mut self, name: &str, value: &str) {
        match self.fields.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.fields.push((name.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn timestamp(&self, field: &str) -> Result<Timestamp, FareError> {
        let raw = self
            .get(field)
            .ok_or_else(|| FareError::field_format(field, "", "missing from flight leg"))?;
        Timestamp::parse(field, raw)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for FlightLeg {
    fn from(fields: [(&str, &str); N]) -> Self {
        let mut leg = FlightLeg::default();
        for (name, value) in fields {
            leg.insert(name, value);
        }
        leg
    }
}

impl Serialize for FlightLeg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// The onward legs of one priced itinerary, in flight order. Never empty.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct Itinerary {
    legs: Vec<FlightLeg>,
}

impl Itinerary {
    pub fn new(legs: Vec<FlightLeg>) -> Result<Self, FareError> {
        if legs.is_empty() {
            return Err(FareError::InvalidRouteRecord);
        }
        Ok(Self { legs })
    }

    pub fn legs(&self) -> &[FlightLeg] {
        &self.legs
    }

    pub fn first(&self) -> &FlightLeg {
        &self.legs[0]
    }

    pub fn last(&self) -> &FlightLeg {
        &self.legs[self.legs.len() - 1]
    }

    /// Seconds from the first leg's departure to the last leg's arrival.
    pub fn time_to_flying(&self) -> Result<i64, FareError> {
        let departure = self.first().timestamp(DEPARTURE_TIMESTAMP)?;
        let arrival = self.last().timestamp(ARRIVAL_TIMESTAMP)?;
        departure.seconds_until(&arrival)
    }
}

/// Origin/destination pair an itinerary must connect.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub source: String,
    pub destination: String,
}

impl Route {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Exact, case-sensitive comparison. A leg without the field never matches.
    pub fn matches(&self, itinerary: &Itinerary) -> bool {
        itinerary.first().get(SOURCE) == Some(self.source.as_str())
            && itinerary.last().get(DESTINATION) == Some(self.destination.as_str())
    }
}

impl Default for Route {
    fn default() -> Self {
        Self::new("DXB", "BKK")
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.source, self.destination)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PricedFlightRecord {
    pub itinerary: Itinerary,
    pub time_to_flying: i64,
    pub price: f64,
}
