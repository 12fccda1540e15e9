// Fare feed scanner: finds priced itineraries on one route in GDS XML feeds
// and reports the cheapest, most expensive, fastest or slowest of them.

pub mod config;
pub mod error;
pub mod feed_scanner;
pub mod itinerary;
pub mod pricing;
pub mod report;
pub mod timestamp;
pub mod xml_element;

// Re-export key types for convenience
pub use config::ScanConfig;
pub use error::FareError;
pub use feed_scanner::FeedScanner;
pub use itinerary::{FlightLeg, Itinerary, PricedFlightRecord, Route};
pub use report::{select, JsonStyle, Report, SelectionMode};
pub use timestamp::Timestamp;
pub use xml_element::{parse_document, XmlElement};
