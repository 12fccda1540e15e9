// Extraction of priced itineraries from GDS fare feeds
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::FareError;
use crate::itinerary::{FlightLeg, Itinerary, PricedFlightRecord, Route, DESTINATION, SOURCE};
use crate::pricing::total_price;
use crate::xml_element::{parse_document, XmlElement};

const PRICED_ITINERARIES: &str = "PricedItineraries";
const PRICED_ITINERARY: &str = "Flights";
const ONWARD_LEGS: &str = "OnwardPricedItinerary/Flights/Flight";
const CHARGE_LINES: &str = "Pricing/ServiceCharges";

pub struct FeedScanner {
    route: Route,
}

impl FeedScanner {
    pub fn new(route: Route) -> Self {
        Self { route }
    }

    /// Scan every feed in order and concatenate the matches. The first
    /// failing feed aborts the whole scan.
    pub fn scan_all<P: AsRef<Path>>(&self, feeds: &[P]) -> Result<Vec<PricedFlightRecord>, FareError> {
        let mut flights = Vec::new();
        for feed in feeds {
            flights.extend(self.scan_file(feed.as_ref())?);
        }
        info!(feeds = feeds.len(), flights = flights.len(), route = %self.route, "scan complete");
        Ok(flights)
    }

    pub fn scan_file(&self, path: &Path) -> Result<Vec<PricedFlightRecord>, FareError> {
        let xml = std::fs::read_to_string(path).map_err(|e| FareError::FeedParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        self.scan_xml(path, &xml)
    }

    /// Scan one document. `path` is only used to label parse errors.
    pub fn scan_xml(&self, path: &Path, xml: &str) -> Result<Vec<PricedFlightRecord>, FareError> {
        let root = parse_document(xml).map_err(|e| FareError::FeedParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let flights = self.scan_document(&root)?;
        debug!(feed = %path.display(), flights = flights.len(), "feed scanned");
        Ok(flights)
    }

    pub fn scan_document(&self, root: &XmlElement) -> Result<Vec<PricedFlightRecord>, FareError> {
        let mut flights = Vec::new();
        for priced in priced_itineraries(root) {
            if let Some(record) = self.extract_record(priced)? {
                flights.push(record);
            }
        }
        Ok(flights)
    }

    fn extract_record(&self, priced: &XmlElement) -> Result<Option<PricedFlightRecord>, FareError> {
        let legs: Vec<FlightLeg> = priced
            .select(ONWARD_LEGS)
            .into_iter()
            .map(FlightLeg::from_element)
            .collect();

        let itinerary = match Itinerary::new(legs) {
            Ok(itinerary) => itinerary,
            Err(e) => {
                warn!("skipping priced itinerary: {e}");
                return Ok(None);
            }
        };

        if !self.route.matches(&itinerary) {
            debug!(
                source = itinerary.first().get(SOURCE),
                destination = itinerary.last().get(DESTINATION),
                "itinerary off route"
            );
            return Ok(None);
        }

        let time_to_flying = itinerary.time_to_flying()?;
        let price = total_price(priced.select(CHARGE_LINES))?;

        Ok(Some(PricedFlightRecord {
            itinerary,
            time_to_flying,
            price,
        }))
    }
}

impl Default for FeedScanner {
    fn default() -> Self {
        Self::new(Route::default())
    }
}

// The feed root is usually a response envelope holding `PricedItineraries`,
// but a bare `PricedItineraries` document is accepted too.
fn priced_itineraries(root: &XmlElement) -> Vec<&XmlElement> {
    if root.name == PRICED_ITINERARIES {
        return root.select(PRICED_ITINERARY);
    }
    root.children_named(PRICED_ITINERARIES)
        .flat_map(|block| block.children_named(PRICED_ITINERARY))
        .collect()
}

// Sample feeds (stored in the samples directory)
pub const SAMPLE_VIA_3_PATH: &str = "samples/RS_Via-3.xml";
pub const SAMPLE_VIA_OW_PATH: &str = "samples/RS_ViaOW.xml";

pub fn sample_feeds() -> Vec<PathBuf> {
    vec![PathBuf::from(SAMPLE_VIA_3_PATH), PathBuf::from(SAMPLE_VIA_OW_PATH)]
}
