use std::path::PathBuf;

use crate::itinerary::Route;

// Feeds scanned when none are given on the command line
pub const DEFAULT_FEEDS: [&str; 2] = ["RS_Via-3.xml", "RS_ViaOW.xml"];

// Scan configuration options
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Feed files, scanned and concatenated in this order.
    pub feeds: Vec<PathBuf>,
    pub route: Route,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            feeds: DEFAULT_FEEDS.iter().map(PathBuf::from).collect(),
            route: Route::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert_eq!(
            config.feeds,
            vec![PathBuf::from("RS_Via-3.xml"), PathBuf::from("RS_ViaOW.xml")]
        );
        assert_eq!(config.route, Route::new("DXB", "BKK"));
    }
}
