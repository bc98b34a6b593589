//! Registry of monitored cities.
//!
//! This is the single source of truth for which cities the dashboard polls.
//! IQAir identifies a city by its English name plus the region ("state")
//! it belongs to, so both are stored alongside the Italian display name.

use serde::Serialize;

/// Country passed to the upstream API for every city.
pub const DEFAULT_COUNTRY: &str = "Italy";

/// A city shown on the dashboard.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct MonitoredCity {
    /// Name shown on cards (Italian).
    pub display_name: &'static str,
    /// City name as IQAir expects it.
    pub api_city: &'static str,
    /// Region name as IQAir expects it.
    pub region: &'static str,
}

/// All monitored cities, in dashboard order.
pub static CITY_REGISTRY: &[MonitoredCity] = &[
    MonitoredCity {
        display_name: "Roma",
        api_city: "Rome",
        region: "Lazio",
    },
    MonitoredCity {
        display_name: "Milano",
        api_city: "Milan",
        region: "Lombardy",
    },
    MonitoredCity {
        display_name: "Napoli",
        api_city: "Naples",
        region: "Campania",
    },
    MonitoredCity {
        display_name: "Torino",
        api_city: "Turin",
        region: "Piedmont",
    },
    MonitoredCity {
        display_name: "Firenze",
        api_city: "Florence",
        region: "Tuscany",
    },
    MonitoredCity {
        display_name: "Bologna",
        api_city: "Bologna",
        region: "Emilia-Romagna",
    },
    MonitoredCity {
        display_name: "Venezia",
        api_city: "Venice",
        region: "Veneto",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_contains_the_seven_cities() {
        let names: Vec<_> = CITY_REGISTRY.iter().map(|c| c.display_name).collect();
        assert_eq!(
            names,
            ["Roma", "Milano", "Napoli", "Torino", "Firenze", "Bologna", "Venezia"]
        );
    }

    #[test]
    fn test_no_duplicate_display_names() {
        let mut seen = std::collections::HashSet::new();
        for city in CITY_REGISTRY {
            assert!(
                seen.insert(city.display_name),
                "duplicate city '{}' in CITY_REGISTRY",
                city.display_name
            );
        }
    }

    #[test]
    fn test_every_city_has_upstream_identifiers() {
        for city in CITY_REGISTRY {
            assert!(!city.api_city.is_empty(), "'{}' has no api_city", city.display_name);
            assert!(!city.region.is_empty(), "'{}' has no region", city.display_name);
        }
    }
}
