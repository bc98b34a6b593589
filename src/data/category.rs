//! AQI severity bands and classification.
//!
//! The six bands follow the US EPA scale reported by IQAir (`aqius`).
//! They are contiguous over `[0, 500]`; anything above the last band's
//! maximum still classifies as the last band.

use serde::Serialize;

/// One fixed AQI severity band.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Category {
    /// Inclusive lower bound.
    pub min: u32,
    /// Inclusive upper bound.
    pub max: u32,
    /// Short label shown on cards.
    pub label: &'static str,
    /// Hex colour, e.g. `#00e400`.
    pub color: &'static str,
    /// Marker used in front of city names.
    pub symbol: &'static str,
    /// What the band means for health.
    pub description: &'static str,
    /// What people should do about it.
    pub advice: &'static str,
}

impl Category {
    /// Returns the 0-based rank of this band (0 = Good, 5 = Hazardous).
    pub fn severity(&self) -> usize {
        CATEGORIES
            .iter()
            .position(|c| std::ptr::eq(c, self))
            .unwrap_or(CATEGORIES.len() - 1)
    }

    /// Returns true if `aqi` falls inside this band's inclusive range.
    pub fn contains(&self, aqi: u32) -> bool {
        aqi >= self.min && aqi <= self.max
    }

    /// Parses the hex colour into RGB components.
    pub fn rgb(&self) -> (u8, u8, u8) {
        let hex = self.color.trim_start_matches('#');
        let channel = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .unwrap_or(0)
        };
        (channel(0), channel(2), channel(4))
    }
}

/// All bands in ascending order of severity.
pub static CATEGORIES: [Category; 6] = [
    Category {
        min: 0,
        max: 50,
        label: "Good",
        color: "#00e400",
        symbol: "●",
        description: "Air quality is satisfactory and poses little or no risk.",
        advice: "Ideal for outdoor activities.",
    },
    Category {
        min: 51,
        max: 100,
        label: "Moderate",
        color: "#ffff00",
        symbol: "●",
        description: "Air quality is acceptable; some people may face a moderate risk.",
        advice: "Acceptable for most people.",
    },
    Category {
        min: 101,
        max: 150,
        label: "Unhealthy for Sensitive Groups",
        color: "#ff7e00",
        symbol: "▲",
        description: "Members of sensitive groups may experience health effects.",
        advice: "Children, the elderly and people with respiratory conditions \
                 should limit outdoor activity.",
    },
    Category {
        min: 151,
        max: 200,
        label: "Unhealthy",
        color: "#ff0000",
        symbol: "▲",
        description: "Everyone may begin to experience health effects.",
        advice: "Limit prolonged outdoor exertion.",
    },
    Category {
        min: 201,
        max: 300,
        label: "Very Unhealthy",
        color: "#8f3f97",
        symbol: "■",
        description: "Health alert: everyone may experience more serious effects.",
        advice: "Avoid outdoor activity. Wear a mask if you must go out.",
    },
    Category {
        min: 301,
        max: 500,
        label: "Hazardous",
        color: "#7e0023",
        symbol: "■",
        description: "Health emergency: the entire population is likely to be affected.",
        advice: "Stay indoors and run air purifiers. See a doctor if you have symptoms.",
    },
];

/// Returns the band containing `aqi`.
///
/// Values above the last band's maximum fall back to the last band, so this
/// never fails.
pub fn classify(aqi: u32) -> &'static Category {
    CATEGORIES
        .iter()
        .find(|c| c.contains(aqi))
        .unwrap_or(&CATEGORIES[CATEGORIES.len() - 1])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
