// agrisense/core/soil/src/classify.rs

// Pure soil classification rules
use crate::types::SoilProperties;

/// pH at or above which topsoil is treated as alkaline
pub const ALKALINE_PH: f64 = 8.3;

/// Rough bounding box of India
pub fn in_india(latitude: f64, longitude: f64) -> bool {
    (6.0..=37.2).contains(&latitude) && (68.0..=97.5).contains(&longitude)
}

/// Regional defaults used when SoilGrids has nothing for a point
pub fn mock_properties(latitude: f64, longitude: f64) -> SoilProperties {
    let (clay, sand, silt, ph) = if in_india(latitude, longitude) {
        if latitude > 30.0 {
            // Northern plains
            (25.0, 45.0, 30.0, 7.5)
        } else if latitude < 15.0 {
            // Peninsular south
            (35.0, 40.0, 25.0, 6.8)
        } else {
            (40.0, 35.0, 25.0, 7.2)
        }
    } else {
        (20.0, 50.0, 30.0, 7.0)
    };

    SoilProperties {
        clay: Some(clay),
        sand: Some(sand),
        silt: Some(silt),
        phh2o: Some(ph),
    }
}

/// Texture family with its confidence. Missing data gives a low-confidence Loamy.
pub fn texture_family(props: Option<&SoilProperties>) -> (&'static str, f64) {
    let Some(props) = props.filter(|p| !p.is_empty()) else {
        return ("Loamy", 0.25);
    };

    let clay = props.clay.unwrap_or(0.0);
    let sand = props.sand.unwrap_or(0.0);
    let silt = props.silt.unwrap_or(0.0);

    if clay >= 40.0 {
        ("Clayey", 0.75)
    } else if sand >= 70.0 {
        ("Sandy", 0.70)
    } else if silt >= 80.0 {
        ("Silty", 0.70)
    } else {
        ("Loamy", 0.60)
    }
}

/// Map a salinity service class to a soil type
pub fn salinity_class(class: &str) -> Option<&'static str> {
    match class.trim().to_lowercase().as_str() {
        "saline" | "saline-sodic" => Some("Saline"),
        "sodic" | "alkaline" => Some("Alkaline"),
        _ => None,
    }
}

/// Map a free-text soil map label to one of the Bhuvan categories
pub fn bhuvan_category(label: &str) -> Option<&'static str> {
    let label = label.to_lowercase();
    if label.contains("red") {
        Some("Red")
    } else if label.contains("black") || label.contains("vertisol") {
        Some("Black")
    } else if label.contains("laterite") || label.contains("lateritic") {
        Some("Laterite")
    } else if label.contains("peat") || label.contains("histic") || label.contains("muck") {
        Some("Peaty")
    } else {
        None
    }
}
