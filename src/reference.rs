//! Reference Data
//!
//! Hand-authored lists served as-is by the reference endpoints, plus the
//! default crop list substituted when the crop collection is empty.
//! Nothing here is computed or persisted.

use serde::Serialize;

use crate::models::CropReference;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Technique {
    pub name: &'static str,
    pub desc: &'static str,
}

/// Government support scheme
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scheme {
    pub name: &'static str,
    pub benefit: &'static str,
    pub desc: &'static str,
    pub link: &'static str,
}

/// Common crop disease and its remedy
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Disease {
    pub crop: &'static str,
    pub disease: &'static str,
    pub solution: &'static str,
}

const TECHNIQUES: [Technique; 5] = [
    Technique { name: "Drip Irrigation", desc: "Efficient water use for crops." },
    Technique { name: "Organic Farming", desc: "Eco-friendly farming techniques." },
    Technique { name: "Precision Agriculture", desc: "Uses GPS & sensors to monitor crops." },
    Technique { name: "Hydroponics", desc: "Soilless farming using nutrient solution." },
    Technique { name: "Vertical Farming", desc: "Indoor stacked crop cultivation." },
];

const SCHEMES: [Scheme; 3] = [
    Scheme {
        name: "PM-Kisan Samman Nidhi",
        benefit: "₹6000/year income support",
        desc: "Income support to farmer families",
        link: "https://pmkisan.gov.in/",
    },
    Scheme {
        name: "Pradhan Mantri Fasal Bima Yojana",
        benefit: "Crop insurance cover",
        desc: "Protection from crop loss",
        link: "https://pmfby.gov.in/",
    },
    Scheme {
        name: "Soil Health Card Scheme",
        benefit: "Free soil testing & nutrient report",
        desc: "Improves soil productivity",
        link: "https://soilhealth.dac.gov.in/",
    },
];

const DISEASES: [Disease; 3] = [
    Disease { crop: "Wheat", disease: "Rust", solution: "Resistant varieties + fungicide" },
    Disease { crop: "Rice", disease: "Blast", solution: "Spacing + proper fungicide" },
    Disease { crop: "Potato", disease: "Late Blight", solution: "Preventive fungicide + drainage" },
];

pub fn techniques() -> &'static [Technique] {
    &TECHNIQUES
}

pub fn schemes() -> &'static [Scheme] {
    &SCHEMES
}

pub fn diseases() -> &'static [Disease] {
    &DISEASES
}

/// Crops shown when the store has none. Built fresh on every call.
pub fn default_crops() -> Vec<CropReference> {
    vec![
        CropReference::new("Wheat", "Loamy", "Cool", "4 tons/hectare"),
        CropReference::new("Rice", "Clayey", "Hot & Humid", "5 tons/hectare"),
    ]
}

/// Stored crops, or the defaults when nothing is stored
pub fn crops_or_default(stored: Vec<CropReference>) -> Vec<CropReference> {
    if stored.is_empty() {
        default_crops()
    } else {
        stored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_sizes() {
        assert_eq!(techniques().len(), 5);
        assert_eq!(schemes().len(), 3);
        assert_eq!(diseases().len(), 3);
        assert_eq!(default_crops().len(), 2);
    }

    #[test]
    fn test_scheme_json_shape() {
        let value = serde_json::to_value(schemes()).unwrap();
        assert_eq!(value[0]["benefit"], "₹6000/year income support");
        assert_eq!(value[2]["link"], "https://soilhealth.dac.gov.in/");
    }

    #[test]
    fn test_fallback_only_when_empty() {
        let fallback = crops_or_default(Vec::new());
        assert_eq!(fallback, default_crops());
        assert_eq!(fallback[1].climate.as_deref(), Some("Hot & Humid"));

        let stored = vec![CropReference::new("Millet", "Sandy", "Dry", "2 tons/hectare")];
        let result = crops_or_default(stored.clone());
        assert_eq!(result, stored);
    }
}
