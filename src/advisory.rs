//! NPK Fertilizer Advisor
//!
//! Compares nitrogen, phosphorus and potassium levels against fixed thresholds
//! and suggests one fertilizer per deficient nutrient, always in N, P, K order.

use serde::Serialize;
use serde_json::Value;

use crate::models::loose_number;

pub const NITROGEN_THRESHOLD: f64 = 50.0;
pub const PHOSPHORUS_THRESHOLD: f64 = 40.0;
pub const POTASSIUM_THRESHOLD: f64 = 40.0;

pub const NITROGEN_ADVICE: &str = "Add Urea (Nitrogen fertilizer)";
pub const PHOSPHORUS_ADVICE: &str = "Use DAP (Phosphorus fertilizer)";
pub const POTASSIUM_ADVICE: &str = "Apply MOP (Potassium fertilizer)";

/// Soil nutrient levels. A missing level is never deficient; a present one is
/// read loosely, so null or `""` count as 0 and unparsable text as NaN.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NutrientLevels {
    pub nitrogen: Option<f64>,
    pub phosphorus: Option<f64>,
    pub potassium: Option<f64>,
}

impl NutrientLevels {
    pub fn new(nitrogen: f64, phosphorus: f64, potassium: f64) -> Self {
        Self {
            nitrogen: Some(nitrogen),
            phosphorus: Some(phosphorus),
            potassium: Some(potassium),
        }
    }

    pub fn from_payload(payload: &Value) -> Self {
        Self {
            nitrogen: payload.get("N").map(loose_number),
            phosphorus: payload.get("P").map(loose_number),
            potassium: payload.get("K").map(loose_number),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advice {
    pub advice: Vec<&'static str>,
}

pub fn advise(levels: &NutrientLevels) -> Advice {
    let checks = [
        (levels.nitrogen, NITROGEN_THRESHOLD, NITROGEN_ADVICE),
        (levels.phosphorus, PHOSPHORUS_THRESHOLD, PHOSPHORUS_ADVICE),
        (levels.potassium, POTASSIUM_THRESHOLD, POTASSIUM_ADVICE),
    ];

    let advice = checks
        .iter()
        // NaN fails every comparison
        .filter(|(level, threshold, _)| level.is_some_and(|v| v < *threshold))
        .map(|(_, _, text)| *text)
        .collect();

    Advice { advice }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_thresholds_met_exactly() {
        let result = advise(&NutrientLevels::new(50.0, 40.0, 40.0));
        assert!(result.advice.is_empty());
    }

    #[test]
    fn test_all_deficient_in_order() {
        let result = advise(&NutrientLevels::new(10.0, 5.0, 0.0));
        assert_eq!(
            result.advice,
            vec![NITROGEN_ADVICE, PHOSPHORUS_ADVICE, POTASSIUM_ADVICE]
        );
    }

    #[test]
    fn test_each_nutrient_independent() {
        for n in [0.0, 25.0, 49.99] {
            let result = advise(&NutrientLevels::new(n, 100.0, 100.0));
            assert_eq!(result.advice, vec![NITROGEN_ADVICE]);
        }

        let result = advise(&NutrientLevels::new(30.0, 90.0, 10.0));
        assert_eq!(result.advice, vec![NITROGEN_ADVICE, POTASSIUM_ADVICE]);

        let result = advise(&NutrientLevels::new(80.0, 39.0, 90.0));
        assert_eq!(result.advice, vec![PHOSPHORUS_ADVICE]);
    }

    #[test]
    fn test_missing_levels_not_deficient() {
        let levels = NutrientLevels::from_payload(&json!({ "P": "12", "K": "high" }));
        assert_eq!(levels.nitrogen, None);
        assert_eq!(advise(&levels).advice, vec![PHOSPHORUS_ADVICE]);

        assert!(advise(&NutrientLevels::default()).advice.is_empty());
        assert!(advise(&NutrientLevels::from_payload(&json!({}))).advice.is_empty());
    }

    #[test]
    fn test_blank_levels_read_as_zero() {
        let levels = NutrientLevels::from_payload(&json!({ "N": null, "P": "", "K": true }));
        assert_eq!(
            advise(&levels).advice,
            vec![NITROGEN_ADVICE, PHOSPHORUS_ADVICE, POTASSIUM_ADVICE]
        );

        let levels = NutrientLevels::from_payload(&json!({ "N": [], "P": ["45"], "K": { "v": 1 } }));
        assert_eq!(advise(&levels).advice, vec![NITROGEN_ADVICE]);
    }
}
