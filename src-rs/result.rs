use serde::{Deserialize, Serialize};

/// Payload of the main-spec lookup as produced by the generation backend.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainSpec {
    pub product_name: String,
    pub specification: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub country_of_origin: Option<String>,
}

/// Payload of the certification lookup.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationNumbers {
    #[serde(default)]
    pub kats_certification_number: Option<String>,
    #[serde(default)]
    pub kc_certification_number: Option<String>,
}

/// Merged product specification handed back to callers.
///
/// Enrichment consumes `self` and returns a new value, so a result that has
/// already been delivered is never touched by a later merge step.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub product_name: String,
    pub specification: String,
    pub model_name: String,
    pub kats_certification_number: Option<String>,
    pub kc_certification_number: Option<String>,
    pub manufacturer: Option<String>,
    pub country_of_origin: Option<String>,
    pub g2b_classification_number: Option<String>,
}

impl GenerationResult {
    pub fn from_main_spec(spec: MainSpec) -> Self {
        Self {
            product_name: spec.product_name,
            specification: spec.specification,
            model_name: spec.model_name,
            kats_certification_number: None,
            kc_certification_number: None,
            manufacturer: spec.manufacturer,
            country_of_origin: spec.country_of_origin,
            g2b_classification_number: None,
        }
    }

    pub fn with_certification(mut self, cert: CertificationNumbers) -> Self {
        self.kats_certification_number = cert.kats_certification_number;
        self.kc_certification_number = cert.kc_certification_number;
        self
    }

    pub fn with_classification(mut self, code: Option<String>) -> Self {
        if code.is_some() {
            self.g2b_classification_number = code;
        }
        self
    }

    /// A scraped country always replaces the generated guess.
    pub fn with_country_of_origin(mut self, country: Option<String>) -> Self {
        if country.is_some() {
            self.country_of_origin = country;
        }
        self
    }
}

/// Result of the single-lookup general product flow.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralSpecResult {
    pub product_name: String,
    pub specification: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub country_of_origin: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn main_spec() -> MainSpec {
        MainSpec {
            product_name: "Air purifier".to_string(),
            specification: "AX40R3080WMD, 40m2".to_string(),
            model_name: "AX40R3080WMD".to_string(),
            manufacturer: Some("Samsung".to_string()),
            country_of_origin: Some("South Korea".to_string()),
        }
    }

    #[test]
    fn scraped_country_overwrites_generated_guess() {
        let result = GenerationResult::from_main_spec(main_spec())
            .with_country_of_origin(Some("Thailand".to_string()));
        assert_eq!(result.country_of_origin.as_deref(), Some("Thailand"));
    }

    #[test]
    fn absent_enrichments_keep_base_fields() {
        let result = GenerationResult::from_main_spec(main_spec())
            .with_classification(None)
            .with_country_of_origin(None);
        assert_eq!(result.country_of_origin.as_deref(), Some("South Korea"));
        assert_eq!(result.g2b_classification_number, None);
        assert_eq!(result.model_name, "AX40R3080WMD");
    }

    #[test]
    fn certification_fills_both_numbers() {
        let result = GenerationResult::from_main_spec(main_spec()).with_certification(
            CertificationNumbers {
                kats_certification_number: Some("HU07123-20001".to_string()),
                kc_certification_number: Some("R-R-SEC-AX40".to_string()),
            },
        );
        assert_eq!(result.kats_certification_number.as_deref(), Some("HU07123-20001"));
        assert_eq!(result.kc_certification_number.as_deref(), Some("R-R-SEC-AX40"));
    }

    #[test]
    fn serializes_absent_fields_as_null() {
        let value = serde_json::to_value(GenerationResult::from_main_spec(main_spec())).unwrap();
        assert_eq!(value["productName"], "Air purifier");
        assert!(value["g2bClassificationNumber"].is_null());
        assert!(value.get("katsCertificationNumber").is_some());
    }
}
