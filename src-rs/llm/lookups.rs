use serde::de::DeserializeOwned;

use super::extract::parse_payload;
use crate::result::{CertificationNumbers, GeneralSpecResult, MainSpec};

/// One kind of generation-backend question: how to ask it and how to read
/// the answer.
pub trait Lookup {
    type Output: DeserializeOwned + Send;

    const KIND: &'static str;

    fn prompt(&self) -> String;

    fn parse(&self, text: &str) -> Result<Self::Output, String> {
        parse_payload(text)
    }
}

pub struct MainSpecLookup<'a> {
    pub model: &'a str,
    pub spec_example: &'a str,
    pub product_name_example: Option<&'a str>,
}

impl Lookup for MainSpecLookup<'_> {
    type Output = MainSpec;

    const KIND: &'static str = "main_spec";

    fn prompt(&self) -> String {
        let naming = match self.product_name_example.filter(|s| !s.trim().is_empty()) {
            Some(example) => format!(
                "Product name format example: '{}'. Name the product in exactly this style.\n",
                example
            ),
            None => "Give the product a concise name that does not repeat the model name.\n".to_string(),
        };
        format!(
            "You research product data with extreme accuracy.\n\
             Target model: '{model}'.\n\
             {naming}\
             Specification format example: '{spec}'.\n\
             Use the manufacturer's official site first, then major retailers. Find the manufacturer and the \
             country of origin. Write the specification in the example's format. The product name must be at \
             most 40 characters and the specification at most 50 characters.\n\
             Reply with JSON only, no commentary:\n\
             {{\"productName\":\"...\",\"specification\":\"...\",\"modelName\":\"{model}\",\
             \"manufacturer\":\"...\",\"countryOfOrigin\":\"...\"}}",
            model = self.model,
            naming = naming,
            spec = self.spec_example,
        )
    }

    fn parse(&self, text: &str) -> Result<MainSpec, String> {
        let mut spec: MainSpec = parse_payload(text)?;
        if spec.model_name.trim().is_empty() {
            spec.model_name = self.model.to_string();
        }
        Ok(spec)
    }
}

pub struct CertificationLookup<'a> {
    pub model: &'a str,
}

impl Lookup for CertificationLookup<'_> {
    type Output = CertificationNumbers;

    const KIND: &'static str = "certification";

    fn prompt(&self) -> String {
        format!(
            "Find the regulatory certification numbers for model '{model}'.\n\
             Only report numbers whose certificate lists exactly this model; leave a field empty otherwise.\n\
             Reply with JSON only:\n\
             {{\"katsCertificationNumber\":\"electrical safety certification number\",\
             \"kcCertificationNumber\":\"radio conformity certification number\"}}",
            model = self.model,
        )
    }

    fn parse(&self, text: &str) -> Result<CertificationNumbers, String> {
        let cert: CertificationNumbers = parse_payload(text)?;
        Ok(CertificationNumbers {
            kats_certification_number: non_blank(cert.kats_certification_number),
            kc_certification_number: non_blank(cert.kc_certification_number),
        })
    }
}

pub struct GeneralSpecLookup<'a> {
    pub product_name: &'a str,
    pub spec_example: &'a str,
}

impl Lookup for GeneralSpecLookup<'_> {
    type Output = GeneralSpecResult;

    const KIND: &'static str = "general_spec";

    fn prompt(&self) -> String {
        format!(
            "Write a procurement specification for the product '{name}'.\n\
             Specification format example: '{spec}'.\n\
             Find the manufacturer and the country of origin if they can be determined.\n\
             Reply with JSON only:\n\
             {{\"productName\":\"...\",\"specification\":\"...\",\"manufacturer\":\"...\",\"countryOfOrigin\":\"...\"}}",
            name = self.product_name,
            spec = self.spec_example,
        )
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_spec_prompt_switches_on_name_example() {
        let with = MainSpecLookup {
            model: "AX40R3080WMD",
            spec_example: "W x D x H",
            product_name_example: Some("Air purifier"),
        };
        let without = MainSpecLookup {
            product_name_example: Some("  "),
            ..with
        };
        assert!(with.prompt().contains("'Air purifier'"));
        assert!(!without.prompt().contains("Product name format example"));
        assert!(without.prompt().contains("\"modelName\":\"AX40R3080WMD\""));
    }

    #[test]
    fn main_spec_falls_back_to_requested_model() {
        let lookup = MainSpecLookup {
            model: "MODEL-OK",
            spec_example: "",
            product_name_example: None,
        };
        let spec = lookup
            .parse("{\"productName\":\"Fan\",\"specification\":\"30cm\"}")
            .unwrap();
        assert_eq!(spec.model_name, "MODEL-OK");
        assert_eq!(spec.manufacturer, None);
    }

    #[test]
    fn main_spec_without_required_fields_is_rejected() {
        let lookup = MainSpecLookup {
            model: "M",
            spec_example: "",
            product_name_example: None,
        };
        assert!(lookup.parse("{\"specification\":\"30cm\"}").is_err());
    }

    #[test]
    fn certification_drops_blank_numbers() {
        let cert = CertificationLookup { model: "M" }
            .parse("{\"katsCertificationNumber\":\"\",\"kcCertificationNumber\":\"R-R-ABC\"}")
            .unwrap();
        assert_eq!(cert.kats_certification_number, None);
        assert_eq!(cert.kc_certification_number.as_deref(), Some("R-R-ABC"));
    }
}
