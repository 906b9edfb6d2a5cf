use serde::{Deserialize, Serialize};

/// The caller a generation is charged to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
}

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Immutable input of one model-spec generation.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    model: String,
    spec_example: String,
    product_name_example: Option<String>,
    principal: Principal,
}

impl GenerationRequest {
    pub fn new(
        model: impl Into<String>,
        spec_example: impl Into<String>,
        product_name_example: Option<String>,
        principal: Principal,
    ) -> Self {
        Self {
            model: model.into(),
            spec_example: spec_example.into(),
            product_name_example: product_name_example.filter(|s| !s.trim().is_empty()),
            principal,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn spec_example(&self) -> &str {
        &self.spec_example
    }

    pub fn product_name_example(&self) -> Option<&str> {
        self.product_name_example.as_deref()
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}

/// Input of the single-lookup general product flow.
#[derive(Clone, Debug)]
pub struct GeneralSpecRequest {
    pub product_name: String,
    pub spec_example: String,
    pub principal: Principal,
}
