use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::part::CarPart;

/// Car models the factory knows how to build, with the parts each requires.
///
/// Serialized as a map of model name to part list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlueprintLibrary(BTreeMap<String, Vec<CarPart>>);

impl BlueprintLibrary {
    /// A library with no known models.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with_blueprint(mut self, car_model: impl Into<String>, parts: Vec<CarPart>) -> Self {
        self.0.insert(car_model.into(), parts);
        self
    }

    /// Parts required to build `car_model`, if the model is known.
    pub fn required_parts(&self, car_model: &str) -> Option<&[CarPart]> {
        self.0.get(car_model).map(Vec::as_slice)
    }
}

impl Default for BlueprintLibrary {
    fn default() -> Self {
        Self::empty().with_blueprint(
            "Model T",
            vec![
                CarPart::new("wheels", 6),
                CarPart::new("engine", 1),
                CarPart::new("bits and pieces", 2),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_library_knows_model_t() {
        let library = BlueprintLibrary::default();
        let parts = library.required_parts("Model T").unwrap();
        assert_eq!(parts.len(), 3);
        assert!(library.required_parts("Model S").is_none());
    }

    #[test]
    fn deserializes_from_model_map() {
        let library: BlueprintLibrary = serde_json::from_str(
            r#"{ "Model A": [ { "name": "wheels", "quantity": 4 } ] }"#,
        )
        .unwrap();
        assert_eq!(
            library.required_parts("Model A"),
            Some(&[CarPart::new("wheels", 4)][..])
        );
    }
}
