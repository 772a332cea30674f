use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;

/// Tunables of the analysis.
///
/// Every field has a default, so a JSON document only needs to name the
/// fields it changes:
///
/// ```
/// use squirrel_semantic::config::AnalysisConfig;
///
/// let config = AnalysisConfig::from_json(r#"{ "max_depth": 64 }"#).unwrap();
/// assert_eq!(config.max_depth, 64);
/// assert_eq!(config.magic_getter, "_get");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Callees whose literal first argument names another unit or asset.
    pub import_functions: Vec<String>,
    pub magic_getter: String,
    pub magic_setter: String,
    /// Pseudo-type returned by functions containing `yield`.
    pub generator_type: String,
    /// Nested resolution steps allowed before a query gives up.
    pub max_depth: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            import_functions: vec!["require".to_string(), "require_optional".to_string()],
            magic_getter: "_get".to_string(),
            magic_setter: "_set".to_string(),
            generator_type: "Generator".to_string(),
            max_depth: 256,
        }
    }
}

impl AnalysisConfig {
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfig`] when `text` is not a valid
    /// configuration document.
    pub fn from_json(text: &str) -> Result<Self, AnalysisError> {
        Ok(serde_json::from_str(text)?)
    }

    #[must_use]
    pub fn is_import_function(&self, name: &str) -> bool {
        self.import_functions.iter().any(|function| function == name)
    }
}
