//! Compiler configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VigilError};

/// Knobs for the template compiler.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust,ignore
/// let options = CompilerOptions::from_json(r#"{"directive_prefix": "v-"}"#)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Attribute prefix that marks a directive, e.g. `k-text`.
    pub directive_prefix: String,
    /// Opening interpolation delimiter.
    pub open_delimiter: String,
    /// Closing interpolation delimiter.
    pub close_delimiter: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            directive_prefix: "k-".to_string(),
            open_delimiter: "{{".to_string(),
            close_delimiter: "}}".to_string(),
        }
    }
}

impl CompilerOptions {
    /// Parse options from JSON, filling omitted fields with defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Reject options the compiler cannot scan with.
    pub fn validate(&self) -> Result<()> {
        if self.directive_prefix.is_empty() {
            return Err(VigilError::InvalidOptions(
                "directive_prefix must not be empty".to_string(),
            ));
        }
        if self.open_delimiter.is_empty() || self.close_delimiter.is_empty() {
            return Err(VigilError::InvalidOptions(
                "interpolation delimiters must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
