//! Externally supplied codec parameter documents.
//!
//! A [`ParametersDocument`] lets an administrator or batch job state codec parameters without a live dataset.
//!
//! A document is JSON: either the identifier of a codec factory on its own,
//! ```json
//! "jpeg2000_lossless"
//! ```
//! or an object holding the identifier and a configuration interpreted by that factory.
//! ```json
//! {
//!     "name": "jpeg2000_lossy",
//!     "configuration": {
//!       "ratio": 15.0
//!     }
//! }
//! ```

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::factory::ConfigParseError;

/// A codec parameters document addressed to one codec factory.
#[derive(Clone, Debug, PartialEq)]
pub struct ParametersDocument {
    name: String,
    configuration: Map<String, Value>,
}

impl ParametersDocument {
    /// Create a document addressed to the factory identified by `name`, with an empty configuration.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            configuration: Map::new(),
        }
    }

    /// Parse a document from JSON text.
    ///
    /// # Errors
    /// Returns
    ///  - [`ConfigParseError::Malformed`] if `json` is not valid JSON, or
    ///  - [`ConfigParseError::InvalidDocument`] if it is not shaped like a parameters document.
    pub fn parse(json: &str) -> Result<Self, ConfigParseError> {
        let value: Value = serde_json::from_str(json).map_err(ConfigParseError::Malformed)?;
        match value {
            Value::String(name) => Ok(Self::new(&name)),
            Value::Object(mut fields) => {
                let name = match fields.remove("name") {
                    Some(Value::String(name)) => name,
                    Some(_) => return Err(invalid_document("\"name\" must be a string")),
                    None => return Err(invalid_document("\"name\" is missing")),
                };
                let configuration = match fields.remove("configuration") {
                    None | Some(Value::Null) => Map::new(),
                    Some(Value::Object(configuration)) => configuration,
                    Some(_) => return Err(invalid_document("\"configuration\" must be an object")),
                };
                if let Some(field) = fields.keys().next() {
                    return Err(invalid_document(&format!("unknown field \"{field}\"")));
                }
                Ok(Self {
                    name,
                    configuration,
                })
            }
            _ => Err(invalid_document(
                "expected a factory identifier or an object with \"name\" and \"configuration\"",
            )),
        }
    }

    /// Returns the identifier of the factory the document is addressed to.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Convert the configuration to the configuration type of a factory.
    ///
    /// # Errors
    /// Returns [`ConfigParseError::InvalidConfiguration`] if the configuration does not match `TConfiguration`.
    pub fn to_configuration<TConfiguration: DeserializeOwned>(
        &self,
    ) -> Result<TConfiguration, ConfigParseError> {
        serde_json::from_value(Value::Object(self.configuration.clone())).map_err(|err| {
            ConfigParseError::InvalidConfiguration {
                name: self.name.clone(),
                reason: err.to_string(),
            }
        })
    }
}

fn invalid_document(reason: &str) -> ConfigParseError {
    ConfigParseError::InvalidDocument(reason.to_string())
}
