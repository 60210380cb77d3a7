//! Product attribute schemas
//!
//! Every product type has an explicit schema; an incoming attribute bag is
//! only accepted once it has been checked against the schema for its type
//! and converted into typed values. Schemas come from JSON configuration.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const BUILTIN_PRODUCT_TYPES: &str = include_str!("product_types.json");

/// Attribute validation / configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttributeError {
    #[error("Unknown product type: {0}")]
    UnknownProductType(String),

    #[error("Unknown attribute '{field}' for product type '{product_type}'")]
    UnknownField { product_type: String, field: String },

    #[error("Missing required attribute '{0}'")]
    MissingField(String),

    #[error("Attribute '{field}' must be {expected}")]
    WrongKind { field: String, expected: &'static str },

    #[error("'{value}' is not an allowed value for '{field}'")]
    OptionNotAllowed { field: String, value: String },

    #[error("Attribute '{0}' is out of range")]
    OutOfRange(String),

    #[error("Attribute '{field}' exceeds {max} characters")]
    TooLong { field: String, max: usize },

    #[error("Invalid product type configuration: {0}")]
    InvalidConfig(String),
}

/// Value kind accepted by a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Boolean,
    Select {
        options: Vec<String>,
    },
    MultiSelect {
        options: Vec<String>,
    },
}

/// One attribute of a product type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeField {
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSchema {
    pub label: String,
    pub fields: Vec<AttributeField>,
}

impl AttributeSchema {
    pub fn field(&self, key: &str) -> Option<&AttributeField> {
        self.fields.iter().find(|f| f.key == key)
    }
}

/// Typed attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Boolean(bool),
    Number(f64),
    Text(String),
    Choices(Vec<String>),
}

/// Attribute bag that passed validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAttributes {
    pub product_type: String,
    pub values: BTreeMap<String, AttributeValue>,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    product_types: BTreeMap<String, AttributeSchema>,
}

/// Registry mapping product-type tag to its schema
#[derive(Debug, Clone, PartialEq)]
pub struct ProductTypeRegistry {
    types: BTreeMap<String, AttributeSchema>,
}

impl ProductTypeRegistry {
    /// Registry shipped with the binary
    pub fn builtin() -> Result<Self, AttributeError> {
        Self::from_json(BUILTIN_PRODUCT_TYPES)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AttributeError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AttributeError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, AttributeError> {
        let file: RegistryFile =
            serde_json::from_str(raw).map_err(|e| AttributeError::InvalidConfig(e.to_string()))?;

        for (tag, schema) in &file.product_types {
            check_schema(tag, schema)?;
        }

        Ok(Self {
            types: file.product_types,
        })
    }

    pub fn schema(&self, product_type: &str) -> Option<&AttributeSchema> {
        self.types.get(product_type)
    }

    pub fn schemas(&self) -> &BTreeMap<String, AttributeSchema> {
        &self.types
    }

    /// Check an open attribute bag against the schema for `product_type`
    pub fn validate(
        &self,
        product_type: &str,
        attributes: &Map<String, Value>,
    ) -> Result<ProductAttributes, AttributeError> {
        let schema = self
            .schema(product_type)
            .ok_or_else(|| AttributeError::UnknownProductType(product_type.to_string()))?;

        if let Some(field) = attributes.keys().find(|key| schema.field(key).is_none()) {
            return Err(AttributeError::UnknownField {
                product_type: product_type.to_string(),
                field: field.clone(),
            });
        }

        let mut values = BTreeMap::new();
        for field in &schema.fields {
            match attributes.get(&field.key) {
                None | Some(Value::Null) => {
                    if field.required {
                        return Err(AttributeError::MissingField(field.key.clone()));
                    }
                }
                Some(raw) => {
                    values.insert(field.key.clone(), coerce(field, raw)?);
                }
            }
        }

        Ok(ProductAttributes {
            product_type: product_type.to_string(),
            values,
        })
    }
}

fn check_schema(tag: &str, schema: &AttributeSchema) -> Result<(), AttributeError> {
    let mut seen = HashSet::new();
    for field in &schema.fields {
        if !seen.insert(field.key.as_str()) {
            return Err(AttributeError::InvalidConfig(format!(
                "duplicate field '{}' in '{tag}'",
                field.key
            )));
        }
        match &field.kind {
            FieldKind::Select { options } | FieldKind::MultiSelect { options }
                if options.is_empty() =>
            {
                return Err(AttributeError::InvalidConfig(format!(
                    "field '{}' in '{tag}' has no options",
                    field.key
                )));
            }
            FieldKind::Number {
                min: Some(min),
                max: Some(max),
            } if min > max => {
                return Err(AttributeError::InvalidConfig(format!(
                    "field '{}' in '{tag}' has min > max",
                    field.key
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

fn coerce(field: &AttributeField, raw: &Value) -> Result<AttributeValue, AttributeError> {
    let wrong_kind = |expected| AttributeError::WrongKind {
        field: field.key.clone(),
        expected,
    };

    match &field.kind {
        FieldKind::Text { max_length } => {
            let text = raw.as_str().ok_or_else(|| wrong_kind("text"))?.trim();
            if let Some(max) = *max_length
                && text.chars().count() > max
            {
                return Err(AttributeError::TooLong {
                    field: field.key.clone(),
                    max,
                });
            }
            if text.is_empty() && field.required {
                return Err(AttributeError::MissingField(field.key.clone()));
            }
            Ok(AttributeValue::Text(text.to_string()))
        }
        FieldKind::Number { min, max } => {
            let number = raw.as_f64().ok_or_else(|| wrong_kind("a number"))?;
            let below = min.is_some_and(|min| number < min);
            let above = max.is_some_and(|max| number > max);
            if below || above {
                return Err(AttributeError::OutOfRange(field.key.clone()));
            }
            Ok(AttributeValue::Number(number))
        }
        FieldKind::Boolean => raw
            .as_bool()
            .map(AttributeValue::Boolean)
            .ok_or_else(|| wrong_kind("true or false")),
        FieldKind::Select { options } => {
            let choice = raw.as_str().ok_or_else(|| wrong_kind("one of the options"))?;
            ensure_option(field, options, choice)?;
            Ok(AttributeValue::Text(choice.to_string()))
        }
        FieldKind::MultiSelect { options } => {
            let items = raw.as_array().ok_or_else(|| wrong_kind("a list of options"))?;
            let mut choices = Vec::with_capacity(items.len());
            for item in items {
                let choice = item.as_str().ok_or_else(|| wrong_kind("a list of options"))?;
                ensure_option(field, options, choice)?;
                if !choices.iter().any(|c| c == choice) {
                    choices.push(choice.to_string());
                }
            }
            Ok(AttributeValue::Choices(choices))
        }
    }
}

fn ensure_option(
    field: &AttributeField,
    options: &[String],
    choice: &str,
) -> Result<(), AttributeError> {
    if options.iter().any(|o| o == choice) {
        Ok(())
    } else {
        Err(AttributeError::OptionNotAllowed {
            field: field.key.clone(),
            value: choice.to_string(),
        })
    }
}
