// agrisense/core/inference/src/schema.rs

// Hard-coded input contracts for each served model.
//
// Field order is the column order the models were trained on and cannot be
// recovered at runtime. Changing it without retraining produces silent garbage.
use crate::error::InvalidInputError;
use agrisense_models::ModelId;
use serde_json::{Map, Value};
use std::fmt;

/// Soil types in training label-encoding order
pub const SOIL_TYPES: &[&str] = &["Black", "Clayey", "Loamy", "Red", "Sandy"];

/// Crop types in training label-encoding order
pub const CROP_TYPES: &[&str] = &[
    "Barley",
    "Cotton",
    "Ground Nuts",
    "Maize",
    "Millets",
    "Oil seeds",
    "Paddy",
    "Pulses",
    "Sugarcane",
    "Tobacco",
    "Wheat",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// A JSON number within the inclusive bounds
    Numeric { min: f64, max: f64 },
    /// Either the integer code or the case-insensitive category name
    Categorical { categories: &'static [&'static str] },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Alternative spellings accepted from clients
    pub aliases: &'static [&'static str],
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn numeric(
        name: &'static str,
        aliases: &'static [&'static str],
        min: f64,
        max: f64,
    ) -> Self {
        Self {
            name,
            aliases,
            kind: FieldKind::Numeric { min, max },
        }
    }

    const fn categorical(
        name: &'static str,
        aliases: &'static [&'static str],
        categories: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            aliases,
            kind: FieldKind::Categorical { categories },
        }
    }

    /// Exact name first, then the name or any alias ignoring ASCII case
    fn lookup<'a>(&self, fields: &'a Map<String, Value>) -> Option<&'a Value> {
        fields.get(self.name).or_else(|| {
            fields.iter().find_map(|(key, value)| {
                let key = key.trim();
                let matches = key.eq_ignore_ascii_case(self.name)
                    || self.aliases.iter().any(|alias| key.eq_ignore_ascii_case(alias));
                matches.then_some(value)
            })
        })
    }

    /// Validate one value and encode it as a feature
    fn encode(&self, value: &Value) -> Result<f64, InvalidInputError> {
        match self.kind {
            FieldKind::Numeric { min, max } => {
                let x = value.as_f64().ok_or(InvalidInputError::WrongType {
                    field: self.name,
                    expected: "a number",
                    found: json_type(value),
                })?;
                if x < min || x > max {
                    return Err(InvalidInputError::OutOfRange {
                        field: self.name,
                        value: x,
                        min,
                        max,
                    });
                }
                Ok(x)
            }
            FieldKind::Categorical { categories } => match value {
                Value::String(name) => categories
                    .iter()
                    .position(|c| c.eq_ignore_ascii_case(name.trim()))
                    .map(|code| code as f64)
                    .ok_or_else(|| InvalidInputError::UnknownCategory {
                        field: self.name,
                        value: name.clone(),
                    }),
                Value::Number(n) => {
                    // 1 and 1.0 are the same code
                    let code = n.as_f64().unwrap_or(f64::NAN);
                    if code.fract() != 0.0 {
                        return Err(InvalidInputError::WrongType {
                            field: self.name,
                            expected: "an integer category code",
                            found: "a fractional number",
                        });
                    }
                    if code < 0.0 || code >= categories.len() as f64 {
                        return Err(InvalidInputError::OutOfRange {
                            field: self.name,
                            value: code,
                            min: 0.0,
                            max: (categories.len() - 1) as f64,
                        });
                    }
                    Ok(code)
                }
                other => Err(InvalidInputError::WrongType {
                    field: self.name,
                    expected: "a category name or integer code",
                    found: json_type(other),
                }),
            },
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Ordered input contract of one model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSchema {
    pub model: ModelId,
    pub fields: &'static [FieldSpec],
}

// Nutrient spellings shared by both schemas
const NITROGEN: &[&str] = &["nitrogen"];
const PHOSPHORUS: &[&str] = &["phosphorus", "phosphorous"];
const POTASSIUM: &[&str] = &["potassium"];

/// `[N, P, K, temperature, humidity, ph, rainfall]`
pub const CROP_SCHEMA: FeatureSchema = FeatureSchema {
    model: ModelId::Classifier,
    fields: &[
        FieldSpec::numeric("N", NITROGEN, 0.0, 1000.0),
        FieldSpec::numeric("P", PHOSPHORUS, 0.0, 1000.0),
        FieldSpec::numeric("K", POTASSIUM, 0.0, 1000.0),
        FieldSpec::numeric("temperature", &[], -50.0, 60.0),
        FieldSpec::numeric("humidity", &[], 0.0, 100.0),
        FieldSpec::numeric("ph", &[], 0.0, 14.0),
        FieldSpec::numeric("rainfall", &[], 0.0, 5000.0),
    ],
};

/// `[N, P, K, soil_type, crop_type]`
pub const FERTILIZER_SCHEMA: FeatureSchema = FeatureSchema {
    model: ModelId::Fertilizer,
    fields: &[
        FieldSpec::numeric("N", NITROGEN, 0.0, 1000.0),
        FieldSpec::numeric("P", PHOSPHORUS, 0.0, 1000.0),
        FieldSpec::numeric("K", POTASSIUM, 0.0, 1000.0),
        FieldSpec::categorical("soil_type", &["Soil Type"], SOIL_TYPES),
        FieldSpec::categorical("crop_type", &["Crop Type"], CROP_TYPES),
    ],
};

impl FeatureSchema {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.to_string()).collect()
    }

    /// Validate `body` and build the feature vector in training order.
    ///
    /// Fails on the first field, in schema order, that is missing or invalid.
    /// Unknown extra fields are ignored.
    pub fn build(&self, body: &Value) -> Result<FeatureVector, InvalidInputError> {
        let fields = body.as_object().ok_or(InvalidInputError::NotAnObject)?;

        let values = self
            .fields
            .iter()
            .map(|spec| {
                let value = spec
                    .lookup(fields)
                    .ok_or(InvalidInputError::MissingField { field: spec.name })?;
                spec.encode(value)
            })
            .collect::<Result<Vec<f64>, _>>()?;

        Ok(FeatureVector(values))
    }
}

/// Feature values in the order a model expects
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
