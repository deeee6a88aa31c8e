//! Incoming scoring request and its validation

use crate::error::ScoringError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier used when the caller omits `tx_id`
pub const DEFAULT_TRANSACTION_ID: &str = "TXN-MANUAL";

/// Currency used when the caller omits `currency`
pub const DEFAULT_CURRENCY: &str = "USD";

/// A validated transaction to be scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRequest {
    /// Caller-supplied transaction identifier
    #[serde(rename = "tx_id")]
    pub transaction_id: String,

    /// Declared currency code, looked up case-sensitively
    pub currency: String,

    /// Amount in the declared currency
    pub amount: f64,
}

impl RiskRequest {
    /// Create a request with default identifier and currency
    pub fn new(amount: f64) -> Self {
        Self {
            transaction_id: DEFAULT_TRANSACTION_ID.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            amount,
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = transaction_id.into();
        self
    }

    /// Parse and validate a raw request body.
    ///
    /// An empty or non-JSON body, or JSON that is not an object, is rejected.
    pub fn from_body(body: &[u8]) -> Result<Self, ScoringError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ScoringError::invalid_input("Request body is empty"));
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ScoringError::invalid_input(format!("Malformed JSON body: {}", e)))?;

        Self::from_value(&value)
    }

    /// Validate an already-decoded JSON value.
    pub fn from_value(value: &Value) -> Result<Self, ScoringError> {
        let fields = value
            .as_object()
            .ok_or_else(|| ScoringError::invalid_input("Request body must be a JSON object"))?;

        let transaction_id = string_field(fields, "tx_id", DEFAULT_TRANSACTION_ID)?;
        let currency = string_field(fields, "currency", DEFAULT_CURRENCY)?;
        let amount = match fields.get("amount") {
            None => 0.0,
            Some(raw) => coerce_amount(raw)?,
        };

        Ok(Self {
            transaction_id,
            currency,
            amount,
        })
    }
}

/// Read an optional string field, `null` counting as absent
fn string_field(
    fields: &Map<String, Value>,
    name: &str,
    default: &str,
) -> Result<String, ScoringError> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(default.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ScoringError::invalid_input(format!(
            "Field '{}' must be a string, got {}",
            name,
            json_type_name(other)
        ))),
    }
}

/// Coerce a JSON number or numeric string into a finite float
pub fn coerce_amount(raw: &Value) -> Result<f64, ScoringError> {
    let amount = match raw {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ScoringError::invalid_input(format!("Amount {} is out of range", n)))?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| {
            ScoringError::invalid_input(format!(
                "could not convert string to float: '{}'",
                s
            ))
        })?,
        other => {
            return Err(ScoringError::invalid_input(format!(
                "Amount must be a number or numeric string, got {}",
                json_type_name(other)
            )))
        }
    };

    if !amount.is_finite() {
        return Err(ScoringError::invalid_input(format!(
            "Amount must be finite, got {}",
            amount
        )));
    }

    Ok(amount)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
