//! Threshold conditions attached to a formula

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog;

use super::error::{FormulaError, FormulaResult};

/// Field name that refers to the expression result
pub const RESULT_FIELD: &str = "result";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Between,
}

impl ConditionOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Eq => "eq",
            Self::Between => "between",
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConditionOperator {
    type Err = FormulaError;

    fn from_str(s: &str) -> FormulaResult<Self> {
        match s.to_lowercase().as_str() {
            "gt" => Ok(Self::Gt),
            "gte" => Ok(Self::Gte),
            "lt" => Ok(Self::Lt),
            "lte" => Ok(Self::Lte),
            "eq" => Ok(Self::Eq),
            "between" => Ok(Self::Between),
            _ => Err(FormulaError::InvalidCondition {
                field: String::new(),
                message: format!("unknown operator '{}'", s),
            }),
        }
    }
}

/// A single threshold or an inclusive `[min, max]` range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Single(f64),
    Range([f64; 2]),
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(v) => write!(f, "{}", v),
            Self::Range([min, max]) => write!(f, "[{}, {}]", min, max),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// `result` or a variable name
    pub field: String,
    pub operator: ConditionOperator,
    pub value: ConditionValue,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: ConditionOperator, value: ConditionValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn is_result(&self) -> bool {
        self.field == RESULT_FIELD
    }

    /// Check the field is known and the value shape matches the operator
    pub fn validate(&self) -> FormulaResult<()> {
        if !self.is_result() && !catalog::is_known_variable(&self.field) {
            return Err(FormulaError::UnknownConditionField(self.field.clone()));
        }

        let invalid = |message: &str| FormulaError::InvalidCondition {
            field: self.field.clone(),
            message: message.to_string(),
        };

        match (self.operator, self.value) {
            (ConditionOperator::Between, ConditionValue::Single(_)) => {
                Err(invalid("'between' requires a [min, max] pair"))
            }
            (ConditionOperator::Between, ConditionValue::Range([min, max])) if min > max => {
                Err(invalid("range minimum is greater than maximum"))
            }
            (ConditionOperator::Between, ConditionValue::Range(_)) => Ok(()),
            (op, ConditionValue::Range(_)) => Err(FormulaError::InvalidCondition {
                field: self.field.clone(),
                message: format!("'{}' takes a single value, not a range", op),
            }),
            (_, ConditionValue::Single(v)) if v.is_nan() => Err(invalid("value is not a number")),
            (_, ConditionValue::Single(_)) => Ok(()),
        }
    }

    /// Whether `actual` satisfies this condition
    pub fn holds(&self, actual: f64) -> bool {
        match (self.operator, self.value) {
            (ConditionOperator::Gt, ConditionValue::Single(v)) => actual > v,
            (ConditionOperator::Gte, ConditionValue::Single(v)) => actual >= v,
            (ConditionOperator::Lt, ConditionValue::Single(v)) => actual < v,
            (ConditionOperator::Lte, ConditionValue::Single(v)) => actual <= v,
            (ConditionOperator::Eq, ConditionValue::Single(v)) => actual == v,
            (ConditionOperator::Between, ConditionValue::Range([min, max])) => {
                actual >= min && actual <= max
            }
            _ => false,
        }
    }
}

/// Parse `field:operator:value`, where a `between` value is `min,max`
///
/// ```rust,ignore
/// let c: Condition = "active_members:between:5,20".parse()?;
/// ```
impl FromStr for Condition {
    type Err = FormulaError;

    fn from_str(s: &str) -> FormulaResult<Self> {
        let parts: Vec<&str> = s.splitn(3, ':').map(str::trim).collect();
        let [field, operator, value] = parts[..] else {
            return Err(FormulaError::InvalidCondition {
                field: s.to_string(),
                message: "expected field:operator:value".into(),
            });
        };

        let with_field = |e: FormulaError| match e {
            FormulaError::InvalidCondition { message, .. } => FormulaError::InvalidCondition {
                field: field.to_string(),
                message,
            },
            other => other,
        };
        let number = |text: &str| {
            text.trim()
                .parse::<f64>()
                .map_err(|_| FormulaError::InvalidCondition {
                    field: field.to_string(),
                    message: format!("'{}' is not a number", text.trim()),
                })
        };

        let operator: ConditionOperator = operator.parse().map_err(with_field)?;
        let value = match value.split_once(',') {
            Some((min, max)) => ConditionValue::Range([number(min)?, number(max)?]),
            None => ConditionValue::Single(number(value)?),
        };

        Ok(Self::new(field, operator, value))
    }
}

/// Outcome of one condition against bound values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionResult {
    pub field: String,
    pub operator: ConditionOperator,
    pub expected: ConditionValue,
    /// `None` when the field had no value (unbound variable or failed result)
    pub actual: Option<f64>,
    pub passed: bool,
}
