//! Formula evaluation
//!
//! A formula is validated once (`FormulaExpression::new`) and can then be
//! evaluated against any number of variable maps. Identifiers are resolved
//! directly against the map while walking the AST; the substituted form of
//! the expression is produced only for display.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog;

use super::condition::{Condition, ConditionResult};
use super::error::{FormulaError, FormulaResult};
use super::lexer::identifier_spans;
use super::parser::{BinaryOp, Expr, Parser, UnaryOp};

/// Variable bindings: metric name to value
pub type Variables = BTreeMap<String, f64>;

/// Result of evaluating an expression
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Bool(bool),
}

impl Value {
    /// Numeric view; booleans coerce to 1/0
    pub fn as_number(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Bool(true) => 1.0,
            Self::Bool(false) => 0.0,
        }
    }

    /// Non-zero, non-NaN numbers and `true` are truthy
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Bool(b) => *b,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Distinct non-keyword identifiers in the expression
pub fn extract_variable_names(expression: &str) -> BTreeSet<String> {
    identifier_spans(expression)
        .into_iter()
        .map(|span| span.name)
        .collect()
}

/// Replace each bound identifier with its value, leaving all other text as is
///
/// Works on identifier spans, so `total_messages` is never replaced inside
/// `prev_total_messages`.
pub fn substitute(expression: &str, variables: &Variables) -> String {
    let chars: Vec<char> = expression.chars().collect();
    let mut out = String::with_capacity(expression.len());
    let mut cursor = 0;

    for span in identifier_spans(expression) {
        let Some(value) = variables.get(&span.name) else {
            continue;
        };
        out.extend(&chars[cursor..span.start]);
        out.push_str(&value.to_string());
        cursor = span.end;
    }
    out.extend(&chars[cursor..]);
    out
}

/// A numeric value, rejecting NaN so it never reaches a comparison
fn number(n: f64) -> FormulaResult<Value> {
    if n.is_nan() {
        Err(FormulaError::NotANumber)
    } else {
        Ok(Value::Number(n))
    }
}

/// Evaluate a parsed expression
///
/// Any step producing NaN (`0/0`, `inf - inf`, `0 * inf`, a NaN binding)
/// fails with `NotANumber`.
pub fn evaluate_expr(expr: &Expr, variables: &Variables) -> FormulaResult<Value> {
    match expr {
        Expr::Literal(value) => Ok(*value),
        Expr::Identifier(name) => variables
            .get(name)
            .ok_or_else(|| FormulaError::UnboundVariable(name.clone()))
            .and_then(|v| number(*v)),
        Expr::Unary {
            op: UnaryOp::Neg,
            operand,
        } => number(-evaluate_expr(operand, variables)?.as_number()),
        Expr::Binary { op, left, right } => {
            let lhs = evaluate_expr(left, variables)?;

            // Short-circuit before touching the right side
            match op {
                BinaryOp::And if !lhs.is_truthy() => return Ok(Value::Bool(false)),
                BinaryOp::Or if lhs.is_truthy() => return Ok(Value::Bool(true)),
                _ => {}
            }

            let rhs = evaluate_expr(right, variables)?;
            let (l, r) = (lhs.as_number(), rhs.as_number());

            match op {
                BinaryOp::Add => number(l + r),
                BinaryOp::Sub => number(l - r),
                BinaryOp::Mul => number(l * r),
                // IEEE: x/0 is ±inf
                BinaryOp::Div => number(l / r),
                BinaryOp::Mod if r == 0.0 => Err(FormulaError::ModuloByZero),
                BinaryOp::Mod => number(l % r),
                BinaryOp::Gt => Ok(Value::Bool(l > r)),
                BinaryOp::Gte => Ok(Value::Bool(l >= r)),
                BinaryOp::Lt => Ok(Value::Bool(l < r)),
                BinaryOp::Lte => Ok(Value::Bool(l <= r)),
                BinaryOp::Eq => Ok(Value::Bool(l == r)),
                BinaryOp::NotEq => Ok(Value::Bool(l != r)),
                BinaryOp::And | BinaryOp::Or => Ok(Value::Bool(rhs.is_truthy())),
            }
        }
    }
}

/// Outcome of evaluating a formula against one set of bindings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub expression: String,
    /// `None` when evaluation failed
    pub result: Option<Value>,
    pub triggered: bool,
    pub substituted_expression: String,
    pub condition_results: Vec<ConditionResult>,
    pub error: Option<String>,
}

/// A validated formula: expression plus threshold conditions
#[derive(Debug, Clone)]
pub struct FormulaExpression {
    expression: String,
    variables: BTreeSet<String>,
    conditions: Vec<Condition>,
    ast: FormulaResult<Expr>,
}

impl FormulaExpression {
    /// Validate and parse a formula
    ///
    /// Validation errors (empty expression, unknown variables, bad conditions)
    /// are returned here. Syntax errors are kept and reported by every
    /// evaluation instead.
    pub fn new(expression: impl Into<String>, conditions: Vec<Condition>) -> FormulaResult<Self> {
        let expression = expression.into();
        if expression.trim().is_empty() {
            return Err(FormulaError::EmptyExpression);
        }

        // Report the first unknown identifier in textual order
        if let Some(unknown) = identifier_spans(&expression)
            .into_iter()
            .find(|span| !catalog::is_known_variable(&span.name))
        {
            return Err(FormulaError::UnknownVariable(unknown.name));
        }

        for condition in &conditions {
            condition.validate()?;
        }

        let variables = extract_variable_names(&expression);
        let ast = Parser::parse(&expression);

        Ok(Self {
            expression,
            variables,
            conditions,
            ast,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Distinct variables referenced by the expression
    pub fn variables(&self) -> &BTreeSet<String> {
        &self.variables
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// The syntax error, if the expression did not parse
    pub fn syntax_error(&self) -> Option<&FormulaError> {
        self.ast.as_ref().err()
    }

    /// Evaluate against a set of bindings
    ///
    /// Triggers only when the expression evaluates and every condition holds.
    /// A boolean result must also be `true`; a numeric result with no
    /// conditions triggers when it is non-zero.
    pub fn evaluate(&self, variables: &Variables) -> Evaluation {
        let outcome = self
            .ast
            .as_ref()
            .map_err(Clone::clone)
            .and_then(|ast| evaluate_expr(ast, variables));

        let result = outcome.as_ref().ok().copied();
        let condition_results: Vec<ConditionResult> = self
            .conditions
            .iter()
            .map(|condition| {
                let actual = if condition.is_result() {
                    result.map(|v| v.as_number())
                } else {
                    variables.get(&condition.field).copied()
                };
                ConditionResult {
                    field: condition.field.clone(),
                    operator: condition.operator,
                    expected: condition.value,
                    actual,
                    passed: actual.map_or(false, |v| condition.holds(v)),
                }
            })
            .collect();

        let gate = match result {
            Some(Value::Bool(b)) => b,
            Some(Value::Number(n)) => !self.conditions.is_empty() || n != 0.0,
            None => false,
        };
        let triggered = gate && condition_results.iter().all(|c| c.passed);

        tracing::debug!(
            expression = self.expression.as_str(),
            triggered,
            "Formula evaluated"
        );

        Evaluation {
            expression: self.expression.clone(),
            result,
            triggered,
            substituted_expression: substitute(&self.expression, variables),
            condition_results,
            error: outcome.err().map(|e| e.to_string()),
        }
    }
}

/// Validate and evaluate in one call
///
/// Only validation errors are returned as `Err`; evaluation failures are
/// reported inside the `Evaluation`.
pub fn evaluate(
    expression: &str,
    variables: &Variables,
    conditions: Vec<Condition>,
) -> FormulaResult<Evaluation> {
    Ok(FormulaExpression::new(expression, conditions)?.evaluate(variables))
}

/// A named formula as stored by a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaDefinition {
    pub name: String,
    pub expression: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Per-formula outcome of a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaReport {
    pub name: String,
    pub evaluation: Option<Evaluation>,
    /// Validation error text when the formula was rejected
    pub error: Option<String>,
}

/// Evaluate many formulas against the same bindings
///
/// Each formula is independent; a rejected formula never stops the others.
pub fn evaluate_batch(definitions: &[FormulaDefinition], variables: &Variables) -> Vec<FormulaReport> {
    definitions
        .iter()
        .map(|def| {
            match FormulaExpression::new(def.expression.as_str(), def.conditions.clone()) {
                Ok(formula) => FormulaReport {
                    name: def.name.clone(),
                    evaluation: Some(formula.evaluate(variables)),
                    error: None,
                },
                Err(e) => {
                    tracing::debug!(formula = def.name.as_str(), error = %e, "Formula rejected");
                    FormulaReport {
                        name: def.name.clone(),
                        evaluation: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect()
}
