//! Formula handlers
//!
//! Validation errors (unknown variables, bad conditions) are client errors and
//! map to 400. Syntax and evaluation errors are part of a normal `Evaluation`.

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::{AppError, MAX_FORMULAS_PER_REQUEST};
use chatpulse_core::formula::{
    evaluate_batch, Condition, Evaluation, FormulaDefinition, FormulaExpression, FormulaReport,
    Variables,
};
use chatpulse_core::{compute_metrics, compute_metrics_with_previous, GroupAnalysisInput};

/// Request body for validation
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub expression: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub variables: Vec<String>,
}

/// Request body for evaluating one formula
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub expression: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Explicit bindings; override metrics computed from `group`
    #[serde(default)]
    pub variables: Variables,
    pub group: Option<GroupAnalysisInput>,
    pub previous: Option<GroupAnalysisInput>,
}

/// Request body for evaluating many formulas against the same bindings
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub formulas: Vec<FormulaDefinition>,
    #[serde(default)]
    pub variables: Variables,
    pub group: Option<GroupAnalysisInput>,
    pub previous: Option<GroupAnalysisInput>,
}

/// Metrics of `group` (if any) overlaid with explicit bindings
fn bindings(
    group: Option<&GroupAnalysisInput>,
    previous: Option<&GroupAnalysisInput>,
    explicit: Variables,
) -> Result<Variables, AppError> {
    let mut variables = match (group, previous) {
        (Some(group), Some(previous)) => compute_metrics_with_previous(group, previous).into_inner(),
        (Some(group), None) => compute_metrics(group).into_inner(),
        (None, Some(_)) => return Err(AppError::bad_request("'previous' requires 'group'")),
        (None, None) => Variables::new(),
    };
    variables.extend(explicit);
    Ok(variables)
}

fn validate(expression: &str, conditions: Vec<Condition>) -> Result<FormulaExpression, AppError> {
    FormulaExpression::new(expression, conditions).map_err(|e| AppError::bad_request(&e.to_string()))
}

/// POST /api/formulas/validate - Check a formula and list its variables
pub async fn validate_formula(Json(req): Json<ValidateRequest>) -> Result<Json<ValidateResponse>, AppError> {
    let formula = validate(&req.expression, req.conditions)?;
    if let Some(err) = formula.syntax_error() {
        return Err(AppError::bad_request(&err.to_string()));
    }

    Ok(Json(ValidateResponse {
        variables: formula.variables().iter().cloned().collect(),
    }))
}

/// POST /api/formulas/evaluate - Evaluate one formula
pub async fn evaluate_formula(Json(req): Json<EvaluateRequest>) -> Result<Json<Evaluation>, AppError> {
    let formula = validate(&req.expression, req.conditions)?;
    let variables = bindings(req.group.as_ref(), req.previous.as_ref(), req.variables)?;

    Ok(Json(formula.evaluate(&variables)))
}

/// POST /api/formulas/evaluate-batch - Evaluate many formulas
///
/// A rejected formula is reported in its own entry; the others still run.
pub async fn evaluate_formula_batch(
    Json(req): Json<BatchRequest>,
) -> Result<Json<Vec<FormulaReport>>, AppError> {
    if req.formulas.len() > MAX_FORMULAS_PER_REQUEST {
        return Err(AppError::bad_request(&format!(
            "Too many formulas: {} (max {})",
            req.formulas.len(),
            MAX_FORMULAS_PER_REQUEST
        )));
    }

    let variables = bindings(req.group.as_ref(), req.previous.as_ref(), req.variables)?;

    Ok(Json(evaluate_batch(&req.formulas, &variables)))
}
