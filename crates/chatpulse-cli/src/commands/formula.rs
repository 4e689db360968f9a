//! Formula command implementations

use std::path::Path;

use anyhow::{Context, Result};
use chatpulse_core::formula::{Condition, Evaluation, FormulaExpression, Variables};
use chatpulse_core::{compute_metrics, compute_metrics_with_previous, provider, GroupAnalysisInput};

/// Parse a `name=value` binding
pub fn parse_var(binding: &str) -> Result<(String, f64)> {
    let (name, value) = binding
        .split_once('=')
        .with_context(|| format!("Invalid --var '{}' (use name=value)", binding))?;
    let value: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for '{}': {}", name.trim(), value.trim()))?;
    Ok((name.trim().to_string(), value))
}

/// Parse `--condition` arguments
pub fn parse_conditions(raw: &[String]) -> Result<Vec<Condition>> {
    raw.iter()
        .map(|c| {
            c.parse::<Condition>()
                .with_context(|| format!("Invalid --condition '{}'", c))
        })
        .collect()
}

fn load_single_group(path: &Path) -> Result<GroupAnalysisInput> {
    let mut groups = provider::load_groups(path)
        .with_context(|| format!("Failed to read group from {}", path.display()))?;
    match groups.len() {
        1 => Ok(groups.remove(0)),
        n => anyhow::bail!("{} holds {} groups; expected exactly one", path.display(), n),
    }
}

/// Bindings from group metrics (if any) overlaid with explicit `--var`s
pub fn build_variables(
    vars: &[String],
    group: Option<&Path>,
    previous: Option<&Path>,
) -> Result<Variables> {
    let mut variables = match (group, previous) {
        (Some(group), Some(previous)) => {
            let current = load_single_group(group)?;
            let previous = load_single_group(previous)?;
            compute_metrics_with_previous(&current, &previous).into_inner()
        }
        (Some(group), None) => compute_metrics(&load_single_group(group)?).into_inner(),
        (None, Some(_)) => anyhow::bail!("--previous requires --group"),
        (None, None) => Variables::new(),
    };

    for binding in vars {
        let (name, value) = parse_var(binding)?;
        variables.insert(name, value);
    }

    Ok(variables)
}

pub fn cmd_formula_check(expr: &str, conditions: &[String]) -> Result<()> {
    let conditions = parse_conditions(conditions)?;
    let formula = FormulaExpression::new(expr, conditions)?;

    if let Some(err) = formula.syntax_error() {
        anyhow::bail!("{} in '{}'", err, formula.expression());
    }

    println!("✅ Formula is valid");
    println!("   {}", formula.expression());
    if formula.variables().is_empty() {
        println!("   Variables: (none)");
    } else {
        let names: Vec<&str> = formula.variables().iter().map(String::as_str).collect();
        println!("   Variables: {}", names.join(", "));
    }
    for condition in formula.conditions() {
        println!(
            "   Condition: {} {} {}",
            condition.field, condition.operator, condition.value
        );
    }

    Ok(())
}

pub fn cmd_formula_eval(
    expr: &str,
    vars: &[String],
    conditions: &[String],
    group: Option<&Path>,
    previous: Option<&Path>,
    json: bool,
) -> Result<()> {
    let conditions = parse_conditions(conditions)?;
    let formula = FormulaExpression::new(expr, conditions)?;
    let variables = build_variables(vars, group, previous)?;

    let evaluation = formula.evaluate(&variables);

    if json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
    } else {
        print_evaluation(&evaluation);
    }

    Ok(())
}

fn print_evaluation(evaluation: &Evaluation) {
    println!();
    println!("🧮 {}", evaluation.expression);
    println!("   ─────────────────────────────────────────────────────────");
    println!("   Substituted: {}", evaluation.substituted_expression);

    match (&evaluation.result, &evaluation.error) {
        (Some(result), _) => println!("   Result:      {}", result),
        (None, Some(error)) => println!("   Error:       {}", error),
        (None, None) => println!("   Result:      (none)"),
    }

    for c in &evaluation.condition_results {
        let actual = c
            .actual
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unbound".to_string());
        println!(
            "   {} {} {} {} (actual: {})",
            if c.passed { "✓" } else { "✗" },
            c.field,
            c.operator,
            c.expected,
            actual
        );
    }

    println!();
    if evaluation.triggered {
        println!("   🔔 Triggered");
    } else {
        println!("   Not triggered");
    }
}
