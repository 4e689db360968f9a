//! Custom insight formulas
//!
//! Users write small expressions over catalog metrics such as
//! `participation_rate > 70 && active_members > 20`, optionally with
//! threshold conditions. Expressions are tokenized, parsed into an AST and
//! evaluated against a map of metric values; nothing is ever executed as
//! code.
//!
//! Grammar: numbers, identifiers, `true`/`false`, `+ - * / %`,
//! `> >= < <= == !=`, `&&`/`and`, `||`/`or`, unary `-` and parentheses.

pub mod condition;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;

pub use condition::{Condition, ConditionOperator, ConditionResult, ConditionValue, RESULT_FIELD};
pub use error::{FormulaError, FormulaResult};
pub use eval::{
    evaluate, evaluate_batch, extract_variable_names, substitute, Evaluation, FormulaDefinition,
    FormulaExpression, FormulaReport, Value, Variables,
};
pub use parser::{Expr, Parser};
