//! # Condition Evaluator
//!
//! Evaluates a flat list of `(field, operator, value)` clauses against an
//! entity snapshot. The list is a logical AND that stops at the first false
//! clause; an empty list is true. There is no OR and no negation beyond `!=`
//! and `not_contains`.
//!
//! ## Absent fields
//!
//! A field missing from the snapshot makes every operator false except `!=`,
//! which is true. A JSON `null` that is present is an ordinary value.
//!
//! ## Type rules
//!
//! - `==` / `!=`: structural equality; numbers compare numerically, so
//!   `3 == 3.0`. Strings are case-sensitive.
//! - `>` `>=` `<` `<=`: two numbers, or two strings that both parse as dates
//!   (`YYYY-MM-DD` or RFC 3339). Anything else is a
//!   [`ConditionEvaluationError`], never a silent `false`.
//! - `contains` / `not_contains`: case-insensitive substring test on the
//!   string form of both sides.

use std::cmp::Ordering;

use juris_core::parse_date_like;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Read access to the fields a condition can reference.
pub trait Snapshot {
    /// Resolve a field name. `None` means the field is absent.
    fn field(&self, name: &str) -> Option<&Value>;
}

impl Snapshot for Map<String, Value> {
    fn field(&self, name: &str) -> Option<&Value> {
        lookup(self, name)
    }
}

/// Exact key first, then a dotted path through nested objects.
pub(crate) fn lookup<'a>(map: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    if let Some(value) = map.get(name) {
        return Some(value);
    }
    if !name.contains('.') {
        return None;
    }
    let mut segments = name.split('.');
    let mut current = map.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

// ---------------------------------------------------------------------------
// ConditionOperator
// ---------------------------------------------------------------------------

/// Comparison operator of a condition clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ConditionOperator {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterOrEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessOrEqual,
    /// `contains`
    Contains,
    /// `not_contains`
    NotContains,
}

impl ConditionOperator {
    /// All operators, in wire-table order.
    pub const ALL: [ConditionOperator; 8] = [
        Self::Equal,
        Self::NotEqual,
        Self::GreaterThan,
        Self::GreaterOrEqual,
        Self::LessThan,
        Self::LessOrEqual,
        Self::Contains,
        Self::NotContains,
    ];

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::GreaterThan => ">",
            Self::GreaterOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessOrEqual => "<=",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
        }
    }

    /// Parse the wire representation.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownOperator(s.to_string()))
    }

    /// Whether this operator needs an ordering between the operands.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Self::GreaterThan | Self::GreaterOrEqual | Self::LessThan | Self::LessOrEqual
        )
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Self::GreaterThan => ordering == Ordering::Greater,
            Self::GreaterOrEqual => ordering != Ordering::Less,
            Self::LessThan => ordering == Ordering::Less,
            Self::LessOrEqual => ordering != Ordering::Greater,
            Self::Equal | Self::NotEqual | Self::Contains | Self::NotContains => false,
        }
    }
}

impl TryFrom<String> for ConditionOperator {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ConditionOperator> for String {
    fn from(op: ConditionOperator) -> Self {
        op.as_str().to_string()
    }
}

impl std::fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

/// A single `(field, operator, value)` clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Key resolved against the event snapshot.
    pub field: String,
    /// Comparison operator.
    pub operator: ConditionOperator,
    /// Right-hand operand.
    pub value: Value,
}

impl Condition {
    /// Create a condition clause.
    pub fn new(field: impl Into<String>, operator: ConditionOperator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Evaluate this clause alone. `Err` carries the reason the operands
    /// could not be compared.
    fn check(&self, snapshot: &(impl Snapshot + ?Sized)) -> Result<bool, String> {
        let Some(actual) = snapshot.field(&self.field) else {
            return Ok(self.operator == ConditionOperator::NotEqual);
        };
        match self.operator {
            ConditionOperator::Equal => Ok(values_equal(actual, &self.value)),
            ConditionOperator::NotEqual => Ok(!values_equal(actual, &self.value)),
            ConditionOperator::Contains => Ok(contains_ci(actual, &self.value)),
            ConditionOperator::NotContains => Ok(!contains_ci(actual, &self.value)),
            op => order(actual, &self.value).map(|ordering| op.accepts(ordering)),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value)
    }
}

/// A condition compared operands that have no ordering between them.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("condition #{index} `{field} {operator} {value}` cannot be evaluated: {reason}")]
pub struct ConditionEvaluationError {
    /// Position of the clause in the trigger's condition list.
    pub index: usize,
    /// Field the clause references.
    pub field: String,
    /// Operator of the clause.
    pub operator: ConditionOperator,
    /// Right-hand operand of the clause.
    pub value: Value,
    /// Why the operands could not be compared.
    pub reason: String,
}

/// Evaluate `conditions` as a short-circuiting AND over `snapshot`.
///
/// Returns `Ok(true)` for an empty list. Clauses after the first false one
/// are not evaluated, so they cannot raise errors.
pub fn evaluate(
    conditions: &[Condition],
    snapshot: &(impl Snapshot + ?Sized),
) -> Result<bool, ConditionEvaluationError> {
    for (index, condition) in conditions.iter().enumerate() {
        let holds = condition
            .check(snapshot)
            .map_err(|reason| ConditionEvaluationError {
                index,
                field: condition.field.clone(),
                operator: condition.operator,
                value: condition.value.clone(),
                reason,
            })?;
        if !holds {
            return Ok(false);
        }
    }
    Ok(true)
}

// ---------------------------------------------------------------------------
// Comparison helpers
// ---------------------------------------------------------------------------

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                return x == y;
            }
            match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => x == y,
            }
        }
        _ => a == b,
    }
}

fn order(a: &Value, b: &Value) -> Result<Ordering, String> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                return Ok(x.cmp(&y));
            }
            let (x, y) = (x.as_f64(), y.as_f64());
            x.zip(y)
                .and_then(|(x, y)| x.partial_cmp(&y))
                .ok_or_else(|| "numbers are not comparable".to_string())
        }
        (Value::String(x), Value::String(y)) => match (parse_date_like(x), parse_date_like(y)) {
            (Some(x), Some(y)) => Ok(x.cmp(&y)),
            _ => Err(format!("strings {x:?} and {y:?} are not both dates")),
        },
        _ => Err(format!(
            "cannot order {} against {}",
            kind_name(a),
            kind_name(b)
        )),
    }
}

fn contains_ci(haystack: &Value, needle: &Value) -> bool {
    display_form(haystack)
        .to_lowercase()
        .contains(&display_form(needle).to_lowercase())
}

fn display_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("snapshot must be an object"),
        }
    }

    fn eval_one(field: &str, op: ConditionOperator, value: Value, snap: Value) -> Result<bool, ConditionEvaluationError> {
        evaluate(&[Condition::new(field, op, value)], &snapshot(snap))
    }

    #[test]
    fn empty_conditions_are_true() {
        assert!(evaluate(&[], &snapshot(json!({}))).unwrap());
        assert!(evaluate(&[], &snapshot(json!({"status": "ativo"}))).unwrap());
    }

    #[test]
    fn equality_on_strings_is_case_sensitive() {
        let snap = json!({"status": "Concluido"});
        assert!(!eval_one("status", ConditionOperator::Equal, json!("concluido"), snap.clone()).unwrap());
        assert!(eval_one("status", ConditionOperator::Equal, json!("Concluido"), snap).unwrap());
    }

    #[test]
    fn equality_on_numbers_is_numeric() {
        let snap = json!({"dias_restantes": 3.0});
        assert!(eval_one("dias_restantes", ConditionOperator::Equal, json!(3), snap.clone()).unwrap());
        assert!(!eval_one("dias_restantes", ConditionOperator::NotEqual, json!(3), snap).unwrap());
    }

    #[test]
    fn equality_across_types_is_false_not_error() {
        let snap = json!({"dias_restantes": 3});
        assert!(!eval_one("dias_restantes", ConditionOperator::Equal, json!("3"), snap).unwrap());
    }

    #[test]
    fn numeric_ordering() {
        let snap = json!({"dias_restantes": 7});
        assert!(eval_one("dias_restantes", ConditionOperator::LessOrEqual, json!(7), snap.clone()).unwrap());
        assert!(!eval_one("dias_restantes", ConditionOperator::LessThan, json!(7), snap.clone()).unwrap());
        assert!(eval_one("dias_restantes", ConditionOperator::GreaterOrEqual, json!(7), snap.clone()).unwrap());
        assert!(!eval_one("dias_restantes", ConditionOperator::GreaterThan, json!(7), snap.clone()).unwrap());
        assert!(eval_one("dias_restantes", ConditionOperator::GreaterThan, json!(6.5), snap).unwrap());
    }

    #[test]
    fn date_ordering() {
        let snap = json!({"data_audiencia": "2026-05-10"});
        assert!(eval_one("data_audiencia", ConditionOperator::LessThan, json!("2026-05-11T00:00:00Z"), snap.clone()).unwrap());
        assert!(eval_one("data_audiencia", ConditionOperator::GreaterOrEqual, json!("2026-05-10"), snap).unwrap());
    }

    #[test]
    fn ordering_string_against_number_is_error() {
        let err = eval_one("status", ConditionOperator::GreaterThan, json!(3), json!({"status": "ativo"}))
            .unwrap_err();
        assert_eq!(err.index, 0);
        assert_eq!(err.field, "status");
        assert_eq!(err.operator, ConditionOperator::GreaterThan);
        assert!(err.reason.contains("string"));
        assert!(err.reason.contains("number"));
    }

    #[test]
    fn ordering_non_date_strings_is_error() {
        let result = eval_one("fase", ConditionOperator::LessThan, json!("recurso"), json!({"fase": "inicial"}));
        assert!(result.is_err());
    }

    #[test]
    fn contains_is_case_insensitive() {
        let snap = json!({"titulo": "Ação Trabalhista URGENTE"});
        assert!(eval_one("titulo", ConditionOperator::Contains, json!("urgente"), snap.clone()).unwrap());
        assert!(!eval_one("titulo", ConditionOperator::NotContains, json!("Urgente"), snap.clone()).unwrap());
        assert!(eval_one("titulo", ConditionOperator::NotContains, json!("civel"), snap).unwrap());
    }

    #[test]
    fn contains_uses_string_form_of_non_strings() {
        let snap = json!({"tags": ["urgente", "vip"], "numero": 12345});
        assert!(eval_one("tags", ConditionOperator::Contains, json!("VIP"), snap.clone()).unwrap());
        assert!(eval_one("numero", ConditionOperator::Contains, json!(234), snap).unwrap());
    }

    #[test]
    fn absent_field_policy() {
        let snap = json!({"status": "ativo"});
        for op in ConditionOperator::ALL {
            let result = eval_one("responsavel", op, json!("ana"), snap.clone()).unwrap();
            assert_eq!(result, op == ConditionOperator::NotEqual, "operator {op}");
        }
    }

    #[test]
    fn absent_field_never_errors_for_ordering() {
        let result = eval_one("dias_restantes", ConditionOperator::LessOrEqual, json!("x"), json!({}));
        assert_eq!(result.unwrap(), false);
    }

    #[test]
    fn present_null_is_a_value() {
        let snap = json!({"responsavel": null});
        assert!(eval_one("responsavel", ConditionOperator::Equal, Value::Null, snap.clone()).unwrap());
        assert!(!eval_one("responsavel", ConditionOperator::NotEqual, Value::Null, snap).unwrap());
    }

    #[test]
    fn dotted_path_lookup() {
        let snap = json!({"cliente": {"tipo": "pj", "endereco": {"uf": "SP"}}});
        assert!(eval_one("cliente.tipo", ConditionOperator::Equal, json!("pj"), snap.clone()).unwrap());
        assert!(eval_one("cliente.endereco.uf", ConditionOperator::Equal, json!("SP"), snap.clone()).unwrap());
        assert!(eval_one("cliente.nome", ConditionOperator::NotEqual, json!("x"), snap).unwrap());
    }

    #[test]
    fn exact_key_wins_over_path() {
        let snap = json!({"cliente.tipo": "pf", "cliente": {"tipo": "pj"}});
        assert!(eval_one("cliente.tipo", ConditionOperator::Equal, json!("pf"), snap).unwrap());
    }

    #[test]
    fn short_circuit_skips_erroring_clause() {
        let conditions = vec![
            Condition::new("status", ConditionOperator::Equal, "arquivado"),
            Condition::new("status", ConditionOperator::GreaterThan, 3),
        ];
        let snap = snapshot(json!({"status": "ativo"}));
        assert_eq!(evaluate(&conditions, &snap).unwrap(), false);
    }

    #[test]
    fn error_reports_clause_index() {
        let conditions = vec![
            Condition::new("status", ConditionOperator::Equal, "ativo"),
            Condition::new("status", ConditionOperator::GreaterThan, 3),
        ];
        let err = evaluate(&conditions, &snapshot(json!({"status": "ativo"}))).unwrap_err();
        assert_eq!(err.index, 1);
        assert!(err.to_string().contains("condition #1"));
    }

    #[test]
    fn operator_wire_names() {
        for op in ConditionOperator::ALL {
            assert_eq!(ConditionOperator::parse(op.as_str()).unwrap(), op);
        }
        assert_eq!(
            ConditionOperator::parse("~="),
            Err(ValidationError::UnknownOperator("~=".into()))
        );
    }

    #[test]
    fn condition_deserializes_from_wire_form() {
        let c: Condition =
            serde_json::from_value(json!({"field": "dias_restantes", "operator": "<=", "value": 7})).unwrap();
        assert_eq!(c, Condition::new("dias_restantes", ConditionOperator::LessOrEqual, 7));
        let bad: Result<Condition, _> =
            serde_json::from_value(json!({"field": "x", "operator": "like", "value": 1}));
        assert!(bad.is_err());
    }
}
