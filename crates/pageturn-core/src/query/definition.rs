use crate::{key::EntityKey, query::QueryError, value::Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
}

impl CompareOp {
    /// Parse the textual operator of a filter expression.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let op = match token {
            "=" | "==" => Self::Eq,
            "!=" => Self::Ne,
            "<" => Self::Lt,
            "<=" => Self::Lte,
            ">" => Self::Gt,
            ">=" => Self::Gte,
            _ if token.eq_ignore_ascii_case("in") => Self::In,
            _ => return None,
        };

        Some(op)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::In => "IN",
        }
    }

    /// Evaluate `left <op> right`.
    ///
    /// `In` expects `right` to be a list; ordering operators are false for
    /// values of different families.
    #[must_use]
    pub fn eval(self, left: &Value, right: &Value) -> bool {
        match self {
            Self::In => match right {
                Value::List(items) => items
                    .iter()
                    .any(|item| left.strict_order_cmp(item) == Some(Ordering::Equal)),
                _ => false,
            },
            Self::Ne => left.strict_order_cmp(right) != Some(Ordering::Equal),
            _ => left.strict_order_cmp(right).is_some_and(|ord| match self {
                Self::Eq => ord == Ordering::Equal,
                Self::Lt => ord == Ordering::Less,
                Self::Lte => ord != Ordering::Greater,
                Self::Gt => ord == Ordering::Greater,
                Self::Gte => ord != Ordering::Less,
                Self::Ne | Self::In => false,
            }),
        }
    }
}

///
/// FilterClause
///
/// One `field <op> value` condition. Built from expressions such as
/// `"published >"`; an expression without an operator means equality.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FilterClause {
    pub field: String,
    pub op: CompareOp,
    pub value: Value,
}

impl FilterClause {
    #[must_use]
    pub fn new(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn parse(expr: &str, value: impl Into<Value>) -> Result<Self, QueryError> {
        let invalid = |reason| QueryError::InvalidFilter {
            expr: expr.to_string(),
            reason,
        };

        let mut parts = expr.split_whitespace();
        let field = parts.next().ok_or_else(|| invalid("missing field name"))?;
        let op = match parts.next() {
            Some(token) => CompareOp::parse(token).ok_or_else(|| invalid("unknown operator"))?,
            None => CompareOp::Eq,
        };

        if parts.next().is_some() {
            return Err(invalid("unexpected trailing tokens"));
        }

        Ok(Self::new(field, op, value))
    }
}

///
/// OrderDirection
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

///
/// OrderClause
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct OrderClause {
    pub field: String,
    pub direction: OrderDirection,
}

impl OrderClause {
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: OrderDirection::Asc,
        }
    }

    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: OrderDirection::Desc,
        }
    }

    /// Parse `"field"` (ascending) or `"-field"` (descending).
    pub fn parse(expr: &str) -> Result<Self, QueryError> {
        let trimmed = expr.trim();
        let (field, direction) = match trimmed.strip_prefix('-') {
            Some(field) => (field, OrderDirection::Desc),
            None => (trimmed, OrderDirection::Asc),
        };

        if field.is_empty() || field.contains(char::is_whitespace) {
            return Err(QueryError::InvalidOrder {
                expr: expr.to_string(),
            });
        }

        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}

///
/// ComposedQuery
///
/// Composable query definition over one entity kind. Filters and orders keep
/// the sequence they were applied in; a later ancestor replaces an earlier one.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ComposedQuery {
    kind: String,
    filters: Vec<FilterClause>,
    orders: Vec<OrderClause>,
    ancestor: Option<EntityKey>,
}

impl ComposedQuery {
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            filters: Vec::new(),
            orders: Vec::new(),
            ancestor: None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn filters(&self) -> &[FilterClause] {
        &self.filters
    }

    #[must_use]
    pub fn orders(&self) -> &[OrderClause] {
        &self.orders
    }

    #[must_use]
    pub const fn ancestor(&self) -> Option<&EntityKey> {
        self.ancestor.as_ref()
    }

    pub fn push_filter(&mut self, clause: FilterClause) {
        self.filters.push(clause);
    }

    pub fn push_order(&mut self, clause: OrderClause) {
        self.orders.push(clause);
    }

    pub fn set_ancestor(&mut self, key: EntityKey) {
        self.ancestor = Some(key);
    }
}

///
/// RawStatement
///
/// Pre-built query text with bound parameters. Cannot be composed further.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RawStatement {
    pub text: String,
    pub params: Vec<Value>,
}

///
/// QueryDefinition
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum QueryDefinition {
    Composed(ComposedQuery),
    Raw(RawStatement),
}

impl QueryDefinition {
    /// Short human-readable label used in error messages and logs.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Composed(query) => format!("query over '{}'", query.kind()),
            Self::Raw(_) => "raw statement".to_string(),
        }
    }

    #[must_use]
    pub const fn is_composable(&self) -> bool {
        matches!(self, Self::Composed(_))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_expression_defaults_to_equality() {
        let clause = FilterClause::parse("category", "rust").expect("filter should parse");

        assert_eq!(clause.field, "category");
        assert_eq!(clause.op, CompareOp::Eq);
        assert_eq!(clause.value, Value::from("rust"));
    }

    #[test]
    fn filter_expression_parses_operator_token() {
        let clause = FilterClause::parse("published >=", 10_i64).expect("filter should parse");
        assert_eq!(clause.op, CompareOp::Gte);

        let clause = FilterClause::parse("tag in", vec!["a", "b"]).expect("filter should parse");
        assert_eq!(clause.op, CompareOp::In);
    }

    #[test]
    fn filter_expression_rejects_unknown_operator_and_trailing_tokens() {
        let err = FilterClause::parse("published ~", 1_i64).expect_err("unknown operator");
        assert!(matches!(
            err,
            QueryError::InvalidFilter {
                reason: "unknown operator",
                ..
            }
        ));

        let err = FilterClause::parse("a = b", 1_i64).expect_err("trailing token");
        assert!(matches!(err, QueryError::InvalidFilter { .. }));

        let err = FilterClause::parse("   ", 1_i64).expect_err("empty expression");
        assert!(matches!(
            err,
            QueryError::InvalidFilter {
                reason: "missing field name",
                ..
            }
        ));
    }

    #[test]
    fn order_expression_uses_dash_for_descending() {
        assert_eq!(
            OrderClause::parse("-published"),
            Ok(OrderClause::desc("published"))
        );
        assert_eq!(OrderClause::parse("title"), Ok(OrderClause::asc("title")));
        assert!(OrderClause::parse("-").is_err());
        assert!(OrderClause::parse("a b").is_err());
    }

    #[test]
    fn compare_op_eval_handles_in_and_cross_family() {
        let list = Value::from(vec![1_i64, 3]);

        assert!(CompareOp::In.eval(&Value::Uint(3), &list));
        assert!(!CompareOp::In.eval(&Value::Int(2), &list));
        assert!(CompareOp::Ne.eval(&Value::from("a"), &Value::Int(1)));
        assert!(!CompareOp::Lt.eval(&Value::from("a"), &Value::Int(1)));
        assert!(CompareOp::Lte.eval(&Value::Int(1), &Value::Uint(1)));
    }

    #[test]
    fn last_ancestor_wins() {
        let mut query = ComposedQuery::new("Post");
        query.set_ancestor(EntityKey::root("Blog", 1_u64));
        query.set_ancestor(EntityKey::root("Blog", 2_u64));

        assert_eq!(query.ancestor(), Some(&EntityKey::root("Blog", 2_u64)));
    }
}
