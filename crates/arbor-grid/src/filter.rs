//! Filter predicate engine.
//!
//! A filter for one field is an ordered list of [`FilterClause`]s. Each
//! clause tests the field value against a comparison operand; clauses after
//! the first carry a [`LogicalOp`] saying how their result combines with the
//! **running folded result** of every prior clause in the chain (a
//! left-to-right fold, not pairwise grouping). A record passes the filter
//! when the final folded result is true.
//!
//! Clause symbols come from the widget layer's filter editor. An
//! unrecognized symbol resolves to [`ComparisonOp::Never`], which matches
//! nothing, rather than an error; a clause whose comparison value is null
//! (the user left the second comparison box empty) is skipped entirely, as
//! if the clause were absent.

use std::cmp::Ordering;
use std::fmt;

use crate::compare::{date_equals, default_compare, values_equal};
use crate::record::Record;
use crate::value::FieldValue;

/// Comparison operator of a filter clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    /// Equal (`=`). Date operands compare day-truncated.
    Eq,
    /// Not equal (`!=`).
    Ne,
    /// Greater than (`>`).
    Gt,
    /// Greater than or equal (`>=`).
    Ge,
    /// Less than (`<`).
    Lt,
    /// Less than or equal (`<=`).
    Le,
    /// String starts with the operand.
    StartsWith,
    /// String ends with the operand.
    EndsWith,
    /// String contains the operand.
    Contains,
    /// Matches nothing. Fallback for unrecognized symbols.
    Never,
}

impl ComparisonOp {
    /// Resolves the widget layer's comparison symbol to an operator.
    ///
    /// Unknown symbols resolve to [`ComparisonOp::Never`]: clause symbols are
    /// produced by the filter editor and assumed well formed, so a bad one
    /// silently matches nothing instead of failing the whole filter pass.
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol {
            "=" => Self::Eq,
            "!=" => Self::Ne,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            "<" => Self::Lt,
            "<=" => Self::Le,
            "startsWith" => Self::StartsWith,
            "endsWith" => Self::EndsWith,
            "contains" => Self::Contains,
            other => {
                tracing::warn!(
                    target: "arbor_grid::data",
                    symbol = other,
                    "unrecognized comparison symbol, clause will match nothing"
                );
                Self::Never
            }
        }
    }

    /// The widget layer's symbol for this operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
            Self::Contains => "contains",
            Self::Never => "never",
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// How a clause combines with the running result of the clauses before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogicalOp {
    /// Both the running result and this clause must hold.
    #[default]
    And,
    /// Either the running result or this clause must hold.
    Or,
}

/// One comparison test within a field's filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    /// The comparison operand.
    pub value: FieldValue,
    /// The comparison operator.
    pub op: ComparisonOp,
    /// How this clause joins the running result of prior clauses.
    /// Ignored on the first clause; defaults to `And`.
    pub logical: LogicalOp,
}

impl FilterClause {
    /// Creates a clause joining with `And`.
    pub fn new(value: FieldValue, op: ComparisonOp) -> Self {
        Self {
            value,
            op,
            logical: LogicalOp::And,
        }
    }

    /// Creates a clause from the widget layer's symbol string.
    pub fn from_symbol(value: FieldValue, symbol: &str) -> Self {
        Self::new(value, ComparisonOp::from_symbol(symbol))
    }

    /// Sets the logical join to prior clauses.
    pub fn with_logical(mut self, logical: LogicalOp) -> Self {
        self.logical = logical;
        self
    }
}

/// The filter specification for a single field.
///
/// # Example
///
/// ```
/// use arbor_grid::{ComparisonOp, FieldFilter, FilterClause, LogicalOp, Record};
///
/// // stock > 5 or stock = 0
/// let filter = FieldFilter::new(
///     "stock",
///     vec![
///         FilterClause::new(5.into(), ComparisonOp::Gt),
///         FilterClause::new(0.into(), ComparisonOp::Eq).with_logical(LogicalOp::Or),
///     ],
/// );
///
/// let record = Record::with_fields([("stock", 0.into())]);
/// assert!(filter.matches(&record, false));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    /// The field this filter reads.
    pub field: String,
    /// The ordered clause chain.
    pub clauses: Vec<FilterClause>,
}

impl FieldFilter {
    /// Creates a filter over the named field.
    pub fn new(field: impl Into<String>, clauses: Vec<FilterClause>) -> Self {
        Self {
            field: field.into(),
            clauses,
        }
    }

    /// Evaluates the clause chain against one record.
    ///
    /// Clauses with a null operand are skipped. A filter whose clauses are
    /// all skipped passes every record, matching the absent-filter behavior
    /// the widget layer expects from an empty filter editor.
    pub fn matches(&self, record: &Record, case_sensitive: bool) -> bool {
        let field_value = record.field_or_null(&self.field);

        let mut result: Option<bool> = None;
        for clause in &self.clauses {
            if clause.value.is_null() {
                continue;
            }
            let passed = evaluate(clause.op, field_value, &clause.value, case_sensitive);
            result = Some(match (result, clause.logical) {
                (None, _) => passed,
                (Some(acc), LogicalOp::And) => acc && passed,
                (Some(acc), LogicalOp::Or) => acc || passed,
            });
        }
        result.unwrap_or(true)
    }

    /// Returns the records matching this filter, preserving input order.
    pub fn apply(&self, records: &[Record], case_sensitive: bool) -> Vec<Record> {
        records
            .iter()
            .filter(|r| self.matches(r, case_sensitive))
            .cloned()
            .collect()
    }
}

/// Evaluates one comparison. Case folding is applied symmetrically to both
/// operands when both are strings and the caller did not request case
/// sensitivity.
fn evaluate(
    op: ComparisonOp,
    field_value: &FieldValue,
    clause_value: &FieldValue,
    case_sensitive: bool,
) -> bool {
    let folded;
    let (lhs, rhs) = if !case_sensitive
        && let (FieldValue::String(a), FieldValue::String(b)) = (field_value, clause_value)
    {
        folded = (
            FieldValue::String(a.to_lowercase()),
            FieldValue::String(b.to_lowercase()),
        );
        (&folded.0, &folded.1)
    } else {
        (field_value, clause_value)
    };

    match op {
        ComparisonOp::Eq => equals(lhs, rhs),
        ComparisonOp::Ne => !equals(lhs, rhs),
        ComparisonOp::Gt => ordered(lhs, rhs, |o| o == Ordering::Greater),
        ComparisonOp::Ge => ordered(lhs, rhs, |o| o != Ordering::Less),
        ComparisonOp::Lt => ordered(lhs, rhs, |o| o == Ordering::Less),
        ComparisonOp::Le => ordered(lhs, rhs, |o| o != Ordering::Greater),
        ComparisonOp::StartsWith => lhs.to_string().starts_with(&rhs.to_string()),
        ComparisonOp::EndsWith => lhs.to_string().ends_with(&rhs.to_string()),
        ComparisonOp::Contains => lhs.to_string().contains(&rhs.to_string()),
        ComparisonOp::Never => false,
    }
}

fn equals(lhs: &FieldValue, rhs: &FieldValue) -> bool {
    match (lhs, rhs) {
        // Date-aware equality when the field value is a date
        (FieldValue::Date(a), FieldValue::Date(b)) => date_equals(*a, *b),
        _ => values_equal(lhs, rhs, false),
    }
}

/// Ordering comparisons never match against a null operand on either side.
fn ordered(lhs: &FieldValue, rhs: &FieldValue, test: impl Fn(Ordering) -> bool) -> bool {
    if lhs.is_null() || rhs.is_null() {
        return false;
    }
    test(default_compare(lhs, rhs))
}
