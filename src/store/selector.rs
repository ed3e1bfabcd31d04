//! Selector query structures
//!
//! A `FindQuery` is a conjunction of field predicates plus optional sort
//! and limit. A `KeyRange` is an inclusive scan over document ids.

use serde_json::Value;

/// Filter operation types
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// Equality: field = value
    Eq(Value),
    /// Membership: field ∈ values
    In(Vec<Value>),
    /// Greater than or equal: field >= value
    Gte(Value),
    /// Greater than: field > value
    Gt(Value),
    /// Less than or equal: field <= value
    Lte(Value),
    /// Less than: field < value
    Lt(Value),
}

impl FilterOp {
    /// Returns true if this is a range operation
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            FilterOp::Gte(_) | FilterOp::Gt(_) | FilterOp::Lte(_) | FilterOp::Lt(_)
        )
    }

    /// Returns the selector operator name
    pub fn op_name(&self) -> &'static str {
        match self {
            FilterOp::Eq(_) => "$eq",
            FilterOp::In(_) => "$in",
            FilterOp::Gte(_) => "$gte",
            FilterOp::Gt(_) => "$gt",
            FilterOp::Lte(_) => "$lte",
            FilterOp::Lt(_) => "$lt",
        }
    }
}

/// A single predicate on a (possibly dotted) field path
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Field path, e.g. `_id` or `page._id`
    pub field: String,
    /// Filter operation
    pub op: FilterOp,
}

impl Predicate {
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Eq(value),
        }
    }

    pub fn is_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::In(values),
        }
    }

    pub fn gte(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Gte(value),
        }
    }

    pub fn gt(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Gt(value),
        }
    }

    pub fn lte(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Lte(value),
        }
    }

    pub fn lt(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Lt(value),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Sort specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Field to sort by
    pub field: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Selector-based find query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    /// Predicates (all combined with AND)
    pub predicates: Vec<Predicate>,
    /// Sort keys, most significant first
    pub sort: Vec<SortSpec>,
    /// Maximum number of rows, unbounded if None
    pub limit: Option<usize>,
}

impl FindQuery {
    /// Creates an empty query matching every document
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Restricts a field to an inclusive range
    pub fn with_range(self, field: &str, min: Value, max: Value) -> Self {
        self.with_predicate(Predicate::gte(field, min))
            .with_predicate(Predicate::lte(field, max))
    }

    /// Appends a sort key
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort.push(sort);
        self
    }

    /// Sets the limit
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

/// Inclusive key-range scan.
///
/// For a descending scan `start` is the high key and `end` the low key,
/// mirroring the order rows are produced in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    pub start: String,
    pub end: String,
    pub direction: SortDirection,
    pub limit: Option<usize>,
}

impl KeyRange {
    pub fn ascending(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            direction: SortDirection::Asc,
            limit: None,
        }
    }

    pub fn descending(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            direction: SortDirection::Desc,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns (low, high) regardless of direction
    pub fn bounds(&self) -> (&str, &str) {
        match self.direction {
            SortDirection::Asc => (&self.start, &self.end),
            SortDirection::Desc => (&self.end, &self.start),
        }
    }

    /// Returns true if the range cannot contain any key
    pub fn is_inverted(&self) -> bool {
        let (low, high) = self.bounds();
        low > high
    }
}
