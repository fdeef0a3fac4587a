//! # Filter Predicate
//!
//! A compiled filter is an AND of groups; each group is an OR of atoms.
//! Only the wildcard `*` field produces groups with more than one atom.

use std::fmt;

use super::schema::FieldDescriptor;

/// Comparison operators accepted in `filter`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
}

impl FilterOperator {
    /// Map a client operator code, case-insensitively
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "eq" => Some(FilterOperator::Eq),
            "ne" => Some(FilterOperator::Ne),
            "lt" => Some(FilterOperator::Lt),
            "le" => Some(FilterOperator::Le),
            "gt" => Some(FilterOperator::Gt),
            "ge" => Some(FilterOperator::Ge),
            "lk" => Some(FilterOperator::Like),
            _ => None,
        }
    }

    /// SQL token for this operator
    pub fn as_sql(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::Ne => "!=",
            FilterOperator::Lt => "<",
            FilterOperator::Le => "<=",
            FilterOperator::Gt => ">",
            FilterOperator::Ge => ">=",
            FilterOperator::Like => "LIKE",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// `{field} {operator} {value}` with an already escaped value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterAtom {
    pub field: &'static FieldDescriptor,
    pub operator: FilterOperator,
    pub value: String,
}

impl fmt::Display for FilterAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field.column, self.operator, self.value)
    }
}

/// OR-combined atoms sharing one operator and value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterGroup {
    atoms: Vec<FilterAtom>,
}

impl FilterGroup {
    pub fn single(atom: FilterAtom) -> Self {
        Self { atoms: vec![atom] }
    }

    /// The same comparison against every given field
    pub fn spanning(
        fields: impl IntoIterator<Item = &'static FieldDescriptor>,
        operator: FilterOperator,
        value: &str,
    ) -> Self {
        let atoms = fields
            .into_iter()
            .map(|field| FilterAtom {
                field,
                operator,
                value: value.to_string(),
            })
            .collect();
        Self { atoms }
    }

    pub fn atoms(&self) -> &[FilterAtom] {
        &self.atoms
    }
}

impl fmt::Display for FilterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, atom) in self.atoms.iter().enumerate() {
            if i > 0 {
                f.write_str(" OR ")?;
            }
            write!(f, "{}", atom)?;
        }
        f.write_str(")")
    }
}

/// AND-combined groups in client order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    groups: Vec<FilterGroup>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, group: FilterGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn push(&mut self, group: FilterGroup) {
        self.groups.push(group);
    }

    pub fn groups(&self) -> &[FilterGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn joined(&self) -> String {
        self.groups
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// `" AND (..) AND (..)"`, or empty when there are no groups.
    ///
    /// Appended verbatim after an existing `WHERE` condition.
    pub fn to_sql(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!(" AND {}", self.joined())
        }
    }

    /// `" WHERE (..) AND (..)"`, or empty, for queries without a base condition
    pub fn to_where_sql(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.joined())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::schema::ValueKind;

    static ID: FieldDescriptor = FieldDescriptor::new("id", ValueKind::Integer);
    static NAME: FieldDescriptor = FieldDescriptor::new("name", ValueKind::String);

    #[test]
    fn test_operator_codes_are_case_insensitive() {
        assert_eq!(FilterOperator::from_code("LK"), Some(FilterOperator::Like));
        assert_eq!(FilterOperator::from_code("Ge"), Some(FilterOperator::Ge));
        assert_eq!(FilterOperator::from_code("neq"), None);
    }

    #[test]
    fn test_empty_predicate_renders_nothing() {
        let predicate = Predicate::new();
        assert_eq!(predicate.to_sql(), "");
        assert_eq!(predicate.to_where_sql(), "");
    }

    #[test]
    fn test_groups_and_atoms() {
        let predicate = Predicate::new()
            .and(FilterGroup::single(FilterAtom {
                field: &ID,
                operator: FilterOperator::Ne,
                value: "3".to_string(),
            }))
            .and(FilterGroup::spanning(
                [&ID, &NAME],
                FilterOperator::Like,
                "'%a'",
            ));

        assert_eq!(
            predicate.to_sql(),
            " AND (id != 3) AND (id LIKE '%a' OR name LIKE '%a')"
        );
        assert_eq!(
            predicate.to_where_sql(),
            " WHERE (id != 3) AND (id LIKE '%a' OR name LIKE '%a')"
        );
    }
}
