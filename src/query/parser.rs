//! # Query Compiler
//!
//! Turns the untrusted `offset`, `limit`, `sort` and `filter` parameters of a
//! list request into a [`Limitation`], an [`OrderSpec`] and a [`Predicate`]
//! checked against an entity's [`EntitySchema`].
//!
//! Every raw value is URL-unescaped once more after the transport has decoded
//! the query string, so clients may percent-encode delimiters twice.
//!
//! The first failure aborts compilation and is returned as a one-entry
//! [`ValidationErrors`] list. Nothing partial is ever returned.

use serde::Deserialize;
use tracing::{debug, warn};

use super::filter::{FilterAtom, FilterGroup, FilterOperator, Predicate};
use super::order::{Direction, Limitation, OrderSpec, OrderTerm};
use super::schema::{quote, EntitySchema};
use crate::models::{ErrorKind, FieldError, ValidationErrors};

/// Separator between the parts of a `sort` or `filter` value
const DELIMITER: char = ':';

/// Default page size when `limit` is absent or zero
pub const DEFAULT_LIMIT: u64 = 100;

/// Raw query parameters in request order, repeated keys preserved
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `key`, in request order
    pub fn all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Output of a full compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub limitation: Limitation,
    pub order: OrderSpec,
    pub predicate: Predicate,
}

/// Query parameter compiler
///
/// Fields render under their descriptor's column, not their client name, so
/// the seat `index` field appears as `"index"` (quoted, since it is a
/// reserved word in SQLite) in both `ORDER BY` and filter clauses, e.g.
/// `"index" LIKE '%4%'`.
#[derive(Debug, Clone, Copy)]
pub struct QueryCompiler {
    default_limit: u64,
}

impl Default for QueryCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

impl QueryCompiler {
    pub fn new(default_limit: u64) -> Self {
        Self { default_limit }
    }

    pub fn default_limit(&self) -> u64 {
        self.default_limit
    }

    /// Compile pagination, ordering and filtering, in that order.
    pub fn compile<E: EntitySchema>(
        &self,
        params: &QueryParams,
    ) -> Result<CompiledQuery, ValidationErrors> {
        let limitation = self.limitation(params)?;
        let order = self.sorting::<E>(params)?;
        let predicate = self.filtering::<E>(params)?;
        Ok(CompiledQuery {
            limitation,
            order,
            predicate,
        })
    }

    /// Parse `offset` then `limit`.
    pub fn limitation(&self, params: &QueryParams) -> Result<Limitation, ValidationErrors> {
        let offset = parse_window_value(params, "offset", "Offset")?;
        let limit = parse_window_value(params, "limit", "Limit")?;

        let count = match limit {
            0 => self.default_limit,
            n => n,
        };
        let limitation = Limitation { offset, count };

        debug!(
            offset = limitation.offset,
            count = limitation.count,
            "Offset and limit successfully parsed"
        );
        Ok(limitation)
    }

    /// Parse every `sort` value into a multi-key order.
    pub fn sorting<E: EntitySchema>(
        &self,
        params: &QueryParams,
    ) -> Result<OrderSpec, ValidationErrors> {
        let mut order = OrderSpec::new();

        for raw in params.all("sort") {
            let element = unescape(raw).ok_or_else(|| reject(FieldError::bad("sort", "Sort"), raw))?;
            if element.is_empty() {
                continue;
            }

            let parts: Vec<&str> = element.split(DELIMITER).collect();
            let [field, direction] = parts.as_slice() else {
                return Err(reject(
                    structural("sort", "Sort has wrong length of elements"),
                    &element,
                ));
            };

            let Some(descriptor) = E::sort_descriptor(field) else {
                return Err(reject(
                    FieldError::new(
                        ErrorKind::UnknownField,
                        "sort.UnknownField",
                        "Sort contains unknown field",
                        "sort",
                    ),
                    &element,
                ));
            };

            let Some(direction) = Direction::parse(direction) else {
                return Err(reject(
                    FieldError::new(
                        ErrorKind::UnknownOrder,
                        "sort.UnknownOrder",
                        "Sort contains unknown order",
                        "sort",
                    ),
                    &element,
                ));
            };

            order.push(OrderTerm {
                field: descriptor,
                direction,
            });
        }

        debug!(entity = E::ENTITY, sorting = %order.to_sql(), "Sort successfully parsed");
        Ok(order)
    }

    /// Parse every `filter` value into an AND of OR-groups.
    pub fn filtering<E: EntitySchema>(
        &self,
        params: &QueryParams,
    ) -> Result<Predicate, ValidationErrors> {
        let mut predicate = Predicate::new();

        for raw in params.all("filter") {
            let element =
                unescape(raw).ok_or_else(|| reject(FieldError::bad("filter", "Filter"), raw))?;

            let parts = match read_first_record(&element) {
                Ok(Some(parts)) => parts,
                Ok(None) => continue,
                Err(err) => {
                    warn!(error = %err, "Filter record could not be read");
                    return Err(reject(
                        structural_code(
                            "filter.InvalidFormat",
                            "Filter is not in csv format",
                        ),
                        &element,
                    ));
                }
            };

            let [field, operator, value] = parts.as_slice() else {
                return Err(reject(
                    structural("filter", "Filter has wrong length of elements"),
                    &element,
                ));
            };

            let Some(operator) = FilterOperator::from_code(operator) else {
                return Err(reject(
                    FieldError::new(
                        ErrorKind::UnknownOperation,
                        "filter.UnknownOperation",
                        "Filter contains unknown operation",
                        "filter",
                    ),
                    &element,
                ));
            };

            let value = match operator {
                FilterOperator::Like => value.replace('*', "%"),
                _ => value.clone(),
            };

            let group = if field == "*" {
                FilterGroup::spanning(E::all_filterable_fields(), operator, &quote(&value))
            } else {
                let Some(descriptor) = E::filter_descriptor(field) else {
                    return Err(reject(
                        FieldError::new(
                            ErrorKind::UnknownField,
                            "field.Unknown",
                            format!("{} field is unknown", field),
                            "field",
                        ),
                        &element,
                    ));
                };
                let literal = descriptor
                    .literal(&value)
                    .map_err(|err| reject(err, &element))?;
                FilterGroup::single(FilterAtom {
                    field: descriptor,
                    operator,
                    value: literal,
                })
            };

            predicate.push(group);
        }

        debug!(entity = E::ENTITY, filtering = %predicate.to_sql(), "Filter successfully parsed");
        Ok(predicate)
    }
}

/// Read one of `offset` / `limit`; absent or empty reads as zero.
fn parse_window_value(
    params: &QueryParams,
    field: &str,
    label: &str,
) -> Result<u64, ValidationErrors> {
    let raw = params.get(field).unwrap_or_default();
    let value = unescape(raw).ok_or_else(|| reject(FieldError::bad(field, label), raw))?;
    if value.is_empty() {
        return Ok(0);
    }

    let parsed: i64 = value.parse().map_err(|_| {
        reject(
            FieldError::invalid(field, format!("{} is not integer", label)),
            &value,
        )
    })?;
    if parsed < 0 {
        return Err(reject(FieldError::negative(field, label), &value));
    }
    Ok(parsed.unsigned_abs())
}

fn structural(field: &str, message: &str) -> FieldError {
    FieldError::new(
        ErrorKind::StructuralInvalid,
        format!("{}.WrongLength", field),
        message,
        field,
    )
}

fn structural_code(code: &str, message: &str) -> FieldError {
    FieldError::new(ErrorKind::StructuralInvalid, code, message, "filter")
}

fn reject(error: FieldError, value: &str) -> ValidationErrors {
    warn!(code = %error.code, value, "{}", error.message);
    error.into()
}

/// Query-component unescape: `+` is a space and every `%` must start a
/// two-digit hex escape. `None` when the input is malformed or the decoded
/// bytes are not UTF-8.
fn unescape(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3)?;
            if !escape.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    urlencoding::decode(&raw.replace('+', " "))
        .ok()
        .map(|decoded| decoded.into_owned())
}

/// Parse `value` as `:`-delimited CSV with permissive quoting and return the
/// first record. Later records must have the same length.
fn read_first_record(value: &str) -> Result<Option<Vec<String>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER as u8)
        .has_headers(false)
        .from_reader(value.as_bytes());

    let mut first = None;
    for record in reader.records() {
        let record = record?;
        if first.is_none() {
            first = Some(record.iter().map(str::to_string).collect::<Vec<_>>());
        }
    }
    Ok(first.filter(|parts| !parts.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Flight, Seat};

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs.iter().copied().collect()
    }

    fn first_code(err: ValidationErrors) -> String {
        err.errors()[0].code.clone()
    }

    #[test]
    fn test_limitation_explicit() {
        let compiler = QueryCompiler::default();
        let limitation = compiler
            .limitation(&params(&[("offset", "5"), ("limit", "10")]))
            .unwrap();
        assert_eq!(limitation.to_sql(), " LIMIT 5, 10");
    }

    #[test]
    fn test_limitation_defaults() {
        let compiler = QueryCompiler::default();
        assert_eq!(
            compiler.limitation(&QueryParams::new()).unwrap().to_sql(),
            " LIMIT 0, 100"
        );
        assert_eq!(
            compiler
                .limitation(&params(&[("limit", "0")]))
                .unwrap()
                .to_sql(),
            " LIMIT 0, 100"
        );
        assert_eq!(
            QueryCompiler::new(25)
                .limitation(&params(&[("offset", "3")]))
                .unwrap()
                .to_sql(),
            " LIMIT 3, 25"
        );
    }

    #[test]
    fn test_limitation_errors() {
        let compiler = QueryCompiler::default();

        let err = compiler
            .limitation(&params(&[("offset", "-1"), ("limit", "1")]))
            .unwrap_err();
        assert_eq!(err.errors().len(), 1);
        assert_eq!(err.errors()[0].code, "offset.Negative");
        assert_eq!(err.errors()[0].message, "Offset can't be negative");
        assert_eq!(err.errors()[0].kind, ErrorKind::ParameterNegative);

        let err = compiler.limitation(&params(&[("offset", "a")])).unwrap_err();
        assert_eq!(err.errors()[0].code, "offset.Invalid");
        assert_eq!(err.errors()[0].message, "Offset is not integer");

        let err = compiler.limitation(&params(&[("limit", "%zz")])).unwrap_err();
        assert_eq!(err.errors()[0].code, "limit.Bad");
        assert_eq!(err.errors()[0].message, "Limit can't be unescaped");
    }

    #[test]
    fn test_offset_is_checked_before_limit() {
        let compiler = QueryCompiler::default();
        let err = compiler
            .limitation(&params(&[("limit", "x"), ("offset", "-2")]))
            .unwrap_err();
        assert_eq!(first_code(err), "offset.Negative");
    }

    #[test]
    fn test_limitation_double_unescape() {
        let compiler = QueryCompiler::default();
        let limitation = compiler
            .limitation(&params(&[("offset", "%31%32")]))
            .unwrap();
        assert_eq!(limitation.offset, 12);
    }

    #[test]
    fn test_sorting_multi_key() {
        let compiler = QueryCompiler::default();
        let order = compiler
            .sorting::<Seat>(&params(&[
                ("sort", "line:asc"),
                ("sort", "id:desc"),
                ("sort", ""),
            ]))
            .unwrap();
        assert_eq!(order.to_sql(), " ORDER BY line ASC, id DESC");
    }

    #[test]
    fn test_sorting_empty() {
        let compiler = QueryCompiler::default();
        let order = compiler.sorting::<Seat>(&QueryParams::new()).unwrap();
        assert!(order.is_empty());
        assert_eq!(order.to_sql(), "");
    }

    #[test]
    fn test_sorting_errors() {
        let compiler = QueryCompiler::default();

        let err = compiler
            .sorting::<Seat>(&params(&[("sort", "colour:asc")]))
            .unwrap_err();
        assert_eq!(err.errors()[0].code, "sort.UnknownField");
        assert_eq!(err.errors()[0].field, "sort");

        let err = compiler
            .sorting::<Seat>(&params(&[("sort", "line")]))
            .unwrap_err();
        assert_eq!(err.errors()[0].code, "sort.WrongLength");

        let err = compiler
            .sorting::<Seat>(&params(&[("sort", "line:asc:desc")]))
            .unwrap_err();
        assert_eq!(err.errors()[0].code, "sort.WrongLength");

        let err = compiler
            .sorting::<Seat>(&params(&[("sort", "line:sideways")]))
            .unwrap_err();
        assert_eq!(err.errors()[0].code, "sort.UnknownOrder");

        let err = compiler
            .sorting::<Seat>(&params(&[("sort", "flight_id:asc")]))
            .unwrap_err();
        assert_eq!(err.errors()[0].code, "sort.UnknownField");

        let err = compiler
            .sorting::<Seat>(&params(&[("sort", "id:asc"), ("sort", "%")]))
            .unwrap_err();
        assert_eq!(err.errors()[0].code, "sort.Bad");
    }

    #[test]
    fn test_sorting_direction_is_case_insensitive() {
        let compiler = QueryCompiler::default();
        let order = compiler
            .sorting::<Flight>(&params(&[("sort", "name:DeSc")]))
            .unwrap();
        assert_eq!(order.to_sql(), " ORDER BY name DESC");
    }

    #[test]
    fn test_filtering_specific_fields() {
        let compiler = QueryCompiler::default();
        let predicate = compiler
            .filtering::<Seat>(&params(&[
                ("filter", "line:eq:v"),
                ("filter", "id:gt:100"),
                ("filter", "id:lk:6"),
            ]))
            .unwrap();
        assert_eq!(
            predicate.to_sql(),
            " AND (line = 'v') AND (id > 100) AND (id LIKE 6)"
        );
    }

    #[test]
    fn test_filtering_operator_tokens() {
        let compiler = QueryCompiler::default();
        let cases = [
            ("eq", "="),
            ("ne", "!="),
            ("lt", "<"),
            ("le", "<="),
            ("gt", ">"),
            ("ge", ">="),
            ("LK", "LIKE"),
        ];
        for (code, token) in cases {
            let filter = format!("row:{}:3", code);
            let predicate = compiler
                .filtering::<Seat>(&params(&[("filter", filter.as_str())]))
                .unwrap();
            assert_eq!(predicate.to_sql(), format!(" AND (row {} 3)", token));
        }
    }

    #[test]
    fn test_filtering_wildcard_spans_all_fields() {
        let compiler = QueryCompiler::default();
        let predicate = compiler
            .filtering::<Seat>(&params(&[("filter", "*:lk:\"*v' s\"")]))
            .unwrap();

        assert_eq!(predicate.groups().len(), 1);
        let atoms = predicate.groups()[0].atoms();
        assert_eq!(atoms.len(), 8);

        let names: Vec<_> = atoms.iter().map(|a| a.field.name).collect();
        assert_eq!(
            names,
            vec![
                "id",
                "index",
                "type",
                "row",
                "line",
                "assigned",
                "created_at",
                "updated_at"
            ]
        );
        for atom in atoms {
            assert_eq!(atom.operator, FilterOperator::Like);
            assert_eq!(atom.value, "'%v'' s'");
        }
        assert!(predicate
            .to_sql()
            .starts_with(" AND (id LIKE '%v'' s' OR \"index\" LIKE '%v'' s' OR type LIKE"));
    }

    #[test]
    fn test_filtering_quoted_value_keeps_delimiter() {
        let compiler = QueryCompiler::default();
        let predicate = compiler
            .filtering::<Flight>(&params(&[("filter", "name:eq:\"LH:400\"")]))
            .unwrap();
        assert_eq!(predicate.to_sql(), " AND (name = 'LH:400')");
    }

    #[test]
    fn test_filtering_boolean_is_canonical() {
        let compiler = QueryCompiler::default();
        let predicate = compiler
            .filtering::<Seat>(&params(&[("filter", "assigned:eq:T")]))
            .unwrap();
        assert_eq!(predicate.to_sql(), " AND (assigned = true)");
    }

    #[test]
    fn test_filtering_skips_empty_values() {
        let compiler = QueryCompiler::default();
        let predicate = compiler
            .filtering::<Seat>(&params(&[("filter", "")]))
            .unwrap();
        assert!(predicate.is_empty());
    }

    #[test]
    fn test_filtering_errors() {
        let compiler = QueryCompiler::default();
        let code = |value: &str| {
            first_code(
                compiler
                    .filtering::<Seat>(&params(&[("filter", value)]))
                    .unwrap_err(),
            )
        };

        assert_eq!(code("%"), "filter.Bad");
        assert_eq!(code("line:eq"), "filter.WrongLength");
        assert_eq!(code("line:eq:A:B"), "filter.WrongLength");
        assert_eq!(code("line:xx:A"), "filter.UnknownOperation");
        assert_eq!(code("colour:eq:A"), "field.Unknown");
        assert_eq!(code("flight_id:eq:1"), "field.Unknown");
        assert_eq!(code("id:eq:abc"), "id.Invalid");
        assert_eq!(code("row:eq:9999999999"), "row.Invalid");
        assert_eq!(code("index:gt:2147483648"), "index.Invalid");
        assert_eq!(code("type:eq:4294967296"), "type.Invalid");
        assert_eq!(code("line:eq:AB"), "line.Invalid");
        assert_eq!(code("assigned:eq:maybe"), "assigned.Invalid");
        assert_eq!(code("line:eq:A\nrow:eq"), "filter.InvalidFormat");
    }

    #[test]
    fn test_unknown_field_message() {
        let compiler = QueryCompiler::default();
        let err = compiler
            .filtering::<Seat>(&params(&[("filter", "colour:eq:A")]))
            .unwrap_err();
        assert_eq!(err.errors()[0].message, "colour field is unknown");
        assert_eq!(err.errors()[0].field, "field");
    }

    #[test]
    fn test_compile_fails_whole_request() {
        let compiler = QueryCompiler::default();
        let result = compiler.compile::<Seat>(&params(&[
            ("offset", "1"),
            ("sort", "row:asc"),
            ("filter", "row:eq:x"),
        ]));
        assert_eq!(first_code(result.unwrap_err()), "row.Invalid");

        let compiled = compiler
            .compile::<Seat>(&params(&[
                ("offset", "1"),
                ("sort", "row:asc"),
                ("filter", "row:eq:2"),
            ]))
            .unwrap();
        assert_eq!(compiled.limitation.to_sql(), " LIMIT 1, 100");
        assert_eq!(compiled.order.to_sql(), " ORDER BY row ASC");
        assert_eq!(compiled.predicate.to_sql(), " AND (row = 2)");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("a+b%3Ac").as_deref(), Some("a b:c"));
        assert_eq!(unescape("%4"), None);
        assert_eq!(unescape("%G1"), None);
        assert_eq!(unescape("%FF"), None);
        assert_eq!(unescape("").as_deref(), Some(""));
    }
}
