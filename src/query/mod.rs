//! # Query Compiler
//!
//! Compiles list-endpoint query parameters into SQL fragments that the
//! store appends verbatim:
//!
//! - [`Limitation`]: `" LIMIT {offset}, {count}"`
//! - [`OrderSpec`]: `" ORDER BY {field} {DIR}, ..."`
//! - [`Predicate`]: `" AND ({atom} OR ...) AND (...)"`
//!
//! Field names and literal rules come from a static per-entity
//! [`EntitySchema`].

pub mod filter;
pub mod order;
pub mod parser;
pub mod schema;

pub use filter::{FilterAtom, FilterGroup, FilterOperator, Predicate};
pub use order::{Direction, Limitation, OrderSpec, OrderTerm};
pub use parser::{CompiledQuery, QueryCompiler, QueryParams, DEFAULT_LIMIT};
pub use schema::{parse_bool, quote, EntitySchema, FieldDescriptor, ValueKind};
