//! Syntax tree and parser for pip requirements files.
//!
//! This crate provides the tree layer consumed by the finder framework in
//! `reqs-core`:
//!
//! - **`Tree`/`Node`**: an arena-backed, immutable parse tree. Nodes expose a
//!   kind tag, source text, byte spans, (line, UTF-16 column) points, ordered
//!   children, a parent link, and the `is_missing`/`has_error` flags the
//!   error finders key on.
//! - **`parse`**: a single-pass, line-oriented parser. It never fails:
//!   malformed input becomes `error` nodes and absent-but-required tokens
//!   become zero-width missing nodes, so analyses always have a tree to walk.
//!
//! Trees are rebuilt wholesale on every document change; nothing is ever
//! mutated in place.
//!
//! # Examples
//!
//! ```
//! use reqs_syntax::{SyntaxKind, parse};
//!
//! let tree = parse("requests>=2.28\n");
//! let requirement = tree.root().child(0).unwrap();
//! assert_eq!(requirement.kind(), SyntaxKind::Requirement);
//! assert_eq!(requirement.child(0).unwrap().text(), "requests");
//! ```

pub mod parser;
pub mod tree;

pub use parser::parse;
pub use tree::{Node, Point, SyntaxKind, Tree};
