//! Finder framework for reqs-lsp.
//!
//! This crate is the analysis core: a predicate-driven tree visitor
//! ([`Finder`]) over the syntax trees produced by `reqs-syntax`, plus the
//! projections that turn findings into editor-protocol shapes.
//!
//! # Architecture
//!
//! - **[`Uni`]**: one reportable unit, a (document, node) pair. Converts to
//!   a range, location, diagnostic, text edit, or document link.
//! - **[`Finder`]**: a stateful predicate plus rendering metadata. The
//!   provided `find`/`find_all` drive a pre-order traversal that prunes the
//!   subtree of every match, and transparently fold included documents
//!   (`-r`/`-c` references) into the walk when a finder declares inclusion
//!   points.
//! - **Standard finders**: syntax errors, missing tokens, kind and point
//!   queries, and the pairing family (`RepeatedFinder`/`UnsortedFinder`)
//!   that powers duplicate detection, go-to-definition across occurrences,
//!   and pairwise re-sort edits.
//! - **Projection**: [`diagnose`] aggregates finders into diagnostics and
//!   renders CLI linter lines; [`format`] splices text edits against the
//!   original source.
//!
//! The package-name lookup used by domain finders is abstracted behind
//! [`PackageLookup`] so the analysis layer stays synchronous and free of
//! network concerns.

pub mod diagnose;
pub mod finder;
pub mod finders;
pub mod format;
pub mod lookup;
pub mod uni;

pub use diagnose::{count_level, get_diagnostics, linter_message, severity_name};
pub use finder::{Combined, CombineOp, FindReport, Finder, FinderExt, MAX_INCLUDE_DEPTH};
pub use finders::{
    ErrorFinder, InvalidPackageFinder, InvalidPathFinder, MissingFinder, PairRelation,
    PairingFinder, PositionFinder, RangeFinder, RepeatedFinder, SortsBefore, TextEqual, TypeFinder,
    UnsortedFinder, include_target,
};
pub use format::{apply_text_edits, position_to_offset};
pub use lookup::PackageLookup;
pub use uni::{Uni, path_to_uri, uri_to_path};

/// `source` attached to every diagnostic this framework produces.
pub const DIAGNOSTIC_SOURCE: &str = "reqs-lsp";
