//! Phase 3: context-sensitive validation.
//!
//! A second pass over the AST enforcing everything the grammar cannot:
//! per-context object property rules, id and code ranges, required
//! definition fields, annotation targets and arities, and the media
//! format whitelists. Produces diagnostics in AST pre-order; never
//! mutates the tree.

mod validator;

pub use validator::validate;
