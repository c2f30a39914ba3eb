use thiserror::Error;

/// Errors reported to callers of the ordered containers.
///
/// Structural corruption is not represented here: a broken invariant inside
/// the repair logic is a bug and panics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("invalid traversal order: {0:?} (expected pre_order, in_order or post_order)")]
    InvalidTraversalOrder(String),
}
