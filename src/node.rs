//! View Node Capability Surface
//!
//! The binding engine never touches a concrete tree type. Everything it
//! needs from the host (discovery, mutation, cloning, placement) is
//! expressed through this trait, and the engine is generic over it.

/// One node of a host view tree.
///
/// Implementations are expected to be cheap handles onto shared tree
/// storage (`Clone` duplicates the handle, not the subtree), with interior
/// mutability for the write operations. [`crate::dom::DomNode`] is the
/// bundled implementation.
pub trait ViewNode: Clone {
    /// The node's binding identifier, if it carries one. The identifier
    /// encodes the unconsumed suffix of the node's binding path relative
    /// to the scope currently being scanned.
    fn identifier(&self) -> Option<String>;

    /// Remove the binding identifier. Applied to clone roots so a clone is
    /// never re-discoverable in place of its template.
    fn clear_identifier(&self);

    /// Whether this node is marked as a repeatable template rather than a
    /// plain field.
    fn is_repeat_template(&self) -> bool;

    /// All descendants carrying a binding identifier, in document order.
    /// The receiver itself is not included.
    fn descendants_with_identifier(&self) -> Vec<Self>;

    /// Replace the node's content with literal text.
    fn set_text(&self, text: &str);

    /// Replace the node's content with parsed markup, unescaped.
    fn set_markup(&self, markup: &str);

    fn attribute(&self, name: &str) -> Option<String>;

    fn set_attribute(&self, name: &str, value: &str);

    /// Deep-copy the node and its subtree. The copy is detached and keeps
    /// every attribute, including the identifier, until callers strip it.
    fn clone_subtree(&self) -> Self;

    /// Attach this (detached) node as the next sibling of `anchor`.
    fn insert_after(&self, anchor: &Self);

    /// Detach this node from the tree.
    fn detach(&self);

    /// Make the node visible. Templates are hidden; clones are shown as
    /// they are attached.
    fn show(&self);
}
