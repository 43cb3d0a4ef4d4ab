//! Field Discovery Module for Bindery
//!
//! Scans a subtree for identifier-bearing nodes and claims the ones whose
//! identifier, after the current path prefix is stripped, is a single
//! segment with no embedded dot. Everything deeper belongs to a nested
//! repeated scope and is claimed later, by that scope's own scan.

use std::collections::HashMap;

use log::{debug, trace};
use regex::Regex;

use crate::error::BindError;
use crate::node::ViewNode;
use crate::repeat::RepeatedRegion;

/// One bound field: a direct node reference, or the controller of a
/// repeatable template.
pub enum Field<N: ViewNode> {
    Node(N),
    Repeated(RepeatedRegion<N>),
}

/// Per-scope mapping from field name to bound field.
///
/// Exactly one table exists per scope: the document root, or one live
/// clone of a repeated template. A table is rebuilt from scratch whenever
/// its owning subtree is constructed, never updated incrementally.
pub struct FieldTable<N: ViewNode> {
    fields: HashMap<String, Field<N>>,
}

impl<N: ViewNode> FieldTable<N> {
    /// Scan `scope_root`'s descendants and claim this scope's direct
    /// fields.
    ///
    /// A node is claimed when its identifier matches
    /// `^<escaped prefix>([^.]+)$`. The prefix is escaped in full, so
    /// identifier segments containing regex metacharacters match
    /// literally. The walk is non-destructive: identifiers stay on the
    /// source nodes, and each scope's subtree is only ever scanned once.
    pub fn build(scope_root: &N, prefix: &str) -> Result<Self, BindError> {
        let pattern = Regex::new(&format!("^{}([^.]+)$", regex::escape(prefix))).unwrap();

        let mut fields = HashMap::new();
        for node in scope_root.descendants_with_identifier() {
            let id = match node.identifier() {
                Some(id) => id,
                None => continue,
            };
            let name = match pattern.captures(&id) {
                Some(caps) => caps[1].to_string(),
                // Not this scope's field; a deeper scan may claim it later.
                None => continue,
            };
            if fields.contains_key(&name) {
                return Err(BindError::DuplicateField {
                    field: name,
                    scope: prefix.to_string(),
                });
            }

            if node.is_repeat_template() {
                trace!("claimed repeated field '{}' under prefix '{}'", name, prefix);
                fields.insert(name, Field::Repeated(RepeatedRegion::new(id, node)));
            } else {
                trace!("claimed field '{}' under prefix '{}'", name, prefix);
                fields.insert(name, Field::Node(node));
            }
        }

        debug!(
            "discovered {} field(s) under prefix '{}'",
            fields.len(),
            prefix
        );
        Ok(FieldTable { fields })
    }

    /// Strip the claimed identifiers off a freshly built clone subtree.
    ///
    /// Live clones must not advertise their template's identifiers; only
    /// the document root and the templates themselves keep theirs.
    /// Unclaimed identifiers (nested template contents) stay for the
    /// deeper scans that will claim them.
    pub(crate) fn strip_identifiers(&self) {
        for field in self.fields.values() {
            match field {
                Field::Node(node) => node.clear_identifier(),
                Field::Repeated(region) => region.template_node().clear_identifier(),
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Field<N>> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field<N>> {
        self.fields.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One binding scope: a subtree root paired with its field table.
///
/// The document root and every live clone of a repeated template are
/// scopes. Tables of different scopes never alias; mutating fields on one
/// clone cannot affect another.
pub struct Scope<N: ViewNode> {
    node: N,
    table: FieldTable<N>,
}

impl<N: ViewNode> Scope<N> {
    /// Build the root scope over a view tree. The caller owns the result;
    /// no ambient registration happens.
    pub fn root(node: N) -> Result<Self, BindError> {
        let table = FieldTable::build(&node, "")?;
        Ok(Scope { node, table })
    }

    pub(crate) fn new(node: N, table: FieldTable<N>) -> Self {
        Scope { node, table }
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn table(&self) -> &FieldTable<N> {
        &self.table
    }

    pub fn field(&self, name: &str) -> Option<&Field<N>> {
        self.table.get(name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field<N>> {
        self.table.get_mut(name)
    }
}
