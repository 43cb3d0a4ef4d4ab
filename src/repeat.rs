//! Repeated Region Module for Bindery
//!
//! Lifecycle of one repeatable template and its live clones. The template
//! node stays in the tree, hidden, and doubles as the insertion anchor
//! before any clone exists; it is never mutated after capture.

use log::trace;

use crate::error::BindError;
use crate::node::ViewNode;
use crate::table::{FieldTable, Scope};

/// Controller for a repeatable template's live clones.
///
/// The live-clone list always mirrors the clones currently attached to the
/// tree, in display order. Each clone owns an independently built field
/// table, so writes into one clone can never leak into another.
pub struct RepeatedRegion<N: ViewNode> {
    /// The template's full matched identifier; nested discovery runs under
    /// the prefix `"<id>."`.
    id: String,
    template: N,
    clones: Vec<Scope<N>>,
}

impl<N: ViewNode> RepeatedRegion<N> {
    pub(crate) fn new(id: String, template: N) -> Self {
        RepeatedRegion {
            id,
            template,
            clones: Vec::new(),
        }
    }

    /// The template's binding identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn template_node(&self) -> &N {
        &self.template
    }

    /// Stamp out one more clone at the end of the region.
    ///
    /// The clone re-derives its own field table before it is attached, so
    /// its nested fields resolve independently of every other clone.
    pub fn append(&mut self) -> Result<&mut Scope<N>, BindError> {
        let clone = self.template.clone_subtree();
        clone.clear_identifier();
        let table = FieldTable::build(&clone, &format!("{}.", self.id))?;
        table.strip_identifiers();
        clone.show();

        let anchor = match self.clones.last() {
            Some(last) => last.node().clone(),
            None => self.template.clone(),
        };
        clone.insert_after(&anchor);

        trace!("appended clone {} of '{}'", self.clones.len(), self.id);
        self.clones.push(Scope::new(clone, table));
        let last = self.clones.len() - 1;
        Ok(&mut self.clones[last])
    }

    /// The live clone at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<&Scope<N>> {
        self.clones.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Scope<N>> {
        self.clones.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scope<N>> {
        self.clones.iter()
    }

    /// Number of live clones.
    pub fn len(&self) -> usize {
        self.clones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clones.is_empty()
    }

    /// Grow or shrink to exactly `count` clones.
    ///
    /// Only trailing clones are appended or detached; surviving clones
    /// keep their identity, field tables, and order.
    pub fn resize(&mut self, count: usize) -> Result<(), BindError> {
        if count < self.clones.len() {
            trace!("shrinking '{}' from {} to {}", self.id, self.clones.len(), count);
            for scope in self.clones.drain(count..) {
                scope.node().detach();
            }
        } else {
            while self.clones.len() < count {
                self.append()?;
            }
        }
        Ok(())
    }

    /// Detach every live clone. Equivalent to `resize(0)`.
    pub fn clear(&mut self) {
        trace!("clearing {} clone(s) of '{}'", self.clones.len(), self.id);
        for scope in self.clones.drain(..) {
            scope.node().detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{DomNode, DomTree};
    use crate::table::Field;

    // Kept free of whitespace between tags so text assertions are exact.
    const LIST: &str = "<html><body><ul>\
        <li id=\"rows\" class=\"repeated\" hidden><span id=\"rows.label\"></span></li>\
        </ul></body></html>";

    fn region_of(tree: &DomTree) -> RepeatedRegion<DomNode> {
        let template = tree.node_by_identifier("rows").unwrap();
        assert!(template.is_repeat_template());
        RepeatedRegion::new("rows".to_string(), template)
    }

    #[test]
    fn test_append_rebuilds_nested_table() {
        let tree = DomTree::parse(LIST);
        let mut region = region_of(&tree);

        let first = region.append().unwrap();
        assert!(first.table().contains("label"));
        assert!(first.node().identifier().is_none());
        assert!(first.node().is_attached());
        // Template keeps its identifier and stays hidden.
        assert!(tree.node_by_identifier("rows").is_some());
    }

    #[test]
    fn test_clone_isolation() {
        let tree = DomTree::parse(LIST);
        let mut region = region_of(&tree);

        region.append().unwrap();
        region.append().unwrap();

        let label = |scope: &Scope<DomNode>| match scope.field("label") {
            Some(Field::Node(n)) => n.clone(),
            _ => panic!("missing label"),
        };
        label(region.get(0).unwrap()).set_text("one");
        label(region.get(1).unwrap()).set_text("two");

        assert_eq!(region.get(0).unwrap().node().text_content(), "one");
        assert_eq!(region.get(1).unwrap().node().text_content(), "two");
    }

    #[test]
    fn test_resize_is_idempotent() {
        let tree = DomTree::parse(LIST);
        let mut region = region_of(&tree);

        region.resize(3).unwrap();
        let identities: Vec<DomNode> =
            region.iter().map(|s| s.node().clone()).collect();

        region.resize(3).unwrap();
        assert_eq!(region.len(), 3);
        for (scope, before) in region.iter().zip(&identities) {
            assert!(scope.node().same_node(before));
        }
    }

    #[test]
    fn test_resize_shrink_then_grow() {
        let tree = DomTree::parse(LIST);
        let mut region = region_of(&tree);

        region.resize(5).unwrap();
        let originals: Vec<DomNode> =
            region.iter().map(|s| s.node().clone()).collect();

        region.resize(2).unwrap();
        assert_eq!(region.len(), 2);

        region.resize(4).unwrap();
        assert_eq!(region.len(), 4);

        assert!(region.get(0).unwrap().node().same_node(&originals[0]));
        assert!(region.get(1).unwrap().node().same_node(&originals[1]));
        // Trailing clones are fresh, not resurrected.
        for old in &originals[2..] {
            assert!(!region.get(2).unwrap().node().same_node(old));
            assert!(!region.get(3).unwrap().node().same_node(old));
        }
    }

    #[test]
    fn test_clones_follow_template_in_order() {
        let tree = DomTree::parse(LIST);
        let mut region = region_of(&tree);

        region.resize(3).unwrap();
        for i in 0..3 {
            region.get(i).unwrap().node().set_text(&i.to_string());
        }

        // The hidden template contributes no text; clones read back in
        // append order.
        let parent = region.get(0).unwrap().node().parent().unwrap();
        assert_eq!(parent.text_content(), "012");
    }

    #[test]
    fn test_clear_detaches_everything() {
        let tree = DomTree::parse(LIST);
        let mut region = region_of(&tree);

        region.resize(3).unwrap();
        let clones: Vec<DomNode> = region.iter().map(|s| s.node().clone()).collect();

        region.clear();
        assert_eq!(region.len(), 0);
        for clone in &clones {
            assert!(!clone.is_attached());
        }
    }
}
