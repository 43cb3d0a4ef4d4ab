//! Assignment Module for Bindery
//!
//! The recursive value-to-view walk. Dispatch is driven purely by the
//! shape of the data; the view tree, through its field tables, is the only
//! schema there is. Writes are applied eagerly and there is no rollback;
//! a failed assignment leaves whatever the traversal wrote before it
//! stopped.

use log::debug;

use crate::error::BindError;
use crate::node::ViewNode;
use crate::repeat::RepeatedRegion;
use crate::table::{Field, Scope};
use crate::value::Value;

impl<N: ViewNode> Scope<N> {
    /// Assign a data value onto this scope.
    ///
    /// - text and markup leaves write the scope's own content;
    /// - records dispatch field by field, with the reserved keys `text`
    ///   and `html` addressing the scope itself, unresolved names falling
    ///   back to attribute writes;
    /// - lists are rejected here, since they bind only to repeated fields.
    pub fn assign(&mut self, value: &Value) -> Result<(), BindError> {
        assign_scope(self, value, "$")
    }
}

fn assign_scope<N: ViewNode>(
    scope: &mut Scope<N>,
    value: &Value,
    path: &str,
) -> Result<(), BindError> {
    match value {
        Value::Text(text) => {
            scope.node().set_text(text);
            Ok(())
        }
        Value::Markup(markup) => {
            scope.node().set_markup(markup);
            Ok(())
        }
        Value::List(_) => Err(BindError::ShapeMismatch {
            value: "list",
            destination: "a non-repeated scope".to_string(),
            scope: path.to_string(),
        }),
        Value::Record(fields) => {
            // Cheap handle to the scope's own node, taken before the field
            // table is borrowed mutably below.
            let own = scope.node().clone();
            for (name, child) in fields {
                match name.as_str() {
                    "text" => set_own_text(&own, child, path)?,
                    "html" => set_own_markup(&own, child, path)?,
                    _ => {
                        let child_path = format!("{}.{}", path, name);
                        match scope.field_mut(name) {
                            Some(Field::Node(node)) => {
                                let node = node.clone();
                                assign_node(&node, child, &child_path)?;
                            }
                            Some(Field::Repeated(region)) => {
                                assign_region(region, child, &child_path)?;
                            }
                            None => assign_attribute(&own, name, child, path)?,
                        }
                    }
                }
            }
            Ok(())
        }
    }
}

/// Assignment into a plain bound node. A plain field owns no field table,
/// so record keys other than the reserved ones can only be attributes.
fn assign_node<N: ViewNode>(node: &N, value: &Value, path: &str) -> Result<(), BindError> {
    match value {
        Value::Text(text) => {
            node.set_text(text);
            Ok(())
        }
        Value::Markup(markup) => {
            node.set_markup(markup);
            Ok(())
        }
        Value::List(_) => Err(BindError::ShapeMismatch {
            value: "list",
            destination: "a plain node".to_string(),
            scope: path.to_string(),
        }),
        Value::Record(fields) => {
            for (name, child) in fields {
                match name.as_str() {
                    "text" => set_own_text(node, child, path)?,
                    "html" => set_own_markup(node, child, path)?,
                    _ => assign_attribute(node, name, child, path)?,
                }
            }
            Ok(())
        }
    }
}

/// Assignment into a repeated region. Lists reconcile the clone set;
/// anything else has nowhere to go: a region offers neither text nor
/// attribute capability.
fn assign_region<N: ViewNode>(
    region: &mut RepeatedRegion<N>,
    value: &Value,
    path: &str,
) -> Result<(), BindError> {
    match value {
        Value::List(items) => {
            region.clear();
            for (index, item) in items.iter().enumerate() {
                let item_path = format!("{}[{}]", path, index);
                let slot = region.append()?;
                assign_scope(slot, item, &item_path)?;
            }
            Ok(())
        }
        Value::Record(fields) => match fields.first() {
            None => Ok(()),
            Some((name, child)) if name == "text" || name == "html" => {
                Err(BindError::ShapeMismatch {
                    value: child.kind(),
                    destination: "a repeated region".to_string(),
                    scope: path.to_string(),
                })
            }
            Some((name, _)) => Err(BindError::UnknownField {
                field: name.clone(),
                scope: path.to_string(),
            }),
        },
        other => Err(BindError::ShapeMismatch {
            value: other.kind(),
            destination: "a repeated region".to_string(),
            scope: path.to_string(),
        }),
    }
}

fn assign_attribute<N: ViewNode>(
    node: &N,
    name: &str,
    value: &Value,
    path: &str,
) -> Result<(), BindError> {
    match value.scalar() {
        Some(text) => {
            debug!("binding unresolved field '{}' as attribute at {}", name, path);
            node.set_attribute(name, text);
            Ok(())
        }
        None => Err(BindError::ShapeMismatch {
            value: value.kind(),
            destination: format!("attribute '{}'", name),
            scope: path.to_string(),
        }),
    }
}

fn set_own_text<N: ViewNode>(node: &N, value: &Value, path: &str) -> Result<(), BindError> {
    match value.scalar() {
        Some(text) => {
            node.set_text(text);
            Ok(())
        }
        None => Err(BindError::ShapeMismatch {
            value: value.kind(),
            destination: "the reserved 'text' field".to_string(),
            scope: path.to_string(),
        }),
    }
}

fn set_own_markup<N: ViewNode>(node: &N, value: &Value, path: &str) -> Result<(), BindError> {
    let markup = match value {
        Value::Text(s) => s,
        Value::Markup(s) => s,
        other => {
            return Err(BindError::ShapeMismatch {
                value: other.kind(),
                destination: "the reserved 'html' field".to_string(),
                scope: path.to_string(),
            })
        }
    };
    node.set_markup(markup);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DomTree;

    // The list template carries no whitespace between tags so clone text
    // assertions are exact.
    const PAGE: &str = "<html><body>\
        <h1 id=\"title\"></h1>\
        <div id=\"intro\"></div>\
        <ul><li id=\"rows\" class=\"repeated\" hidden><span id=\"rows.label\"></span></li></ul>\
        </body></html>";

    #[test]
    fn test_scalar_assigns_text() {
        let tree = DomTree::parse(PAGE);
        let mut root = tree.bind_root().unwrap();
        root.assign(&Value::record([("title", "Hello & <welcome>")]))
            .unwrap();

        let title = tree.node_by_identifier("title").unwrap();
        assert_eq!(title.text_content(), "Hello & <welcome>");
        // Literal text, never interpreted as markup.
        assert!(tree.to_html().contains("&lt;welcome&gt;"));
    }

    #[test]
    fn test_markup_leaf_assigns_markup() {
        let tree = DomTree::parse(PAGE);
        let mut root = tree.bind_root().unwrap();
        root.assign(&Value::record([("intro", Value::markup("<em>hi</em>"))]))
            .unwrap();
        assert!(tree.to_html().contains("<em>hi</em>"));
    }

    #[test]
    fn test_list_reconciles_clones_in_order() {
        let tree = DomTree::parse(PAGE);
        let mut root = tree.bind_root().unwrap();

        let rows = Value::list([
            Value::record([("label", "x")]),
            Value::record([("label", "y")]),
        ]);
        root.assign(&Value::record([("rows", rows)])).unwrap();

        match root.field("rows") {
            Some(Field::Repeated(region)) => {
                assert_eq!(region.len(), 2);
                assert_eq!(region.get(0).unwrap().node().text_content(), "x");
                assert_eq!(region.get(1).unwrap().node().text_content(), "y");
            }
            _ => panic!("'rows' should be repeated"),
        }
    }

    #[test]
    fn test_reassignment_replaces_clone_set() {
        let tree = DomTree::parse(PAGE);
        let mut root = tree.bind_root().unwrap();

        root.assign(&Value::record([("rows", Value::list(["a", "b", "c"]))]))
            .unwrap();
        root.assign(&Value::record([("rows", Value::list(["z"]))]))
            .unwrap();

        match root.field("rows") {
            Some(Field::Repeated(region)) => {
                assert_eq!(region.len(), 1);
                assert_eq!(region.get(0).unwrap().node().text_content(), "z");
            }
            _ => panic!("'rows' should be repeated"),
        }
    }

    #[test]
    fn test_reserved_text_key_hits_scope_itself() {
        // A child field named `text` must not shadow the reserved key.
        let tree = DomTree::parse(
            r#"<body><div id="card"><span id="card.text">unused</span></div></body>"#,
        );
        let mut root = tree.bind_root().unwrap();
        root.assign(&Value::record([(
            "card",
            Value::record([("text", "hello")]),
        )]))
        .unwrap();

        let card = tree.node_by_identifier("card").unwrap();
        assert_eq!(card.text_content(), "hello");
    }

    #[test]
    fn test_unresolved_name_becomes_attribute() {
        let tree = DomTree::parse(PAGE);
        let mut root = tree.bind_root().unwrap();
        root.assign(&Value::record([(
            "title",
            Value::record([("data-kind", "headline"), ("text", "T")]),
        )]))
        .unwrap();

        let title = tree.node_by_identifier("title").unwrap();
        assert_eq!(title.attribute("data-kind").as_deref(), Some("headline"));
        assert_eq!(title.text_content(), "T");
    }

    #[test]
    fn test_unknown_field_on_region_fails() {
        let tree = DomTree::parse(PAGE);
        let mut root = tree.bind_root().unwrap();
        let err = root
            .assign(&Value::record([(
                "rows",
                Value::record([("nope", Value::from(1i64))]),
            )]))
            .unwrap_err();

        match err {
            BindError::UnknownField { field, scope } => {
                assert_eq!(field, "nope");
                assert_eq!(scope, "$.rows");
            }
            other => panic!("expected unknown field, got {}", other),
        }
    }

    #[test]
    fn test_list_to_plain_node_is_mismatch() {
        let tree = DomTree::parse(PAGE);
        let mut root = tree.bind_root().unwrap();
        let err = root
            .assign(&Value::record([("title", Value::list(["a"]))]))
            .unwrap_err();

        match err {
            BindError::ShapeMismatch { value, scope, .. } => {
                assert_eq!(value, "list");
                assert_eq!(scope, "$.title");
            }
            other => panic!("expected shape mismatch, got {}", other),
        }
    }

    #[test]
    fn test_scalar_to_region_is_mismatch() {
        let tree = DomTree::parse(PAGE);
        let mut root = tree.bind_root().unwrap();
        let err = root
            .assign(&Value::record([("rows", "oops")]))
            .unwrap_err();
        assert!(matches!(err, BindError::ShapeMismatch { value: "text", .. }));
    }

    #[test]
    fn test_failed_assignment_keeps_partial_writes() {
        let tree = DomTree::parse(PAGE);
        let mut root = tree.bind_root().unwrap();
        let result = root.assign(&Value::Record(vec![
            ("title".to_string(), Value::from("kept")),
            ("rows".to_string(), Value::from("oops")),
        ]));

        assert!(result.is_err());
        let title = tree.node_by_identifier("title").unwrap();
        assert_eq!(title.text_content(), "kept");
    }
}
