//! # Bindery
//!
//! Declarative data-to-view binding: map a nested data value (text, raw
//! markup, ordered lists, named-field records) onto a tree of pre-existing
//! view nodes, addressed by dot-separated node identifiers.
//!
//! ## Binding Invariants
//!
//! 1. **Prefix-relative discovery**: a scan claims only identifiers that
//!    are a single segment beyond the current path prefix. Deeper
//!    identifiers belong to nested repeated scopes and are claimed by
//!    those scopes' own scans, never earlier.
//! 2. **One table per scope**: the document root and every live clone own
//!    exactly one field table, built fresh when the scope's subtree is
//!    constructed. Tables never alias; clone *i* cannot observe writes to
//!    clone *j*.
//! 3. **Templates are inert**: a repeatable template node is the stamp and
//!    the insertion anchor. It is hidden, never in the live-clone list,
//!    and never mutated after capture.
//! 4. **Order is preserved**: binding a list appends clones strictly in
//!    input order, and resizing touches only trailing clones; surviving
//!    clones keep identity, tables, and position.
//! 5. **Eager, synchronous writes**: every operation runs to completion on
//!    the calling thread; a failed assignment aborts in place with no
//!    rollback.
//!
//! ## Usage
//!
//! ```no_run
//! use bindery::{DomTree, Value};
//!
//! let tree = DomTree::parse(r#"
//!     <body>
//!       <h1 id="title"></h1>
//!       <li id="rows" class="repeated" hidden><span id="rows.label"></span></li>
//!     </body>
//! "#);
//! let mut root = tree.bind_root()?;
//! root.assign(&Value::record([
//!     ("title", Value::from("Inbox")),
//!     ("rows", Value::list([
//!         Value::record([("label", "first")]),
//!         Value::record([("label", "second")]),
//!     ])),
//! ]))?;
//! println!("{}", tree.to_html());
//! # Ok::<(), bindery::BindError>(())
//! ```

mod assign;
mod dom;
mod error;
mod node;
mod repeat;
mod table;
mod value;

pub use dom::{DomNode, DomOptions, DomTree};
pub use error::BindError;
pub use node::ViewNode;
pub use repeat::RepeatedRegion;
pub use table::{Field, FieldTable, Scope};
pub use value::Value;
