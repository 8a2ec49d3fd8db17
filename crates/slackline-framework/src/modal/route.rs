//! Structural modal identifiers and selected routes.

use std::fmt;
use std::sync::Arc;

/// Scratch-map key the selected [`ModalRoute`] is stored under.
pub const MODAL_ROUTE_KEY: &str = "modal:route";

/// Identifies a node by its tree's root callback id and its index path.
///
/// Ids are assigned when children are attached, so they are deterministic
/// and unique within one tree. Including the root callback id keeps keys of
/// different trees apart when they share a context.
///
/// Rendered as `{path}/{root}`, e.g. `1.0/signup`, or `/signup` for the root.
/// The path part never contains `/`, so any callback id stays unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModalId {
    root: Arc<str>,
    path: Vec<usize>,
}

impl ModalId {
    pub(crate) fn root(callback_id: &str) -> Self {
        Self {
            root: Arc::from(callback_id),
            path: Vec::new(),
        }
    }

    pub(crate) fn child(&self, index: usize) -> Self {
        let mut path = self.path.clone();
        path.push(index);
        Self {
            root: Arc::clone(&self.root),
            path,
        }
    }

    /// Index path from the root; empty for the root itself.
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Scratch-map key recording this node's own selected mode.
    pub fn key(&self) -> String {
        format!("modal:{self}")
    }
}

impl fmt::Display for ModalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, index) in self.path.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{index}")?;
        }
        write!(f, "/{}", self.root)
    }
}

/// What the selected node was chosen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalMode {
    /// A view submission whose callback id matched the node.
    Submit,
    /// The node's update check accepted the request.
    Update,
}

/// The path from a root to the node that accepted a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalRoute {
    path: Vec<ModalId>,
    mode: ModalMode,
}

impl ModalRoute {
    pub(crate) fn new(selected: ModalId, mode: ModalMode) -> Self {
        Self {
            path: vec![selected],
            mode,
        }
    }

    pub(crate) fn prepend(mut self, ancestor: ModalId) -> Self {
        self.path.insert(0, ancestor);
        self
    }

    /// Ids from the root down to the selected node.
    pub fn path(&self) -> &[ModalId] {
        &self.path
    }

    pub fn mode(&self) -> ModalMode {
        self.mode
    }

    /// The node that accepted the request.
    pub fn selected(&self) -> &ModalId {
        // A route always holds at least the selected node.
        &self.path[self.path.len() - 1]
    }

    /// The id following `id` on this route, if `id` is an ancestor of the
    /// selected node.
    pub fn next_after(&self, id: &ModalId) -> Option<&ModalId> {
        let position = self.path.iter().position(|p| p == id)?;
        self.path.get(position + 1)
    }
}
