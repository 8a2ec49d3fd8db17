//! Trees of modals that dispatch submissions and updates to the right node.
//!
//! A tree is built from [`ModalNode`]s, each carrying a [`Modal`] behaviour.
//! Wrapping the root in a [`ModalStack`] turns it into a request handler:
//!
//! ```rust,ignore
//! let tree = ModalNode::new("order", OrderForm)
//!     .child("address", ModalNode::new("order_address", AddressForm));
//!
//! let pipeline = Pipeline::new().handler(ModalStack::new(tree, |result| match result {
//!     ModalResult::Submit(action) => Ok(Reply::from(action)),
//!     ModalResult::Update(_) => Ok(Reply::Ack),
//! }));
//! ```
//!
//! When a child accepts a request, every node on the route from the root is
//! invoked in turn, and the child's behaviour receives its parent node.

mod client;
mod node;
mod route;
mod stack;

pub use client::ViewClient;
pub use node::{Modal, ModalNode, ModalResult, ModalScope, UpdateCheck};
pub use route::{MODAL_ROUTE_KEY, ModalId, ModalMode, ModalRoute};
pub use stack::{ModalConverter, ModalStack};
