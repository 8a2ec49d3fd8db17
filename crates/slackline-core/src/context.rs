//! Per-request context.
//!
//! [`SlackContext`] wraps the inbound [`SlackRequest`] together with a
//! string-keyed scratch map ([`Items`]) and an opaque caller tag. A context is
//! created once per `process*` call and dropped when that call returns; it is
//! never shared between requests.
//!
//! Handlers that make a routing decision in `can_handle` record it in the
//! scratch map so the matching `handle` call can read it back:
//!
//! ```rust,ignore
//! async fn can_handle(&self, ctx: &mut SlackContext) -> bool {
//!     match self.pick(ctx.request()) {
//!         Some(index) => {
//!             ctx.items_mut().insert(self.key.clone(), index);
//!             true
//!         }
//!         None => false,
//!     }
//! }
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::model::{Envelope, Payload, RequestKind, SlackRequest};

/// Scratch-map key the pipeline stores the source envelope under.
pub const ENVELOPE_KEY: &str = "envelope";

/// Opaque caller-supplied value attached to a context.
pub type Tag = Arc<dyn Any + Send + Sync>;

// ============================================================================
// Items
// ============================================================================

/// A string-keyed map of type-erased values.
#[derive(Default)]
pub struct Items {
    entries: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl Items {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing any previous value under the same key.
    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), Box::new(value));
    }

    /// Returns the value under `key` if it exists and has type `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries.get(key)?.downcast_ref::<T>()
    }

    /// Mutable variant of [`Items::get`].
    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.entries.get_mut(key)?.downcast_mut::<T>()
    }

    /// Removes the value under `key` and returns it if it has type `T`.
    ///
    /// A value of another type is left in place.
    pub fn remove<T: Any>(&mut self, key: &str) -> Option<T> {
        if !self.entries.get(key)?.is::<T>() {
            return None;
        }
        let boxed = self.entries.remove(key)?;
        boxed.downcast::<T>().ok().map(|b| *b)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the stored keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl fmt::Debug for Items {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

// ============================================================================
// SlackContext
// ============================================================================

/// The context handed to every handler and interceptor.
pub struct SlackContext {
    request: Arc<SlackRequest>,
    items: Items,
    tag: Option<Tag>,
}

impl SlackContext {
    /// Creates a context for the given request.
    pub fn new(request: SlackRequest) -> Self {
        Self {
            request: Arc::new(request),
            items: Items::new(),
            tag: None,
        }
    }

    /// Attaches a tag (builder style).
    pub fn with_tag(mut self, tag: Option<Tag>) -> Self {
        self.tag = tag;
        self
    }

    /// Returns the inbound request.
    pub fn request(&self) -> &SlackRequest {
        &self.request
    }

    /// Returns a shared handle to the request.
    ///
    /// Lets a handler hold a borrowed payload while also mutating
    /// [`items_mut`](Self::items_mut).
    pub fn shared_request(&self) -> Arc<SlackRequest> {
        Arc::clone(&self.request)
    }

    pub fn kind(&self) -> RequestKind {
        self.request.kind()
    }

    /// Borrows a typed payload out of the request.
    pub fn payload<P: Payload>(&self) -> Option<&P> {
        P::extract(&self.request)
    }

    pub fn items(&self) -> &Items {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Items {
        &mut self.items
    }

    /// Returns the caller tag, if any.
    pub fn tag(&self) -> Option<&Tag> {
        self.tag.as_ref()
    }

    /// Returns the caller tag downcast to `T`.
    pub fn tag_as<T: Any>(&self) -> Option<&T> {
        self.tag.as_deref()?.downcast_ref::<T>()
    }

    pub fn set_tag(&mut self, tag: Option<Tag>) {
        self.tag = tag;
    }

    /// Returns the envelope this request was adapted from, if it came in
    /// through `process_envelope`.
    pub fn envelope(&self) -> Option<&Envelope> {
        self.items.get::<Envelope>(ENVELOPE_KEY)
    }
}

impl fmt::Debug for SlackContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackContext")
            .field("request", &self.request.describe())
            .field("items", &self.items)
            .field("has_tag", &self.tag.is_some())
            .finish()
    }
}
