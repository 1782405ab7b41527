use alloc::rc::Rc;

use crate::dom::Document;
use crate::{ObserverOptions, VisibilityCallback, VisibilityObserver};

/// The execution context the reveal mechanism runs in.
///
/// A host may have no document at all (e.g. server-side rendering) and may or may not provide
/// a native visibility-observation primitive.
pub trait RevealHost {
    fn document(&self) -> Option<&Document>;

    fn supports_visibility_observer(&self) -> bool;

    /// The host's native observer constructor.
    ///
    /// Returns `None` when the host cannot build one.
    fn create_visibility_observer(
        &self,
        callback: VisibilityCallback,
        options: ObserverOptions,
    ) -> Option<Rc<dyn VisibilityObserver>>;
}

/// What a host can do for the reveal mechanism.
#[derive(Clone, Copy, Debug)]
pub enum Capability<'a> {
    /// No document: nothing to reveal.
    NoContext,
    /// A document without a visibility-observation primitive.
    NoPrimitive(&'a Document),
    /// A document and a visibility-observation primitive.
    Available(&'a Document),
}

impl<'a> Capability<'a> {
    pub fn document(&self) -> Option<&'a Document> {
        match *self {
            Self::NoContext => None,
            Self::NoPrimitive(doc) | Self::Available(doc) => Some(doc),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

pub fn detect_capability<H: RevealHost + ?Sized>(host: &H) -> Capability<'_> {
    match host.document() {
        None => Capability::NoContext,
        Some(doc) if host.supports_visibility_observer() => Capability::Available(doc),
        Some(doc) => Capability::NoPrimitive(doc),
    }
}
