use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use crate::dom::{Element, Node};
use crate::{Bounds, ObserverOptions, REVEAL_VISIBLE_CLASS};

/// One visibility-change record delivered to a [`VisibilityCallback`].
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityEntry {
    /// The observed node. Hosts may report any node; the reveal callback only acts on elements.
    pub target: Node,
    /// Whether the target is sufficiently visible under the observer's root margin and threshold.
    pub is_intersecting: bool,
    /// Visible fraction of the target's area, in `[0, 1]`.
    pub intersection_ratio: f64,
    pub bounding_rect: Bounds,
    pub intersection_rect: Bounds,
    /// The viewport after the root margin was applied.
    pub root_bounds: Bounds,
}

impl VisibilityEntry {
    /// A record with empty geometry; the ratio is `1.0` when intersecting and `0.0` otherwise.
    pub fn new(target: Node, is_intersecting: bool) -> Self {
        Self {
            target,
            is_intersecting,
            intersection_ratio: if is_intersecting { 1.0 } else { 0.0 },
            bounding_rect: Bounds::default(),
            intersection_rect: Bounds::default(),
            root_bounds: Bounds::default(),
        }
    }

    pub fn with_intersection_ratio(mut self, ratio: f64) -> Self {
        self.intersection_ratio = ratio;
        self
    }
}

/// A visibility-observation primitive.
///
/// Methods take `&self`: implementations live behind `Rc` and are re-entered from their own
/// callback (the reveal callback unobserves targets while records are being delivered).
pub trait VisibilityObserver {
    /// Starts observing `target`. Observing an already observed target is a no-op.
    fn observe(&self, target: &Element);

    /// Stops observing `target`. Unknown targets are ignored.
    fn unobserve(&self, target: &Element);

    /// Stops observing every target.
    fn disconnect(&self);

    fn options(&self) -> &ObserverOptions;
}

/// Called by an observer with a batch of records and the observer itself.
pub type VisibilityCallback = Rc<dyn Fn(&[VisibilityEntry], &dyn VisibilityObserver)>;

/// Builds an observer from a callback and resolved options.
///
/// This is the injection point used by [`crate::init_reveal_with`]; a host's native
/// constructor is the default.
pub type ObserverFactory = dyn Fn(VisibilityCallback, ObserverOptions) -> Rc<dyn VisibilityObserver>;

/// The live binding between an observer and the targets it was given at initialization.
///
/// Dropping the session does not stop the observer; call [`ObservationSession::disconnect`]
/// for that.
pub struct ObservationSession {
    observer: Rc<dyn VisibilityObserver>,
    targets: Vec<Element>,
}

impl ObservationSession {
    pub(crate) fn new(observer: Rc<dyn VisibilityObserver>, targets: Vec<Element>) -> Self {
        Self { observer, targets }
    }

    pub fn observer(&self) -> &Rc<dyn VisibilityObserver> {
        &self.observer
    }

    pub fn options(&self) -> &ObserverOptions {
        self.observer.options()
    }

    /// Targets collected at initialization, in document order.
    pub fn targets(&self) -> &[Element] {
        &self.targets
    }

    /// Targets that have not been revealed yet.
    pub fn pending(&self) -> Vec<Element> {
        self.targets
            .iter()
            .filter(|t| !t.has_class(REVEAL_VISIBLE_CLASS))
            .cloned()
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.targets
            .iter()
            .all(|t| t.has_class(REVEAL_VISIBLE_CLASS))
    }

    pub fn disconnect(self) {
        self.observer.disconnect();
    }
}

impl fmt::Debug for ObservationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservationSession")
            .field("options", self.observer.options())
            .field("targets", &self.targets)
            .finish_non_exhaustive()
    }
}
