//! A deterministic host for running the reveal mechanism outside a browser.
//!
//! [`HeadlessHost`] owns a document, a scrollable viewport and a layout box per element. Its
//! observers ([`GeometryObserver`]) compute intersections against the viewport the way a
//! browser's intersection observer does, queue a record whenever a target's visibility state
//! changes, and deliver queued records only when the host is flushed. That mirrors a browser
//! delivering observer callbacks from its rendering step rather than synchronously.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::mem;

use crate::dom::{Document, Element};
use crate::{
    Bounds, DEFAULT_THRESHOLD, ObserverOptions, RevealHost, RootMargin, VisibilityCallback,
    VisibilityEntry, VisibilityObserver,
};

/// Default viewport for a new host.
pub const DEFAULT_VIEWPORT: Bounds = Bounds::new(0.0, 0.0, 1280.0, 800.0);

struct Scene {
    viewport: Cell<Bounds>,
    layout: RefCell<Vec<(Element, Bounds)>>,
}

impl Scene {
    fn bounds_of(&self, element: &Element) -> Option<Bounds> {
        self.layout
            .borrow()
            .iter()
            .find(|(e, _)| e == element)
            .map(|(_, b)| *b)
    }

    fn set_bounds(&self, element: &Element, bounds: Bounds) {
        let mut layout = self.layout.borrow_mut();
        match layout.iter().position(|(e, _)| e == element) {
            Some(i) => layout[i].1 = bounds,
            None => layout.push((element.clone(), bounds)),
        }
    }
}

/// A host backed by an in-memory document and a simulated viewport.
///
/// Observers built by the host stay alive as long as the host does, like a page keeps its
/// observers alive; dropping an [`ObservationSession`](crate::ObservationSession) does not stop
/// delivery.
pub struct HeadlessHost {
    document: Option<Document>,
    supports_observer: bool,
    scene: Rc<Scene>,
    observers: RefCell<Vec<Rc<GeometryObserver>>>,
}

impl HeadlessHost {
    /// A host with `document`, observer support and [`DEFAULT_VIEWPORT`].
    pub fn new(document: Document) -> Self {
        Self {
            document: Some(document),
            supports_observer: true,
            scene: Rc::new(Scene {
                viewport: Cell::new(DEFAULT_VIEWPORT),
                layout: RefCell::new(Vec::new()),
            }),
            observers: RefCell::new(Vec::new()),
        }
    }

    /// A host with no document, like a server-side rendering context.
    pub fn without_document() -> Self {
        Self {
            document: None,
            ..Self::new(Document::new())
        }
    }

    pub fn with_visibility_observer(mut self, supported: bool) -> Self {
        self.supports_observer = supported;
        self
    }

    pub fn with_viewport(self, viewport: Bounds) -> Self {
        self.scene.viewport.set(viewport);
        self
    }

    pub fn viewport(&self) -> Bounds {
        self.scene.viewport.get()
    }

    /// Moves or resizes the viewport and re-evaluates every observer.
    pub fn set_viewport(&self, viewport: Bounds) {
        self.scene.viewport.set(viewport);
        self.evaluate();
    }

    pub fn scroll_to(&self, x: f64, y: f64) {
        let viewport = self.viewport();
        self.set_viewport(Bounds { x, y, ..viewport });
    }

    pub fn scroll_by(&self, dx: f64, dy: f64) {
        self.set_viewport(self.viewport().translate(dx, dy));
    }

    pub fn bounds(&self, element: &Element) -> Option<Bounds> {
        self.scene.bounds_of(element)
    }

    /// Sets an element's layout box and re-evaluates every observer.
    pub fn set_bounds(&self, element: &Element, bounds: Bounds) {
        self.scene.set_bounds(element, bounds);
        self.evaluate();
    }

    /// Stacks `elements` vertically from `top`, each `height` tall and as wide as the
    /// viewport, separated by `gap`.
    pub fn layout_column(&self, elements: &[Element], top: f64, height: f64, gap: f64) {
        let viewport = self.viewport();
        let mut y = top;
        for element in elements {
            self.scene
                .set_bounds(element, Bounds::new(viewport.x, y, viewport.width, height));
            y += height + gap;
        }
        self.evaluate();
    }

    /// Delivers queued records to every live observer's callback.
    ///
    /// Returns the number of records delivered.
    pub fn flush(&self) -> usize {
        let mut delivered = 0;
        for observer in self.observers() {
            delivered += observer.deliver();
        }
        if delivered > 0 {
            rtrace!(delivered, "HeadlessHost::flush");
        }
        delivered
    }

    /// Observers built by this host that have not been disconnected, in creation order.
    ///
    /// Disconnected observers are dropped from the host here.
    pub fn observers(&self) -> Vec<Rc<GeometryObserver>> {
        let mut observers = self.observers.borrow_mut();
        observers.retain(|observer| !observer.is_disconnected());
        observers.clone()
    }

    fn evaluate(&self) {
        for observer in self.observers() {
            observer.evaluate_all();
        }
    }
}

impl RevealHost for HeadlessHost {
    fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    fn supports_visibility_observer(&self) -> bool {
        self.supports_observer
    }

    fn create_visibility_observer(
        &self,
        callback: VisibilityCallback,
        options: ObserverOptions,
    ) -> Option<Rc<dyn VisibilityObserver>> {
        if !self.supports_observer {
            return None;
        }
        let observer = Rc::new(GeometryObserver::new(
            Rc::clone(&self.scene),
            callback,
            options,
        ));
        self.observers.borrow_mut().push(Rc::clone(&observer));
        let observer: Rc<dyn VisibilityObserver> = observer;
        Some(observer)
    }
}

struct Tracked {
    element: Element,
    last: bool,
}

#[derive(Default)]
struct ObserverState {
    targets: Vec<Tracked>,
    queue: Vec<VisibilityEntry>,
}

/// An intersection observer driven by a [`HeadlessHost`].
///
/// A target is sufficiently visible when its layout box intersects the viewport grown (or
/// shrunk) by the root margin, edge contact included, and the visible fraction of its area is
/// at least the threshold. A zero-area target that intersects counts as fully visible; a
/// target without a layout box never intersects.
pub struct GeometryObserver {
    scene: Rc<Scene>,
    callback: VisibilityCallback,
    options: ObserverOptions,
    root_margin: RootMargin,
    threshold: f64,
    disconnected: Cell<bool>,
    state: RefCell<ObserverState>,
}

impl GeometryObserver {
    fn new(scene: Rc<Scene>, callback: VisibilityCallback, options: ObserverOptions) -> Self {
        let root_margin = match options.parsed_root_margin() {
            Ok(margin) => margin,
            Err(_err) => {
                rwarn!(error = %_err, "GeometryObserver: falling back to a zero root margin");
                RootMargin::default()
            }
        };
        let threshold = if options.threshold.is_nan() {
            rwarn!("GeometryObserver: NaN threshold, using the default");
            DEFAULT_THRESHOLD
        } else {
            let clamped = options.threshold.clamp(0.0, 1.0);
            if clamped != options.threshold {
                rwarn!(
                    threshold = options.threshold,
                    clamped,
                    "GeometryObserver: threshold out of range"
                );
            }
            clamped
        };

        Self {
            scene,
            callback,
            options,
            root_margin,
            threshold,
            disconnected: Cell::new(false),
            state: RefCell::new(ObserverState::default()),
        }
    }

    /// Effective threshold after validation.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn root_margin(&self) -> RootMargin {
        self.root_margin
    }

    /// Currently observed elements, in observation order.
    pub fn observed(&self) -> Vec<Element> {
        self.state
            .borrow()
            .targets
            .iter()
            .map(|t| t.element.clone())
            .collect()
    }

    pub fn is_observing(&self, element: &Element) -> bool {
        self.state
            .borrow()
            .targets
            .iter()
            .any(|t| t.element == *element)
    }

    /// A disconnected observer ignores further `observe` calls.
    pub fn is_disconnected(&self) -> bool {
        self.disconnected.get()
    }

    /// Number of records waiting for the next flush.
    pub fn queued(&self) -> usize {
        self.state.borrow().queue.len()
    }

    fn compute(&self, element: &Element) -> VisibilityEntry {
        let root_bounds = self.root_margin.expand(self.scene.viewport.get());
        let mut entry = VisibilityEntry::new(element.as_node().clone(), false);
        entry.root_bounds = root_bounds;

        let Some(bounds) = self.scene.bounds_of(element) else {
            return entry;
        };
        entry.bounding_rect = bounds;
        // NaN edges would slip through `min`/`max` and read as full visibility.
        if !bounds.is_finite() || !root_bounds.is_finite() {
            return entry;
        }

        let Some(intersection) = bounds.intersection(&root_bounds) else {
            return entry;
        };
        let area = bounds.area();
        let ratio = if area > 0.0 {
            (intersection.area() / area).min(1.0)
        } else {
            1.0
        };

        entry.intersection_rect = intersection;
        entry.intersection_ratio = ratio;
        entry.is_intersecting = ratio >= self.threshold;
        entry
    }

    fn evaluate_all(&self) {
        let mut state = self.state.borrow_mut();
        let ObserverState { targets, queue } = &mut *state;
        for tracked in targets.iter_mut() {
            let entry = self.compute(&tracked.element);
            if entry.is_intersecting != tracked.last {
                tracked.last = entry.is_intersecting;
                queue.push(entry);
            }
        }
    }

    fn deliver(&self) -> usize {
        let entries = mem::take(&mut self.state.borrow_mut().queue);
        if entries.is_empty() {
            return 0;
        }
        (self.callback)(&entries, self);
        entries.len()
    }
}

impl VisibilityObserver for GeometryObserver {
    fn observe(&self, target: &Element) {
        if self.is_disconnected() {
            rwarn!("GeometryObserver: observe after disconnect");
            return;
        }
        if self.is_observing(target) {
            return;
        }
        // The first evaluation of a target is always reported.
        let entry = self.compute(target);
        let mut state = self.state.borrow_mut();
        state.targets.push(Tracked {
            element: target.clone(),
            last: entry.is_intersecting,
        });
        state.queue.push(entry);
    }

    fn unobserve(&self, target: &Element) {
        self.state
            .borrow_mut()
            .targets
            .retain(|t| t.element != *target);
    }

    fn disconnect(&self) {
        self.disconnected.set(true);
        let mut state = self.state.borrow_mut();
        state.targets.clear();
        state.queue.clear();
    }

    fn options(&self) -> &ObserverOptions {
        &self.options
    }
}
