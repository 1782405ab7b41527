use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use crate::dom::{Element, Node};
use crate::host::{Capability, RevealHost, detect_capability};
use crate::selector::Selector;
use crate::{
    ObservationSession, ObserverFactory, ObserverOptions, REVEAL_VISIBLE_CLASS, RevealInit,
    VisibilityCallback, VisibilityEntry, VisibilityObserver,
};

/// Collects the reveal targets in `root`'s subtree, in document order.
///
/// `root` itself is not considered. Use `document.root()` (or
/// [`crate::Document::reveal_targets`]) for the whole document.
pub fn get_reveal_targets(root: &Node) -> Vec<Element> {
    root.query_selector_all(&Selector::reveal())
}

/// Marks every element as revealed. Already revealed elements are left unchanged.
pub fn reveal_elements<'a>(targets: impl IntoIterator<Item = &'a Element>) {
    for target in targets {
        target.add_class(REVEAL_VISIBLE_CLASS);
    }
}

/// The observer callback used by [`init_reveal`].
///
/// Each sufficiently visible element is revealed and unobserved, so it is never reported
/// again. Records that are not intersecting, or whose target is not an element, are skipped.
pub fn handle_visibility_entries(entries: &[VisibilityEntry], observer: &dyn VisibilityObserver) {
    for entry in entries {
        if !entry.is_intersecting {
            continue;
        }
        let Some(target) = entry.target.as_element() else {
            rtrace!(kind = ?entry.target.kind(), "skipping non-element visibility record");
            continue;
        };

        target.add_class(REVEAL_VISIBLE_CLASS);
        observer.unobserve(&target);
        rtrace!(
            tag = target.tag_name(),
            ratio = entry.intersection_ratio,
            "revealed target"
        );
    }
}

/// Starts revealing the document's targets using the host's native observer.
///
/// Returns `None` when there is nothing to observe: no document, no targets, or no observer
/// (in which case every target is revealed immediately). `None` is a normal outcome.
pub fn init_reveal<H: RevealHost + ?Sized>(
    host: &H,
    init: &RevealInit,
) -> Option<ObservationSession> {
    init_reveal_impl(host, init, |callback, options| {
        host.create_visibility_observer(callback, options)
    })
}

/// Like [`init_reveal`], but builds the observer with `factory`.
///
/// The host is still consulted for a document and for observer support: a host without the
/// primitive degrades to revealing everything even when a factory is supplied.
pub fn init_reveal_with<H, F>(host: &H, init: &RevealInit, factory: &F) -> Option<ObservationSession>
where
    H: RevealHost + ?Sized,
    F: Fn(VisibilityCallback, ObserverOptions) -> Rc<dyn VisibilityObserver> + ?Sized,
{
    init_reveal_impl(host, init, |callback, options| {
        Some(factory(callback, options))
    })
}

fn init_reveal_impl<H: RevealHost + ?Sized>(
    host: &H,
    init: &RevealInit,
    build: impl FnOnce(VisibilityCallback, ObserverOptions) -> Option<Rc<dyn VisibilityObserver>>,
) -> Option<ObservationSession> {
    let (document, available) = match detect_capability(host) {
        Capability::NoContext => {
            rdebug!("init_reveal: no document");
            return None;
        }
        Capability::NoPrimitive(document) => (document, false),
        Capability::Available(document) => (document, true),
    };

    let targets = get_reveal_targets(document.root());
    if targets.is_empty() {
        rdebug!("init_reveal: no targets");
        return None;
    }

    if !available {
        rdebug!(
            targets = targets.len(),
            "init_reveal: no visibility observer, revealing all"
        );
        reveal_elements(&targets);
        return None;
    }

    let options = ObserverOptions::default().merged(init);
    let callback: VisibilityCallback = Rc::new(handle_visibility_entries);
    let Some(observer) = build(callback, options) else {
        rwarn!("init_reveal: host declined to build an observer, revealing all");
        reveal_elements(&targets);
        return None;
    };

    for target in &targets {
        observer.observe(target);
    }
    rdebug!(
        targets = targets.len(),
        root_margin = observer.options().root_margin.as_str(),
        threshold = observer.options().threshold,
        "init_reveal"
    );
    Some(ObservationSession::new(observer, targets))
}

/// A reusable reveal configuration.
///
/// Bundles the caller's option overlay and an optional observer factory so the same setup can
/// be applied to several hosts or documents.
#[derive(Clone, Default)]
pub struct RevealController {
    init: RevealInit,
    factory: Option<Rc<ObserverFactory>>,
}

impl RevealController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_init(mut self, init: RevealInit) -> Self {
        self.init = init;
        self
    }

    pub fn with_root_margin(mut self, root_margin: &str) -> Self {
        self.init.root_margin = Some(root_margin.into());
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.init.threshold = Some(threshold);
        self
    }

    /// Replaces the host's native observer constructor.
    pub fn with_observer_factory(
        mut self,
        factory: impl Fn(VisibilityCallback, ObserverOptions) -> Rc<dyn VisibilityObserver> + 'static,
    ) -> Self {
        let factory: Rc<ObserverFactory> = Rc::new(factory);
        self.factory = Some(factory);
        self
    }

    pub fn init_options(&self) -> &RevealInit {
        &self.init
    }

    /// The options an observer built by this controller receives.
    pub fn observer_options(&self) -> ObserverOptions {
        ObserverOptions::default().merged(&self.init)
    }

    pub fn targets(&self, root: &Node) -> Vec<Element> {
        get_reveal_targets(root)
    }

    pub fn reveal<'a>(&self, targets: impl IntoIterator<Item = &'a Element>) {
        reveal_elements(targets);
    }

    pub fn init<H: RevealHost + ?Sized>(&self, host: &H) -> Option<ObservationSession> {
        match &self.factory {
            Some(factory) => init_reveal_with(host, &self.init, &**factory),
            None => init_reveal(host, &self.init),
        }
    }
}

impl fmt::Debug for RevealController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevealController")
            .field("init", &self.init)
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}
