//! A headless reveal-on-scroll engine.
//!
//! Elements flagged with the `data-reveal` attribute get the `is-visible` class once they
//! scroll into the viewport. A stylesheet is expected to hang its transition on that class.
//!
//! The crate is host-agnostic. A host ([`RevealHost`]) provides:
//! - a document (or none, e.g. during server-side rendering)
//! - optionally, a visibility-observation primitive ([`VisibilityObserver`])
//!
//! [`init_reveal`] wires the two together: every target is observed and, the first time it is
//! sufficiently visible, revealed and unobserved. Without a primitive every target is revealed
//! immediately. [`HeadlessHost`] is a deterministic host with a simulated viewport.
//!
//! ```
//! use reveal::{Bounds, Document, Element, HeadlessHost, RevealInit, init_reveal};
//!
//! let doc = Document::new();
//! let hero = Element::new("section").with_attribute("data-reveal", "");
//! doc.body().append_child(&hero).unwrap();
//!
//! let host = HeadlessHost::new(doc).with_viewport(Bounds::new(0.0, 0.0, 800.0, 600.0));
//! host.set_bounds(&hero, Bounds::new(0.0, 900.0, 800.0, 200.0));
//!
//! let session = init_reveal(&host, &RevealInit::default()).unwrap();
//! host.flush();
//! assert!(!hero.has_class("is-visible"));
//!
//! host.scroll_to(0.0, 600.0);
//! host.flush();
//! assert!(hero.has_class("is-visible"));
//! assert!(session.is_complete());
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
mod dom;
mod error;
mod headless;
mod host;
mod observer;
mod options;
mod selector;
mod types;


pub use controller::{
    RevealController, get_reveal_targets, handle_visibility_entries, init_reveal,
    init_reveal_with, reveal_elements,
};
pub use dom::{Descendants, Document, Element, Node, NodeKind};
pub use error::RevealError;
pub use headless::{DEFAULT_VIEWPORT, GeometryObserver, HeadlessHost};
pub use host::{Capability, RevealHost, detect_capability};
pub use observer::{
    ObservationSession, ObserverFactory, VisibilityCallback, VisibilityEntry, VisibilityObserver,
};
pub use options::{
    DEFAULT_ROOT_MARGIN, DEFAULT_THRESHOLD, MarginLength, ObserverOptions, RevealInit,
    RootMargin, validate_threshold,
};
pub use selector::{CompoundSelector, Selector, SimpleSelector};
pub use types::Bounds;

/// Attribute that opts an element into revealing. Its value is ignored.
pub const REVEAL_ATTRIBUTE: &str = "data-reveal";

/// Selector matching reveal targets.
pub const REVEAL_SELECTOR: &str = "[data-reveal]";

/// Class added to revealed elements.
pub const REVEAL_VISIBLE_CLASS: &str = "is-visible";
