// Example: scroll a headless page and watch sections reveal.
use reveal::{Bounds, Document, Element, HeadlessHost, RevealController, REVEAL_VISIBLE_CLASS};

fn main() {
    let doc = Document::new();
    let mut sections = Vec::new();
    for i in 0..6 {
        let section = Element::new("section").with_attribute("data-reveal", "");
        section.set_attribute("id", &format!("s{i}"));
        doc.body().append_child(&section).expect("fresh element");
        sections.push(section);
    }

    let host = HeadlessHost::new(doc).with_viewport(Bounds::new(0.0, 0.0, 1200.0, 700.0));
    host.layout_column(&sections, 80.0, 500.0, 120.0);

    let controller = RevealController::new().with_threshold(0.25);
    let Some(session) = controller.init(&host) else {
        println!("nothing to observe");
        return;
    };

    for y in (0..=3000).step_by(500) {
        host.scroll_to(0.0, y as f64);
        let delivered = host.flush();
        let revealed: Vec<_> = sections
            .iter()
            .filter(|s| s.has_class(REVEAL_VISIBLE_CLASS))
            .filter_map(|s| s.id())
            .collect();
        println!("scroll_y={y:<5} records={delivered} revealed={revealed:?}");
    }
    println!("complete={}", session.is_complete());
}
