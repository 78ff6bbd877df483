//! The landing page the header navigates: four full-height sections inside
//! `main#content`.

use crate::dom::style::{FlexDirection, StylePatch};
use crate::dom::{Document, NodeId};

use super::header::MenuItem;

pub const CONTENT_SELECTOR: &str = "#content";

/// Section id and menu label, top to bottom.
pub const SECTIONS: &[(&str, &str)] = &[
    ("home", "Home"),
    ("about", "About Us"),
    ("services", "Our Services"),
    ("contact", "Contact Us"),
];

const SECTION_PADDING: f64 = 16.0;
const GRID_GAP: f64 = 16.0;
const SERVICE_COUNT: usize = 3;

const ABOUT: &[&str] = &[
    "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Sed do eiusmod tempor \
     incididunt ut labore et dolore magna aliqua.",
    "Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi ut aliquip \
     ex ea commodo consequat.",
];

pub fn menu_items() -> Vec<MenuItem> {
    SECTIONS
        .iter()
        .map(|(id, label)| MenuItem::new(id, label))
        .collect()
}

fn element(doc: &mut Document, parent: NodeId, tag: &str, text: Option<&str>) -> NodeId {
    let el = doc.create_element(tag);
    if let Some(text) = text {
        doc.set_text(el, text);
    }
    doc.append_child(parent, el);
    el
}

fn input(doc: &mut Document, parent: NodeId, tag: &str, placeholder: &str) -> NodeId {
    let el = element(doc, parent, tag, Some(placeholder));
    doc.set_attr(el, "placeholder", placeholder);
    el
}

/// Append the page to `parent` and size it to the viewport.  Returns the
/// `main` element.
pub fn build_landing_page(doc: &mut Document, parent: NodeId) -> NodeId {
    let main = element(doc, parent, "main", None);
    doc.set_id(main, "content");
    doc.add_class(main, "content");

    for (id, title) in SECTIONS {
        let section = element(doc, main, "section", None);
        doc.set_id(section, id);
        doc.add_class(section, "section");
        doc.update_style(
            section,
            &StylePatch {
                padding: Some(SECTION_PADDING),
                gap: Some(16.0),
                ..StylePatch::default()
            },
        );

        match *id {
            "home" => {
                element(doc, section, "h2", Some("Welcome to Our Website"));
                element(
                    doc,
                    section,
                    "p",
                    Some("Scroll down to watch the menu items glide out of the header list."),
                );
            }
            "about" => {
                element(doc, section, "h2", Some(title));
                for text in ABOUT {
                    element(doc, section, "p", Some(text));
                }
            }
            "services" => {
                element(doc, section, "h2", Some(title));
                let grid = element(doc, section, "div", None);
                doc.add_class(grid, "services-grid");
                doc.update_style(
                    grid,
                    &StylePatch {
                        gap: Some(GRID_GAP),
                        ..StylePatch::flex(FlexDirection::Row)
                    },
                );
                for n in 1..=SERVICE_COUNT {
                    let card = element(doc, grid, "div", None);
                    doc.add_class(card, "service-card");
                    doc.update_style(
                        card,
                        &StylePatch {
                            padding: Some(8.0),
                            gap: Some(8.0),
                            ..StylePatch::default()
                        },
                    );
                    element(doc, card, "h3", Some(&format!("Service {n}")));
                    element(
                        doc,
                        card,
                        "p",
                        Some(&format!("Description of service {n} goes here.")),
                    );
                }
            }
            _ => {
                element(doc, section, "h2", Some(title));
                element(doc, section, "p", Some("Get in touch with us today!"));
                let form = element(doc, section, "form", None);
                doc.add_class(form, "contact-form");
                doc.update_style(
                    form,
                    &StylePatch {
                        gap: Some(8.0),
                        ..StylePatch::flex(FlexDirection::Column)
                    },
                );
                input(doc, form, "input", "Your Name");
                input(doc, form, "input", "Your Email");
                input(doc, form, "textarea", "Your Message");
                element(doc, form, "button", Some("Send Message"));
            }
        }
    }

    fit_sections(doc);
    main
}

/// Make every section one viewport tall and split the services grid into
/// equal columns.  Call again after the viewport changes.
pub fn fit_sections(doc: &mut Document) {
    let viewport = doc.viewport();
    let root = doc.root();
    for section in doc.query_selector_all(root, ".section") {
        doc.update_style(
            section,
            &StylePatch {
                height: Some(Some(viewport.height)),
                ..StylePatch::default()
            },
        );
    }

    let inner = viewport.width - 2.0 * SECTION_PADDING;
    let gaps = GRID_GAP * (SERVICE_COUNT - 1) as f64;
    let card_w = ((inner - gaps) / SERVICE_COUNT as f64).floor().max(0.0);
    for card in doc.query_selector_all(root, ".service-card") {
        doc.update_style(
            card,
            &StylePatch {
                width: Some(Some(card_w)),
                ..StylePatch::default()
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{layout, Viewport};

    #[test]
    fn sections_fill_the_viewport() {
        let mut doc = Document::new(Viewport::new(640.0, 368.0));
        let root = doc.root();
        let main = build_landing_page(&mut doc, root);
        let map = layout(&doc);

        let tops: Vec<f64> = SECTIONS
            .iter()
            .map(|(id, _)| map.get(doc.get_element_by_id(id).unwrap()).unwrap().top)
            .collect();
        assert_eq!(tops, vec![0.0, 368.0, 736.0, 1104.0]);
        assert_eq!(map.get(main).map(|r| r.height), Some(4.0 * 368.0));
    }

    #[test]
    fn services_grid_has_equal_columns() {
        let mut doc = Document::new(Viewport::new(640.0, 368.0));
        let root = doc.root();
        build_landing_page(&mut doc, root);
        let cards = doc.query_selector_all(doc.root(), ".service-card");
        assert_eq!(cards.len(), 3);

        let map = layout(&doc);
        // (608 - 32) / 3
        let widths: Vec<f64> = cards.iter().map(|&c| map.get(c).unwrap().width).collect();
        assert_eq!(widths, vec![192.0; 3]);
        assert_eq!(map.get(cards[1]).unwrap().left, 16.0 + 192.0 + 16.0);

        doc.set_viewport(Viewport::new(320.0, 368.0));
        fit_sections(&mut doc);
        assert_eq!(doc.style(cards[0]).width, Some(85.0));
    }

    #[test]
    fn menu_items_match_sections() {
        let items = menu_items();
        assert_eq!(items.len(), SECTIONS.len());
        assert_eq!(items[2], MenuItem::new("services", "Our Services"));
    }
}
