use scrollspy_core::page::PageElement;
use scrollspy_core::{SpyConfig, StaticPage};
use scrollspy_protocol::{Rect, Viewport};

/// Attribute the renderer reads for an element's caption.
pub const LABEL_ATTRIBUTE: &str = "data-label";

const PAGE_WIDTH: f64 = 960.0;
const SECTION_HEIGHT: f64 = 640.0;

/// A one-page portfolio with one block per configured section: a heading,
/// two cards side by side and a wide footer row, all staggered for reveal.
pub fn demo_page(config: &SpyConfig) -> StaticPage {
    let marker = config.reveal.marker.as_str();
    let delay = config.reveal.delay_attribute.as_str();
    let mut page = StaticPage::new(Viewport::new(PAGE_WIDTH, SECTION_HEIGHT));

    for (i, section) in config.sections.iter().enumerate() {
        let top = i as f64 * SECTION_HEIGHT;
        let id = section.id.as_str();
        page.push(
            PageElement::new(id, Rect::new(0.0, top, PAGE_WIDTH, SECTION_HEIGHT))
                .with_attribute(LABEL_ATTRIBUTE, section.label.clone()),
        );

        let blocks = [
            ("title", Rect::new(32.0, top + 48.0, 640.0, 32.0), section.label.clone()),
            (
                "card-a",
                Rect::new(32.0, top + 128.0, 432.0, 160.0),
                format!("{} highlights", section.label),
            ),
            (
                "card-b",
                Rect::new(496.0, top + 128.0, 432.0, 160.0),
                format!("{} details", section.label),
            ),
            (
                "footer",
                Rect::new(32.0, top + 336.0, 896.0, 96.0),
                format!("More about {}", section.label.to_lowercase()),
            ),
        ];
        for (slot, (suffix, rect, label)) in blocks.into_iter().enumerate() {
            page.push(
                PageElement::new(format!("{id}-{suffix}"), rect)
                    .with_attribute(marker, "")
                    .with_attribute(delay, (slot + 1).to_string())
                    .with_attribute(LABEL_ATTRIBUTE, label),
            );
        }
    }
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollspy_core::nav::NavItem;
    use scrollspy_core::{Page, PageSession};
    use scrollspy_protocol::ElementId;

    #[test]
    fn demo_has_every_configured_section() {
        let config = SpyConfig::default();
        let page = demo_page(&config);
        for item in &config.sections {
            assert!(page.element_by_id(&item.id).is_some(), "{} missing", item.id);
        }
        assert_eq!(page.query_marked("data-animate").len(), config.sections.len() * 4);
        assert_eq!(page.document_height(), 6.0 * SECTION_HEIGHT);
    }

    #[test]
    fn demo_follows_custom_sections_and_marker() {
        let mut config = SpyConfig {
            sections: vec![NavItem::new("intro", "Intro"), NavItem::new("faq", "FAQ")],
            ..SpyConfig::default()
        };
        config.reveal.marker = "data-reveal".into();
        let page = demo_page(&config);
        assert_eq!(page.query_marked("data-reveal").len(), 8);
        assert!(page.query_marked("data-animate").is_empty());

        let session = PageSession::mount(page, &config);
        assert_eq!(session.active().map(ElementId::as_str), Some("intro"));
        assert_eq!(session.reveal().len(), 8);
    }
}
