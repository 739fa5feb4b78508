mod common;

use folio_pdf::model::Block;

#[test]
fn book_front_matter_lands_on_fresh_pages() {
    let _ = env_logger::try_init();
    let mut doc = common::book_with_front_matter();
    let pdf = common::render(&mut doc);

    assert_eq!(common::page_count(&pdf), 5);
    assert!(common::shown_on_page(&pdf, 1, "The Survey"));
    assert!(common::shown_on_page(&pdf, 2, "Table of Contents"));
    assert!(common::shown_on_page(&pdf, 3, "List of Figures"));
    assert!(common::shown_on_page(&pdf, 4, "1. Orientation"));
    assert!(common::shown_on_page(&pdf, 5, "2. Findings"));
    assert_eq!(common::shown_count(&pdf, "?"), 0);
}

#[test]
fn article_lists_continue_on_the_shared_page() {
    let _ = env_logger::try_init();
    let mut doc = common::article_with_two_figures();
    let pdf = common::render(&mut doc);

    assert_eq!(common::page_count(&pdf), 1);
    assert!(common::shown_on_page(&pdf, 1, "List of Figures"));
    assert!(common::shown_on_page(&pdf, 1, "1. Observations"));
}

#[test]
fn rendering_identical_documents_is_deterministic() {
    let _ = env_logger::try_init();
    let mut first = common::book_with_front_matter();
    let mut second = common::book_with_front_matter();
    assert_eq!(common::render(&mut first), common::render(&mut second));
}

#[test]
fn a_long_list_spans_pages_with_resolved_labels() {
    let _ = env_logger::try_init();
    let mut doc = common::article_with_two_figures();
    let Some(Block::Section(sect)) = doc.blocks.first_mut() else {
        panic!("builder changed shape");
    };
    for i in 3..=90 {
        sect.blocks.push(common::figure(
            &format!("Figure {i}"),
            Some("Plot"),
            &format!("fig-{i}"),
        ));
    }
    let pdf = common::render(&mut doc);

    assert!(common::page_count(&pdf) > 3);
    assert!(common::shown_on_page(&pdf, 1, "List of Figures"));
    assert_eq!(common::shown_count(&pdf, "?"), 0);
}
