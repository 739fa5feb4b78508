mod common;

use folio_pdf::model::Block;

#[test]
fn page_label_table_switches_at_the_body_start() {
    let _ = env_logger::try_init();
    let mut doc = common::book_with_front_matter();
    let pdf = common::render(&mut doc);

    assert!(common::find(&pdf, b"/PageLabels", 0).is_some());
    assert!(common::find(&pdf, b"/S /r", 0).is_some());
    assert!(common::find(&pdf, b"/S /D", 0).is_some());
}

#[test]
fn article_starting_in_the_body_gets_one_arabic_range() {
    let _ = env_logger::try_init();
    let mut doc = common::article_with_two_figures();
    let pdf = common::render(&mut doc);

    assert!(common::find(&pdf, b"/S /D", 0).is_some());
    assert!(common::find(&pdf, b"/S /r", 0).is_none());
}

#[test]
fn page_mode_attribute_reaches_the_catalog() {
    let _ = env_logger::try_init();
    let mut doc = common::book_with_front_matter();
    doc.attrs.set("pdf-page-mode", "outline");
    let pdf = common::render(&mut doc);
    assert!(common::find(&pdf, b"/PageMode /UseOutlines", 0).is_some());

    let mut doc = common::book_with_front_matter();
    doc.attrs.set("pdf-page-mode", "fullscreen thumbs");
    let pdf = common::render(&mut doc);
    assert!(common::find(&pdf, b"/PageMode /FullScreen", 0).is_some());
    assert!(common::find(&pdf, b"/NonFullScreenPageMode /UseThumbs", 0).is_some());
}

#[test]
fn missing_outline_attribute_skips_bookmarks() {
    let _ = env_logger::try_init();
    let mut doc = common::book_with_front_matter();
    doc.attrs.unset("outline");
    let pdf = common::render(&mut doc);

    assert!(common::find(&pdf, b"/Outlines", 0).is_none());
    assert!(!common::has_bookmark(&pdf, "1. Orientation"));

    let mut doc = common::book_with_front_matter();
    let pdf = common::render(&mut doc);
    assert!(common::has_bookmark(&pdf, "1. Orientation"));
    assert!(common::has_bookmark(&pdf, "Table of Contents"));
    assert!(common::has_bookmark(&pdf, "List of Figures"));
}

#[test]
fn merged_lists_appear_in_the_contents_and_tear_down() {
    let _ = env_logger::try_init();
    let mut doc = common::book_with_front_matter();
    doc.attrs.set("include-lists-in-toc", "all");
    let pdf = common::render(&mut doc);

    // the contents listing gains a line for the figure list
    assert!(common::shown_on_page(&pdf, 2, "List of Figures"));
    assert!(common::has_bookmark(&pdf, "List of Figures"));
    assert!(!doc.blocks.iter().any(
        |b| matches!(b, Block::Section(s) if s.anchor.as_deref() == Some("_lof"))
    ));
}

#[test]
fn blank_merge_value_keeps_the_standalone_sections() {
    let _ = env_logger::try_init();
    let mut doc = common::book_with_front_matter();
    doc.attrs.set("include-lists-in-toc", "");
    let pdf = common::render(&mut doc);

    assert!(common::shown_on_page(&pdf, 2, "List of Figures"));
    assert!(doc.blocks.iter().any(
        |b| matches!(b, Block::Section(s) if s.anchor.as_deref() == Some("_lof"))
    ));
}
