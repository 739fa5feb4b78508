mod common;

use folio_pdf::model::{Block, Doctype, Document, Paragraph};

fn article_with_n_figures(n: usize) -> Document {
    let mut doc = Document::new(Doctype::Article, "Field Notes");
    let mut sect = common::section(1, "1.", "Observations", "_observations");
    for i in 1..=n {
        sect.blocks.push(common::figure(
            &format!("Figure {i}"),
            Some("Plot"),
            &format!("fig-{i}"),
        ));
    }
    doc.blocks.push(Block::Section(sect));
    doc
}

#[test]
fn titled_figures_get_list_lines_and_a_bookmark() {
    let _ = env_logger::try_init();
    let mut doc = common::article_with_two_figures();
    let pdf = common::render(&mut doc);

    assert_eq!(common::shown_count(&pdf, "List of Figures"), 1);
    // one list line, one body caption
    assert_eq!(common::shown_count(&pdf, "Figure 1. Alpha plot"), 2);
    assert_eq!(common::shown_count(&pdf, "Figure 2. Beta plot"), 2);
    // every page label resolved
    assert_eq!(common::shown_count(&pdf, "?"), 0);
    assert!(common::has_bookmark(&pdf, "List of Figures"));

    let has_leaders = common::content_streams(&pdf)
        .iter()
        .any(|s| common::find(s, b"..........", 0).is_some());
    assert!(has_leaders, "entry lines should carry dot-leader runs");
}

#[test]
fn unset_or_blank_title_matches_a_render_without_the_list() {
    let _ = env_logger::try_init();
    let mut plain = article_with_n_figures(40);
    let plain_pdf = common::render(&mut plain);

    let mut with_list = article_with_n_figures(40);
    with_list.attrs.set("lof-title", "List of Figures");
    let lof_pdf = common::render(&mut with_list);

    let mut blank = article_with_n_figures(40);
    blank.attrs.set("lof-title", "  ");
    blank.attrs.set("outline", "");
    let blank_pdf = common::render(&mut blank);

    assert!(common::page_count(&lof_pdf) > common::page_count(&plain_pdf));
    assert_eq!(common::page_count(&blank_pdf), common::page_count(&plain_pdf));
    assert_eq!(common::shown_count(&blank_pdf, "List of Figures"), 0);
    assert!(!common::has_bookmark(&blank_pdf, "List of Figures"));
}

#[test]
fn captioned_untitled_figure_is_omitted_from_the_list() {
    let _ = env_logger::try_init();
    let mut doc = Document::new(Doctype::Article, "Field Notes");
    doc.attrs.set("lof-title", "List of Figures");
    let mut sect = common::section(1, "1.", "Observations", "_observations");
    sect.blocks
        .push(common::figure("Figure 1", Some("Alpha plot"), "fig-alpha"));
    sect.blocks.push(common::figure("Figure 2", None, "fig-bare"));
    doc.blocks.push(Block::Section(sect));
    let pdf = common::render(&mut doc);

    assert_eq!(common::shown_count(&pdf, "List of Figures"), 1);
    assert_eq!(common::shown_count(&pdf, "Figure 1. Alpha plot"), 2);
    // the untitled figure keeps its body caption but gets no list line
    assert_eq!(common::shown_count(&pdf, "Figure 2"), 1);
}

#[test]
fn sub_document_figures_are_captured() {
    let _ = env_logger::try_init();
    let mut sub = Document::new(Doctype::Article, "Annex");
    let mut annex = common::section(1, "A.", "Annex", "_annex");
    annex
        .blocks
        .push(common::figure("Figure 9", Some("Annex view"), "fig-annex"));
    sub.blocks.push(Block::Section(annex));

    let mut doc = Document::new(Doctype::Article, "Main");
    doc.attrs.set("lof-title", "List of Figures");
    doc.blocks
        .push(Block::Paragraph(Paragraph::body("Preamble.")));
    doc.blocks.push(Block::SubDocument(Box::new(sub)));
    let pdf = common::render(&mut doc);

    assert_eq!(common::shown_count(&pdf, "Figure 9. Annex view"), 2);
}
