use std::collections::HashMap;
use std::time::Instant;

use miniz_oxide::deflate::compress_to_vec_zlib;
use pdf_writer::types::AnnotationType;
use pdf_writer::writers::Destination;
use pdf_writer::{Filter, Name, Pdf, Rect, Ref, TextStr};

use crate::error::Error;
use crate::fonts::{register_fonts, Fonts};
use crate::model::{Block, CaptionedBlock, Document, Paragraph, Section};

mod entries;
mod extent;
mod layout;
mod lists;
mod outline;
mod running;
mod surface;

pub use extent::{ListKind, ListOutcome, PageExtent, Position};

use entries::EntryFilter;
use extent::{is_list_anchor, is_suppressed};
use lists::{ListRenderer, TwoPassAllocator};
use outline::OutlineSynthesizer;
use running::RunningContentReconciler;
use surface::Surface;

const CAPTION_FONT_SIZE: f32 = 10.0;

pub(crate) fn render(doc: &mut Document) -> Result<Vec<u8>, Error> {
    let t0 = Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let fonts = register_fonts(&mut pdf, &mut alloc);

    let mut surface = Surface::new(doc.geometry);

    // Phase 1: front matter. Suppression is decided against the pristine
    // tree, then the placeholder sections go in so every dry run already
    // walks the tree the committed ink will see.
    let title_page = doc.doctype.is_book() || doc.attrs.is_set("title-page");
    if title_page {
        render_title_page(&mut surface, &fonts, doc);
    }
    let merge_lists = doc.attrs.is_set("include-lists-in-toc");
    let active: Vec<ListKind> = ListKind::ORDER
        .into_iter()
        .filter(|&k| !is_suppressed(doc, k))
        .collect();
    OutlineSynthesizer::insert_sections(doc, &active);

    let break_after = doc.doctype.is_book();
    let mut extents: HashMap<ListKind, PageExtent> = HashMap::new();
    for kind in ListKind::ORDER {
        let outcome = if !active.contains(&kind) {
            ListOutcome::Suppressed
        } else {
            let renderer = list_renderer(doc, &fonts, kind, 0, merge_lists);
            let extent = TwoPassAllocator::allocate(&mut surface, &renderer, break_after);
            extents.insert(kind, extent);
            if has_entry_lines(doc, kind) {
                ListOutcome::Rendered(extent)
            } else {
                ListOutcome::Empty
            }
        };
        log::debug!("{kind:?}: {outcome:?}");
    }
    OutlineSynthesizer::assign_start_pages(doc, &extents);
    let t_front = t0.elapsed();

    // Phase 2: body. Records per-section start pages and registers every
    // anchor destination the lists will resolve against.
    let body_start_page = surface.current_page();
    let is_book = doc.doctype.is_book();
    render_blocks(&mut surface, &fonts, is_book, &mut doc.blocks);
    let t_body = t0.elapsed();

    // Phase 3: committed ink. Every destination is known now, so each list
    // re-inks its extent with resolved page labels and links.
    for kind in ListKind::ORDER {
        let Some(extent) = extents.get(&kind) else {
            continue;
        };
        let renderer = list_renderer(doc, &fonts, kind, body_start_page, merge_lists);
        let saved = surface.save_position();
        renderer.ink(&mut surface, extent.from);
        surface.restore_position(saved);
    }
    let t_lists = t0.elapsed();

    // Phase 4: running content.
    let reconciler = RunningContentReconciler {
        doc,
        fonts: &fonts,
        extents: &extents,
        body_start_page,
        first_stamped_page: if title_page { 2 } else { 1 },
    };
    let slot_images = reconciler.stamp(&mut surface);
    let t_running = t0.elapsed();

    // Phase 5: outline and teardown. The outline attribute gates bookmark
    // generation; teardown is tied to the merge attribute alone.
    let nodes = if doc.attrs.is_set("outline") {
        OutlineSynthesizer::build_nodes(doc, &surface.dests, &extents, surface.top())
    } else {
        Vec::new()
    };
    if doc.attrs.non_blank("include-lists-in-toc").is_some() {
        OutlineSynthesizer::teardown(doc);
    }

    // Phase 6: assembly.
    let (pages, dests, links) = surface.finish();
    let n = pages.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    let mut image_xobjects: Vec<(String, Ref)> = Vec::new();
    for img in &slot_images {
        let xobj_ref = alloc();
        let smask_ref = img.alpha.as_ref().map(|alpha| {
            let mask_ref = alloc();
            let mask_data = compress_to_vec_zlib(alpha, 6);
            let mut mask = pdf.image_xobject(mask_ref, &mask_data);
            mask.filter(Filter::FlateDecode);
            mask.width(img.width as i32);
            mask.height(img.height as i32);
            mask.color_space().device_gray();
            mask.bits_per_component(8);
            mask_ref
        });
        let xobj_data = compress_to_vec_zlib(&img.rgb, 6);
        let mut xobj = pdf.image_xobject(xobj_ref, &xobj_data);
        xobj.filter(Filter::FlateDecode);
        xobj.width(img.width as i32);
        xobj.height(img.height as i32);
        xobj.color_space().device_rgb();
        xobj.bits_per_component(8);
        if let Some(mask_ref) = smask_ref {
            xobj.s_mask(mask_ref);
        }
        image_xobjects.push((img.name.clone(), xobj_ref));
    }

    let mut page_annots: Vec<Vec<Ref>> = vec![Vec::new(); n];
    for link in &links {
        let Some(dest) = dests.get(&link.anchor) else {
            log::warn!("link to unknown anchor \"{}\" dropped", link.anchor);
            continue;
        };
        let Some(&target) = page_ids.get(dest.page - 1) else {
            continue;
        };
        let annot_ref = alloc();
        {
            let mut annot = pdf.annotation(annot_ref);
            annot
                .subtype(AnnotationType::Link)
                .rect(link.rect)
                .border(0.0, 0.0, 0.0, None);
            annot
                .insert(Name(b"Dest"))
                .start::<Destination>()
                .page(target)
                .xyz(0.0, dest.y + 4.0, None);
        }
        page_annots[link.page - 1].push(annot_ref);
    }

    for (i, content) in pages.into_iter().enumerate() {
        let data = compress_to_vec_zlib(&content.finish(), 6);
        pdf.stream(content_ids[i], &data).filter(Filter::FlateDecode);
    }

    let outline_root = doc
        .attrs
        .is_set("outline")
        .then(|| outline::write_outline(&mut pdf, &mut alloc, &nodes, &page_ids));

    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(
            0.0,
            0.0,
            doc.geometry.page_width,
            doc.geometry.page_height,
        ))
        .parent(pages_id)
        .contents(content_ids[i]);
        if !page_annots[i].is_empty() {
            page.annotations(page_annots[i].iter().copied());
        }
        let mut resources = page.resources();
        {
            let mut font_dict = resources.fonts();
            for entry in fonts.entries() {
                font_dict.pair(Name(entry.pdf_name.as_bytes()), entry.font_ref);
            }
        }
        if !image_xobjects.is_empty() {
            let mut xobjects = resources.x_objects();
            for (name, xobj_ref) in &image_xobjects {
                xobjects.pair(Name(name.as_bytes()), *xobj_ref);
            }
        }
    }

    {
        let mut catalog = pdf.catalog(catalog_id);
        catalog.pages(pages_id);
        if let Some(root) = outline_root {
            catalog.outlines(root);
        }
        outline::write_page_labels(&mut catalog, body_start_page);
        if let Some(mode) = doc.attrs.non_blank("pdf-page-mode") {
            outline::apply_page_mode(&mut catalog, mode);
        }
    }

    {
        let info_id = alloc();
        let mut info = pdf.document_info(info_id);
        info.title(TextStr(&doc.title));
        if let Some(author) = doc.author.as_deref() {
            info.author(TextStr(author));
        }
    }
    let t_assembly = t0.elapsed();

    log::info!(
        "Render phases: front_matter={:.1}ms, body={:.1}ms, lists={:.1}ms, running={:.1}ms, assembly={:.1}ms ({n} pages)",
        t_front.as_secs_f64() * 1000.0,
        (t_body - t_front).as_secs_f64() * 1000.0,
        (t_lists - t_body).as_secs_f64() * 1000.0,
        (t_running - t_lists).as_secs_f64() * 1000.0,
        (t_assembly - t_running).as_secs_f64() * 1000.0,
    );

    Ok(pdf.finish())
}

fn list_renderer<'a>(
    doc: &'a Document,
    fonts: &'a Fonts,
    kind: ListKind,
    body_start_page: usize,
    merge_lists: bool,
) -> ListRenderer<'a> {
    let num_levels = match kind {
        ListKind::Contents => doc.toclevels(),
        // captured entries sit at the normalized indent level
        _ => 2,
    };
    ListRenderer {
        doc,
        fonts,
        kind,
        num_levels,
        body_start_page,
        merge_lists,
    }
}

/// True when the committed list will carry at least one entry line, as
/// opposed to a heading over an otherwise blank allocation.
fn has_entry_lines(doc: &Document, kind: ListKind) -> bool {
    match kind.content_kind() {
        Some(entry_kind) => EntryFilter::collect(doc, entry_kind)
            .iter()
            .any(|e| e.display_title().is_some() && e.anchor.is_some()),
        None => true,
    }
}

fn render_title_page(surface: &mut Surface, fonts: &Fonts, doc: &Document) {
    let drop = (surface.top() - surface.bottom()) / 3.0;
    surface.set_cursor(surface.top() - drop);
    layout::render_centered_line(surface, &fonts.bold, 28.0, &doc.title);
    if let Some(author) = doc.author.as_deref() {
        surface.set_cursor(surface.cursor() - 14.0);
        layout::render_centered_line(surface, &fonts.regular, 12.0, author);
    }
    surface.new_page();
}

fn render_blocks(surface: &mut Surface, fonts: &Fonts, is_book: bool, blocks: &mut [Block]) {
    for block in blocks {
        match block {
            Block::Section(sect) => render_section(surface, fonts, is_book, sect),
            Block::Paragraph(para) => layout::render_paragraph(surface, fonts, para),
            Block::Captioned(cb) => render_captioned(surface, fonts, is_book, cb),
            // The contents listing was placed during front-matter allocation.
            Block::TocMacro => {}
            Block::SubDocument(sub) => render_blocks(surface, fonts, is_book, &mut sub.blocks),
        }
    }
}

fn render_section(surface: &mut Surface, fonts: &Fonts, is_book: bool, sect: &mut Section) {
    // Placeholder list sections own pre-allocated pages; nothing to lay out.
    if sect.anchor.as_deref().is_some_and(is_list_anchor) {
        return;
    }
    let fresh_page = sect.part || (is_book && sect.level <= 1);
    if fresh_page && surface.cursor() < surface.top() {
        surface.new_page();
    }
    let level = if sect.part { 0 } else { sect.level };
    let page = layout::render_heading(
        surface,
        fonts,
        &sect.numbered_title(),
        level,
        sect.anchor.as_deref(),
    );
    sect.start_page = Some(page);
    render_blocks(surface, fonts, is_book, &mut sect.blocks);
}

fn render_captioned(surface: &mut Surface, fonts: &Fonts, is_book: bool, cb: &mut CaptionedBlock) {
    surface.ensure_room(layout::line_height(CAPTION_FONT_SIZE) * 2.0);
    if let Some(anchor) = cb.anchor.as_deref() {
        surface.register_destination(anchor, surface.cursor());
    }
    if let Some(line) = caption_line(cb) {
        let mut para = Paragraph::body(&line);
        para.font_size = CAPTION_FONT_SIZE;
        para.italic = true;
        para.space_after = 4.0;
        layout::render_paragraph(surface, fonts, &para);
    }
    for para in &cb.body {
        layout::render_paragraph(surface, fonts, para);
    }
    render_blocks(surface, fonts, is_book, &mut cb.blocks);
}

fn caption_line(cb: &CaptionedBlock) -> Option<String> {
    let caption = cb.caption.as_deref()?;
    match cb.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => Some(format!("{caption}. {title}")),
        _ => Some(caption.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Doctype, EntryKind};

    fn doc_with_front_matter(doctype: Doctype) -> Document {
        let mut doc = Document::new(doctype, "Sample");
        doc.attrs.set("toc-title", "Contents");
        doc.attrs.set("lof-title", "List of Figures");
        let mut sect = Section::new(1, "One");
        sect.number = "1.".to_string();
        sect.anchor = Some("_one".to_string());
        let mut fig = CaptionedBlock::new(EntryKind::Figure);
        fig.caption = Some("Figure 1".to_string());
        fig.title = Some("A diagram".to_string());
        fig.anchor = Some("fig-1".to_string());
        sect.blocks.push(Block::Captioned(fig));
        sect.blocks
            .push(Block::Paragraph(Paragraph::body("Body text.")));
        doc.blocks.push(Block::Section(sect));
        doc
    }

    #[test]
    fn renders_article_with_lists_to_pdf_bytes() {
        let mut doc = doc_with_front_matter(Doctype::Article);
        let bytes = render(&mut doc).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn placeholders_survive_without_merge_value() {
        let mut doc = doc_with_front_matter(Doctype::Article);
        render(&mut doc).unwrap();
        assert!(doc.blocks.iter().any(
            |b| matches!(b, Block::Section(s) if s.anchor.as_deref() == Some("_lof"))
        ));
    }

    #[test]
    fn placeholders_torn_down_in_merge_mode_with_value() {
        let mut doc = doc_with_front_matter(Doctype::Article);
        doc.attrs.set("include-lists-in-toc", "all");
        render(&mut doc).unwrap();
        assert!(!doc.blocks.iter().any(
            |b| matches!(b, Block::Section(s) if s.anchor.as_deref() == Some("_lof"))
        ));
    }

    #[test]
    fn book_records_body_section_start_pages() {
        let mut doc = doc_with_front_matter(Doctype::Book);
        render(&mut doc).unwrap();
        let Some(Block::Section(sect)) = doc
            .blocks
            .iter()
            .find(|b| matches!(b, Block::Section(s) if s.anchor.as_deref() == Some("_one")))
        else {
            panic!("body section missing");
        };
        // title page + two single-page lists precede the body
        assert_eq!(sect.start_page, Some(4));
    }

    #[test]
    fn suppressed_lists_allocate_nothing() {
        let mut doc = Document::new(Doctype::Article, "Plain");
        doc.blocks
            .push(Block::Paragraph(Paragraph::body("Only text.")));
        let bytes = render(&mut doc).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(doc.blocks.iter().all(|b| !matches!(
            b,
            Block::Section(s) if s.anchor.as_deref().is_some_and(|a| a.starts_with('_'))
        )));
    }
}
