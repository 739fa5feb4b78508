use std::collections::HashMap;
use std::path::{Path, PathBuf};

use pdf_writer::{Content, Name};

use crate::fonts::Fonts;
use crate::model::{
    Alignment, Block, ColumnContent, Document, PageGeometry, PeripheryColumns, Side,
};

use super::extent::{is_list_anchor, ListKind, PageExtent};
use super::layout::show_line;
use super::outline::user_page_label;
use super::surface::Surface;

const PERIPHERY_FONT_SIZE: f32 = 9.0;
const ASCENT: f32 = 0.75;
const RULE_WIDTH: f32 = 0.5;

/// Structural titles in force on one physical page.
#[derive(Clone, Debug, Default, PartialEq)]
pub(super) struct PageAttribution {
    pub(super) part: Option<String>,
    pub(super) chapter: Option<String>,
    pub(super) section: Option<String>,
}

/// A decoded periphery PNG. The content stream references `name` during the
/// stamp; the matching XObject is written at serialization time.
pub(super) struct SlotImage {
    pub(super) name: String,
    pub(super) rgb: Vec<u8>,
    pub(super) alpha: Option<Vec<u8>>,
    pub(super) width: u32,
    pub(super) height: u32,
}

#[derive(Default)]
struct SlotImageCache {
    by_path: HashMap<PathBuf, Option<usize>>,
    images: Vec<SlotImage>,
}

impl SlotImageCache {
    /// Decode at most once per path; a failed decode stays failed so the
    /// warning is not repeated on every page.
    fn get(&mut self, path: &Path) -> Option<&SlotImage> {
        let idx = match self.by_path.get(path) {
            Some(cached) => *cached,
            None => {
                let loaded = match decode_png(path) {
                    Ok((width, height, rgb, alpha)) => {
                        let name = format!("Rc{}", self.images.len() + 1);
                        self.images.push(SlotImage {
                            name,
                            rgb,
                            alpha,
                            width,
                            height,
                        });
                        Some(self.images.len() - 1)
                    }
                    Err(err) => {
                        log::warn!(
                            "periphery image {} failed to load ({err}); using alt text",
                            path.display()
                        );
                        None
                    }
                };
                self.by_path.insert(path.to_path_buf(), loaded);
                loaded
            }
        };
        idx.map(|i| &self.images[i])
    }
}

fn decode_png(path: &Path) -> Result<(u32, u32, Vec<u8>, Option<Vec<u8>>), image::ImageError> {
    let rgba = image::ImageReader::open(path)?.decode()?.to_rgba8();
    let (width, height) = rgba.dimensions();
    let rgb = rgba.pixels().flat_map(|p| [p.0[0], p.0[1], p.0[2]]).collect();
    let alpha = if rgba.pixels().any(|p| p.0[3] < 255) {
        Some(rgba.pixels().map(|p| p.0[3]).collect())
    } else {
        None
    };
    Ok((width, height, rgb, alpha))
}

/// Page-indexed section starts, by structural role.
#[derive(Default)]
struct StartMaps {
    part: HashMap<usize, String>,
    chapter: HashMap<usize, String>,
    section: HashMap<usize, String>,
}

/// Attributes every physical page to the part/chapter/section in force on it
/// and stamps the configured header/footer columns in a second pass over the
/// finished pages.
pub(super) struct RunningContentReconciler<'a> {
    pub(super) doc: &'a Document,
    pub(super) fonts: &'a Fonts,
    pub(super) extents: &'a HashMap<ListKind, PageExtent>,
    /// Physical page where arabic numbering restarts; 0 while unknown.
    pub(super) body_start_page: usize,
    /// Pages before this one (the title page) receive no periphery.
    pub(super) first_stamped_page: usize,
}

impl RunningContentReconciler<'_> {
    /// One attribution record per physical page 1..=`last_page`.
    ///
    /// Carried state advances on section starts only. A page inside a list
    /// extent borrows the list title for its record (chapter slot for books,
    /// section slot otherwise, unless a real section starts on that page);
    /// the carried state stays untouched, so attribution resumes by itself
    /// after the extent's final page.
    pub(super) fn attributions(&self, last_page: usize) -> Vec<PageAttribution> {
        let maps = self.start_maps();
        let is_book = self.doc.doctype.is_book();
        let mut out = Vec::with_capacity(last_page);
        let mut part: Option<String> = None;
        let mut chapter: Option<String> = None;
        let mut section: Option<String> = None;
        for page in 1..=last_page {
            if let Some(t) = maps.part.get(&page) {
                part = Some(t.clone());
                chapter = None;
                section = None;
            }
            if let Some(t) = maps.chapter.get(&page) {
                chapter = Some(t.clone());
                section = None;
            }
            if let Some(t) = maps.section.get(&page) {
                section = Some(t.clone());
            }
            let mut attr = PageAttribution {
                part: part.clone(),
                chapter: chapter.clone(),
                section: section.clone(),
            };
            if let Some(title) = self.list_title_covering(page) {
                if is_book {
                    attr.chapter = Some(title);
                } else if !maps.section.contains_key(&page) {
                    attr.section = Some(title);
                }
            }
            if is_book && attr.chapter.is_none() {
                attr.chapter =
                    Some(if self.body_start_page == 0 || page < self.body_start_page {
                        self.doc.title.clone()
                    } else {
                        "Preface".to_string()
                    });
            }
            out.push(attr);
        }
        out
    }

    fn start_maps(&self) -> StartMaps {
        let mut maps = StartMaps::default();
        Self::collect_starts(&self.doc.blocks, self.doc.doctype.is_book(), &mut maps);
        maps
    }

    fn collect_starts(blocks: &[Block], is_book: bool, maps: &mut StartMaps) {
        for block in blocks {
            match block {
                Block::Section(sect) => {
                    // Inserted list placeholders are attributed through their
                    // extents, never through the start maps.
                    if let Some(page) = sect.start_page
                        && !sect.anchor.as_deref().is_some_and(is_list_anchor)
                    {
                        let title = sect.numbered_title();
                        let slot = if sect.part {
                            &mut maps.part
                        } else if is_book && sect.level <= 1 {
                            &mut maps.chapter
                        } else {
                            &mut maps.section
                        };
                        slot.entry(page).or_insert(title);
                    }
                    Self::collect_starts(&sect.blocks, is_book, maps);
                }
                Block::SubDocument(sub) => Self::collect_starts(&sub.blocks, is_book, maps),
                _ => {}
            }
        }
    }

    fn list_title_covering(&self, page: usize) -> Option<String> {
        ListKind::ORDER.iter().find_map(|kind| {
            let extent = self.extents.get(kind)?;
            if !extent.covers(page) {
                return None;
            }
            Some(
                self.doc
                    .attrs
                    .non_blank(kind.attribute())
                    .unwrap_or(kind.default_title())
                    .to_string(),
            )
        })
    }

    /// Second pass over the finished pages. Returns the decoded slot images
    /// so the serializer can write their XObjects under the names the content
    /// streams already reference.
    pub(super) fn stamp(&self, surface: &mut Surface) -> Vec<SlotImage> {
        let last = surface.last_page();
        let attrs = self.attributions(last);
        let geom = surface.geom;
        let mut cache = SlotImageCache::default();
        for page in self.first_stamped_page..=last {
            let attr = &attrs[page - 1];
            let side = if page % 2 == 1 { Side::Recto } else { Side::Verso };
            let running = &self.doc.running;
            let header = match side {
                Side::Recto => running.header_recto.as_ref(),
                Side::Verso => running.header_verso.as_ref(),
            };
            let footer = match side {
                Side::Recto => running.footer_recto.as_ref(),
                Side::Verso => running.footer_verso.as_ref(),
            };
            let content = surface.page_content_mut(page);
            if let Some(cols) = header {
                self.stamp_periphery(content, cols, &geom, true, page, last, attr, &mut cache);
            }
            if let Some(cols) = footer {
                self.stamp_periphery(content, cols, &geom, false, page, last, attr, &mut cache);
            }
        }
        cache.images
    }

    #[allow(clippy::too_many_arguments)]
    fn stamp_periphery(
        &self,
        content: &mut Content,
        cols: &PeripheryColumns,
        geom: &PageGeometry,
        is_header: bool,
        page: usize,
        page_count: usize,
        attr: &PageAttribution,
        cache: &mut SlotImageCache,
    ) {
        let fs = PERIPHERY_FONT_SIZE;
        let left = geom.margin_left;
        let width = geom.page_width - geom.margin_left - geom.margin_right;
        let col_w = width / 3.0;
        let baseline = if is_header {
            geom.page_height - geom.header_margin - fs * ASCENT
        } else {
            geom.footer_margin + fs * (1.0 - ASCENT)
        };

        let slots = [
            (&cols.left, Alignment::Left, left),
            (&cols.center, Alignment::Center, left + col_w),
            (&cols.right, Alignment::Right, left + 2.0 * col_w),
        ];
        let mut any = false;
        for (slot, align, col_x) in slots {
            match slot {
                ColumnContent::None => {}
                ColumnContent::Text(template) => {
                    let text = self.substitute(template, page, page_count, attr);
                    if text.is_empty() {
                        continue;
                    }
                    any = true;
                    let x = aligned_x(
                        align,
                        col_x,
                        col_w,
                        self.fonts.regular.text_width(&text, fs),
                    );
                    show_line(content, &self.fonts.regular, fs, x, baseline, &text);
                }
                ColumnContent::Image { path, alt, height } => {
                    any = true;
                    match cache.get(path) {
                        Some(img) => {
                            let draw_h = *height;
                            let draw_w = draw_h * img.width as f32 / img.height.max(1) as f32;
                            let x = aligned_x(align, col_x, col_w, draw_w);
                            let y = if is_header {
                                geom.page_height - geom.header_margin - draw_h
                            } else {
                                geom.footer_margin
                            };
                            content.save_state();
                            content.transform([draw_w, 0.0, 0.0, draw_h, x, y]);
                            content.x_object(Name(img.name.as_bytes()));
                            content.restore_state();
                        }
                        None => {
                            let x = aligned_x(
                                align,
                                col_x,
                                col_w,
                                self.fonts.regular.text_width(alt, fs),
                            );
                            show_line(content, &self.fonts.regular, fs, x, baseline, alt);
                        }
                    }
                }
            }
        }

        if cols.column_rule && any {
            let y0 = baseline - fs * 0.25;
            let y1 = baseline + fs * 0.75;
            content.set_line_width(RULE_WIDTH);
            for i in 1..3 {
                let x = left + col_w * i as f32;
                content.move_to(x, y0);
                content.line_to(x, y1);
            }
            content.stroke();
        }
    }

    fn substitute(
        &self,
        template: &str,
        page: usize,
        page_count: usize,
        attr: &PageAttribution,
    ) -> String {
        template
            .replace(
                "{page-number}",
                &user_page_label(page, self.body_start_page),
            )
            .replace("{page-count}", &page_count.to_string())
            .replace("{document-title}", &self.doc.title)
            .replace("{part-title}", attr.part.as_deref().unwrap_or(""))
            .replace("{chapter-title}", attr.chapter.as_deref().unwrap_or(""))
            .replace("{section-title}", attr.section.as_deref().unwrap_or(""))
    }
}

fn aligned_x(align: Alignment, col_x: f32, col_w: f32, item_w: f32) -> f32 {
    match align {
        Alignment::Left => col_x,
        Alignment::Center => col_x + (col_w - item_w) / 2.0,
        Alignment::Right => col_x + col_w - item_w,
    }
}
