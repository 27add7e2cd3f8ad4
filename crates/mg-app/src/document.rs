mod layout;

use std::path::{Path, PathBuf};
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};
use tracing::info;
use mg_core::{DocumentContents, DocumentSection, Result};
use crate::document::layout::{Font, Layout, Page, BODY, HEADING, PAGE_HEIGHT, PAGE_WIDTH, SUBHEADING, TITLE};

const REGULAR_FONT: Name<'static> = Name(b"F1");
const BOLD_FONT: Name<'static> = Name(b"F2");

pub const PDF_MIME: &str = "application/pdf";

/// Lay out the document and write it to `path`.
pub async fn assemble(
    title: &str,
    sections: &[DocumentSection],
    contents: &DocumentContents,
    path: &Path,
) -> Result<PathBuf> {
    let bytes = render(title, sections, contents);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, &bytes).await?;
    info!(path = %path.display(), bytes = bytes.len(), "PDF written");
    Ok(path.to_path_buf())
}

/// Render the document to PDF bytes. Identical input gives identical bytes.
pub fn render(title: &str, sections: &[DocumentSection], contents: &DocumentContents) -> Vec<u8> {
    let mut layout = Layout::new();
    layout.push(title, TITLE);

    for section in sections {
        layout.push(&section.heading, HEADING);
        let content = contents.get(&section.heading);
        if let Some(main) = content.and_then(|c| c.main.as_deref()) {
            layout.push(main, BODY);
        }

        for subheading in &section.subheadings {
            layout.push(subheading, SUBHEADING);
            if let Some(text) = content.and_then(|c| c.subsection(subheading)) {
                layout.push(text, BODY);
            }
        }
    }

    write_pdf(title, &layout.finish())
}

fn write_pdf(title: &str, pages: &[Page]) -> Vec<u8> {
    let catalog_id = Ref::new(1);
    let tree_id = Ref::new(2);
    let regular_id = Ref::new(3);
    let bold_id = Ref::new(4);
    let info_id = Ref::new(5);
    let first_page = 6;

    let page_ids: Vec<Ref> = (0..pages.len())
        .map(|i| Ref::new(first_page + 2 * i as i32))
        .collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().copied())
        .count(pages.len() as i32);
    pdf.type1_font(regular_id).base_font(Name(b"Helvetica"));
    pdf.type1_font(bold_id).base_font(Name(b"Helvetica-Bold"));
    pdf.document_info(info_id).title(TextStr(title));

    for (page_id, lines) in page_ids.iter().zip(pages) {
        let content_id = Ref::new(page_id.get() + 1);

        let mut page = pdf.page(*page_id);
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
        page.parent(tree_id);
        page.contents(content_id);
        {
            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            fonts.pair(REGULAR_FONT, regular_id);
            fonts.pair(BOLD_FONT, bold_id);
        }
        page.finish();

        let mut content = Content::new();
        for line in lines {
            let font = match line.font {
                Font::Regular => REGULAR_FONT,
                Font::Bold => BOLD_FONT,
            };
            content.begin_text();
            content.set_font(font, line.size);
            content.set_text_matrix([1.0, 0.0, 0.0, 1.0, line.x, line.y]);
            content.show(Str(line.text.as_bytes()));
            content.end_text();
        }
        pdf.stream(content_id, &content.finish());
    }

    pdf.finish()
}
