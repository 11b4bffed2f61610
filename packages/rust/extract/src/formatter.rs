//! Rendering of structured documents into summarizer-facing text.

use deepbrief_shared::StructuredDocument;

/// Render a document to the flat text layout the summarizer consumes.
///
/// Sections become `###` headings and subsections `####`, below an
/// optional `##` main heading, so the model sees the page hierarchy.
pub fn format_document(doc: &StructuredDocument) -> String {
    let mut out = String::new();

    let title = if doc.title.is_empty() {
        "Content"
    } else {
        &doc.title
    };
    out.push_str(&format!("=== {title} ===\n"));
    out.push_str(&format!("Source: {}\n\n", doc.url));

    if let Some(main_heading) = doc.main_heading.as_deref() {
        if !main_heading.is_empty() {
            out.push_str(&format!("## {main_heading}\n\n"));
        }
    }

    for section in &doc.sections {
        if !section.heading.is_empty() {
            out.push_str(&format!("### {}\n", section.heading));
        }
        if !section.content.is_empty() {
            out.push_str(&section.content);
            out.push('\n');
        }

        for sub in &section.subsections {
            out.push('\n');
            if !sub.heading.is_empty() {
                out.push_str(&format!("#### {}\n", sub.heading));
            }
            if !sub.content.is_empty() {
                out.push_str(&sub.content);
                out.push('\n');
            }
        }

        out.push('\n');
    }

    out
}
