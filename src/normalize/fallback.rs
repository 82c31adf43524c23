//! Deterministic markdown rendering
//!
//! Used whenever the language model is disabled or fails. The output depends
//! only on the input, so the same record always renders to the same bytes.

use crate::extract::{Heading, Link};
use crate::normalize::SourceContent;

/// Maximum number of links listed under `## Resources`
pub const MAX_RESOURCE_LINKS: usize = 10;

/// Renders a page or PDF section as markdown
///
/// # Layout
///
/// ```text
/// # <title or "Documentation">
/// > Source: [url](url)
/// ## Key Topics       (headings, one level deeper than on the page)
/// ## Content          (one block per paragraph)
/// ## Code Examples    (one fence per block)
/// ## Resources        (first 10 links)
/// ```
///
/// Categories with no entries are left out entirely.
pub fn render(source: &SourceContent<'_>) -> String {
    match source {
        SourceContent::Page(page) => render_parts(
            &page.title,
            Some(&page.url),
            &page.headings,
            &page.paragraphs,
            &page.code_blocks,
            &page.links,
        ),
        SourceContent::Section(section) => {
            render_parts(&section.title, None, &[], &section.content, &[], &[])
        }
    }
}

fn render_parts(
    title: &str,
    url: Option<&str>,
    headings: &[Heading],
    paragraphs: &[String],
    code_blocks: &[String],
    links: &[Link],
) -> String {
    let mut out = String::new();
    let title = if title.is_empty() { "Documentation" } else { title };

    // Writing into a String cannot fail
    out.push_str(&format!("# {}\n\n", title));

    if let Some(url) = url.filter(|u| !u.is_empty()) {
        out.push_str(&format!("> Source: [{}]({})\n\n", url, url));
    }

    if !headings.is_empty() {
        out.push_str("## Key Topics\n\n");
        for heading in headings {
            let marks = "#".repeat(usize::from(heading.level) + 1);
            out.push_str(&format!("{} {}\n\n", marks, heading.text));
        }
    }

    if !paragraphs.is_empty() {
        out.push_str("## Content\n\n");
        for paragraph in paragraphs {
            out.push_str(&format!("{}\n\n", paragraph));
        }
    }

    if !code_blocks.is_empty() {
        out.push_str("## Code Examples\n\n");
        for code in code_blocks {
            out.push_str(&format!("```\n{}\n```\n\n", code));
        }
    }

    if !links.is_empty() {
        out.push_str("## Resources\n\n");
        for link in links.iter().take(MAX_RESOURCE_LINKS) {
            let text = if link.text.is_empty() { &link.url } else { &link.text };
            out.push_str(&format!("- [{}]({})\n", text, link.url));
        }
    }

    out
}
