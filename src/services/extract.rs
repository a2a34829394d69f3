//! HTML metadata and readable-content extraction

use scraper::{ElementRef, Html, Node, Selector};

use crate::models::ScrapeMetadata;

/// Candidate containers for the main content, most specific first
const CONTENT_ROOTS: [&str; 4] = ["article", "main", "[role=\"main\"]", "body"];

/// Subtrees that never carry readable content
const NOISE_ELEMENTS: [&str; 9] = [
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "template",
];

const BLOCK_ELEMENTS: [&str; 22] = [
    "p", "div", "section", "article", "main", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul",
    "ol", "br", "blockquote", "pre", "table", "tr", "td", "th", "figcaption",
];

/// Pull description, Open Graph and canonical data from a document
pub fn extract_metadata(html: &str) -> ScrapeMetadata {
    let document = Html::parse_document(html);

    ScrapeMetadata {
        description: first_attr(&document, "meta[name=\"description\"]", "content"),
        keywords: first_attr(&document, "meta[name=\"keywords\"]", "content"),
        og_title: first_attr(&document, "meta[property=\"og:title\"]", "content"),
        og_description: first_attr(&document, "meta[property=\"og:description\"]", "content"),
        og_image: first_attr(&document, "meta[property=\"og:image\"]", "content"),
        author: first_attr(&document, "meta[name=\"author\"]", "content"),
        canonical: first_attr(&document, "link[rel=\"canonical\"]", "href"),
    }
}

/// Readable text of the main content area, one trimmed line per block
///
/// Returns `None` when the document has no text outside navigation and script noise.
pub fn extract_main_content(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let root = CONTENT_ROOTS
        .iter()
        .filter_map(|css| Selector::parse(css).ok())
        .find_map(|selector| document.select(&selector).next())?;

    let text = collect_block_text(root);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn first_attr(document: &Html, css: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .find_map(|element| element.value().attr(attr))
        .map(str::to_string)
}

fn collect_block_text(root: ElementRef<'_>) -> String {
    let root_id = root.id();
    let mut buffer = String::new();

    for node in root.descendants() {
        match node.value() {
            Node::Element(element) if BLOCK_ELEMENTS.contains(&element.name()) => {
                buffer.push('\n');
            }
            Node::Text(text) => {
                let in_noise = node
                    .ancestors()
                    .take_while(|ancestor| ancestor.id() != root_id)
                    .any(|ancestor| {
                        ancestor
                            .value()
                            .as_element()
                            .is_some_and(|e| NOISE_ELEMENTS.contains(&e.name()))
                    });
                if !in_noise {
                    buffer.push_str(text);
                }
            }
            _ => {}
        }
    }

    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html>
<head>
  <title>Example</title>
  <meta name="description" content="An example page">
  <meta name="keywords" content="example, test">
  <meta name="author" content="Jane Roe">
  <meta property="og:title" content="Example OG">
  <meta property="og:description" content="OG description">
  <meta property="og:image" content="https://example.com/cover.png">
  <link rel="canonical" href="https://example.com/article">
  <script>var tracking = true;</script>
</head>
<body>
  <nav><a href="/">Home</a><a href="/about">About</a></nav>
  <article>
    <h1>Headline</h1>
    <p>First paragraph.</p>
    <script>console.log("hidden")</script>
    <p>Second <b>bold</b> paragraph.</p>
  </article>
  <footer>Copyright</footer>
</body>
</html>"#;

    #[test]
    fn test_extract_metadata() {
        let metadata = extract_metadata(PAGE);

        assert_eq!(metadata.description.as_deref(), Some("An example page"));
        assert_eq!(metadata.keywords.as_deref(), Some("example, test"));
        assert_eq!(metadata.author.as_deref(), Some("Jane Roe"));
        assert_eq!(metadata.og_title.as_deref(), Some("Example OG"));
        assert_eq!(metadata.og_description.as_deref(), Some("OG description"));
        assert_eq!(
            metadata.og_image.as_deref(),
            Some("https://example.com/cover.png")
        );
        assert_eq!(
            metadata.canonical.as_deref(),
            Some("https://example.com/article")
        );
    }

    #[test]
    fn test_extract_metadata_missing_tags() {
        let metadata = extract_metadata("<html><body><p>bare</p></body></html>");
        assert_eq!(metadata, ScrapeMetadata::default());
    }

    #[test]
    fn test_extract_main_content_prefers_article() {
        let content = extract_main_content(PAGE).unwrap();
        assert_eq!(
            content,
            "Headline\nFirst paragraph.\nSecond bold paragraph."
        );
    }

    #[test]
    fn test_extract_main_content_falls_back_to_body() {
        let html = "<html><body><nav>Menu</nav><div>Alpha</div><div>Beta</div></body></html>";
        assert_eq!(extract_main_content(html).as_deref(), Some("Alpha\nBeta"));
    }

    #[test]
    fn test_extract_main_content_empty_document() {
        let html = "<html><body><script>x()</script></body></html>";
        assert!(extract_main_content(html).is_none());
    }
}
