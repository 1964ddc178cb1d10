//! PDF composition for aggregated deep-search results.
//!
//! Layout is fixed and deterministic: a title block with the query, then up
//! to three sections in fixed order ("Overview", "Scholarly Papers",
//! "Related Works"), each omitted when its data is absent or empty. URLs are
//! rendered as visible text covered by `/Link` annotations. The writer embeds
//! no timestamps, so identical input produces byte-identical output.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object};

use crate::models::{DeepSearchResult, ScholarlyEntry, WorkEntry};

/// Composition is the one fatal step of the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// The PDF writer could not allocate or serialize the document
    #[error("Failed to write PDF document: {0}")]
    Write(#[from] lopdf::Error),
}

// A4 geometry, points
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

// Average Helvetica glyph advance as a fraction of the font size; good
// enough for greedy wrapping against a fixed page width.
const AVG_GLYPH_WIDTH: f32 = 0.5;

const TITLE_SIZE: f32 = 20.0;
const HEADING_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 10.0;
const META_SIZE: f32 = 9.0;

/// Regular and bold base-14 fonts registered in the page resources.
#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

fn line_height(size: f32) -> f32 {
    size * 1.4
}

fn max_chars(size: f32) -> usize {
    (CONTENT_WIDTH / (size * AVG_GLYPH_WIDTH)).floor() as usize
}

fn text_width(text: &str, size: f32) -> f32 {
    (text.chars().count() as f32 * size * AVG_GLYPH_WIDTH).min(CONTENT_WIDTH)
}

/// Map text to WinAnsi-compatible bytes, substituting anything the base
/// fonts cannot show rather than failing.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{00A0}'..='\u{00FF}' => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Greedy word wrap against the estimated per-line character budget.
/// Words longer than a whole line are hard-split.
fn wrap(text: &str, size: f32) -> Vec<String> {
    let budget = max_chars(size).max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > budget {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let split = word
                .char_indices()
                .nth(budget)
                .map(|(i, _)| i)
                .unwrap_or(word.len());
            lines.push(word[..split].to_string());
            word = &word[split..];
        }
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= budget {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[derive(Default)]
struct Page {
    operations: Vec<Operation>,
    annotations: Vec<Dictionary>,
}

/// Cursor-based page writer: text flows top to bottom, breaking to a new
/// page whenever the cursor would cross the bottom margin.
struct PageWriter {
    pages: Vec<Page>,
    y: f32,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn current_is_blank(&self) -> bool {
        self.pages
            .last()
            .map(|p| p.operations.is_empty())
            .unwrap_or(true)
    }

    fn break_page(&mut self) {
        self.pages.push(Page::default());
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Start a new page unless `height` still fits below the cursor. A group
    /// taller than a whole page starts at the top of a fresh page and flows.
    fn reserve(&mut self, height: f32) {
        if self.y - height < MARGIN && !self.current_is_blank() {
            self.break_page();
        }
    }

    fn gap(&mut self, points: f32) {
        self.y -= points;
    }

    /// Write one line of text at the cursor, breaking the page first when it
    /// would not fit. Returns the baseline y of the drawn line.
    fn line(&mut self, font: Font, size: f32, text: &str) -> f32 {
        if self.y - line_height(size) < MARGIN {
            self.break_page();
        }
        self.y -= line_height(size);
        let baseline = self.y;

        let page = self.pages.last_mut().expect("writer always has a page");
        page.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.resource_name().into(), size.into()]),
            Operation::new("Td", vec![MARGIN.into(), baseline.into()]),
            Operation::new("Tj", vec![Object::string_literal(encode_text(text))]),
            Operation::new("ET", vec![]),
        ]);
        baseline
    }

    /// Write a URL as visible text covered by a link annotation.
    fn link_line(&mut self, size: f32, url: &str) {
        let baseline = self.line(Font::Regular, size, url);
        let rect_width = text_width(url, size);

        let annotation = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => vec![
                MARGIN.into(),
                (baseline - 2.0).into(),
                (MARGIN + rect_width).into(),
                (baseline + size).into(),
            ],
            "Border" => vec![0.into(), 0.into(), 0.into()],
            "A" => dictionary! {
                "Type" => "Action",
                "S" => "URI",
                "URI" => Object::string_literal(encode_text(url)),
            },
        };
        let page = self.pages.last_mut().expect("writer always has a page");
        page.annotations.push(annotation);
    }

    fn heading(&mut self, text: &str) {
        // Keep a heading attached to at least one following line
        self.reserve(line_height(HEADING_SIZE) + line_height(BODY_SIZE) + 10.0);
        self.gap(10.0);
        self.line(Font::Bold, HEADING_SIZE, text);
        self.gap(4.0);
    }

    /// Assemble the final document.
    fn finish(self) -> Result<Vec<u8>, ComposeError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for page in self.pages {
            let content = Content {
                operations: page.operations,
            };
            let content_id =
                doc.add_object(lopdf::Stream::new(dictionary! {}, content.encode()?));

            let mut page_dict = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            };
            if !page.annotations.is_empty() {
                let annot_refs: Vec<Object> = page
                    .annotations
                    .into_iter()
                    .map(|a| doc.add_object(a).into())
                    .collect();
                page_dict.set("Annots", annot_refs);
            }
            kids.push(doc.add_object(page_dict).into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).map_err(lopdf::Error::from)?;
        Ok(bytes)
    }
}

/// Render an aggregated result into a well-formed PDF byte sequence.
pub fn compose(result: &DeepSearchResult) -> Result<Vec<u8>, ComposeError> {
    let mut writer = PageWriter::new();

    for line in wrap(&result.query, TITLE_SIZE) {
        writer.line(Font::Bold, TITLE_SIZE, &line);
    }
    writer.gap(2.0);
    writer.line(Font::Regular, META_SIZE, "Deep research report");

    if let Some(summary) = &result.encyclopedia {
        writer.heading("Overview");
        writer.line(Font::Bold, BODY_SIZE, &summary.title);
        for line in wrap(&summary.extract, BODY_SIZE) {
            writer.line(Font::Regular, BODY_SIZE, &line);
        }
        writer.gap(2.0);
        writer.line(Font::Regular, META_SIZE, "Source:");
        writer.link_line(META_SIZE, &summary.source_url);
    }

    if !result.scholarly.is_empty() {
        writer.heading("Scholarly Papers");
        for entry in &result.scholarly {
            compose_scholarly_item(&mut writer, entry);
        }
    }

    if !result.works.is_empty() {
        writer.heading("Related Works");
        for work in &result.works {
            compose_work_item(&mut writer, work);
        }
    }

    writer.finish()
}

fn compose_scholarly_item(writer: &mut PageWriter, entry: &ScholarlyEntry) {
    let title_lines = wrap(&entry.title, BODY_SIZE);
    let meta = format!("{} ({})", entry.author_line(), entry.published);

    // Items never split across a page boundary
    let height = title_lines.len() as f32 * line_height(BODY_SIZE)
        + 2.0 * line_height(META_SIZE)
        + 6.0;
    writer.reserve(height);

    for line in &title_lines {
        writer.line(Font::Bold, BODY_SIZE, line);
    }
    writer.line(Font::Regular, META_SIZE, &meta);
    writer.link_line(META_SIZE, &entry.source_url);
    writer.gap(6.0);
}

fn compose_work_item(writer: &mut PageWriter, work: &WorkEntry) {
    let title_lines = wrap(&work.title, BODY_SIZE);
    let meta = match (work.authors.is_empty(), work.year) {
        (false, Some(year)) => Some(format!("{} ({})", work.author_line(), year)),
        (false, None) => Some(work.author_line()),
        (true, Some(year)) => Some(format!("({})", year)),
        (true, None) => None,
    };

    let mut height = title_lines.len() as f32 * line_height(BODY_SIZE) + 6.0;
    if meta.is_some() {
        height += line_height(META_SIZE);
    }
    if work.source_url.is_some() {
        height += line_height(META_SIZE);
    }
    writer.reserve(height);

    for line in &title_lines {
        writer.line(Font::Bold, BODY_SIZE, line);
    }
    if let Some(meta) = meta {
        writer.line(Font::Regular, META_SIZE, &meta);
    }
    if let Some(url) = &work.source_url {
        writer.link_line(META_SIZE, url);
    }
    writer.gap(6.0);
}

/// Download filename for a query: whitespace runs become underscores and the
/// `_deep_research.pdf` suffix is appended. Boundary contract with the caller.
pub fn suggested_filename(query: &str) -> String {
    let stem: Vec<&str> = query.split_whitespace().collect();
    format!("{}_deep_research.pdf", stem.join("_"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EncyclopediaSummary;
    use chrono::NaiveDate;

    fn sample_result() -> DeepSearchResult {
        DeepSearchResult {
            query: "diffusion models".to_string(),
            encyclopedia: Some(EncyclopediaSummary {
                title: "Diffusion model".to_string(),
                extract: "In machine learning, diffusion models are a class of latent \
                          variable models trained to denoise data. "
                    .repeat(20),
                source_url: "https://en.wikipedia.org/wiki/Diffusion_model".to_string(),
            }),
            scholarly: vec![ScholarlyEntry {
                title: "Denoising Diffusion Probabilistic Models".to_string(),
                authors: vec!["Jonathan Ho".to_string(), "Pieter Abbeel".to_string()],
                published: NaiveDate::from_ymd_opt(2020, 6, 19).unwrap(),
                source_url: "http://arxiv.org/abs/2006.11239".to_string(),
            }],
            works: vec![WorkEntry {
                title: "Score-Based Generative Modeling".to_string(),
                authors: vec!["Yang Song".to_string()],
                year: Some(2021),
                source_url: Some("https://doi.org/10.48550/arXiv.2011.13456".to_string()),
            }],
        }
    }

    fn extract_all_text(bytes: &[u8]) -> String {
        let doc = Document::load_mem(bytes).expect("output must be a loadable PDF");
        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        doc.extract_text(&pages).expect("text must be extractable")
    }

    #[test]
    fn test_wrap_respects_budget() {
        let budget = max_chars(BODY_SIZE);
        let text = "word ".repeat(200);
        for line in wrap(&text, BODY_SIZE) {
            assert!(line.chars().count() <= budget);
        }
    }

    #[test]
    fn test_wrap_hard_splits_long_words() {
        let long = "x".repeat(500);
        let lines = wrap(&long, BODY_SIZE);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), long);
    }

    #[test]
    fn test_encode_text_substitutes() {
        assert_eq!(encode_text("plain"), b"plain");
        assert_eq!(encode_text("caf\u{00E9}"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_text("\u{6F22}\u{5B57}"), b"??");
    }

    #[test]
    fn test_compose_round_trip() {
        let result = sample_result();
        let bytes = compose(&result).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));

        let text = extract_all_text(&bytes);
        assert!(text.contains("diffusion models"));
        assert!(text.contains("Diffusion model"));
        assert!(text.contains("Denoising Diffusion Probabilistic Models"));
        assert!(text.contains("Score-Based Generative Modeling"));
        assert!(text.contains("Overview"));
        assert!(text.contains("Scholarly Papers"));
        assert!(text.contains("Related Works"));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let result = sample_result();
        let first = compose(&result).unwrap();
        let second = compose(&result).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sections_omitted() {
        let result = DeepSearchResult {
            query: "diffusion models".to_string(),
            encyclopedia: None,
            scholarly: sample_result().scholarly,
            works: Vec::new(),
        };
        let bytes = compose(&result).unwrap();
        let text = extract_all_text(&bytes);

        assert!(!text.contains("Overview"));
        assert!(text.contains("Scholarly Papers"));
        assert!(text.contains("Denoising Diffusion Probabilistic Models"));
        assert!(!text.contains("Related Works"));
    }

    #[test]
    fn test_compose_empty_result_is_valid() {
        let result = DeepSearchResult {
            query: "unheard-of topic".to_string(),
            encyclopedia: None,
            scholarly: Vec::new(),
            works: Vec::new(),
        };
        let bytes = compose(&result).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        let text = extract_all_text(&bytes);
        assert!(text.contains("unheard-of topic"));
        assert!(!text.contains("Overview"));
    }

    #[test]
    fn test_long_extract_paginates() {
        let mut result = sample_result();
        result.encyclopedia.as_mut().unwrap().extract =
            "A sentence that keeps going to fill the page. ".repeat(400);
        let bytes = compose(&result).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() > 1);
    }

    #[test]
    fn test_link_annotations_present() {
        let bytes = compose(&sample_result()).unwrap();
        // Three URLs in the sample: overview citation plus one per entry
        let haystack = String::from_utf8_lossy(&bytes);
        assert_eq!(haystack.matches("/Link").count(), 3);
        assert!(haystack.contains("/URI"));
    }

    #[test]
    fn test_suggested_filename() {
        assert_eq!(
            suggested_filename("diffusion models"),
            "diffusion_models_deep_research.pdf"
        );
        assert_eq!(
            suggested_filename("  spaced   out  query "),
            "spaced_out_query_deep_research.pdf"
        );
    }
}
