//! Exported artifacts: Markdown and plain-text downloads, and a print-ready HTML page
//! that the browser's print dialog turns into a PDF.

use askama::Template;
use chrono::{DateTime, Utc};

use crate::models::history::{AnswerEntry, ResumeEntry};

pub mod handlers;

pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

pub fn resume_file_name(at: DateTime<Utc>) -> String {
    format!("tailored_resume_{}.md", at.timestamp_millis())
}

pub fn answers_file_name(at: DateTime<Utc>) -> String {
    format!("answers_{}.txt", at.timestamp_millis())
}

/// `Q:`/`A:` blocks separated by `---` lines.
pub fn answers_to_text<'a>(answers: impl IntoIterator<Item = &'a AnswerEntry>) -> String {
    answers
        .into_iter()
        .map(|a| format!("Q: {}\nA: {}\n", a.question_text, a.answer_text))
        .collect::<Vec<_>>()
        .join("\n---\n")
}

/// One rendered element of the print page. Lists carry `items`; everything else `text`.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintBlock {
    pub tag: &'static str,
    pub text: String,
    pub items: Vec<String>,
}

impl PrintBlock {
    fn new(tag: &'static str, text: String) -> Self {
        Self {
            tag,
            text,
            items: Vec::new(),
        }
    }

    pub fn is_list(&self) -> bool {
        self.tag == "ul"
    }
}

const HEADINGS: [(&str, &str); 3] = [("### ", "h3"), ("## ", "h2"), ("# ", "h1")];

fn clean_inline(text: &str) -> String {
    text.replace("**", "").trim().to_string()
}

/// Converts the résumé Markdown layout (headings, bullets, paragraphs) into print blocks.
/// Consecutive plain lines form one paragraph; stray code fences are dropped.
pub fn print_blocks(markdown: &str) -> Vec<PrintBlock> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<String> = Vec::new();
    let mut items: Vec<String> = Vec::new();

    fn flush_paragraph(blocks: &mut Vec<PrintBlock>, paragraph: &mut Vec<String>) {
        if !paragraph.is_empty() {
            blocks.push(PrintBlock::new("p", paragraph.join(" ")));
            paragraph.clear();
        }
    }

    fn flush_list(blocks: &mut Vec<PrintBlock>, items: &mut Vec<String>) {
        if !items.is_empty() {
            blocks.push(PrintBlock {
                tag: "ul",
                text: String::new(),
                items: std::mem::take(items),
            });
        }
    }

    for line in markdown.lines().map(str::trim) {
        if let Some(item) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
            flush_paragraph(&mut blocks, &mut paragraph);
            items.push(clean_inline(item));
            continue;
        }
        flush_list(&mut blocks, &mut items);

        if line.is_empty() || line.starts_with("```") {
            flush_paragraph(&mut blocks, &mut paragraph);
            continue;
        }

        let heading = HEADINGS
            .iter()
            .find_map(|(prefix, tag)| line.strip_prefix(prefix).map(|text| (*tag, text)));
        match heading {
            Some((tag, text)) => {
                flush_paragraph(&mut blocks, &mut paragraph);
                blocks.push(PrintBlock::new(tag, clean_inline(text)));
            }
            None => paragraph.push(clean_inline(line)),
        }
    }
    flush_paragraph(&mut blocks, &mut paragraph);
    flush_list(&mut blocks, &mut items);
    blocks
}

#[derive(Template)]
#[template(path = "print_resume.html")]
struct PrintResumeTemplate {
    title: String,
    blocks: Vec<PrintBlock>,
}

pub fn render_print_html(entry: &ResumeEntry) -> Result<String, askama::Error> {
    PrintResumeTemplate {
        title: format!("{} at {}", entry.job_title, entry.company_name),
        blocks: print_blocks(&entry.updated_resume_content),
    }
    .render()
}
