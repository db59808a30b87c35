//! PDF report writer.
//!
//! Lays out a title, then one heading + body block per section, on A4 pages
//! using the base-14 Helvetica fonts, and serializes the result with `lopdf`.
//! Layout is two passes: `build_blocks` decides what each line is, and
//! `PageWriter` places blocks, wrapping and paginating as it goes.

pub mod font_metrics;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use thiserror::Error;

use crate::formatting::strip_markers;
use font_metrics::{wrap, Face};

pub const REPORT_TITLE: &str = "Resume Analysis Report";

// A4 in points.
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 54.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const TITLE_SIZE: f32 = 24.0;
const HEADING_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 11.0;
const LEADING: f32 = 1.3;

const BODY_INDENT: f32 = 10.0;
const BULLET_INDENT: f32 = 20.0;

const TITLE_COLOR: [f32; 3] = [0.122, 0.467, 0.706]; // #1f77b4
const HEADING_COLOR: [f32; 3] = [0.173, 0.243, 0.314]; // #2c3e50
const BODY_COLOR: [f32; 3] = [0.0, 0.0, 0.0];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to encode page content: {0}")]
    Encode(String),

    #[error("failed to write PDF: {0}")]
    Write(String),
}

/// One titled section of a report, body as raw model (or guidance) text.
#[derive(Debug, Clone)]
pub struct ReportSection {
    pub title: String,
    pub body: String,
}

impl ReportSection {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Heading(String),
    Paragraph(String),
    Bullet(String),
    Spacer(f32),
}

/// Renders `sections` (in order) into PDF bytes.
pub fn to_document(sections: &[ReportSection]) -> Result<Vec<u8>, ReportError> {
    let blocks = build_blocks(sections);
    let mut writer = PageWriter::new();
    for block in &blocks {
        writer.place(block);
    }
    write_pdf(writer.finish())
}

/// Turns sections into layout blocks. Sections with blank bodies are skipped.
pub fn build_blocks(sections: &[ReportSection]) -> Vec<Block> {
    let mut blocks = vec![Block::Title(REPORT_TITLE.to_string()), Block::Spacer(20.0)];

    for section in sections {
        if section.body.trim().is_empty() {
            continue;
        }

        blocks.push(Block::Heading(section.title.clone()));
        for line in section.body.lines() {
            let clean = strip_markers(line);
            let clean = clean.trim();
            if clean.is_empty() {
                continue;
            }
            if is_bullet_line(clean) {
                blocks.push(Block::Bullet(clean.to_string()));
            } else {
                blocks.push(Block::Paragraph(clean.to_string()));
            }
        }
        blocks.push(Block::Spacer(15.0));
    }

    blocks
}

/// A line is a bullet when it starts with `•` or a numeric `N.` prefix.
fn is_bullet_line(line: &str) -> bool {
    if line.starts_with('•') {
        return true;
    }
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && line[digits..].starts_with('.')
}

// ────────────────────────────────────────────────────────────────────────────
// Page layout
// ────────────────────────────────────────────────────────────────────────────

struct PageWriter {
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    /// Baseline cursor, measured from the bottom of the page.
    y: f32,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn place(&mut self, block: &Block) {
        match block {
            Block::Title(text) => {
                self.text_block(text, Face::Bold, TITLE_SIZE, 0.0, TITLE_COLOR);
                self.y -= 10.0;
            }
            Block::Heading(text) => {
                self.y -= 20.0;
                self.text_block(text, Face::Bold, HEADING_SIZE, 0.0, HEADING_COLOR);
                self.rule(TITLE_COLOR);
                self.y -= 10.0;
            }
            Block::Paragraph(text) => {
                self.text_block(text, Face::Regular, BODY_SIZE, BODY_INDENT, BODY_COLOR);
                self.y -= 10.0;
            }
            Block::Bullet(text) => {
                self.text_block(text, Face::Regular, BODY_SIZE, BULLET_INDENT, BODY_COLOR);
                self.y -= 8.0;
            }
            Block::Spacer(height) => {
                self.y -= height;
            }
        }
    }

    fn text_block(&mut self, text: &str, face: Face, size: f32, indent: f32, color: [f32; 3]) {
        let line_height = size * LEADING;
        for line in wrap(text, face, size, CONTENT_WIDTH - indent) {
            if self.y - line_height < MARGIN {
                self.break_page();
            }
            self.y -= line_height;
            self.current.extend([
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![
                        Object::Name(face.resource_name().as_bytes().to_vec()),
                        Object::Real(size),
                    ],
                ),
                Operation::new("rg", color.iter().map(|c| Object::Real(*c)).collect()),
                Operation::new(
                    "Td",
                    vec![Object::Real(MARGIN + indent), Object::Real(self.y)],
                ),
                Operation::new("Tj", vec![Object::string_literal(encode_win_ansi(&line))]),
                Operation::new("ET", vec![]),
            ]);
        }
    }

    /// Horizontal rule just under the current baseline.
    fn rule(&mut self, color: [f32; 3]) {
        let y = self.y - 4.0;
        self.current.extend([
            Operation::new("RG", color.iter().map(|c| Object::Real(*c)).collect()),
            Operation::new("w", vec![Object::Real(1.0)]),
            Operation::new("m", vec![Object::Real(MARGIN), Object::Real(y)]),
            Operation::new("l", vec![Object::Real(PAGE_WIDTH - MARGIN), Object::Real(y)]),
            Operation::new("S", vec![]),
        ]);
        self.y = y;
    }

    fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Serialization
// ────────────────────────────────────────────────────────────────────────────

fn write_pdf(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>, ReportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(font_dictionary(Face::Regular));
    let bold_id = doc.add_object(font_dictionary(Face::Bold));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            Face::Regular.resource_name() => regular_id,
            Face::Bold.resource_name() => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let page_id = add_page(&mut doc, pages_id, resources_id, operations)?;
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| ReportError::Write(e.to_string()))?;
    Ok(buffer)
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    operations: Vec<Operation>,
) -> Result<ObjectId, ReportError> {
    let content = Content { operations }
        .encode()
        .map_err(|e| ReportError::Encode(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));

    let media_box: Vec<Object> = vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(PAGE_WIDTH as i64),
        Object::Integer(PAGE_HEIGHT as i64),
    ];

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => media_box,
        "Resources" => resources_id,
        "Contents" => content_id,
    }))
}

fn font_dictionary(face: Face) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => face.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Encodes text for a WinAnsi (CP1252) base-14 font. Characters outside the
/// code page become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}
