//! HTML to DOCX conversion for the export endpoint.
//!
//! Editor markup is tokenized with quick-xml and flattened into styled runs;
//! the result is packaged as a minimal WordprocessingML document. Only the
//! structure the editor emits matters here: paragraph-level blocks and
//! bold/italic inline spans. Unknown tags contribute their text content.

use std::io::{Cursor, Write};

use anyhow::{Context, anyhow};
use quick_xml::events::Event;
use quick_xml::{Reader, escape::{escape, resolve_predefined_entity}};
use zip::write::SimpleFileOptions;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

#[derive(Debug, Default, Clone, PartialEq)]
struct Run {
    text: String,
    bold: bool,
    italic: bool,
}

type Paragraph = Vec<Run>;

fn is_block_tag(name: &[u8]) -> bool {
    matches!(
        name,
        b"p" | b"div" | b"li" | b"tr" | b"h1" | b"h2" | b"h3" | b"h4" | b"h5" | b"h6"
    )
}

/// Flatten editor HTML into paragraphs of styled runs.
fn collect_paragraphs(html: &str) -> anyhow::Result<Vec<Paragraph>> {
    let mut reader = Reader::from_str(html);
    reader.config_mut().check_end_names = false;
    reader.config_mut().allow_unmatched_ends = true;

    let mut paragraphs: Vec<Paragraph> = Vec::new();
    let mut current: Paragraph = Vec::new();
    let mut bold_depth = 0usize;
    let mut italic_depth = 0usize;
    let mut skip_depth = 0usize;

    let flush = |current: &mut Paragraph, paragraphs: &mut Vec<Paragraph>| {
        if !current.is_empty() {
            paragraphs.push(std::mem::take(current));
        }
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(tag)) => match tag.name().as_ref() {
                b"b" | b"strong" => bold_depth += 1,
                b"i" | b"em" => italic_depth += 1,
                b"script" | b"style" => skip_depth += 1,
                b"br" | b"hr" => flush(&mut current, &mut paragraphs),
                name if is_block_tag(name) => flush(&mut current, &mut paragraphs),
                _ => {}
            },
            Ok(Event::End(tag)) => match tag.name().as_ref() {
                b"b" | b"strong" => bold_depth = bold_depth.saturating_sub(1),
                b"i" | b"em" => italic_depth = italic_depth.saturating_sub(1),
                b"script" | b"style" => skip_depth = skip_depth.saturating_sub(1),
                name if is_block_tag(name) => flush(&mut current, &mut paragraphs),
                _ => {}
            },
            Ok(Event::Empty(tag)) => {
                if matches!(tag.name().as_ref(), b"br" | b"hr") {
                    flush(&mut current, &mut paragraphs);
                }
            }
            Ok(Event::Text(event)) => {
                if skip_depth > 0 {
                    continue;
                }
                let text = match event.unescape_with(|entity| match entity {
                    "nbsp" => Some(" "),
                    _ => resolve_predefined_entity(entity),
                }) {
                    Ok(decoded) => decoded.into_owned(),
                    Err(_) => String::from_utf8_lossy(event.as_ref()).into_owned(),
                };
                if text.trim().is_empty() {
                    continue;
                }
                current.push(Run {
                    text,
                    bold: bold_depth > 0,
                    italic: italic_depth > 0,
                });
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(error) => return Err(anyhow!("Failed to parse HTML: {}", error)),
        }
    }
    flush(&mut current, &mut paragraphs);
    Ok(paragraphs)
}

fn build_document_xml(paragraphs: &[Paragraph]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );
    for paragraph in paragraphs {
        xml.push_str("<w:p>");
        for run in paragraph {
            xml.push_str("<w:r>");
            if run.bold || run.italic {
                xml.push_str("<w:rPr>");
                if run.bold {
                    xml.push_str("<w:b/>");
                }
                if run.italic {
                    xml.push_str("<w:i/>");
                }
                xml.push_str("</w:rPr>");
            }
            xml.push_str(r#"<w:t xml:space="preserve">"#);
            xml.push_str(&escape(run.text.as_str()));
            xml.push_str("</w:t></w:r>");
        }
        xml.push_str("</w:p>");
    }
    xml.push_str("<w:sectPr/></w:body></w:document>");
    xml
}

/// Convert editor HTML into DOCX bytes.
pub fn html_to_docx(html: &str) -> anyhow::Result<Vec<u8>> {
    let paragraphs = collect_paragraphs(html)?;
    let document_xml = build_document_xml(&paragraphs);

    let mut archive = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    archive
        .start_file("[Content_Types].xml", options)
        .context("Failed to start content types entry")?;
    archive.write_all(CONTENT_TYPES_XML.as_bytes())?;
    archive
        .start_file("_rels/.rels", options)
        .context("Failed to start relationships entry")?;
    archive.write_all(RELS_XML.as_bytes())?;
    archive
        .start_file("word/document.xml", options)
        .context("Failed to start document entry")?;
    archive.write_all(document_xml.as_bytes())?;
    let cursor = archive.finish().context("Failed to finish DOCX archive")?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_document_xml(bytes: &[u8]) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn produces_a_readable_archive_with_required_parts() {
        let bytes = html_to_docx("<p>Hello</p>").unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        for name in ["[Content_Types].xml", "_rels/.rels", "word/document.xml"] {
            assert!(archive.by_name(name).is_ok(), "missing {name}");
        }
    }

    #[test]
    fn paragraphs_and_styles_survive_conversion() {
        let bytes =
            html_to_docx("<p>Plain and <b>bold</b></p><p><em>emphasis</em></p>").unwrap();
        let xml = read_document_xml(&bytes);
        assert_eq!(xml.matches("<w:p>").count(), 2);
        assert!(xml.contains("<w:rPr><w:b/></w:rPr><w:t xml:space=\"preserve\">bold</w:t>"));
        assert!(xml.contains("<w:rPr><w:i/></w:rPr><w:t xml:space=\"preserve\">emphasis</w:t>"));
        assert!(xml.contains(">Plain and </w:t>"));
    }

    #[test]
    fn entities_are_decoded_then_reescaped() {
        let bytes = html_to_docx("<p>Fish &amp; Chips&nbsp;&lt;hot&gt;</p>").unwrap();
        let xml = read_document_xml(&bytes);
        assert!(xml.contains("Fish &amp; Chips &lt;hot&gt;"));
    }

    #[test]
    fn br_splits_paragraphs_and_scripts_are_dropped() {
        let bytes = html_to_docx("<div>one<br/>two<script>alert(1)</script></div>").unwrap();
        let xml = read_document_xml(&bytes);
        assert_eq!(xml.matches("<w:p>").count(), 2);
        assert!(!xml.contains("alert"));
    }

    #[test]
    fn plain_text_without_markup_becomes_one_paragraph() {
        let bytes = html_to_docx("just words").unwrap();
        let xml = read_document_xml(&bytes);
        assert_eq!(xml.matches("<w:p>").count(), 1);
        assert!(xml.contains("just words"));
    }
}
