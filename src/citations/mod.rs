//! Citation formatter: BibTeX/RIS parsing and BibTeX/APA/IEEE rendering.
//!
//! Every function here is a pure transformation over [`Reference`] records.
//! Malformed input never errors; it falls back to defaults (`Misc` kind,
//! empty fields, "n.d." placeholders).

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Reference, ReferenceKind};

static BIBTEX_ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)@(\w+)\s*\{[^,]*,\s*(.*)\}").unwrap());
static BIBTEX_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@\w+\s*\{").unwrap());
static AND_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\s+and\s+").unwrap());
static IEEE_AUTHOR_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+and\s+|;|,").unwrap());
static RIS_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^TY\s+-\s+").unwrap());
static RIS_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z0-9]{2})\s+-\s+(.+)$").unwrap());
static DOI_URL_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://doi\.org/").unwrap());
static MD_ITALICS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*]+)\*").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationFormat {
    BibTex,
    RefMan,
}

impl CitationFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BibTex => "bibtex",
            Self::RefMan => "refman",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCitation {
    pub format: CitationFormat,
    pub reference: Reference,
}

fn extract_bibtex_value(body: &str, key: &str) -> Option<String> {
    let re = Regex::new(&format!(r#"(?i){key}\s*=\s*[{{"]([^}}"]*)["}}]"#)).ok()?;
    let value = re.captures(body)?.get(1)?.as_str().trim();
    Some(value.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn map_bibtex_kind(raw: &str) -> ReferenceKind {
    match raw {
        "article" | "jour" => ReferenceKind::Article,
        "book" => ReferenceKind::Book,
        "inproceedings" | "conference" => ReferenceKind::Inproceedings,
        _ => ReferenceKind::Misc,
    }
}

/// Parse a single `@type{key, field = value, ...}` entry.
///
/// Returns `None` when the text is not a BibTeX entry, or when neither an
/// author nor a title can be extracted from it.
pub fn parse_bibtex(text: &str) -> Option<Reference> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let caps = BIBTEX_ENTRY_RE.captures(text)?;
    let kind = map_bibtex_kind(&caps[1].to_lowercase());
    let body = caps.get(2).map_or("", |m| m.as_str());

    let author = extract_bibtex_value(body, "author");
    let title = extract_bibtex_value(body, "title");
    if author.is_none() && title.is_none() {
        return None;
    }
    let author = author
        .map(|a| AND_SEPARATOR_RE.replace_all(&a, ", ").into_owned())
        .unwrap_or_default();

    Some(Reference {
        kind,
        author,
        title: title.unwrap_or_default(),
        year: extract_bibtex_value(body, "year").unwrap_or_default(),
        journal: extract_bibtex_value(body, "journal").unwrap_or_default(),
        booktitle: extract_bibtex_value(body, "booktitle").unwrap_or_default(),
        volume: extract_bibtex_value(body, "volume").unwrap_or_default(),
        pages: extract_bibtex_value(body, "pages").unwrap_or_default(),
        publisher: extract_bibtex_value(body, "publisher").unwrap_or_default(),
        doi: extract_bibtex_value(body, "doi").unwrap_or_default(),
        url: extract_bibtex_value(body, "url").unwrap_or_default(),
    })
}

/// Split a blob containing several concatenated BibTeX entries at each
/// `@type{` boundary.
fn split_bibtex_entries(text: &str) -> Vec<&str> {
    let starts: Vec<usize> = BIBTEX_MARKER_RE.find_iter(text).map(|m| m.start()).collect();
    if starts.is_empty() {
        return Vec::new();
    }
    let mut entries = Vec::with_capacity(starts.len());
    if starts[0] > 0 && !text[..starts[0]].trim().is_empty() {
        entries.push(&text[..starts[0]]);
    }
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        entries.push(&text[start..end]);
    }
    entries
}

/// Detect and parse pasted citation text as BibTeX or RIS ("refman").
///
/// BibTeX wins when an `@word{` marker is present; a multi-entry blob yields
/// the first entry that parses. RIS is recognized by a `TY  - ` line and its
/// two-letter tag pairs are mapped onto the reference fields. Anything else
/// yields `None`.
pub fn parse_citation_format(text: &str) -> Option<ParsedCitation> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if BIBTEX_MARKER_RE.is_match(text) {
        for entry in split_bibtex_entries(text) {
            if let Some(reference) = parse_bibtex(entry.trim()) {
                return Some(ParsedCitation {
                    format: CitationFormat::BibTex,
                    reference,
                });
            }
        }
    }
    if RIS_MARKER_RE.is_match(text) {
        let mut fields: Vec<(String, String)> = Vec::new();
        for line in text.lines() {
            if let Some(caps) = RIS_LINE_RE.captures(line) {
                fields.push((caps[1].to_string(), caps[2].trim().to_string()));
            }
        }
        let field = |tag: &str| -> String {
            fields
                .iter()
                .rev()
                .find(|(t, _)| t == tag)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };
        let authors: Vec<&str> = fields
            .iter()
            .filter(|(t, _)| t == "AU")
            .map(|(_, v)| v.as_str())
            .collect();
        let author = authors.join(", ");
        let title = field("TI");
        if author.is_empty() && title.is_empty() {
            return None;
        }
        let pages = [field("SP"), field("EP")]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        let year: String = field("PY").chars().take(4).collect();
        return Some(ParsedCitation {
            format: CitationFormat::RefMan,
            reference: Reference {
                kind: ReferenceKind::Article,
                author,
                title,
                year,
                journal: field("JO"),
                volume: field("VL"),
                pages,
                doi: field("DO"),
                url: field("UR"),
                booktitle: field("T3"),
                publisher: String::new(),
            },
        });
    }
    None
}

fn escape_bibtex(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '{' | '}' | '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Render references as a BibTeX document, entries separated by blank lines.
///
/// Entry keys are `ref{index+1}{last two digits of year}`; only non-empty
/// fields are emitted, in a fixed order.
pub fn to_bibtex(refs: &[Reference]) -> String {
    refs.iter()
        .enumerate()
        .map(|(i, r)| {
            let year_suffix: String = {
                let chars: Vec<char> = r.year.chars().collect();
                chars[chars.len().saturating_sub(2)..].iter().collect()
            };
            let key = format!("ref{}{}", i + 1, year_suffix);
            let mut fields = Vec::new();
            if !r.author.is_empty() {
                fields.push(format!("  author = {{{}}}", escape_bibtex(&r.author)));
            }
            if !r.title.is_empty() {
                fields.push(format!("  title = {{{}}}", escape_bibtex(&r.title)));
            }
            if !r.year.is_empty() {
                fields.push(format!("  year = {{{}}}", r.year));
            }
            if !r.journal.is_empty() {
                fields.push(format!("  journal = {{{}}}", escape_bibtex(&r.journal)));
            }
            if !r.volume.is_empty() {
                fields.push(format!("  volume = {{{}}}", r.volume));
            }
            if !r.pages.is_empty() {
                fields.push(format!("  pages = {{{}}}", r.pages));
            }
            if !r.publisher.is_empty() {
                fields.push(format!("  publisher = {{{}}}", escape_bibtex(&r.publisher)));
            }
            if !r.doi.is_empty() {
                fields.push(format!("  doi = {{{}}}", r.doi));
            }
            if !r.url.is_empty() {
                fields.push(format!("  url = {{{}}}", r.url));
            }
            if !r.booktitle.is_empty() {
                fields.push(format!("  booktitle = {{{}}}", escape_bibtex(&r.booktitle)));
            }
            format!("@{}{{{},\n{}\n}}", r.kind.as_str(), key, fields.join(",\n"))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// First author's last name: the part before the first comma, or the final
/// whitespace-delimited token when there is no comma. Empty author → "n.d.".
fn author_last_name(author: &str) -> String {
    if author.trim().is_empty() {
        return "n.d.".to_string();
    }
    let first = AND_SEPARATOR_RE
        .split(author)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("");
    if let Some(comma) = first.find(',') {
        let last = first[..comma].trim();
        if !last.is_empty() {
            return last.to_string();
        }
        return first.to_string();
    }
    first
        .split_whitespace()
        .last()
        .unwrap_or(first)
        .to_string()
}

/// Parenthetical in-text citation: `(LastName, Year)`.
pub fn format_in_text_apa(r: &Reference) -> String {
    let author = author_last_name(&r.author);
    let year = if r.year.trim().is_empty() { "n.d." } else { r.year.trim() };
    format!("({author}, {year})")
}

/// Narrative in-text citation: `LastName (Year)`.
pub fn format_in_text_apa_narrative(r: &Reference) -> String {
    let author = author_last_name(&r.author);
    let year = if r.year.trim().is_empty() { "n.d." } else { r.year.trim() };
    format!("{author} ({year})")
}

/// "Last, F. I." for one author name in either "Last, First" or "First Last"
/// order.
fn format_one_author_apa(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        return String::new();
    }
    if let Some(comma) = name.find(',') {
        let last = name[..comma].trim();
        let first_part = name[comma + 1..].trim();
        let initials = first_part
            .split_whitespace()
            .filter_map(|w| w.chars().next())
            .map(|c| format!("{c}."))
            .collect::<Vec<_>>()
            .join(" ");
        if last.is_empty() {
            return first_part.to_string();
        }
        return format!("{last}, {initials}").trim().to_string();
    }
    let words: Vec<&str> = name.split_whitespace().collect();
    if words.len() <= 1 {
        return name.to_string();
    }
    let last = words[words.len() - 1];
    let initials = words[..words.len() - 1]
        .iter()
        .filter_map(|w| w.chars().next())
        .map(|c| format!("{c}."))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{last}, {initials}")
}

fn doi_link(doi: &str) -> String {
    format!("https://doi.org/{}", DOI_URL_PREFIX_RE.replace(doi, ""))
}

fn format_reference_apa(r: &Reference) -> String {
    let authors: Vec<String> = AND_SEPARATOR_RE
        .split(&r.author)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(format_one_author_apa)
        .collect();
    let author_str = match authors.len() {
        0 => "N.d.".to_string(),
        1 => authors[0].clone(),
        2..=7 => format!(
            "{}, & {}",
            authors[..authors.len() - 1].join(", "),
            authors[authors.len() - 1]
        ),
        _ => format!("{} et al.", authors[0]),
    };
    let year = if r.year.trim().is_empty() {
        " (n.d.).".to_string()
    } else {
        format!(" ({}).", r.year)
    };
    let title = if r.title.trim().is_empty() {
        String::new()
    } else {
        format!(" {}.", r.title)
    };

    let mut tail = String::new();
    match r.kind {
        ReferenceKind::Article => {
            let journal = r.journal.trim();
            if !journal.is_empty() {
                tail.push_str(&format!(" *{journal}*"));
                let volume = r.volume.trim();
                if !volume.is_empty() {
                    tail.push_str(&format!(", *{volume}*"));
                }
                let pages = r.pages.trim();
                if !pages.is_empty() {
                    tail.push_str(&format!(", {pages}"));
                }
                tail.push('.');
            }
        }
        ReferenceKind::Book => {
            let publisher = r.publisher.trim();
            if !publisher.is_empty() {
                tail.push_str(&format!(" {publisher}."));
            }
        }
        ReferenceKind::Inproceedings => {
            let venue = if r.booktitle.trim().is_empty() {
                r.journal.trim()
            } else {
                r.booktitle.trim()
            };
            if !venue.is_empty() {
                tail.push_str(&format!(" In *{venue}*."));
            }
        }
        ReferenceKind::Misc => {
            return format!("{author_str}{year}{title}").trim().to_string();
        }
    }
    if !r.doi.trim().is_empty() {
        tail.push_str(&format!(" {}", doi_link(r.doi.trim())));
    } else if !r.url.trim().is_empty() {
        tail.push_str(&format!(" {}", r.url.trim()));
    }
    format!("{author_str}{year}{title}{tail}").trim().to_string()
}

/// Full APA reference list, entries separated by blank lines. Journal and
/// venue names carry markdown italics for [`markdown_italics_to_html`].
pub fn to_reference_list_apa(refs: &[Reference]) -> String {
    refs.iter()
        .map(format_reference_apa)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_reference_ieee(r: &Reference, index: usize) -> String {
    let authors: Vec<&str> = IEEE_AUTHOR_SPLIT_RE
        .split(&r.author)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let author_str = if authors.is_empty() {
        "N.d.".to_string()
    } else {
        authors
            .iter()
            .map(|a| {
                let words: Vec<&str> = a.split_whitespace().collect();
                if words.len() <= 1 {
                    (*a).to_string()
                } else {
                    let last = words[words.len() - 1];
                    let initials = words[..words.len() - 1]
                        .iter()
                        .filter_map(|w| w.chars().next())
                        .map(|c| c.to_string())
                        .collect::<Vec<_>>()
                        .join(". ");
                    format!("{last}, {initials}.")
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    };
    let title = if r.title.trim().is_empty() {
        String::new()
    } else {
        format!("\"{}\",", r.title)
    };
    let year = if r.year.trim().is_empty() { "n.d." } else { r.year.trim() };

    if r.kind == ReferenceKind::Article {
        let mut rest = String::new();
        let journal = r.journal.trim();
        if !journal.is_empty() {
            rest.push_str(&format!(" *{journal}*"));
        }
        let volume = r.volume.trim();
        if !volume.is_empty() {
            rest.push_str(&format!(", vol. {volume}"));
        }
        let pages = r.pages.trim();
        if !pages.is_empty() {
            rest.push_str(&format!(", pp. {pages}"));
        }
        rest.push_str(&format!(", {year}."));
        if !r.doi.trim().is_empty() {
            rest.push_str(&format!(
                " doi: {}",
                DOI_URL_PREFIX_RE.replace(r.doi.trim(), "")
            ));
        }
        return format!("[{}] {}, {} {}", index + 1, author_str, title, rest.trim_start())
            .trim()
            .to_string();
    }
    format!("[{}] {}, {} {}.", index + 1, author_str, title, year)
        .trim()
        .to_string()
}

/// Numbered IEEE reference list: one `[n]`-prefixed entry per reference, in
/// input order, separated by blank lines.
pub fn to_reference_list_ieee(refs: &[Reference]) -> String {
    refs.iter()
        .enumerate()
        .map(|(i, r)| format_reference_ieee(r, i))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Replace `*span*` markdown italics with `<em>` markup. Non-nesting.
pub fn markdown_italics_to_html(text: &str) -> String {
    MD_ITALICS_RE.replace_all(text, "<em>$1</em>").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(author: &str, title: &str, year: &str) -> Reference {
        Reference {
            kind: ReferenceKind::Article,
            author: author.to_string(),
            title: title.to_string(),
            year: year.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn parses_simple_bibtex_entry() {
        let input = r#"@article{smith2020,
  author = {Smith, John and Doe, Jane},
  title = {A Study of Things},
  year = {2020},
  journal = {Journal of Stuff},
  volume = {12},
  pages = {100-110}
}"#;
        let r = parse_bibtex(input).unwrap();
        assert_eq!(r.kind, ReferenceKind::Article);
        assert_eq!(r.author, "Smith, John, Doe, Jane");
        assert_eq!(r.title, "A Study of Things");
        assert_eq!(r.year, "2020");
        assert_eq!(r.journal, "Journal of Stuff");
        assert_eq!(r.pages, "100-110");
    }

    #[test]
    fn bibtex_unknown_type_defaults_to_misc() {
        let r = parse_bibtex("@phdthesis{k, title = {T}}").unwrap();
        assert_eq!(r.kind, ReferenceKind::Misc);
        let r = parse_bibtex("@jour{k, title = {T}}").unwrap();
        assert_eq!(r.kind, ReferenceKind::Article);
    }

    #[test]
    fn bibtex_without_author_or_title_is_rejected() {
        assert!(parse_bibtex("@misc{key, year = {2020}}").is_none());
        assert!(parse_bibtex("not bibtex at all").is_none());
        assert!(parse_bibtex("").is_none());
    }

    #[test]
    fn bibtex_round_trips_author_and_title() {
        let original = article("Curie, Marie", "Radioactive Decay", "1903");
        let rendered = to_bibtex(std::slice::from_ref(&original));
        let reparsed = parse_bibtex(&rendered).unwrap();
        assert_eq!(reparsed.author, original.author);
        assert_eq!(reparsed.title, original.title);
    }

    #[test]
    fn to_bibtex_generates_indexed_keys_and_skips_empty_fields() {
        let refs = vec![
            article("Smith, J.", "First", "2021"),
            article("Doe, J.", "Second", "1999"),
        ];
        let out = to_bibtex(&refs);
        assert!(out.contains("@article{ref121,"));
        assert!(out.contains("@article{ref299,"));
        assert!(!out.contains("journal ="));
        assert_eq!(out.matches("\n\n").count(), 1);
    }

    #[test]
    fn to_bibtex_escapes_reserved_characters() {
        let mut r = article("", "On {braces} and \"quotes\"", "");
        r.author = "O\\Brien".to_string();
        let out = to_bibtex(&[r]);
        assert!(out.contains(r#"title = {On \{braces\} and \"quotes\"}"#));
        assert!(out.contains(r"author = {O\\Brien}"));
    }

    #[test]
    fn detects_bibtex_in_multi_entry_blob() {
        let blob = "@misc{a, year={2001}}\n@article{b, author={Adams, A}, title={Found}}";
        let parsed = parse_citation_format(blob).unwrap();
        assert_eq!(parsed.format, CitationFormat::BibTex);
        assert_eq!(parsed.reference.title, "Found");
    }

    #[test]
    fn parses_ris_with_joined_authors_and_page_range() {
        let input = "TY  - JOUR\nAU  - Smith, John\nAU  - Doe, Jane\nTI  - RIS Title\nPY  - 2019/05/01\nJO  - Some Journal\nVL  - 4\nSP  - 11\nEP  - 22\nDO  - 10.1/x\nER  -";
        let parsed = parse_citation_format(input).unwrap();
        assert_eq!(parsed.format, CitationFormat::RefMan);
        let r = parsed.reference;
        assert_eq!(r.author, "Smith, John, Doe, Jane");
        assert_eq!(r.title, "RIS Title");
        assert_eq!(r.year, "2019");
        assert_eq!(r.pages, "11-22");
        assert_eq!(r.journal, "Some Journal");
        assert_eq!(r.kind, ReferenceKind::Article);
    }

    #[test]
    fn unrecognized_input_returns_none() {
        assert!(parse_citation_format("").is_none());
        assert!(parse_citation_format("just some plain text").is_none());
        assert!(parse_citation_format("TY - but no title or author lines").is_none());
    }

    #[test]
    fn in_text_apa_variants() {
        let r = article("Smith, John and Doe, Jane", "T", "2020");
        assert_eq!(format_in_text_apa(&r), "(Smith, 2020)");
        assert_eq!(format_in_text_apa_narrative(&r), "Smith (2020)");

        let no_comma = article("John Michael Smith", "T", "");
        assert_eq!(format_in_text_apa(&no_comma), "(Smith, n.d.)");

        let anon = article("", "T", "2020");
        assert_eq!(format_in_text_apa(&anon), "(n.d., 2020)");
    }

    #[test]
    fn apa_list_joins_up_to_seven_authors_with_ampersand() {
        let r = article("Smith, John and Doe, Jane and Roe, Richard", "Title", "2020");
        let out = to_reference_list_apa(&[r]);
        assert!(out.starts_with("Smith, J., Doe, J., & Roe, R. (2020). Title."));
    }

    #[test]
    fn apa_list_uses_et_al_beyond_seven_authors() {
        let author = (1..=8)
            .map(|i| format!("Author{i}, A"))
            .collect::<Vec<_>>()
            .join(" and ");
        let r = article(&author, "Big Collaboration", "2022");
        let out = to_reference_list_apa(&[r]);
        assert!(out.starts_with("Author1, A. et al. (2022)."));
    }

    #[test]
    fn apa_article_entry_includes_journal_volume_pages_and_doi() {
        let mut r = article("Smith, John", "Title", "2020");
        r.journal = "Nature".to_string();
        r.volume = "5".to_string();
        r.pages = "1-9".to_string();
        r.doi = "https://doi.org/10.1/abc".to_string();
        let out = to_reference_list_apa(&[r]);
        assert_eq!(
            out,
            "Smith, J. (2020). Title. *Nature*, *5*, 1-9. https://doi.org/10.1/abc"
        );
    }

    #[test]
    fn apa_book_and_inproceedings_tails() {
        let mut book = article("Knuth, Donald", "TAOCP", "1968");
        book.kind = ReferenceKind::Book;
        book.publisher = "Addison-Wesley".to_string();
        assert_eq!(
            to_reference_list_apa(&[book]),
            "Knuth, D. (1968). TAOCP. Addison-Wesley."
        );

        let mut paper = article("Lamport, Leslie", "Time and Clocks", "1978");
        paper.kind = ReferenceKind::Inproceedings;
        paper.booktitle = "CACM".to_string();
        assert_eq!(
            to_reference_list_apa(&[paper]),
            "Lamport, L. (1978). Time and Clocks. In *CACM*."
        );
    }

    #[test]
    fn ieee_list_numbers_every_entry_in_order() {
        let refs: Vec<Reference> = (1..=4)
            .map(|i| article(&format!("Author{i}, A"), &format!("Title {i}"), "2020"))
            .collect();
        let out = to_reference_list_ieee(&refs);
        let entries: Vec<&str> = out.split("\n\n").collect();
        assert_eq!(entries.len(), 4);
        for (i, entry) in entries.iter().enumerate() {
            assert!(entry.starts_with(&format!("[{}]", i + 1)));
        }
    }

    #[test]
    fn ieee_article_entry_format() {
        let mut r = article("John Smith", "A Paper", "2021");
        r.journal = "IEEE Trans.".to_string();
        r.volume = "9".to_string();
        r.pages = "10-20".to_string();
        r.doi = "10.1/xyz".to_string();
        let out = to_reference_list_ieee(std::slice::from_ref(&r));
        assert_eq!(
            out,
            "[1] Smith, J., \"A Paper\", *IEEE Trans.*, vol. 9, pp. 10-20, 2021. doi: 10.1/xyz"
        );
    }

    #[test]
    fn ieee_non_article_entry_is_just_year() {
        let mut r = article("Jane Doe", "Notes", "2018");
        r.kind = ReferenceKind::Misc;
        assert_eq!(
            to_reference_list_ieee(&[r]),
            "[1] Doe, J., \"Notes\", 2018."
        );
    }

    #[test]
    fn markdown_italics_convert_to_em() {
        assert_eq!(
            markdown_italics_to_html("see *Nature*, vol. 5 and *Science*"),
            "see <em>Nature</em>, vol. 5 and <em>Science</em>"
        );
        assert_eq!(markdown_italics_to_html("no italics"), "no italics");
    }
}
