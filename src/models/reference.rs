use serde::{Deserialize, Serialize};

/// Bibliographic entry kind. Unknown input kinds collapse to `Misc`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Article,
    Book,
    Inproceedings,
    #[default]
    #[serde(other)]
    Misc,
}

impl ReferenceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Book => "book",
            Self::Inproceedings => "inproceedings",
            Self::Misc => "misc",
        }
    }
}

/// A citation record embedded in an article's `references_json` column.
///
/// Not persisted as its own table: articles and article versions store an
/// ordered JSON array of these (citation index = array position + 1). Every
/// field defaults to empty so arbitrary client payloads deserialize without
/// erroring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "type", default)]
    pub kind: ReferenceKind,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub journal: String,
    #[serde(default)]
    pub volume: String,
    #[serde(default)]
    pub pages: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub doi: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub booktitle: String,
}

/// Stored reference arrays may predate validation or have been written through
/// the share-token path; anything that is not a JSON array of objects reads as
/// an empty list.
pub fn parse_references(raw: serde_json::Value) -> Vec<Reference> {
    serde_json::from_value(raw).unwrap_or_default()
}

/// Coerce a request-supplied value the same way writes always have: keep it
/// when it is an array, otherwise store an empty list.
pub fn coerce_references(raw: serde_json::Value) -> Vec<Reference> {
    if raw.is_array() {
        parse_references(raw)
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_kind_maps_to_misc() {
        let r: Reference = serde_json::from_value(json!({"type": "phdthesis"})).unwrap();
        assert_eq!(r.kind, ReferenceKind::Misc);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let r: Reference = serde_json::from_value(json!({"title": "T"})).unwrap();
        assert_eq!(r.title, "T");
        assert_eq!(r.author, "");
        assert_eq!(r.kind, ReferenceKind::Misc);
    }

    #[test]
    fn kind_round_trips_lowercase() {
        let r = Reference {
            kind: ReferenceKind::Inproceedings,
            ..Default::default()
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["type"], "inproceedings");
    }

    #[test]
    fn malformed_stored_json_reads_as_empty() {
        assert!(parse_references(json!({"not": "an array"})).is_empty());
        assert!(parse_references(json!("garbage")).is_empty());
        assert!(parse_references(json!([42, "x"])).is_empty());
    }

    #[test]
    fn well_formed_array_parses_in_order() {
        let refs = parse_references(json!([
            {"type": "article", "title": "First"},
            {"type": "book", "title": "Second"}
        ]));
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].title, "First");
        assert_eq!(refs[1].kind, ReferenceKind::Book);
    }

    #[test]
    fn non_array_request_value_coerces_to_empty() {
        assert!(coerce_references(json!({"a": 1})).is_empty());
        assert_eq!(coerce_references(json!([{"title": "x"}])).len(), 1);
    }
}
