use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Wire representation of a field the extractor could not find.
pub const ABSENCE_MARKER: &str = "Not found";

/// Structured fields pulled out of one resume.
///
/// `None` is the only way a field can be missing; an extracted value is never
/// an empty string. On the wire `None` becomes [`ABSENCE_MARKER`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    #[serde(with = "absence_marker")]
    pub name: Option<String>,
    #[serde(with = "absence_marker")]
    pub email: Option<String>,
    #[serde(with = "absence_marker")]
    pub phone: Option<String>,
    pub skills: BTreeSet<String>,
}

impl CandidateRecord {
    /// Serializes the record with four-space indentation, the layout of the
    /// downloadable `resume_data.json`.
    pub fn to_pretty_json(&self) -> serde_json::Result<Vec<u8>> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(out)
    }
}

/// Serde adapter mapping `Option<String>` to either the value or `"Not found"`.
mod absence_marker {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::ABSENCE_MARKER;

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.as_deref().unwrap_or(ABSENCE_MARKER))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.filter(|s| !s.is_empty() && s != ABSENCE_MARKER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_record() -> CandidateRecord {
        CandidateRecord {
            name: Some("Jane Doe".to_string()),
            email: Some("jane.doe@example.com".to_string()),
            phone: Some("+1 555-123-4567".to_string()),
            skills: ["Python", "SQL"].iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_serializes_exactly_four_keys() {
        let value = serde_json::to_value(full_record()).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 4);
        for key in ["name", "email", "phone", "skills"] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        assert!(value["skills"].is_array());
    }

    #[test]
    fn test_absent_fields_serialize_as_marker() {
        let value = serde_json::to_value(CandidateRecord::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "Not found",
                "email": "Not found",
                "phone": "Not found",
                "skills": []
            })
        );
    }

    #[test]
    fn test_json_round_trip_preserves_fields() {
        let record = full_record();
        let encoded = serde_json::to_string(&record).unwrap();
        let decoded: CandidateRecord = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, record);

        let partial = CandidateRecord {
            email: Some("a@b.io".to_string()),
            ..CandidateRecord::default()
        };
        let decoded: CandidateRecord =
            serde_json::from_str(&serde_json::to_string(&partial).unwrap()).unwrap();
        assert_eq!(decoded, partial);
    }

    #[test]
    fn test_marker_and_null_deserialize_to_none() {
        let decoded: CandidateRecord = serde_json::from_value(json!({
            "name": null,
            "email": "Not found",
            "phone": "",
            "skills": ["Docker", "Docker"]
        }))
        .unwrap();
        assert_eq!(decoded.name, None);
        assert_eq!(decoded.email, None);
        assert_eq!(decoded.phone, None);
        assert_eq!(decoded.skills.len(), 1);
    }

    #[test]
    fn test_pretty_json_uses_four_space_indent() {
        let bytes = full_record().to_pretty_json().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\n    \"name\": \"Jane Doe\""));
        let reparsed: CandidateRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(reparsed, full_record());
    }
}
