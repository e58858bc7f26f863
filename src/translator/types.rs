use serde::Deserialize;

/// A selectable language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub code: String,
    pub name: String,
    pub native_name: String,
}

impl Language {
    pub fn new(code: &str, name: &str, native_name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            native_name: native_name.to_string(),
        }
    }
}

/// Result of language detection for a single input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub language: String,
    pub score: f32,
    #[serde(default)]
    pub is_translation_supported: bool,
    #[serde(default)]
    pub is_transliteration_supported: bool,
    #[serde(default)]
    pub alternatives: Vec<DetectionAlternative>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectionAlternative {
    pub language: String,
    pub score: f32,
}

/// Translations of one input, one per requested target.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TranslatedItem {
    pub translations: Vec<Translation>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Translation {
    pub text: String,
    #[serde(default)]
    pub to: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_parses_full_response() {
        let json = r#"{
            "language": "de",
            "score": 0.92,
            "isTranslationSupported": true,
            "isTransliterationSupported": false,
            "alternatives": [{"language": "nl", "score": 0.4}]
        }"#;
        let detection: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(detection.language, "de");
        assert!(detection.is_translation_supported);
        assert_eq!(detection.alternatives.len(), 1);
        assert_eq!(detection.alternatives[0].language, "nl");
    }

    #[test]
    fn test_detection_tolerates_missing_optional_fields() {
        let detection: Detection =
            serde_json::from_str(r#"{"language": "fr", "score": 1.0}"#).unwrap();
        assert_eq!(detection.language, "fr");
        assert!(!detection.is_translation_supported);
        assert!(detection.alternatives.is_empty());
    }

    #[test]
    fn test_detection_rejects_wrong_shape() {
        let result = serde_json::from_str::<Detection>(r#"{"text": "hello"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_translated_item_parses() {
        let items: Vec<TranslatedItem> =
            serde_json::from_str(r#"[{"translations":[{"text":"ciao","to":"it"}]}]"#).unwrap();
        assert_eq!(items[0].translations[0].text, "ciao");
        assert_eq!(items[0].translations[0].to, "it");
    }
}
