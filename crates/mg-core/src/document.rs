use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Outline returned by the structuring step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStructure {
    pub title: String,
    pub sections: Vec<DocumentSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSection {
    pub heading: String,
    #[serde(default)]
    pub subheadings: Vec<String>,
}

impl DocumentSection {
    pub fn new(heading: impl Into<String>, subheadings: &[&str]) -> Self {
        Self {
            heading: heading.into(),
            subheadings: subheadings.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Generated prose for one section: the heading's own paragraph plus one
/// paragraph per subheading that was generated successfully.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionContent {
    pub main: Option<String>,
    pub subsections: HashMap<String, String>,
}

impl SectionContent {
    pub fn with_main(main: impl Into<String>) -> Self {
        Self {
            main: Some(main.into()),
            subsections: HashMap::new(),
        }
    }

    pub fn insert(&mut self, subheading: impl Into<String>, text: impl Into<String>) {
        self.subsections.insert(subheading.into(), text.into());
    }

    pub fn subsection(&self, subheading: &str) -> Option<&str> {
        self.subsections.get(subheading).map(String::as_str)
    }
}

/// Section contents keyed by section heading
pub type DocumentContents = HashMap<String, SectionContent>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_from_json() {
        let structure: DocumentStructure = serde_json::from_str(
            r#"{
                "title": "Solar Energy",
                "sections": [
                    {"heading": "History", "subheadings": ["Early Research", "Modern Breakthroughs"]},
                    {"heading": "Outlook"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(structure.title, "Solar Energy");
        assert_eq!(
            structure.sections[0],
            DocumentSection::new("History", &["Early Research", "Modern Breakthroughs"])
        );
        assert!(structure.sections[1].subheadings.is_empty());
    }

    #[test]
    fn test_missing_title_is_rejected() {
        let parsed = serde_json::from_str::<DocumentStructure>(r#"{"sections": []}"#);
        assert!(parsed.is_err());
    }
}
