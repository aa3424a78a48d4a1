pub const EMERGENCY_REPLY: &str = "⚠️ This may be a medical emergency.\n\n\
Please call your local emergency number or go to the nearest emergency room immediately.\n\n\
This chat cannot assist with emergencies.";

const EMERGENCY_KEYWORDS: &[&str] = &[
    "chest pain",
    "difficulty breathing",
    "shortness of breath",
    "can't breathe",
    "cannot breathe",
    "unconscious",
    "fainted",
    "severe bleeding",
    "heavy bleeding",
    "heart attack",
    "stroke",
    "severe pain",
];

/// Lower-cases and folds curly apostrophes so "can’t" matches "can't".
pub fn normalize(text: &str) -> String {
    text.to_lowercase().replace('\u{2019}', "'")
}

#[derive(Debug, Clone)]
pub struct EmergencyClassifier {
    keywords: Vec<String>,
}

impl EmergencyClassifier {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords.into_iter().map(|k| normalize(k.as_ref())).collect(),
        }
    }

    /// Plain substring containment, no tokenization: "strokes" still hits "stroke".
    pub fn is_emergency(&self, utterance: &str) -> bool {
        let text = normalize(utterance);
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

impl Default for EmergencyClassifier {
    fn default() -> Self {
        Self::new(EMERGENCY_KEYWORDS)
    }
}
