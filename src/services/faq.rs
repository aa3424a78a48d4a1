use super::emergency::normalize;

const DEPARTMENTS: &[&str] = &[
    "Cardiology",
    "Neurology",
    "Orthopedics",
    "Pediatrics",
    "General Medicine",
    "Emergency Care",
];

#[derive(Debug, Clone)]
pub struct FaqRule {
    pub keywords: Vec<String>,
    pub answer: String,
}

impl FaqRule {
    pub fn new(keywords: &[&str], answer: impl Into<String>) -> Self {
        Self {
            keywords: keywords.iter().map(|k| normalize(k)).collect(),
            answer: answer.into(),
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

/// Ordered canned answers. The first rule with a keyword hit wins.
#[derive(Debug, Clone)]
pub struct FaqMatcher {
    rules: Vec<FaqRule>,
}

impl FaqMatcher {
    pub fn new(rules: Vec<FaqRule>) -> Self {
        Self { rules }
    }

    pub fn answer(&self, utterance: &str) -> Option<&str> {
        let text = normalize(utterance);
        self.rules
            .iter()
            .find(|rule| rule.matches(&text))
            .map(|rule| rule.answer.as_str())
    }
}

impl Default for FaqMatcher {
    fn default() -> Self {
        Self::new(vec![
            FaqRule::new(
                &["visiting hour", "visiting time"],
                "Visiting hours are from 10:00 AM to 8:00 PM every day.",
            ),
            FaqRule::new(
                &["location", "address", "where"],
                "We are located at 123 Health Avenue, City Center.",
            ),
            FaqRule::new(
                &["contact", "phone", "call you", "number"],
                "You can reach the front desk at +1 (555) 010-2000, available 24/7.",
            ),
            FaqRule::new(
                &["department", "specialties"],
                format!(
                    "We have the following departments: {}.",
                    DEPARTMENTS.join(", ")
                ),
            ),
        ])
    }
}
