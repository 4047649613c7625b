//! Keyword-driven tone selection for the writer.

use inkflow_shared::{AppConfig, Tone, ToneRule};

/// Ordered tone rules plus the fallback used when none match.
#[derive(Debug, Clone)]
pub struct ToneTable {
    rules: Vec<ToneRule>,
    fallback: Tone,
}

impl ToneTable {
    pub fn new(rules: Vec<ToneRule>, fallback: Tone) -> Self {
        Self { rules, fallback }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.tones.clone(), config.fallback_tone.clone())
    }

    /// Pick the tone for `summary`.
    ///
    /// Rules are checked in order and the first one with a keyword occurring
    /// in the summary wins. Matching is a case-sensitive substring test.
    pub fn select_tone(&self, summary: &str) -> &Tone {
        self.rules
            .iter()
            .find(|rule| {
                rule.keywords
                    .iter()
                    .any(|k| !k.is_empty() && summary.contains(k.as_str()))
            })
            .map(|rule| &rule.tone)
            .unwrap_or(&self.fallback)
    }

    pub fn rules(&self) -> &[ToneRule] {
        &self.rules
    }

    pub fn fallback(&self) -> &Tone {
        &self.fallback
    }
}

impl Default for ToneTable {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_for(summary: &str) -> String {
        ToneTable::default().select_tone(summary).name.clone()
    }

    #[test]
    fn default_rules() {
        assert_eq!(name_for("- The FDA approved a drug"), "Professional");
        assert_eq!(name_for("- RSV cases are rising"), "Empowering Feminine Voice");
        assert_eq!(name_for("- The debate was heated"), "Bold & Witty");
        assert_eq!(name_for("- healthcare costs climb"), "Conversational");
        assert_eq!(name_for("- point one\n- point two"), "Storytelling");
    }

    #[test]
    fn earlier_rule_wins() {
        assert_eq!(name_for("FDA clears new vaccine"), "Professional");
        assert_eq!(name_for("disease burden and the nomination"), "Empowering Feminine Voice");
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(name_for("the fda said"), "Storytelling");
        assert_eq!(name_for("Vaccine rollout"), "Storytelling");
    }

    #[test]
    fn substring_match_inside_words() {
        // "WHO" inside "WHOLE" still counts.
        assert_eq!(name_for("WHOLE grain study"), "Professional");
    }

    #[test]
    fn custom_table_and_blank_keywords() {
        let fallback = Tone {
            name: "Plain".into(),
            directive: "be plain.".into(),
        };
        let rule = ToneRule {
            keywords: vec![String::new(), "Rust".into()],
            tone: Tone {
                name: "Technical".into(),
                directive: "be precise.".into(),
            },
        };
        let table = ToneTable::new(vec![rule], fallback);

        assert_eq!(table.select_tone("anything").name, "Plain");
        assert_eq!(table.select_tone("Rust 2024").name, "Technical");
        assert_eq!(table.rules().len(), 1);
        assert_eq!(table.fallback().name, "Plain");
    }

    #[test]
    fn tone_renders_for_instruction() {
        let table = ToneTable::default();
        let tone = table.select_tone("nothing here");
        assert_eq!(
            tone.to_string(),
            "Storytelling: write in a narrative tone that captures emotions and paints vivid scenarios."
        );
    }
}
