use ratatui::{
    style::Stylize,
    text::{Line, Span, Text},
};

/// A single key binding shown in the usage panel
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub keys: Vec<&'static str>,
    pub description: String,
}

impl KeyBinding {
    pub fn new(keys: &[&'static str], description: impl Into<String>) -> Self {
        KeyBinding {
            keys: keys.to_vec(),
            description: description.into(),
        }
    }

    fn to_line(&self) -> Line<'static> {
        let mut spans: Vec<Span> = Vec::with_capacity(self.keys.len() * 2 + 1);

        for (idx, key) in self.keys.iter().enumerate() {
            if idx > 0 {
                spans.push("/".into());
            }
            spans.push(Span::from(format!("({})", key)).bold());
        }

        spans.push(Span::from(format!(" {}", self.description)));

        Line::from(spans)
    }
}

#[derive(Debug, Clone)]
pub struct UsageInfo {
    pub description: Option<String>,
    pub bindings: Vec<KeyBinding>,
}

impl UsageInfo {
    pub fn to_text(&self) -> Text<'static> {
        let description = self
            .description
            .iter()
            .map(|description| Line::from(Span::from(description.clone()).italic()));

        Text::from(
            description
                .chain(self.bindings.iter().map(KeyBinding::to_line))
                .collect::<Vec<Line>>(),
        )
    }
}

pub trait HasUsageInfo {
    fn usage_info(&self) -> UsageInfo;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_renders_description_then_bindings() {
        let usage = UsageInfo {
            description: Some("Pick a card".into()),
            bindings: vec![
                KeyBinding::new(&["←", "→"], "to move"),
                KeyBinding::new(&["Enter"], "to vote"),
            ],
        };

        let text = usage.to_text();
        let lines: Vec<String> = text
            .lines
            .iter()
            .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect())
            .collect();

        assert_eq!(lines, vec!["Pick a card", "(←)/(→) to move", "(Enter) to vote"]);
    }
}
