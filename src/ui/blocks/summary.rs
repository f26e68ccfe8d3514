use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;
use crate::ui::widgets::r#box::{Box, BoxStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Success,
    Partial,
}

/// Closing box of a command: title, key facts, lists and a next step
#[derive(Debug, Clone)]
pub struct ResultSummary {
    title: String,
    tone: Tone,
    rows: Vec<(String, String)>,
    sections: Vec<(String, Vec<String>)>,
    warnings: Vec<String>,
    next_step: Option<String>,
}

impl ResultSummary {
    fn with_tone(title: impl Into<String>, tone: Tone) -> Self {
        Self {
            title: title.into(),
            tone,
            rows: Vec::new(),
            sections: Vec::new(),
            warnings: Vec::new(),
            next_step: None,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::with_tone(title, Tone::Success)
    }

    /// Finished, but something along the way needs a look
    pub fn partial(title: impl Into<String>) -> Self {
        Self::with_tone(title, Tone::Partial)
    }

    pub fn add_row(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.rows.push((label.into(), value.into()));
    }

    pub fn add_section(&mut self, heading: impl Into<String>, items: Vec<String>) {
        self.sections.push((heading.into(), items));
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn with_next_step(&mut self, hint: impl Into<String>) {
        self.next_step = Some(hint.into());
    }

    pub fn render(&self, supports_color: bool, supports_unicode: bool) -> String {
        let (style, icon, title) = match self.tone {
            Tone::Success => (
                BoxStyle::Success,
                Icon::Success,
                ColoredText::success(self.title.as_str()),
            ),
            Tone::Partial => (
                BoxStyle::Warning,
                Icon::Warning,
                ColoredText::warning(self.title.as_str()),
            ),
        };

        let header = format!(
            "{} {}",
            icon.colored(supports_color, supports_unicode),
            title.bold().render(supports_color)
        );

        let mut b = Box::with_title(header).style(style);

        if !self.rows.is_empty() {
            b.add_empty();
            b.add_rows(&self.rows);
        }

        for (heading, items) in &self.sections {
            b.add_empty();
            b.add_line(ColoredText::dim(heading.as_str()).render(supports_color));
            for item in items {
                b.add_line(format!("  {}", item));
            }
        }

        if !self.warnings.is_empty() {
            b.add_empty();
            for warning in &self.warnings {
                b.add_line(format!(
                    "{} {}",
                    Icon::Warning.colored(supports_color, supports_unicode),
                    warning
                ));
            }
        }

        if let Some(next_step) = &self.next_step {
            b.add_empty();
            b.add_line(format!(
                "{} {} {}",
                Icon::Arrow.colored(supports_color, supports_unicode),
                ColoredText::dim("Next:").render(supports_color),
                next_step
            ));
        }

        b.render(supports_color, supports_unicode)
    }
}
