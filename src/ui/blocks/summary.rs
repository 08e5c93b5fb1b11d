use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;
use crate::ui::widgets::panel::{Panel, PanelStyle};

/// Overall result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryTone {
    Success,
    Partial,
    Failure,
}

#[derive(Debug, Clone)]
pub struct ResultSummary {
    title: String,
    tone: SummaryTone,
    stats: Vec<(String, usize)>,
    items: Vec<(Icon, String)>,
    notes: Vec<String>,
    next_step: Option<String>,
}

impl ResultSummary {
    pub fn new(title: impl Into<String>, tone: SummaryTone) -> Self {
        Self {
            title: title.into(),
            tone,
            stats: Vec::new(),
            items: Vec::new(),
            notes: Vec::new(),
            next_step: None,
        }
    }

    pub fn add_stat(&mut self, label: impl Into<String>, count: usize) {
        self.stats.push((label.into(), count));
    }

    /// One line per server, prefixed with its outcome icon
    pub fn add_item(&mut self, icon: Icon, text: impl Into<String>) {
        self.items.push((icon, text.into()));
    }

    /// Error detail shown below the items
    pub fn add_note(&mut self, message: impl Into<String>) {
        self.notes.push(message.into());
    }

    pub fn with_next_step(&mut self, hint: impl Into<String>) {
        self.next_step = Some(hint.into());
    }

    pub fn render(&self, supports_color: bool, supports_unicode: bool) -> String {
        let (style, icon, title) = match self.tone {
            SummaryTone::Success => (
                PanelStyle::Success,
                Icon::Success,
                ColoredText::success(self.title.as_str()),
            ),
            SummaryTone::Partial => (
                PanelStyle::Warning,
                Icon::Warning,
                ColoredText::warning(self.title.as_str()),
            ),
            SummaryTone::Failure => (
                PanelStyle::Error,
                Icon::Error,
                ColoredText::error(self.title.as_str()),
            ),
        };

        let header = format!(
            "{} {}",
            icon.colored(supports_color, supports_unicode),
            title.bold().render(supports_color)
        );

        let mut panel = Panel::with_title(header).style(style);
        panel.add_empty();

        if !self.stats.is_empty() {
            let stats: Vec<String> = self
                .stats
                .iter()
                .map(|(label, count)| format!("{} {}", count, label))
                .collect();
            panel.add_line(stats.join(", "));
            panel.add_empty();
        }

        for (icon, text) in &self.items {
            panel.add_line(format!(
                "{} {}",
                icon.colored(supports_color, supports_unicode),
                text
            ));
        }

        if !self.notes.is_empty() {
            panel.add_empty();
            for note in &self.notes {
                panel.add_line(ColoredText::dim(note.as_str()).render(supports_color));
            }
        }

        if let Some(next_step) = &self.next_step {
            panel.add_empty();
            panel.add_line(format!(
                "{} {} {}",
                Icon::Arrow.colored(supports_color, supports_unicode),
                ColoredText::dim("Next:").render(supports_color),
                next_step
            ));
        }

        panel.render(supports_color, supports_unicode)
    }
}
