//! Line formatting

use chrono::SecondsFormat;

use scribe_message::LogMessage;

/// Renders one message as one output line, without the trailing newline
pub trait LineFormatter: Send + Sync + 'static {
    fn format(&self, msg: &LogMessage) -> String;
}

/// Plain text formatter
///
/// `2026-08-26T09:15:03.042Z Notice   [Storage] volume mounted`
#[derive(Debug, Clone)]
pub struct TextFormatter {
    /// Append `app/process[pid]` after the writer
    show_process: bool,

    /// Append writer tags after the text
    show_tags: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            show_process: false,
            show_tags: false,
        }
    }
}

impl TextFormatter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Include application, process name and pid
    #[must_use]
    pub fn with_process(mut self) -> Self {
        self.show_process = true;
        self
    }

    /// Include writer tags
    #[must_use]
    pub fn with_tags(mut self) -> Self {
        self.show_tags = true;
        self
    }
}

impl LineFormatter for TextFormatter {
    fn format(&self, msg: &LogMessage) -> String {
        let mut line = format!(
            "{} {:<8} [{}]",
            msg.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            msg.level_name,
            msg.writer,
        );
        if self.show_process {
            line.push_str(&format!(
                " {}/{}[{}]",
                msg.application, msg.process_name, msg.process_id
            ));
        }
        line.push(' ');
        line.push_str(&msg.text);
        if self.show_tags && !msg.tags.is_empty() {
            line.push_str(&format!(" {{{}}}", msg.tags.join(",")));
        }
        line
    }
}
