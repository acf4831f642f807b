use colored::Colorize;
use std::fmt;

/// How a line of shell output is labelled and coloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    /// Lines spoken by the caller during a simulated phone call.
    Call,
    Section,
}

impl MessageKind {
    fn prefix(self) -> Option<&'static str> {
        match self {
            MessageKind::Info => Some("INFO: [i]"),
            MessageKind::Success => Some("SUCCESS: [+]"),
            MessageKind::Warning => Some("WARNING: [!]"),
            MessageKind::Error => Some("ERROR: [x]"),
            MessageKind::Call => Some("CALL: [~]"),
            MessageKind::Section => None,
        }
    }

    fn render(self, message: impl fmt::Display) -> String {
        let text = message.to_string();
        let plain = match self.prefix() {
            Some(prefix) => format!("{prefix} {text}"),
            None => format!("=== {} ===", text.trim()),
        };
        match self {
            MessageKind::Info => plain,
            MessageKind::Success => plain.bright_green().to_string(),
            MessageKind::Warning => plain.bright_yellow().to_string(),
            MessageKind::Error => plain.bright_red().to_string(),
            MessageKind::Call => plain.bright_magenta().italic().to_string(),
            MessageKind::Section => plain.bold().to_string(),
        }
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let line = kind.render(message);
    if kind == MessageKind::Section {
        println!();
    }
    println!("{line}");
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn call(message: impl fmt::Display) {
    print(MessageKind::Call, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}
