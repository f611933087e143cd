use colored::*;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Step,
    Success,
    Warn,
    Error,
    Debug,
    /// Command output. Never hidden by `--quiet`.
    Result,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Step => "step",
            Level::Success => "success",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Debug => "debug",
            Level::Result => "result",
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Level::Info => "[INFO]",
            Level::Step => "→",
            Level::Success => "✓",
            Level::Warn => "[WARN]",
            Level::Error => "[ERROR]",
            Level::Debug => "[DEBUG]",
            Level::Result => "",
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Level::Error | Level::Warn)
    }
}

/// Console reporter handed to every command through the app context.
#[derive(Debug, Clone)]
pub struct Renderer {
    pub format: OutputFormat,
    pub color: bool,
    pub verbose: bool,
    pub quiet: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: true,
            verbose: false,
            quiet: false,
        }
    }
}

// Separator characters
pub const SEPARATOR_HEAVY: &str = "━";
pub const SEPARATOR_LIGHT: &str = "─";

#[derive(Serialize)]
struct Event<'a> {
    level: &'a str,
    code: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

fn colorize(level: Level, s: &str, enable: bool) -> String {
    if !enable {
        return s.to_string();
    }
    match level {
        Level::Info => s.green().to_string(),
        Level::Step => s.cyan().to_string(),
        Level::Success => s.green().bold().to_string(),
        Level::Warn => s.yellow().bold().to_string(),
        Level::Error => s.red().bold().to_string(),
        Level::Debug => s.bright_black().to_string(),
        Level::Result => s.to_string(),
    }
}

fn strip_ansi(input: &str) -> String {
    // Remove common ANSI escape sequences like \x1b[0m, \x1b[1;32m, and similar
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == 0x1b && i + 1 < bytes.len() && bytes[i + 1] == b'[' {
            i += 2;
            // Skip until we hit the final byte of the CSI sequence
            while i < bytes.len() {
                let b = bytes[i];
                i += 1;
                if (b'@'..=b'~').contains(&b) {
                    break;
                }
            }
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

impl Renderer {
    pub fn new(format: OutputFormat, color: bool, verbose: bool, quiet: bool) -> Self {
        Self {
            format,
            color,
            verbose,
            quiet,
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    fn suppressed(&self, level: Level) -> bool {
        match level {
            Level::Debug => !self.verbose,
            Level::Info | Level::Step | Level::Success => self.quiet,
            Level::Warn | Level::Error | Level::Result => false,
        }
    }

    /// Render a message to the line that would be printed, or `None` when the
    /// current verbosity hides it.
    pub fn render_line(
        &self,
        level: Level,
        code: &str,
        message: &str,
        data: Option<serde_json::Value>,
    ) -> Option<String> {
        if self.suppressed(level) {
            return None;
        }
        match self.format {
            OutputFormat::Text => {
                let line = match level {
                    Level::Result => message.to_string(),
                    Level::Success | Level::Step => {
                        colorize(level, &format!("{} {}", level.tag(), message), self.color)
                    }
                    _ => format!("{} {}", colorize(level, level.tag(), self.color), message),
                };
                Some(line)
            }
            OutputFormat::Json => {
                // Ensure message contains no ANSI control sequences in JSON mode
                let clean_msg = strip_ansi(message);
                let ev = Event {
                    level: level.as_str(),
                    code,
                    message: &clean_msg,
                    data,
                };
                serde_json::to_string(&ev).ok()
            }
        }
    }

    pub fn emit(&self, level: Level, code: &str, message: &str, data: Option<serde_json::Value>) {
        let Some(line) = self.render_line(level, code, message, data) else {
            return;
        };
        let mut out: Box<dyn Write> = if level.to_stderr() {
            Box::new(io::stderr())
        } else {
            Box::new(io::stdout())
        };
        let _ = writeln!(out, "{}", line);
    }

    pub fn info(&self, code: &str, message: &str) {
        self.emit(Level::Info, code, message, None);
    }

    pub fn step(&self, code: &str, message: &str) {
        self.emit(Level::Step, code, message, None);
    }

    pub fn success(&self, code: &str, message: &str) {
        self.emit(Level::Success, code, message, None);
    }

    pub fn warn(&self, code: &str, message: &str) {
        self.emit(Level::Warn, code, message, None);
    }

    pub fn error(&self, code: &str, message: &str) {
        self.emit(Level::Error, code, message, None);
    }

    pub fn debug(&self, code: &str, message: &str) {
        self.emit(Level::Debug, code, message, None);
    }

    /// Print a block of pre-rendered text (tables, search output) as-is.
    ///
    /// In JSON mode the text becomes the message of a `result` event so that
    /// stdout stays one event per line.
    pub fn raw(&self, text: &str) {
        self.emit(Level::Result, "output", text, None);
    }

    /// Structured command output: one `result` event carrying `data` in JSON
    /// mode, `message` alone in text mode.
    pub fn data(&self, code: &str, message: &str, data: serde_json::Value) {
        let data = self.is_json().then_some(data);
        self.emit(Level::Result, code, message, data);
    }

    pub fn separator(&self, light: bool) {
        // In JSON mode, do not print separators to avoid breaking jq parsing
        if self.is_json() || self.quiet {
            return;
        }
        let glyph = if light {
            SEPARATOR_LIGHT
        } else {
            SEPARATOR_HEAVY
        };
        println!("{}", glyph.repeat(60));
    }
}
