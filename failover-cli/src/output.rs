use serde::Serialize;

use crate::OutputArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputArgs {
    /// True when a command should print its own human-readable summary.
    pub fn wants_text(&self) -> bool {
        self.format == OutputFormat::Text && !self.quiet
    }

    /// Results go to stdout; text mode falls back to pretty JSON.
    pub fn result<T: Serialize>(&self, result: &T) {
        if self.quiet {
            return;
        }
        let rendered = match self.format {
            OutputFormat::Text => serde_json::to_string_pretty(result),
            OutputFormat::Json => serde_json::to_string(result),
        };
        if let Ok(json) = rendered {
            println!("{json}");
        }
    }

    /// Errors go to stderr, as `{"error": ...}` in JSON mode.
    pub fn error(&self, message: &str) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Text => eprintln!("error: {message}"),
            OutputFormat::Json => {
                eprintln!("{}", serde_json::json!({ "error": message }));
            }
        }
    }
}
