use colored::Colorize;

/// Prompt and diagnostic styling for the interactive session. Colors
/// disable themselves on non-tty output.
pub struct Theme {
    pub prompt: String,
    pub error_style: Box<dyn Fn(String) -> String>,
    pub info_style: Box<dyn Fn(String) -> String>,
}

impl Theme {
    pub fn new(prompt: &str) -> Self {
        Theme {
            prompt: prompt.bright_cyan().to_string(),
            error_style: Box::new(|s| s.bright_red().to_string()),
            info_style: Box::new(|s| s.bright_blue().to_string()),
        }
    }
}
