//! Line input for the session: rustyline when stdin is a terminal,
//! plain buffered reads when the shell is driven by a script.

use std::io::{self, BufRead};

use log::{debug, error};
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::{CompletionType, Config as RlConfig, Editor};

use crate::utils::config::Config;

/// One read cycle's outcome.
pub enum Input {
    Line(String),
    Interrupted,
    Eof,
}

pub struct Reader<'a> {
    config: &'a Config,
    editor: Option<Editor<(), FileHistory>>,
}

impl<'a> Reader<'a> {
    pub fn new(config: &'a Config, interactive: bool) -> anyhow::Result<Self> {
        let editor = if interactive {
            let rl_config = RlConfig::builder()
                .history_ignore_space(true)
                .completion_type(CompletionType::List)
                .edit_mode(config.edit_mode())
                .build();
            Some(Editor::with_config(rl_config)?)
        } else {
            None
        };
        Ok(Self { config, editor })
    }

    pub fn is_interactive(&self) -> bool {
        self.editor.is_some()
    }

    pub fn load_history(&mut self) {
        if let Some(editor) = &mut self.editor {
            if let Err(err) = editor.load_history(&self.config.history_file) {
                debug!(
                    "no history loaded from {}: {err}",
                    self.config.history_file.display()
                );
            }
        }
    }

    pub fn save_history(&mut self) {
        if let Some(editor) = &mut self.editor {
            if let Err(err) = editor.save_history(&self.config.history_file) {
                error!(
                    "saving history to {} failed: {err}",
                    self.config.history_file.display()
                );
            }
        }
    }

    /// Feed the line editor's recall buffer; the session keeps its own
    /// [`crate::shell::history::History`] for the `history`/`!!` built-ins.
    pub fn add_history(&mut self, line: &str) {
        if let Some(editor) = &mut self.editor {
            let _ = editor.add_history_entry(line);
        }
    }

    /// Read one line. The prompt is shown only in interactive mode.
    pub fn read_line(&mut self, prompt: &str) -> Input {
        match &mut self.editor {
            Some(editor) => match editor.readline(prompt) {
                Ok(line) => Input::Line(line),
                Err(ReadlineError::Interrupted) => Input::Interrupted,
                Err(ReadlineError::Eof) => Input::Eof,
                Err(err) => {
                    error!("readline: {err}");
                    Input::Eof
                }
            },
            None => {
                let mut line = String::new();
                match io::stdin().lock().read_line(&mut line) {
                    Ok(0) => Input::Eof,
                    Ok(_) => Input::Line(line.trim_end_matches('\n').to_string()),
                    Err(err) => {
                        error!("reading stdin: {err}");
                        Input::Eof
                    }
                }
            }
        }
    }
}
