use dotenv::dotenv;
use rustyline::EditMode;
use std::env;
use std::fs;
use std::path::PathBuf;

pub struct Config {
    pub config_dir: PathBuf,
    pub prompt: String,
    pub history_file: PathBuf,
    pub history_capacity: usize,
    pub editor_mode: String,
    pub max_line_len: usize,
    pub logger_level: String,
    pub logger_dir: PathBuf,
}

impl Config {
    fn get_config_dir() -> PathBuf {
        if let Ok(home) = env::var("HOME") {
            PathBuf::from(home).join(".config/treesh")
        } else {
            PathBuf::from("/tmp/treesh")
        }
    }

    fn default() -> Self {
        let config_dir = Self::get_config_dir();
        Config {
            prompt: String::from("$ "),
            history_file: config_dir.join("history"),
            history_capacity: crate::shell::history::DEFAULT_CAPACITY,
            editor_mode: String::from("emacs"),
            max_line_len: 4096,
            logger_level: String::from("warn"),
            logger_dir: config_dir.join("logs"),
            config_dir,
        }
    }

    pub fn new() -> Self {
        if cfg!(debug_assertions) {
            dotenv::from_filename(".env.development").ok();
        } else {
            dotenv().ok();
        }

        let mut config = Config::default();

        if let Ok(prompt) = env::var("TREESH_PROMPT") {
            config.prompt = prompt;
        }
        if let Ok(editor) = env::var("TREESH_EDITOR") {
            config.editor_mode = editor;
        }
        if let Ok(history) = env::var("TREESH_HISTORY") {
            config.history_file = PathBuf::from(history);
        }
        if let Some(capacity) = env::var("TREESH_HISTORY_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.history_capacity = capacity;
        }
        if let Some(max_line) = env::var("TREESH_MAX_LINE")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.max_line_len = max_line;
        }
        if let Ok(level) = env::var("TREESH_LOG") {
            config.logger_level = level;
        }
        if let Ok(dir) = env::var("TREESH_LOG_DIR") {
            config.logger_dir = PathBuf::from(dir);
        }

        // Best effort; a missing directory only costs history persistence.
        if let Some(parent) = config.history_file.parent() {
            let _ = fs::create_dir_all(parent);
        }

        config
    }

    pub fn edit_mode(&self) -> EditMode {
        match self.editor_mode.to_lowercase().as_str() {
            "vi" => EditMode::Vi,
            _ => EditMode::Emacs,
        }
    }
}
