//! The interactive session: prompt loop, built-in dispatch, and the
//! per-line fork that isolates parsing and execution from the session.

use std::io::Write;
use std::process;

use anyhow::Result;
use log::{debug, error};
use nix::sys::wait::waitpid;
use nix::unistd::{fork, ForkResult};

use crate::shell::executor;
use crate::shell::history::History;
use crate::shell::jobs::Jobs;
use crate::shell::parser::{self, ast};
use crate::shell::readline::{Input, Reader};
use crate::utils::config::Config;
use crate::utils::theme::Theme;

pub struct Shell<'a> {
    config: &'a Config,
    theme: Theme,
    reader: Reader<'a>,
    history: History,
    jobs: Jobs,
}

impl<'a> Shell<'a> {
    pub fn new(config: &'a Config, interactive: bool) -> Result<Self> {
        Ok(Self {
            theme: Theme::new(&config.prompt),
            reader: Reader::new(config, interactive)?,
            history: History::new(config.history_capacity),
            jobs: Jobs::new(),
            config,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        debug!("session starting");
        self.reader.load_history();

        loop {
            for job in self.jobs.reap() {
                if self.reader.is_interactive() {
                    println!("{}", (self.theme.info_style)(format!("{job} done")));
                }
            }
            std::io::stdout().flush()?;

            let prompt = self.theme.prompt.clone();
            match self.reader.read_line(&prompt) {
                Input::Line(line) => self.handle_line(&line),
                Input::Interrupted => continue,
                Input::Eof => break,
            }
        }

        self.reader.save_history();
        debug!("session exiting");
        Ok(())
    }

    fn handle_line(&mut self, raw: &str) {
        let line = raw.trim();
        if line.is_empty() {
            return;
        }
        if line.len() > self.config.max_line_len {
            self.report(&format!(
                "line too long ({} bytes, limit {})",
                line.len(),
                self.config.max_line_len
            ));
            return;
        }

        // `!!` rewrites the line before anything else sees it.
        let line = if line == "!!" {
            match self.history.last() {
                Some(previous) => {
                    let previous = previous.to_string();
                    println!("{previous}");
                    previous
                }
                None => {
                    self.report("!!: no previous command");
                    return;
                }
            }
        } else {
            line.to_string()
        };

        if line == "exit" {
            self.reader.save_history();
            debug!("session exiting");
            process::exit(0);
        }

        if line == "history" {
            // Printed before the line itself is recorded, so the listing
            // never includes this invocation.
            for (i, entry) in self.history.iter().enumerate() {
                println!("{}: {}", i + 1, entry);
            }
            self.remember(&line);
            return;
        }

        if line == "wait" {
            if let Some(job) = self.jobs.wait_any() {
                if self.reader.is_interactive() {
                    println!("{}", (self.theme.info_style)(format!("{job} done")));
                }
            }
            self.remember(&line);
            return;
        }

        if line == "cd" || line.starts_with("cd ") {
            self.builtin_cd(line[2..].trim());
            self.remember(&line);
            return;
        }

        self.remember(&line);

        // Trailing `&` backgrounds the whole line; the remainder parses
        // normally.
        let (body, background) = match line.strip_suffix('&') {
            Some(rest) => (rest.trim().to_string(), true),
            None => (line.clone(), false),
        };
        if body.is_empty() {
            self.report("syntax error: missing command");
            return;
        }

        self.execute(&body, background, &line);
    }

    /// Spawn the top-level process for one line and supervise it.
    fn execute(&mut self, body: &str, background: bool, display: &str) {
        // Nothing buffered may cross the fork, or the child would flush
        // a copy of it on exit.
        let _ = std::io::stdout().flush();

        match unsafe { fork() } {
            Ok(ForkResult::Child) => Self::run_line(body),
            Ok(ForkResult::Parent { child }) => {
                if background {
                    let job = self.jobs.add(child, display.to_string());
                    debug!("started {job}");
                    if self.reader.is_interactive() {
                        println!("{}", (self.theme.info_style)(job.to_string()));
                    }
                } else if let Err(err) = waitpid(child, None) {
                    error!("waiting for line process: {err}");
                }
            }
            Err(err) => self.report(&format!("fork failed: {err}")),
        }
    }

    /// Parse, finalize, and run one line. Only ever called in the child
    /// process spawned for that line; never returns.
    fn run_line(body: &str) -> ! {
        let tree = match parser::parse(body) {
            Ok(tree) => tree,
            Err(err) => {
                eprintln!("treesh: {err}");
                process::exit(executor::EXIT_FAILURE);
            }
        };
        let tree = ast::finalize(tree, body);
        debug!("command tree: {tree:?}");
        executor::run(&tree)
    }

    fn builtin_cd(&self, path: &str) {
        let path = shellexpand::tilde(if path.is_empty() { "~" } else { path });
        if let Err(err) = std::env::set_current_dir(path.as_ref()) {
            self.report(&format!("cannot cd {path}: {err}"));
        }
    }

    /// Record an accepted line in both the built-in history and the line
    /// editor's recall buffer.
    fn remember(&mut self, line: &str) {
        self.history.push(line);
        self.reader.add_history(line);
    }

    fn report(&self, msg: &str) {
        eprintln!("{}", (self.theme.error_style)(format!("treesh: {msg}")));
    }
}
