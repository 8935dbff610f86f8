//! Registry of backgrounded line processes.

use std::fmt;

use log::debug;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

/// One backgrounded command line.
#[derive(Debug, Clone)]
pub struct Job {
    pub pid: Pid,
    pub index: usize,
    pub command: String,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.index, self.pid, self.command)
    }
}

#[derive(Debug, Default)]
pub struct Jobs {
    jobs: Vec<Job>,
}

impl Jobs {
    pub fn new() -> Self {
        Self { jobs: Vec::new() }
    }

    fn find_available_index(&self) -> usize {
        let mut index = 1;
        while self.jobs.iter().any(|job| job.index == index) {
            index += 1;
        }
        index
    }

    pub fn add(&mut self, pid: Pid, command: String) -> &Job {
        let index = self.find_available_index();
        self.jobs.push(Job {
            pid,
            index,
            command,
        });
        // Just pushed, so last() is the new job.
        &self.jobs[self.jobs.len() - 1]
    }

    pub fn remove(&mut self, pid: Pid) -> Option<Job> {
        let pos = self.jobs.iter().position(|job| job.pid == pid)?;
        Some(self.jobs.remove(pos))
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Reap finished background jobs without blocking; returns the jobs
    /// that completed so the session can report them.
    pub fn reap(&mut self) -> Vec<Job> {
        let mut done = Vec::new();
        loop {
            match waitpid(None, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::Exited(pid, _)) | Ok(WaitStatus::Signaled(pid, _, _)) => {
                    if let Some(job) = self.remove(pid) {
                        done.push(job);
                    }
                }
                Ok(WaitStatus::StillAlive) => break,
                Ok(_) => break,
                // ECHILD: no children at all.
                Err(_) => break,
            }
        }
        done
    }

    /// Block until any one outstanding child terminates. Returns the
    /// finished job if it was a tracked background one.
    pub fn wait_any(&mut self) -> Option<Job> {
        match waitpid(None, None) {
            Ok(WaitStatus::Exited(pid, _)) | Ok(WaitStatus::Signaled(pid, _, _)) => {
                self.remove(pid)
            }
            Ok(status) => {
                debug!("wait: unexpected status {status:?}");
                None
            }
            Err(err) => {
                debug!("wait: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_start_at_one_and_reuse_gaps() {
        let mut jobs = Jobs::new();
        assert_eq!(jobs.add(Pid::from_raw(101), "a &".into()).index, 1);
        assert_eq!(jobs.add(Pid::from_raw(102), "b &".into()).index, 2);
        assert_eq!(jobs.add(Pid::from_raw(103), "c &".into()).index, 3);

        jobs.remove(Pid::from_raw(102));
        assert_eq!(jobs.add(Pid::from_raw(104), "d &".into()).index, 2);
    }

    #[test]
    fn remove_returns_the_tracked_job() {
        let mut jobs = Jobs::new();
        jobs.add(Pid::from_raw(7), "sleep 5 &".into());
        let job = jobs.remove(Pid::from_raw(7));
        assert_eq!(job.map(|j| j.command), Some("sleep 5 &".to_string()));
        assert!(jobs.is_empty());
        assert!(jobs.remove(Pid::from_raw(7)).is_none());
    }

    #[test]
    fn display_includes_index_pid_and_command() {
        let mut jobs = Jobs::new();
        let line = jobs.add(Pid::from_raw(42), "make &".into()).to_string();
        assert_eq!(line, "[1] 42 make &");
    }
}
