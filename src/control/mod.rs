//! Process control actions (terminate, kill, suspend, resume, renice).

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::UnixController as SystemController;
#[cfg(windows)]
pub use windows::WindowsController as SystemController;

use crate::error::ActionError;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

/// How long Terminate/Kill wait for the process to go away.
pub const EXIT_TIMEOUT: Duration = Duration::from_secs(3);
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Term,
    Kill,
    Stop,
    Cont,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Normal,
    High,
    Realtime,
}

/// A priority in the form the OS takes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityValue {
    /// Unix niceness, -20 (highest) ..= 19 (lowest)
    Niceness(i32),
    /// Windows priority class constant
    Class(u32),
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Normal,
        Priority::High,
        Priority::Realtime,
    ];

    /// Unknown labels map to `Normal`.
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(label.trim()))
            .unwrap_or(Priority::Normal)
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Normal => "Normal",
            Priority::High => "High",
            Priority::Realtime => "Realtime",
        }
    }

    pub fn niceness(self) -> i32 {
        match self {
            Priority::Low => 19,
            Priority::Normal => 0,
            Priority::High => -5,
            Priority::Realtime => -20,
        }
    }

    /// IDLE / NORMAL / HIGH / REALTIME_PRIORITY_CLASS
    pub fn priority_class(self) -> u32 {
        match self {
            Priority::Low => 0x40,
            Priority::Normal => 0x20,
            Priority::High => 0x80,
            Priority::Realtime => 0x100,
        }
    }

    pub fn platform_value(self) -> PriorityValue {
        if cfg!(windows) {
            PriorityValue::Class(self.priority_class())
        } else {
            PriorityValue::Niceness(self.niceness())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessAction {
    Terminate,
    Kill,
    Suspend,
    Resume,
    SetPriority(Priority),
}

impl fmt::Display for ProcessAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessAction::Terminate => f.write_str("Terminate"),
            ProcessAction::Kill => f.write_str("Kill"),
            ProcessAction::Suspend => f.write_str("Suspend"),
            ProcessAction::Resume => f.write_str("Resume"),
            ProcessAction::SetPriority(p) => write!(f, "Set priority {}", p.label()),
        }
    }
}

/// OS primitives the executor is built on.
pub trait ProcessController: Send {
    fn send_signal(&mut self, pid: u32, signal: Signal) -> Result<(), ActionError>;

    fn set_priority(&mut self, pid: u32, value: PriorityValue) -> Result<(), ActionError>;

    /// True once `pid` no longer runs. Zombies count as exited.
    fn has_exited(&mut self, pid: u32) -> bool;
}

/// Applies [`ProcessAction`]s to single pids.
///
/// Terminate and Kill wait a bounded time for the process to exit and report
/// [`ActionError::Timeout`] otherwise; a timed-out Terminate is never
/// escalated to Kill.
pub struct ActionExecutor<C> {
    controller: C,
    exit_timeout: Duration,
    poll_interval: Duration,
}

impl<C: ProcessController> ActionExecutor<C> {
    pub fn new(controller: C) -> Self {
        Self::with_timeouts(controller, EXIT_TIMEOUT, EXIT_POLL_INTERVAL)
    }

    pub fn with_timeouts(controller: C, exit_timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            controller,
            exit_timeout,
            poll_interval,
        }
    }

    pub fn apply(&mut self, action: ProcessAction, pid: u32) -> Result<(), ActionError> {
        // pid 0 addresses the caller's process group on unix
        if pid == 0 {
            return Err(ActionError::ProcessNotFound(pid));
        }
        info!("{action} pid {pid}");

        match action {
            ProcessAction::Terminate => {
                self.controller.send_signal(pid, Signal::Term)?;
                self.wait_for_exit(pid)
            }
            ProcessAction::Kill => {
                self.controller.send_signal(pid, Signal::Kill)?;
                self.wait_for_exit(pid)
            }
            ProcessAction::Suspend => self.controller.send_signal(pid, Signal::Stop),
            ProcessAction::Resume => self.controller.send_signal(pid, Signal::Cont),
            ProcessAction::SetPriority(priority) => self
                .controller
                .set_priority(pid, priority.platform_value()),
        }
    }

    fn wait_for_exit(&mut self, pid: u32) -> Result<(), ActionError> {
        let started = Instant::now();
        loop {
            if self.controller.has_exited(pid) {
                return Ok(());
            }
            if started.elapsed() >= self.exit_timeout {
                return Err(ActionError::Timeout {
                    pid,
                    waited: self.exit_timeout,
                });
            }
            thread::sleep(self.poll_interval);
        }
    }
}

/// User-facing text for an action result.
pub fn outcome_message(action: ProcessAction, pid: u32, result: &Result<(), ActionError>) -> String {
    match result {
        Ok(()) => match action {
            ProcessAction::Terminate => format!("Process {pid} terminated."),
            ProcessAction::Kill => format!("Process {pid} killed."),
            ProcessAction::Suspend => format!("Process {pid} suspended."),
            ProcessAction::Resume => format!("Process {pid} resumed."),
            ProcessAction::SetPriority(p) => format!("Set priority {} for PID {pid}", p.label()),
        },
        Err(e) => format!("{action}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_priority_label_falls_back_to_normal() {
        assert_eq!(Priority::from_label("Bogus"), Priority::Normal);
        assert_eq!(Priority::from_label(""), Priority::Normal);
        assert_eq!(Priority::from_label("high"), Priority::High);
        assert_eq!(Priority::from_label("Bogus").niceness(), 0);
    }

    #[test]
    fn priority_mapping_is_total() {
        let nice: Vec<_> = Priority::ALL.iter().map(|p| p.niceness()).collect();
        assert_eq!(nice, vec![19, 0, -5, -20]);
        let classes: Vec<_> = Priority::ALL.iter().map(|p| p.priority_class()).collect();
        assert_eq!(classes, vec![64, 32, 128, 256]);
    }

    #[cfg(unix)]
    #[test]
    fn unix_uses_niceness() {
        assert_eq!(
            Priority::Realtime.platform_value(),
            PriorityValue::Niceness(-20)
        );
    }

    #[test]
    fn messages_name_the_action() {
        let ok = outcome_message(ProcessAction::Kill, 12, &Ok(()));
        assert_eq!(ok, "Process 12 killed.");
        let err = outcome_message(
            ProcessAction::Suspend,
            12,
            &Err(ActionError::PermissionDenied(12)),
        );
        assert_eq!(err, "Suspend: permission denied for process 12");
    }
}
