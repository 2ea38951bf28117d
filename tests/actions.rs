mod common;

use common::FakeController;
use procwatch::control::{ActionExecutor, Priority, PriorityValue, ProcessAction, Signal};
use procwatch::error::ActionError;
use std::time::Duration;

fn executor(controller: FakeController) -> ActionExecutor<FakeController> {
    ActionExecutor::with_timeouts(controller, Duration::from_millis(100), Duration::from_millis(5))
}

#[test]
fn terminate_and_kill_of_missing_pid_report_not_found() {
    let mut executor = executor(FakeController::default());
    assert_eq!(
        executor.apply(ProcessAction::Terminate, 4242),
        Err(ActionError::ProcessNotFound(4242))
    );
    assert_eq!(
        executor.apply(ProcessAction::Kill, 4242),
        Err(ActionError::ProcessNotFound(4242))
    );
}

#[test]
fn pid_zero_is_never_signalled() {
    let controller = FakeController::with_alive(&[0], true);
    let signals = controller.signals.clone();
    let mut executor = executor(controller);
    assert_eq!(
        executor.apply(ProcessAction::Kill, 0),
        Err(ActionError::ProcessNotFound(0))
    );
    assert!(signals.lock().unwrap().is_empty());
}

#[test]
fn terminate_waits_for_exit() {
    let controller = FakeController::with_alive(&[7], true);
    let signals = controller.signals.clone();
    let mut executor = executor(controller);
    assert_eq!(executor.apply(ProcessAction::Terminate, 7), Ok(()));
    assert_eq!(*signals.lock().unwrap(), vec![(7, Signal::Term)]);
}

#[test]
fn stubborn_process_times_out_without_escalation() {
    let controller = FakeController::with_alive(&[7], false);
    let signals = controller.signals.clone();
    let mut executor = executor(controller);
    assert_eq!(
        executor.apply(ProcessAction::Terminate, 7),
        Err(ActionError::Timeout {
            pid: 7,
            waited: Duration::from_millis(100)
        })
    );
    assert_eq!(*signals.lock().unwrap(), vec![(7, Signal::Term)]);
}

#[test]
fn suspend_and_resume_map_to_stop_and_cont() {
    let controller = FakeController::with_alive(&[9], true);
    let signals = controller.signals.clone();
    let mut executor = executor(controller);
    assert_eq!(executor.apply(ProcessAction::Suspend, 9), Ok(()));
    assert_eq!(executor.apply(ProcessAction::Resume, 9), Ok(()));
    assert_eq!(
        *signals.lock().unwrap(),
        vec![(9, Signal::Stop), (9, Signal::Cont)]
    );
}

#[cfg(unix)]
#[test]
fn unknown_priority_label_sets_normal_niceness() {
    let controller = FakeController::with_alive(&[5], true);
    let priorities = controller.priorities.clone();
    let mut executor = executor(controller);
    let priority = Priority::from_label("Bogus");
    assert_eq!(executor.apply(ProcessAction::SetPriority(priority), 5), Ok(()));
    assert_eq!(
        *priorities.lock().unwrap(),
        vec![(5, PriorityValue::Niceness(0))]
    );
}

#[cfg(target_os = "linux")]
mod live {
    use procwatch::control::{ActionExecutor, Priority, ProcessAction, SystemController};
    use procwatch::error::ActionError;
    use std::process::{Child, Command};
    use std::thread;
    use std::time::Duration;

    fn spawn_sleep() -> Child {
        Command::new("sleep").arg("30").spawn().unwrap()
    }

    fn state(pid: u32) -> char {
        procfs::process::Process::new(pid as i32)
            .unwrap()
            .stat()
            .unwrap()
            .state
    }

    #[test]
    fn terminate_stops_a_child() {
        let mut child = spawn_sleep();
        let pid = child.id();
        let mut executor = ActionExecutor::new(SystemController::new());
        assert_eq!(executor.apply(ProcessAction::Terminate, pid), Ok(()));
        let _ = child.wait();
    }

    #[test]
    fn suspend_then_resume() {
        let mut child = spawn_sleep();
        let pid = child.id();
        let mut executor = ActionExecutor::new(SystemController::new());

        assert_eq!(executor.apply(ProcessAction::Suspend, pid), Ok(()));
        thread::sleep(Duration::from_millis(100));
        assert_eq!(state(pid), 'T');

        assert_eq!(executor.apply(ProcessAction::Resume, pid), Ok(()));
        thread::sleep(Duration::from_millis(100));
        assert_eq!(state(pid), 'S');

        let _ = child.kill();
        let _ = child.wait();
    }

    #[test]
    fn lowering_priority_needs_no_privileges() {
        let mut child = spawn_sleep();
        let pid = child.id();
        let mut executor = ActionExecutor::new(SystemController::new());
        assert_eq!(
            executor.apply(ProcessAction::SetPriority(Priority::Low), pid),
            Ok(())
        );
        let nice = procfs::process::Process::new(pid as i32)
            .unwrap()
            .stat()
            .unwrap()
            .nice;
        assert_eq!(nice, 19);
        let _ = child.kill();
        let _ = child.wait();
    }

    #[test]
    fn missing_process_is_not_found() {
        let mut child = spawn_sleep();
        let pid = child.id();
        child.kill().unwrap();
        child.wait().unwrap();
        let mut executor = ActionExecutor::new(SystemController::new());
        assert_eq!(
            executor.apply(ProcessAction::Kill, pid),
            Err(ActionError::ProcessNotFound(pid))
        );
    }
}

#[cfg(windows)]
mod live_windows {
    use procwatch::control::{ActionExecutor, Priority, ProcessAction, SystemController};
    use std::process::{Child, Command, Stdio};

    fn spawn_ping() -> Child {
        Command::new("ping")
            .args(["-n", "30", "127.0.0.1"])
            .stdout(Stdio::null())
            .spawn()
            .unwrap()
    }

    #[test]
    fn terminate_stops_a_child() {
        let mut child = spawn_ping();
        let pid = child.id();
        let mut executor = ActionExecutor::new(SystemController::new());
        assert_eq!(executor.apply(ProcessAction::Terminate, pid), Ok(()));
        assert_eq!(child.wait().unwrap().code(), Some(1));
    }

    #[test]
    fn suspend_resume_and_priority_succeed() {
        let mut child = spawn_ping();
        let pid = child.id();
        let mut executor = ActionExecutor::new(SystemController::new());
        assert_eq!(executor.apply(ProcessAction::Suspend, pid), Ok(()));
        assert_eq!(executor.apply(ProcessAction::Resume, pid), Ok(()));
        assert_eq!(
            executor.apply(ProcessAction::SetPriority(Priority::Low), pid),
            Ok(())
        );
        assert_eq!(executor.apply(ProcessAction::Kill, pid), Ok(()));
        let _ = child.wait();
    }
}
