//! SIGINT handling, in its own binary because the flag is process-global

use bashlite::{signals, Outcome, Shell};
use nix::sys::signal::{raise, Signal};

#[test]
fn test_sigint_sets_flag_and_shell_survives() {
    signals::setup_signal_handlers().unwrap();
    assert!(!signals::take_interrupt());

    raise(Signal::SIGINT).unwrap();
    assert!(signals::take_interrupt());
    // Taking the flag clears it
    assert!(!signals::take_interrupt());

    // Still alive and able to run pipelines afterwards
    let mut shell = Shell::default();
    let mut out = Vec::new();
    assert_eq!(shell.run_line("true | true", &mut out), Outcome::Continue(0));
}
