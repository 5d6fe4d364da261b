//! Signal handling for the shell
//!
//! SIGINT never terminates the shell. The handler only raises a flag; the
//! loop checks it once the current line has finished. Interrupts are not
//! forwarded to children: they share the shell's process group, so a
//! terminal-generated SIGINT reaches them directly, and the shell keeps
//! waiting until every child it started has exited.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

/// Set by the SIGINT handler, cleared by [`take_interrupt`].
pub static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Install the SIGINT handler.
///
/// A real handler rather than SIG_IGN, so programs started afterwards get
/// the default disposition back when they exec.
pub fn setup_signal_handlers() -> io::Result<()> {
    use signal_hook::low_level;

    unsafe {
        low_level::register(signal_hook::consts::SIGINT, || {
            INTERRUPTED.store(true, Ordering::SeqCst);
        })?;
    }
    Ok(())
}

/// Check whether SIGINT arrived since the last call, and clear the flag
pub fn take_interrupt() -> bool {
    INTERRUPTED.swap(false, Ordering::SeqCst)
}
