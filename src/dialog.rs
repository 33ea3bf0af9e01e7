//! ROM selection off the emulation thread.
//!
//! The picker runs on its own thread and hands back only a path over a channel. Loading the
//! cartridge from that path happens on the caller's thread.

use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Picked(PathBuf),
    Cancelled,
}

/// A file pick in progress.
#[derive(Debug)]
pub struct RomPicker {
    rx: Receiver<PickOutcome>,
}

impl RomPicker {
    /// Run `pick` on a worker thread. `None` from `pick` means the user cancelled.
    pub fn spawn_with<F>(pick: F) -> io::Result<Self>
    where
        F: FnOnce() -> Option<PathBuf> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("rom-picker".into())
            .spawn(move || {
                let outcome = match pick() {
                    Some(path) => PickOutcome::Picked(path),
                    None => PickOutcome::Cancelled,
                };
                debug!(outcome:? = outcome; "rom picker finished");
                // Receiver gone means the system was dropped; nothing to report to
                let _ = tx.send(outcome);
            })?;
        Ok(Self { rx })
    }

    /// Native "Open ROM" dialog filtered to .nes files.
    #[cfg(feature = "dialog")]
    pub fn spawn() -> io::Result<Self> {
        Self::spawn_with(|| {
            rfd::FileDialog::new()
                .set_title("Open ROM")
                .add_filter("iNES ROM", &["nes"])
                .pick_file()
        })
    }

    /// Non-blocking. `None` while the dialog is still open.
    pub fn try_recv(&self) -> Option<PickOutcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            // Worker died without answering
            Err(TryRecvError::Disconnected) => Some(PickOutcome::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait(picker: &RomPicker) -> PickOutcome {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(outcome) = picker.try_recv() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "picker never answered");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn picked_path_comes_back() {
        let picker = RomPicker::spawn_with(|| Some(PathBuf::from("game.nes"))).unwrap();
        assert_eq!(wait(&picker), PickOutcome::Picked(PathBuf::from("game.nes")));
    }

    #[test]
    fn cancel_is_reported() {
        let picker = RomPicker::spawn_with(|| None).unwrap();
        assert_eq!(wait(&picker), PickOutcome::Cancelled);
    }

    #[test]
    fn pending_while_dialog_open() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let picker = RomPicker::spawn_with(move || {
            let _ = release_rx.recv();
            Some(PathBuf::from("late.nes"))
        })
        .unwrap();
        assert_eq!(picker.try_recv(), None);
        release_tx.send(()).unwrap();
        assert_eq!(wait(&picker), PickOutcome::Picked(PathBuf::from("late.nes")));
    }
}
