//! Progress bars.
//!
//! A [`ProgressHandle`] is either a local [`ProgressBar`] drawn by this
//! reporter, or a [`RemoteProgress`] proxy whose every call becomes a
//! protocol message for the renderer. Both expose the same operations, so
//! callers never need to know which one they hold.

pub mod bar;
pub mod remote;

pub use bar::{ProgressBar, ProgressState};
pub use remote::RemoteProgress;

use crate::ledger::ActiveElement;
use std::sync::Arc;
use std::time::Duration;

/// The mutation surface of a progress widget. `render`/`end` come from
/// [`ActiveElement`].
pub trait Progress: ActiveElement {
    fn set_current(&self, value: u64);
    fn set_total(&self, value: u64, approximate: bool);
    fn set_title(&self, text: &str);
    fn set_text(&self, text: &str);
    fn set_approximate_eta(&self, eta: Duration);
    fn push_text(&self, text: &str);
    /// Removes the most recently pushed entry equal to `text`.
    fn pop_text(&self, text: &str);
    fn tick(&self);
    fn pause(&self);
    fn resume(&self);
}

/// Dropping a handle does not end its bar: the reporter keeps it active
/// until `end()` or `Reporter::teardown_all`.
#[derive(Clone)]
pub enum ProgressHandle {
    Local(Arc<ProgressBar>),
    Remote(Arc<RemoteProgress>),
}

macro_rules! dispatch {
    ($self:ident, $inner:ident => $call:expr) => {
        match $self {
            ProgressHandle::Local($inner) => $call,
            ProgressHandle::Remote($inner) => $call,
        }
    };
}

impl ProgressHandle {
    pub fn is_remote(&self) -> bool {
        matches!(self, ProgressHandle::Remote(_))
    }

    /// Session id of a remote handle.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            ProgressHandle::Local(_) => None,
            ProgressHandle::Remote(remote) => Some(remote.id()),
        }
    }

    /// True once the bar ended, or the remote session was closed.
    pub fn is_finished(&self) -> bool {
        match self {
            ProgressHandle::Local(bar) => bar.is_ended(),
            ProgressHandle::Remote(remote) => remote.is_closed(),
        }
    }
}

impl ActiveElement for ProgressHandle {
    fn render(&self) {
        dispatch!(self, p => p.render())
    }

    fn end(&self) {
        dispatch!(self, p => p.end())
    }
}

impl Progress for ProgressHandle {
    fn set_current(&self, value: u64) {
        dispatch!(self, p => p.set_current(value))
    }

    fn set_total(&self, value: u64, approximate: bool) {
        dispatch!(self, p => p.set_total(value, approximate))
    }

    fn set_title(&self, text: &str) {
        dispatch!(self, p => p.set_title(text))
    }

    fn set_text(&self, text: &str) {
        dispatch!(self, p => p.set_text(text))
    }

    fn set_approximate_eta(&self, eta: Duration) {
        dispatch!(self, p => p.set_approximate_eta(eta))
    }

    fn push_text(&self, text: &str) {
        dispatch!(self, p => p.push_text(text))
    }

    fn pop_text(&self, text: &str) {
        dispatch!(self, p => p.pop_text(text))
    }

    fn tick(&self) {
        dispatch!(self, p => p.tick())
    }

    fn pause(&self) {
        dispatch!(self, p => p.pause())
    }

    fn resume(&self) {
        dispatch!(self, p => p.resume())
    }
}
