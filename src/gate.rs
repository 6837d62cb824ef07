//! Decides whether writes reach any sink at all.
//!
//! The gate is a reference count: every `enable()` opens one scope and the
//! gate is open while the count is above zero. Nested scopes can silence
//! output independently, a scope re-enabling itself never re-opens an outer
//! scope that is still disabled.

use crate::error::{ReporterError, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct DispatchGate {
    count: Arc<AtomicUsize>,
    redirect_to_error: Arc<AtomicBool>,
}

impl DispatchGate {
    pub fn new(enabled: bool, redirect_to_error: bool) -> Self {
        Self {
            count: Arc::new(AtomicUsize::new(usize::from(enabled))),
            redirect_to_error: Arc::new(AtomicBool::new(redirect_to_error)),
        }
    }

    pub fn enable(&self) -> EnableScope {
        self.count.fetch_add(1, Ordering::SeqCst);
        EnableScope {
            count: self.count.clone(),
            disabled: AtomicBool::new(false),
        }
    }

    pub fn is_open(&self) -> bool {
        self.count.load(Ordering::SeqCst) > 0
    }

    pub fn set_redirect_to_error(&self, redirect: bool) {
        self.redirect_to_error.store(redirect, Ordering::SeqCst);
    }

    pub fn redirects_to_error(&self) -> bool {
        self.redirect_to_error.load(Ordering::SeqCst)
    }
}

/// One level of `enable()`. Disabled explicitly with `disable()` or when
/// dropped.
#[derive(Debug)]
#[must_use = "dropping the scope disables output again"]
pub struct EnableScope {
    count: Arc<AtomicUsize>,
    disabled: AtomicBool,
}

impl EnableScope {
    pub fn disable(&self) -> Result<()> {
        if self.disabled.swap(true, Ordering::SeqCst) {
            return Err(ReporterError::AlreadyDisabled);
        }
        self.count.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for EnableScope {
    fn drop(&mut self) {
        if !self.disabled.swap(true, Ordering::SeqCst) {
            self.count.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
