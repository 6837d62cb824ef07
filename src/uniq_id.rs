use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

lazy_static::lazy_static! {
    static ref INCREMENTAL_UNIQ_ID: AtomicU64 = AtomicU64::new(0);
    pub(crate) static ref PROCESS_IDENTITY: String = std::process::id().to_string();
}

/// Handle for sinks and active elements. Unique across every reporter in the
/// process, so a handle from one reporter is never mistaken for another's.
#[derive(Clone, Copy, Hash, PartialOrd, PartialEq, Ord, Eq, Debug)]
pub struct UniqID(u64);

impl UniqID {
    pub fn new() -> Self {
        UniqID(INCREMENTAL_UNIQ_ID.fetch_add(1, Ordering::SeqCst))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UniqID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Progress session ids: `{process identity}:{counter}`. The identity keeps
/// ids apart when several processes share one renderer.
#[derive(Debug)]
pub struct SessionIds {
    identity: String,
    counter: AtomicU64,
}

impl SessionIds {
    pub fn new<S: Into<String>>(identity: S) -> Self {
        Self {
            identity: identity.into(),
            counter: AtomicU64::new(0),
        }
    }

    pub fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}:{}", self.identity, n)
    }
}
