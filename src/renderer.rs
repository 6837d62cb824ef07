use crate::progress::ProgressBar;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

const RECENTLY_ENDED_CAPACITY: usize = 256;

/// Renderer-side records: session id -> the local bar drawing it.
///
/// The most recent ended ids are remembered so that a message racing with
/// the end of its session can be told apart from one for a session that
/// never existed.
#[derive(Default)]
pub struct RendererSessions {
    bars: HashMap<String, Arc<ProgressBar>>,
    recently_ended: VecDeque<String>,
    recently_ended_set: HashSet<String>,
}

impl RendererSessions {
    pub fn insert(&mut self, id: String, bar: Arc<ProgressBar>) {
        self.bars.insert(id, bar);
    }

    pub fn get(&self, id: &str) -> Option<Arc<ProgressBar>> {
        self.bars.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.bars.contains_key(id)
    }

    /// Forgets a live session. Returns false if it wasn't live.
    pub fn finish(&mut self, id: &str) -> bool {
        if self.bars.remove(id).is_none() {
            return false;
        }
        if self.recently_ended_set.insert(id.to_string()) {
            self.recently_ended.push_back(id.to_string());
        }
        while self.recently_ended.len() > RECENTLY_ENDED_CAPACITY {
            if let Some(oldest) = self.recently_ended.pop_front() {
                self.recently_ended_set.remove(&oldest);
            }
        }
        true
    }

    pub fn recently_ended(&self, id: &str) -> bool {
        self.recently_ended_set.contains(id)
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}
