//! Fair round-robin ordering of machine heads.
//!
//! Each call to [`HeadSequencer::iter`] starts one head further along than
//! the previous call, so across planning rounds no head is always asked
//! first for work.

use std::sync::Arc;

use super::traits::{Head, Machine};

pub struct HeadSequencer {
    heads: Vec<Arc<dyn Head>>,
    position: usize,
}

impl HeadSequencer {
    pub fn new(heads: Vec<Arc<dyn Head>>) -> Self {
        Self { heads, position: 0 }
    }

    pub fn from_machine(machine: &dyn Machine) -> Self {
        Self::new(machine.heads())
    }

    pub fn head_count(&self) -> usize {
        self.heads.len()
    }

    /// Endless cycle over the heads starting at the current offset.
    ///
    /// The offset advances by one per call, however much of the returned
    /// iterator is consumed. Truncate with `.take(head_count())` to visit
    /// each head once.
    pub fn iter(&mut self) -> HeadCycle<'_> {
        let start = self.position;
        if !self.heads.is_empty() {
            self.position = (self.position + 1) % self.heads.len();
        }
        HeadCycle {
            heads: &self.heads,
            position: start,
        }
    }
}

/// Iterator returned by [`HeadSequencer::iter`]. Never ends unless the
/// machine has no heads.
pub struct HeadCycle<'a> {
    heads: &'a [Arc<dyn Head>],
    position: usize,
}

impl<'a> Iterator for HeadCycle<'a> {
    type Item = &'a Arc<dyn Head>;

    fn next(&mut self) -> Option<Self::Item> {
        let head = self.heads.get(self.position)?;
        self.position = (self.position + 1) % self.heads.len();
        Some(head)
    }
}
