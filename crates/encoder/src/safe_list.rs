//! The reconfigurable safe list behind markup encoding.
//!
//! Encoders take an `Arc` snapshot under a short read lock and never hold the
//! lock while encoding. `mark_as_safe` builds a new list and swaps it in
//! under the write lock, so every encode call sees either the old list or
//! the new one in full.

use crate::charts::{
    CodeCharts, LowerCodeCharts, LowerMidCodeCharts, MidCodeCharts, UpperCodeCharts,
    UpperMidCodeCharts,
};
use log::{debug, trace};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

const WORDS: usize = 0x10000 / 64;

/// Characters escaped in markup regardless of the configured charts.
const NEVER_SAFE: &[char] = &['<', '>', '&', '"', '\'', '`'];

/// A 65536-bit set of code points that pass through markup encoding.
#[derive(Clone, PartialEq, Eq)]
pub struct SafeList {
    charts: CodeCharts,
    bits: Box<[u64]>,
}

impl SafeList {
    /// Basic Latin is always included; the charts add to it.
    pub fn build(charts: CodeCharts) -> Self {
        let mut list = Self {
            charts,
            bits: vec![0u64; WORDS].into_boxed_slice(),
        };
        let base = CodeCharts {
            lower: charts.lower | LowerCodeCharts::BASIC_LATIN,
            ..charts
        };
        for range in base.ranges() {
            for cp in range {
                list.set(cp);
            }
        }
        for &ch in NEVER_SAFE {
            list.clear(ch as u32);
        }
        // Noncharacters in the Arabic presentation block.
        for cp in 0xFDD0..=0xFDEF {
            list.clear(cp);
        }
        trace!(
            target: "encoder.tables",
            "built safe list with {} code points",
            list.len()
        );
        list
    }

    pub fn charts(&self) -> CodeCharts {
        self.charts
    }

    #[inline]
    pub fn is_safe(&self, ch: char) -> bool {
        let cp = ch as u32;
        if cp > 0xFFFF {
            return false;
        }
        self.bits[(cp / 64) as usize] & (1u64 << (cp % 64)) != 0
    }

    /// Number of safe code points.
    pub fn len(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn set(&mut self, cp: u32) {
        self.bits[(cp / 64) as usize] |= 1u64 << (cp % 64);
    }

    fn clear(&mut self, cp: u32) {
        self.bits[(cp / 64) as usize] &= !(1u64 << (cp % 64));
    }
}

impl std::fmt::Debug for SafeList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafeList")
            .field("charts", &self.charts)
            .field("len", &self.len())
            .finish()
    }
}

static CURRENT: LazyLock<RwLock<Arc<SafeList>>> =
    LazyLock::new(|| RwLock::new(Arc::new(SafeList::build(CodeCharts::default()))));

/// The safe list in effect right now.
pub fn snapshot() -> Arc<SafeList> {
    let guard = CURRENT.read().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(&guard)
}

/// Replace the markup safe list with the given code charts.
///
/// Calling it again with the same charts leaves the current list in place.
pub fn mark_as_safe(
    lower: LowerCodeCharts,
    lower_mid: LowerMidCodeCharts,
    mid: MidCodeCharts,
    upper_mid: UpperMidCodeCharts,
    upper: UpperCodeCharts,
) {
    install(CodeCharts {
        lower,
        lower_mid,
        mid,
        upper_mid,
        upper,
    });
}

/// `mark_as_safe` taking the five groups as one value.
pub fn install(charts: CodeCharts) {
    if snapshot().charts() == charts {
        trace!(target: "encoder.tables", "safe list unchanged");
        return;
    }
    let list = Arc::new(SafeList::build(charts));
    let mut guard = CURRENT.write().unwrap_or_else(PoisonError::into_inner);
    debug!(
        target: "encoder.tables",
        "installing safe list: {} code points (was {})",
        list.len(),
        guard.len()
    );
    *guard = list;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_list_covers_latin_only() {
        let list = SafeList::build(CodeCharts::default());
        assert!(list.is_safe('a'));
        assert!(list.is_safe(' '));
        assert!(list.is_safe('é'));
        assert!(!list.is_safe('<'));
        assert!(!list.is_safe('`'));
        assert!(!list.is_safe('\n'));
        assert!(!list.is_safe('\u{AD}'));
        assert!(!list.is_safe('ж'));
        assert!(!list.is_safe('\u{1F600}'));
    }

    #[test]
    fn basic_latin_cannot_be_removed() {
        let charts = CodeCharts {
            lower: LowerCodeCharts::CYRILLIC,
            ..CodeCharts::default()
        };
        let list = SafeList::build(charts);
        assert!(list.is_safe('z'));
        assert!(list.is_safe('ж'));
        assert!(!list.is_safe('é'));
        assert_eq!(list.charts(), charts);
    }

    #[test]
    fn noncharacters_stay_unsafe() {
        let list = SafeList::build(CodeCharts::ALL);
        assert!(!list.is_safe('\u{FDD0}'));
        assert!(!list.is_safe('\u{FFFE}'));
        assert!(list.is_safe('\u{FFFD}'));
        assert!(list.is_safe('中'));
    }
}
