//! Scanner instrumentation.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub steps: u64,
    pub tokens_emitted: u64,
    pub pieces_cut: u64,
    pub need_more_input: u64,
    pub capacity_cuts: u64,
}
