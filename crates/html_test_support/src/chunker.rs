//! Deterministic and seeded chunk plans for streaming coverage.
//!
//! A plan splits a byte string into the chunks a streaming consumer would
//! receive. `Utf8Aligned` plans only split between characters; `ByteStream`
//! plans may split inside a multi-byte sequence.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryPolicy {
    Utf8Aligned,
    ByteStream,
}

impl fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryPolicy::Utf8Aligned => f.write_str("utf8"),
            BoundaryPolicy::ByteStream => f.write_str("bytes"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkPlan {
    Fixed { size: usize, policy: BoundaryPolicy },
    Boundaries { indices: Vec<usize>, policy: BoundaryPolicy },
}

impl fmt::Display for ChunkPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkPlan::Fixed { size, policy } => write!(f, "fixed size={size} policy={policy}"),
            ChunkPlan::Boundaries { indices, policy } => write!(
                f,
                "boundaries count={} policy={policy} indices={indices:?}",
                indices.len()
            ),
        }
    }
}

impl ChunkPlan {
    pub fn fixed(size: usize) -> Self {
        Self::Fixed {
            size,
            policy: BoundaryPolicy::Utf8Aligned,
        }
    }

    pub fn fixed_unaligned(size: usize) -> Self {
        Self::Fixed {
            size,
            policy: BoundaryPolicy::ByteStream,
        }
    }

    pub fn boundaries(indices: impl Into<Vec<usize>>) -> Self {
        Self::Boundaries {
            indices: indices.into(),
            policy: BoundaryPolicy::Utf8Aligned,
        }
    }

    pub fn policy(&self) -> BoundaryPolicy {
        match self {
            ChunkPlan::Fixed { policy, .. } | ChunkPlan::Boundaries { policy, .. } => *policy,
        }
    }

    /// Split `input` according to the plan; the chunks concatenate to `input`.
    pub fn split<'a>(&self, input: &'a [u8]) -> Vec<&'a [u8]> {
        let points = match self {
            ChunkPlan::Fixed { size, policy } => {
                assert!(*size > 0, "chunk size must be > 0");
                let raw: Vec<usize> = (1..).map(|n| n * size).take_while(|&p| p < input.len()).collect();
                filter_boundaries(input, &raw, *policy)
            }
            ChunkPlan::Boundaries { indices, policy } => filter_boundaries(input, indices, *policy),
        };
        let mut out = Vec::with_capacity(points.len() + 1);
        let mut last = 0usize;
        for point in points {
            out.push(&input[last..point]);
            last = point;
        }
        if last < input.len() || input.is_empty() {
            out.push(&input[last..]);
        }
        out
    }
}

/// Sort, dedup and clip split points to `(0, len)`; aligned plans also drop
/// points inside a UTF-8 sequence.
fn filter_boundaries(input: &[u8], indices: &[usize], policy: BoundaryPolicy) -> Vec<usize> {
    let mut out: Vec<usize> = indices
        .iter()
        .copied()
        .filter(|&idx| idx > 0 && idx < input.len())
        .filter(|&idx| policy == BoundaryPolicy::ByteStream || !is_continuation(input[idx]))
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

fn is_continuation(byte: u8) -> bool {
    byte & 0b1100_0000 == 0b1000_0000
}

#[derive(Clone, Debug)]
pub struct ChunkPlanCase {
    pub label: String,
    pub plan: ChunkPlan,
}

/// Fixed sizes, splits around markup and style delimiters, and `fuzz_runs`
/// seeded random plans.
pub fn build_chunk_plans(
    input: &[u8],
    fuzz_runs: usize,
    fuzz_seed: u64,
    policy: BoundaryPolicy,
) -> Vec<ChunkPlanCase> {
    let mut plans = Vec::new();
    for size in [1usize, 2, 3, 7, 16, 64] {
        plans.push(ChunkPlanCase {
            label: format!("fixed size={size}"),
            plan: ChunkPlan::Fixed { size, policy },
        });
    }
    let delimiters = delimiter_boundaries(input);
    if !delimiters.is_empty() {
        plans.push(ChunkPlanCase {
            label: format!("delimiters count={}", delimiters.len()),
            plan: ChunkPlan::Boundaries {
                indices: delimiters.clone(),
                policy,
            },
        });
    }
    let candidates: Vec<usize> = (1..input.len()).collect();
    for run in 0..fuzz_runs {
        let seed = fuzz_seed.wrapping_add(run as u64);
        let mut rng = Lcg::new(seed);
        let mut picks = candidates.clone();
        rng.shuffle(&mut picks);
        let count = 1 + rng.gen_range(picks.len().clamp(1, 32));
        picks.truncate(count);
        plans.push(ChunkPlanCase {
            label: format!("fuzz seed=0x{seed:016x}"),
            plan: ChunkPlan::Boundaries {
                indices: picks,
                policy,
            },
        });
    }
    plans
}

fn delimiter_boundaries(input: &[u8]) -> Vec<usize> {
    let mut out = Vec::new();
    for (idx, byte) in input.iter().enumerate() {
        if matches!(byte, b'<' | b'>' | b'"' | b'\'' | b'&' | b';' | b'{' | b'}' | b'/') {
            out.push(idx);
            out.push(idx + 1);
        }
    }
    out
}

struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state
    }

    fn gen_range(&mut self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        (self.next_u64() >> 32) as usize % upper
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.gen_range(i + 1);
            items.swap(i, j);
        }
    }
}
