use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Number of bone influences stored per vertex.
pub const INFLUENCES_PER_VERTEX: usize = 4;

/// Per-vertex skinning record: four `(bone index, weight)` pairs.
///
/// Weights are passed through as supplied; they are not required to sum to 1.
/// A pair whose weight is `<= 0` does not count as a use of its bone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneWeight {
    pub joints: [u32; INFLUENCES_PER_VERTEX],
    pub weights: [f32; INFLUENCES_PER_VERTEX],
}

impl BoneWeight {
    pub fn new(joints: [u32; INFLUENCES_PER_VERTEX], weights: [f32; INFLUENCES_PER_VERTEX]) -> Self {
        Self { joints, weights }
    }

    /// Vertex fully bound to a single bone.
    pub fn single(joint: u32) -> Self {
        Self {
            joints: [joint, 0, 0, 0],
            weights: [1.0, 0.0, 0.0, 0.0],
        }
    }

    /// Iterates the `(joint, weight)` pairs whose weight is positive.
    pub fn influences(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.joints
            .iter()
            .copied()
            .zip(self.weights.iter().copied())
            .filter(|&(_, weight)| weight > 0.0)
    }
}

/// Insertion-ordered mapping from original bone index to compacted bone index.
///
/// Compacted indices are dense (`0..len()`) and assigned in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedBoneMap {
    originals: Vec<u32>,
    lookup: HashMap<u32, u32>,
}

impl UsedBoneMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `original` if it is not mapped yet and returns its compacted index.
    pub fn insert(&mut self, original: u32) -> u32 {
        if let Some(&compacted) = self.lookup.get(&original) {
            return compacted;
        }
        let compacted = self.originals.len() as u32;
        self.originals.push(original);
        self.lookup.insert(original, compacted);
        compacted
    }

    pub fn get(&self, original: u32) -> Option<u32> {
        self.lookup.get(&original).copied()
    }

    pub fn contains(&self, original: u32) -> bool {
        self.lookup.contains_key(&original)
    }

    pub fn len(&self) -> usize {
        self.originals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    /// Original bone indices ordered by compacted index.
    pub fn originals(&self) -> &[u32] {
        &self.originals
    }

    /// Iterates `(original, compacted)` pairs in compacted order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.originals
            .iter()
            .enumerate()
            .map(|(compacted, &original)| (original, compacted as u32))
    }
}

impl FromIterator<u32> for UsedBoneMap {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut map = UsedBoneMap::new();
        for original in iter {
            map.insert(original);
        }
        map
    }
}
