//! Compaction of the equivalence forest into final component ids

use crate::disjoint_set::DisjointSet;

/// Mapping from provisional tag to final component id
///
/// Component ids are consecutive, `1..=num_components`, numbered in order of
/// each class's smallest tag. Tag 0 maps to 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMap {
    class_num: Vec<u32>,
    num_components: u32,
}

impl ClassMap {
    /// Number every class of a frozen table in one sequential pass.
    ///
    /// A non-root tag's root is smaller than the tag, so its number is
    /// already known when the tag is visited.
    pub fn from_table(table: &DisjointSet) -> Self {
        let num_tags = table.num_tags();
        let mut class_num = vec![0u32; num_tags as usize + 1];
        let mut num_components = 0;
        for tag in 1..=num_tags {
            let root = table.find_root(tag);
            class_num[tag as usize] = if root == tag {
                num_components += 1;
                num_components
            } else {
                class_num[root as usize]
            };
        }
        Self {
            class_num,
            num_components,
        }
    }

    /// Final id of `tag`, 0 for background or unknown tags.
    #[inline]
    pub fn class_of(&self, tag: u32) -> u32 {
        self.class_num.get(tag as usize).copied().unwrap_or(0)
    }

    /// Number of final components.
    pub fn num_components(&self) -> u32 {
        self.num_components
    }
}
