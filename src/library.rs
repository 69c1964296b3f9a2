use std::sync::OnceLock;

use crate::state::State;
use crate::transforms;

pub type TransformId = u32;
pub type TransformFn = dyn Fn(&State) -> Option<State> + Send + Sync;

/// One registered transform: its contractual name, the callable itself,
/// its depth cost, and whether it's offered during DAG expansion
/// (`listed`) or only reachable by direct lookup (the unlisted
/// `identity`).
pub struct Transform {
    name: &'static str,
    func: Box<TransformFn>,
    cost: u8,
    listed: bool,
}

impl Transform {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn cost(&self) -> u8 {
        self.cost
    }

    pub fn listed(&self) -> bool {
        self.listed
    }

    pub fn apply(&self, state: &State) -> Option<State> {
        (self.func)(state)
    }
}

/// The process-wide, initialise-once, thereafter read-only transform
/// registry. Populated exactly once via [`Library::global`]; safe to read
/// concurrently from many solves since it never mutates after that first
/// call.
pub struct Library {
    transforms: Vec<Transform>,
}

impl Library {
    fn register(
        &mut self,
        name: &'static str,
        cost: u8,
        listed: bool,
        func: impl Fn(&State) -> Option<State> + Send + Sync + 'static,
    ) -> TransformId {
        let id = self.transforms.len() as TransformId;
        self.transforms.push(Transform {
            name,
            func: Box::new(func),
            cost,
            listed,
        });
        id
    }

    pub fn get(&self, id: TransformId) -> &Transform {
        &self.transforms[id as usize]
    }

    pub fn lookup(&self, name: &str) -> Option<TransformId> {
        self.transforms
            .iter()
            .position(|t| t.name == name)
            .map(|i| i as TransformId)
    }

    /// Transform ids offered during DAG expansion, in registration order
    /// (ascending id) — the BFS tie-break the determinism contract in §5
    /// depends on.
    pub fn listed_ids(&self) -> Vec<TransformId> {
        self.transforms
            .iter()
            .enumerate()
            .filter(|(_, t)| t.listed)
            .map(|(i, _)| i as TransformId)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// The frozen set documented in SPEC_FULL.md §4.B: `identity` plus 31
    /// listed transforms (8 rigid motions, 10 colour filters, invert,
    /// transpose, 2 flips, compress, toOrigin, cut, splitCols, colorMap,
    /// fillHoles, removeNoise, extractPattern, replicate).
    fn build() -> Self {
        let mut lib = Self {
            transforms: Vec::new(),
        };
        lib.register("identity", 1, false, transforms::identity);

        lib.register("rigid_0", 2, true, transforms::rigid_0);
        lib.register("rigid_1", 2, true, transforms::rigid_1);
        lib.register("rigid_2", 2, true, transforms::rigid_2);
        lib.register("rigid_3", 2, true, transforms::rigid_3);
        lib.register("rigid_4", 2, true, transforms::rigid_4);
        lib.register("rigid_5", 2, true, transforms::rigid_5);
        lib.register("rigid_6", 2, true, transforms::rigid_6);
        lib.register("rigid_7", 2, true, transforms::rigid_7);

        for colour in 0..=9i16 {
            let name: &'static str = Box::leak(format!("filterCol_{colour}").into_boxed_str());
            lib.register(name, 2, true, transforms::filter_col(colour));
        }

        lib.register("invert", 2, true, transforms::invert);
        lib.register("transpose", 2, true, transforms::transpose);
        lib.register("flipH", 2, true, transforms::flip_horizontal);
        lib.register("flipV", 2, true, transforms::flip_vertical);
        lib.register("compress", 3, true, transforms::compress);
        lib.register("toOrigin", 1, true, transforms::to_origin);
        lib.register("cut", 5, true, transforms::cut);
        lib.register("splitCols", 5, true, transforms::split_cols);
        lib.register("colorMap", 4, true, transforms::color_map);
        lib.register("fillHoles", 4, true, transforms::fill_holes);
        lib.register("removeNoise", 3, true, transforms::remove_noise);
        lib.register("extractPattern", 6, true, transforms::extract_pattern);
        lib.register("replicate", 6, true, transforms::replicate);

        lib
    }

    /// The single process-wide instance, built lazily on first access.
    pub fn global() -> &'static Library {
        static LIB: OnceLock<Library> = OnceLock::new();
        LIB.get_or_init(Library::build)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_set_has_exactly_32_entries() {
        // 1 unlisted identity + 31 listed transforms, per SPEC_FULL.md 4.B.
        assert_eq!(Library::global().len(), 32);
    }

    #[test]
    fn listed_ids_exclude_identity() {
        let lib = Library::global();
        let identity_id = lib.lookup("identity").unwrap();
        assert!(!lib.listed_ids().contains(&identity_id));
    }

    #[test]
    fn listed_ids_are_sorted_ascending() {
        let ids = Library::global().listed_ids();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn lookup_round_trips_name() {
        let lib = Library::global();
        let id = lib.lookup("compress").unwrap();
        assert_eq!(lib.get(id).name(), "compress");
    }
}
