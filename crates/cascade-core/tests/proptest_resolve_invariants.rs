//! Property-based invariant tests for path resolution.
//!
//! 1. Every path produced by `walk` resolves structurally via `node_at`.
//! 2. `resolve_path` succeeds exactly when no node on the path is disabled.
//! 3. Disabled failures point at the shallowest disabled node.
//! 4. Extending a path past a leaf is always `NotFound` at the extra segment.
//! 5. `labels_for` yields one label per segment.
//! 6. Generated trees always validate (sibling values are unique).

use std::collections::HashSet;

use cascade_core::{Key, KeyPath, OptionNode, OptionTree, ResolveError, resolve_path};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn dedup(nodes: Vec<OptionNode>) -> Vec<OptionNode> {
    let mut seen = HashSet::new();
    nodes
        .into_iter()
        .filter(|node| seen.insert(node.value().clone()))
        .collect()
}

fn arb_tree() -> impl Strategy<Value = OptionTree> {
    let fields = || (0i64..6, "[a-z]{1,5}", proptest::bool::weighted(0.2));
    let leaf = fields()
        .prop_map(|(value, label, disabled)| OptionNode::new(value, label).with_disabled(disabled));
    let node = leaf.prop_recursive(3, 48, 4, move |inner| {
        (fields(), proptest::collection::vec(inner, 0..4)).prop_map(
            |((value, label, disabled), children)| {
                OptionNode::new(value, label)
                    .with_disabled(disabled)
                    .with_children(dedup(children))
            },
        )
    });
    proptest::collection::vec(node, 0..5).prop_map(|roots| OptionTree::new(dedup(roots)))
}

fn all_paths(tree: &OptionTree) -> Vec<KeyPath> {
    let mut out = Vec::new();
    tree.walk(|path, _| out.push(path.clone()));
    out
}

fn first_disabled(tree: &OptionTree, path: &KeyPath) -> Option<usize> {
    (1..=path.len()).find_map(|len| {
        tree.node_at(&path[..len])
            .filter(|node| node.is_disabled())
            .map(|_| len - 1)
    })
}

proptest! {
    #[test]
    fn walked_paths_resolve_structurally(tree in arb_tree()) {
        for path in all_paths(&tree) {
            prop_assert!(tree.node_at(&path).is_some(), "node_at failed for {}", path);
        }
    }

    #[test]
    fn resolution_matches_disabled_flags(tree in arb_tree()) {
        for path in all_paths(&tree) {
            let result = resolve_path(&tree, &path);
            match first_disabled(&tree, &path) {
                Some(depth) => prop_assert_eq!(result.err(), Some(ResolveError::Disabled { depth })),
                None => prop_assert!(result.is_ok(), "expected {} to resolve", path),
            }
        }
    }

    #[test]
    fn extending_a_leaf_is_not_found(tree in arb_tree()) {
        for path in tree.leaf_paths() {
            if first_disabled(&tree, &path).is_some() {
                continue;
            }
            let extended = path.join(Key::from("missing"));
            prop_assert_eq!(
                resolve_path(&tree, &extended),
                Err(ResolveError::NotFound { depth: path.len() })
            );
        }
    }

    #[test]
    fn labels_cover_every_segment(tree in arb_tree()) {
        for path in all_paths(&tree) {
            let labels = tree.labels_for(&path);
            prop_assert_eq!(labels.map(|l| l.len()), Some(path.len()));
        }
    }

    #[test]
    fn generated_trees_validate(tree in arb_tree()) {
        prop_assert!(tree.validate().is_ok());
    }

    #[test]
    fn fingerprint_is_deterministic(tree in arb_tree()) {
        prop_assert_eq!(tree.fingerprint(), tree.clone().fingerprint());
    }
}
