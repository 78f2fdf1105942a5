#![forbid(unsafe_code)]

//! Selection state and pick transitions.
//!
//! The caller owns a [`SelectionState`]; every transition takes the current
//! state by reference and returns a new one. A pick that does not resolve to
//! an enabled option leaves the state untouched.
//!
//! # Example
//!
//! ```
//! use cascade_core::{KeyPath, OptionNode, OptionTree};
//! use cascade_select::{SelectMode, SelectionState, apply_selection};
//!
//! let tree = OptionTree::new(vec![
//!     OptionNode::new("china", "China")
//!         .child(OptionNode::new("beijing", "Beijing"))
//!         .child(OptionNode::new("shanghai", "Shanghai")),
//! ]);
//!
//! let state = SelectionState::single(KeyPath::from(["china", "beijing"]));
//! let next = apply_selection(
//!     &tree,
//!     &state,
//!     &KeyPath::from(["china", "shanghai"]),
//!     SelectMode::Single { toggle: false },
//! );
//! assert_eq!(next, SelectionState::single(KeyPath::from(["china", "shanghai"])));
//! ```

use std::fmt;
use std::str::FromStr;

use cascade_core::{Key, KeyPath, OptionTree, ResolveError, resolve_path};
use indexmap::IndexSet;

/// How picks combine with the existing selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectMode {
    /// At most one path. With `toggle`, re-picking the selected path clears
    /// it; without, re-picking is a no-op replace.
    Single { toggle: bool },
    /// Any number of distinct paths; picking a selected path removes it.
    Multi,
}

impl SelectMode {
    /// Whether this is multi-select.
    #[must_use]
    pub const fn is_multi(&self) -> bool {
        matches!(self, Self::Multi)
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Single { toggle: false } => "single",
            Self::Single { toggle: true } => "single-toggle",
            Self::Multi => "multi",
        }
    }
}

impl Default for SelectMode {
    fn default() -> Self {
        Self::Single { toggle: false }
    }
}

/// Error returned when parsing a [`SelectMode`] name fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSelectModeError {
    input: String,
}

impl fmt::Display for ParseSelectModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown select mode {:?} (expected single, single-toggle, or multi)",
            self.input
        )
    }
}

impl std::error::Error for ParseSelectModeError {}

impl FromStr for SelectMode {
    type Err = ParseSelectModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single { toggle: false }),
            "single-toggle" | "toggle" => Ok(Self::Single { toggle: true }),
            "multi" | "multiple" => Ok(Self::Multi),
            _ => Err(ParseSelectModeError {
                input: s.to_owned(),
            }),
        }
    }
}

/// Optional restrictions on which nodes may be picked.
///
/// Intermediate categories are selectable by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SelectPolicy {
    leaf_only: bool,
}

impl SelectPolicy {
    /// Only accept picks that end at a leaf.
    #[must_use]
    pub fn with_leaf_only(mut self, leaf_only: bool) -> Self {
        self.leaf_only = leaf_only;
        self
    }

    /// Whether picks must end at a leaf.
    #[must_use]
    pub const fn leaf_only(&self) -> bool {
        self.leaf_only
    }
}

/// Why a pick was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectRejection {
    /// The path does not resolve against the current tree.
    Unresolved(ResolveError),
    /// The policy requires a leaf and the path ends at a category.
    NotLeaf,
}

impl SelectRejection {
    /// Short machine-readable name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unresolved(err) => err.as_str(),
            Self::NotLeaf => "not_leaf",
        }
    }
}

impl fmt::Display for SelectRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved(err) => write!(f, "pick rejected: {err}"),
            Self::NotLeaf => f.write_str("pick rejected: path does not end at a leaf"),
        }
    }
}

impl std::error::Error for SelectRejection {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unresolved(err) => Some(err),
            Self::NotLeaf => None,
        }
    }
}

impl From<ResolveError> for SelectRejection {
    fn from(err: ResolveError) -> Self {
        Self::Unresolved(err)
    }
}

/// Caller-owned selection.
///
/// Multi-select keeps insertion order (the order chips are displayed in) and
/// never holds the same full path twice. Equality is order-sensitive.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum SelectionState {
    Single(Option<KeyPath>),
    Multi(IndexSet<KeyPath>),
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::Single(None)
    }
}

impl PartialEq for SelectionState {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Single(a), Self::Single(b)) => a == b,
            (Self::Multi(a), Self::Multi(b)) => a.iter().eq(b.iter()),
            _ => false,
        }
    }
}

impl Eq for SelectionState {}

impl SelectionState {
    /// Single-select state holding `path`.
    #[must_use]
    pub fn single(path: impl Into<KeyPath>) -> Self {
        Self::Single(Some(path.into()))
    }

    /// Multi-select state with the given paths, first occurrence wins.
    #[must_use]
    pub fn multi<I>(paths: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<KeyPath>,
    {
        Self::Multi(paths.into_iter().map(Into::into).collect())
    }

    /// Empty state for `mode`.
    #[must_use]
    pub fn empty(mode: SelectMode) -> Self {
        match mode {
            SelectMode::Single { .. } => Self::Single(None),
            SelectMode::Multi => Self::Multi(IndexSet::new()),
        }
    }

    /// Whether this state holds multi-select paths.
    #[must_use]
    pub fn is_multi(&self) -> bool {
        matches!(self, Self::Multi(_))
    }

    /// Number of selected paths.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(path) => usize::from(path.is_some()),
            Self::Multi(paths) => paths.len(),
        }
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Selected paths in display order.
    pub fn paths(&self) -> impl Iterator<Item = &KeyPath> + '_ {
        let (single, multi) = match self {
            Self::Single(path) => (path.as_ref(), None),
            Self::Multi(paths) => (None, Some(paths.iter())),
        };
        single.into_iter().chain(multi.into_iter().flatten())
    }

    /// Whether exactly `path` is selected.
    #[must_use]
    pub fn contains(&self, path: &[Key]) -> bool {
        match self {
            Self::Single(current) => current.as_deref() == Some(path),
            Self::Multi(paths) => paths.contains(path),
        }
    }

    /// Same mode, nothing selected.
    #[must_use]
    pub fn cleared(&self) -> Self {
        match self {
            Self::Single(_) => Self::Single(None),
            Self::Multi(_) => Self::Multi(IndexSet::new()),
        }
    }

    /// Copy of this state with `path` removed.
    #[must_use]
    pub fn without(&self, path: &[Key]) -> Self {
        match self {
            Self::Single(Some(current)) if current.as_slice() == path => Self::Single(None),
            Self::Single(current) => Self::Single(current.clone()),
            Self::Multi(paths) => {
                let mut paths = paths.clone();
                paths.shift_remove(path);
                Self::Multi(paths)
            }
        }
    }

    /// Copy of this state keeping only paths that still resolve in `tree`.
    ///
    /// Used after the caller swaps in a new option tree.
    #[must_use]
    pub fn retain_valid(&self, tree: &OptionTree) -> Self {
        match self {
            Self::Single(path) => Self::Single(
                path.as_ref()
                    .filter(|path| resolve_path(tree, path).is_ok())
                    .cloned(),
            ),
            Self::Multi(paths) => Self::Multi(
                paths
                    .iter()
                    .filter(|path| resolve_path(tree, path).is_ok())
                    .cloned()
                    .collect(),
            ),
        }
    }

    /// Label chains for every selected path that still exists in `tree`.
    #[must_use]
    pub fn labels<'t>(&self, tree: &'t OptionTree) -> Vec<Vec<&'t str>> {
        self.paths()
            .filter_map(|path| tree.labels_for(path))
            .collect()
    }

    /// Convert to the state shape of `mode`.
    ///
    /// Single to multi keeps the selected path; multi to single keeps the
    /// most recently added one.
    #[must_use]
    pub fn into_mode(self, mode: SelectMode) -> Self {
        match (self, mode) {
            (Self::Single(path), SelectMode::Multi) => Self::Multi(path.into_iter().collect()),
            (Self::Multi(mut paths), SelectMode::Single { .. }) => Self::Single(paths.pop()),
            (state, _) => state,
        }
    }
}

/// Apply a pick, silently ignoring picks that do not resolve.
pub fn apply_selection(
    tree: &OptionTree,
    state: &SelectionState,
    path: &[Key],
    mode: SelectMode,
) -> SelectionState {
    apply_selection_with(tree, state, path, mode, SelectPolicy::default())
}

/// [`apply_selection`] with an explicit pick policy.
pub fn apply_selection_with(
    tree: &OptionTree,
    state: &SelectionState,
    path: &[Key],
    mode: SelectMode,
    policy: SelectPolicy,
) -> SelectionState {
    match try_apply_selection_with(tree, state, path, mode, policy) {
        Ok(next) => next,
        Err(_rejection) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                message = "cascade.select.rejected",
                mode = mode.as_str(),
                depth = path.len(),
                reason = _rejection.as_str(),
            );
            state.clone()
        }
    }
}

/// Apply a pick, reporting why it was rejected.
pub fn try_apply_selection(
    tree: &OptionTree,
    state: &SelectionState,
    path: &[Key],
    mode: SelectMode,
) -> Result<SelectionState, SelectRejection> {
    try_apply_selection_with(tree, state, path, mode, SelectPolicy::default())
}

/// [`try_apply_selection`] with an explicit pick policy.
pub fn try_apply_selection_with(
    tree: &OptionTree,
    state: &SelectionState,
    path: &[Key],
    mode: SelectMode,
    policy: SelectPolicy,
) -> Result<SelectionState, SelectRejection> {
    let node = resolve_path(tree, path)?;
    if policy.leaf_only() && !node.is_leaf() {
        return Err(SelectRejection::NotLeaf);
    }

    let (next, _action) = match (state.clone().into_mode(mode), mode) {
        (SelectionState::Single(current), SelectMode::Single { toggle }) => {
            if current.as_deref() == Some(path) {
                if toggle {
                    (SelectionState::Single(None), "deselect")
                } else {
                    (SelectionState::Single(current), "keep")
                }
            } else {
                (SelectionState::single(path), "replace")
            }
        }
        (SelectionState::Multi(mut paths), SelectMode::Multi) => {
            if paths.shift_remove(path) {
                (SelectionState::Multi(paths), "deselect")
            } else {
                paths.insert(KeyPath::from(path));
                (SelectionState::Multi(paths), "select")
            }
        }
        // `into_mode` always yields the shape of `mode`.
        (other, _) => (other, "keep"),
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(
        message = "cascade.select",
        action = _action,
        mode = mode.as_str(),
        depth = path.len(),
        selected = next.len(),
    );

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_core::OptionNode;
    #[cfg(feature = "tracing")]
    use std::sync::{Arc, Mutex};
    #[cfg(feature = "tracing")]
    use tracing::Subscriber;
    #[cfg(feature = "tracing")]
    use tracing_subscriber::Layer;
    #[cfg(feature = "tracing")]
    use tracing_subscriber::layer::{Context, SubscriberExt};

    fn alerts() -> OptionTree {
        OptionTree::new(vec![
            OptionNode::new("severity", "Severity")
                .child(OptionNode::new("critical", "Critical"))
                .child(OptionNode::new("warning", "Warning")),
            OptionNode::new("status", "Status")
                .child(OptionNode::new("active", "Active"))
                .child(OptionNode::new("pending", "Pending")),
            OptionNode::new("inactive", "Inactive")
                .child(OptionNode::new("maintenance", "Maintenance").with_disabled(true))
                .child(OptionNode::new("retired", "Retired")),
        ])
    }

    fn p<const N: usize>(keys: [&str; N]) -> KeyPath {
        KeyPath::from(keys)
    }

    const SINGLE: SelectMode = SelectMode::Single { toggle: false };
    const TOGGLE: SelectMode = SelectMode::Single { toggle: true };

    #[test]
    fn single_replaces_existing_path() {
        let tree = alerts();
        let state = SelectionState::single(p(["status", "active"]));
        let next = apply_selection(&tree, &state, &p(["status", "pending"]), SINGLE);
        assert_eq!(next, SelectionState::single(p(["status", "pending"])));
        // Original untouched.
        assert_eq!(state, SelectionState::single(p(["status", "active"])));
    }

    #[test]
    fn single_reselect_replace_keeps_path() {
        let tree = alerts();
        let state = SelectionState::single(p(["status", "active"]));
        let next = apply_selection(&tree, &state, &p(["status", "active"]), SINGLE);
        assert_eq!(next, state);
    }

    #[test]
    fn single_reselect_toggle_clears() {
        let tree = alerts();
        let state = SelectionState::single(p(["status", "active"]));
        let next = apply_selection(&tree, &state, &p(["status", "active"]), TOGGLE);
        assert_eq!(next, SelectionState::Single(None));
        let again = apply_selection(&tree, &next, &p(["status", "active"]), TOGGLE);
        assert_eq!(again, state);
    }

    #[test]
    fn multi_appends_in_pick_order() {
        let tree = alerts();
        let state = SelectionState::empty(SelectMode::Multi);
        let state = apply_selection(&tree, &state, &p(["status", "active"]), SelectMode::Multi);
        let state = apply_selection(&tree, &state, &p(["severity", "critical"]), SelectMode::Multi);
        let paths: Vec<_> = state.paths().cloned().collect();
        assert_eq!(paths, vec![p(["status", "active"]), p(["severity", "critical"])]);
    }

    #[test]
    fn multi_toggle_off_preserves_remaining_order() {
        let tree = alerts();
        let state = SelectionState::multi([
            p(["status", "active"]),
            p(["status", "pending"]),
            p(["severity", "warning"]),
        ]);
        let next = apply_selection(&tree, &state, &p(["status", "pending"]), SelectMode::Multi);
        assert_eq!(
            next,
            SelectionState::multi([p(["status", "active"]), p(["severity", "warning"])])
        );
    }

    #[test]
    fn multi_equality_is_order_sensitive() {
        let a = SelectionState::multi([p(["status", "active"]), p(["status", "pending"])]);
        let b = SelectionState::multi([p(["status", "pending"]), p(["status", "active"])]);
        assert_ne!(a, b);
        assert_ne!(SelectionState::Single(None), SelectionState::empty(SelectMode::Multi));
    }

    #[test]
    fn double_toggle_of_selected_path_moves_it_last() {
        let tree = alerts();
        let active = p(["status", "active"]);
        let state = SelectionState::multi([active.clone(), p(["status", "pending"])]);
        let once = apply_selection(&tree, &state, &active, SelectMode::Multi);
        let twice = apply_selection(&tree, &once, &active, SelectMode::Multi);
        assert_eq!(
            twice,
            SelectionState::multi([p(["status", "pending"]), active.clone()])
        );
        assert_ne!(twice, state);

        // Starting without the path, the round trip is exact.
        let fresh = state.without(&active);
        let once = apply_selection(&tree, &fresh, &active, SelectMode::Multi);
        assert_eq!(apply_selection(&tree, &once, &active, SelectMode::Multi), fresh);
    }

    #[test]
    fn disabled_pick_is_silently_ignored() {
        let tree = alerts();
        let state = SelectionState::multi([p(["status", "active"])]);
        let next = apply_selection(
            &tree,
            &state,
            &p(["inactive", "maintenance"]),
            SelectMode::Multi,
        );
        assert_eq!(next, state);
        assert_eq!(
            try_apply_selection(&tree, &state, &p(["inactive", "maintenance"]), SelectMode::Multi),
            Err(SelectRejection::Unresolved(ResolveError::Disabled { depth: 1 }))
        );
    }

    #[test]
    fn unknown_pick_is_silently_ignored() {
        let tree = alerts();
        let state = SelectionState::single(p(["status", "active"]));
        let next = apply_selection(&tree, &state, &p(["status", "gone"]), SINGLE);
        assert_eq!(next, state);
        let empty = apply_selection(&tree, &state, &KeyPath::new(), SINGLE);
        assert_eq!(empty, state);
    }

    #[test]
    fn intermediate_pick_allowed_unless_leaf_only() {
        let tree = alerts();
        let state = SelectionState::default();
        let next = apply_selection(&tree, &state, &p(["status"]), SINGLE);
        assert_eq!(next, SelectionState::single(p(["status"])));

        let policy = SelectPolicy::default().with_leaf_only(true);
        assert_eq!(
            try_apply_selection_with(&tree, &state, &p(["status"]), SINGLE, policy),
            Err(SelectRejection::NotLeaf)
        );
        let kept = apply_selection_with(&tree, &state, &p(["status"]), SINGLE, policy);
        assert_eq!(kept, state);
    }

    #[test]
    fn mismatched_state_is_converted_to_mode() {
        let tree = alerts();
        let single = SelectionState::single(p(["status", "active"]));
        let next = apply_selection(&tree, &single, &p(["status", "pending"]), SelectMode::Multi);
        assert_eq!(
            next,
            SelectionState::multi([p(["status", "active"]), p(["status", "pending"])])
        );

        let multi = SelectionState::multi([p(["status", "active"]), p(["severity", "warning"])]);
        let next = apply_selection(&tree, &multi, &p(["status", "pending"]), SINGLE);
        assert_eq!(next, SelectionState::single(p(["status", "pending"])));
    }

    #[test]
    fn helpers_report_contents() {
        let tree = alerts();
        let state = SelectionState::multi([p(["status", "active"]), p(["severity", "warning"])]);
        assert_eq!(state.len(), 2);
        assert!(state.contains(&p(["status", "active"])));
        assert!(!state.contains(&p(["status"])));
        assert!(state.cleared().is_empty());
        assert!(state.cleared().is_multi());
        assert_eq!(
            state.without(&p(["status", "active"])),
            SelectionState::multi([p(["severity", "warning"])])
        );
        assert_eq!(
            state.labels(&tree),
            vec![vec!["Status", "Active"], vec!["Severity", "Warning"]]
        );
        let single = SelectionState::single(p(["status", "active"]));
        assert_eq!(single.without(&p(["status", "active"])), SelectionState::Single(None));
        assert_eq!(single.without(&p(["status", "pending"])), single);
    }

    #[test]
    fn retain_valid_drops_stale_paths() {
        let state = SelectionState::multi([
            p(["status", "active"]),
            p(["status", "pending"]),
            p(["severity", "critical"]),
        ]);
        let shrunk = OptionTree::new(vec![
            OptionNode::new("status", "Status").child(OptionNode::new("active", "Active")),
            OptionNode::new("severity", "Severity")
                .child(OptionNode::new("critical", "Critical").with_disabled(true)),
        ]);
        assert_eq!(
            state.retain_valid(&shrunk),
            SelectionState::multi([p(["status", "active"])])
        );
        let single = SelectionState::single(p(["status", "pending"]));
        assert_eq!(single.retain_valid(&shrunk), SelectionState::Single(None));
    }

    #[test]
    fn mode_parses_from_names() {
        assert_eq!("single".parse(), Ok(SINGLE));
        assert_eq!(" Single-Toggle ".parse(), Ok(TOGGLE));
        assert_eq!("multi".parse(), Ok(SelectMode::Multi));
        let err = "many".parse::<SelectMode>().unwrap_err();
        assert!(err.to_string().contains("\"many\""));
        for mode in [SINGLE, TOGGLE, SelectMode::Multi] {
            assert_eq!(mode.as_str().parse(), Ok(mode));
        }
    }

    #[test]
    fn rejection_display_and_source() {
        use std::error::Error as _;
        let err = SelectRejection::from(ResolveError::NotFound { depth: 1 });
        assert_eq!(err.to_string(), "pick rejected: no option matches path segment 1");
        assert!(err.source().is_some());
        assert!(SelectRejection::NotLeaf.source().is_none());
        assert_eq!(SelectRejection::NotLeaf.as_str(), "not_leaf");
    }

    #[cfg(feature = "state-persistence")]
    #[test]
    fn state_json_shape() {
        let state = SelectionState::multi([p(["status", "active"]), p(["pool", "1"])]);
        let json = serde_json::to_string(&state).expect("serialize state");
        assert_eq!(json, r#"{"multi":[["status","active"],["pool","1"]]}"#);
        let back: SelectionState = serde_json::from_str(&json).expect("deserialize state");
        assert_eq!(back, state);
    }

    #[cfg(feature = "tracing")]
    #[derive(Debug, Default)]
    struct SelectTraceState {
        actions: Vec<String>,
        rejections: Vec<String>,
    }

    #[cfg(feature = "tracing")]
    struct SelectTraceCapture {
        state: Arc<Mutex<SelectTraceState>>,
    }

    #[cfg(feature = "tracing")]
    impl<S> Layer<S> for SelectTraceCapture
    where
        S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
    {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            #[derive(Default)]
            struct FieldVisitor {
                message: Option<String>,
                action: Option<String>,
                reason: Option<String>,
            }
            impl tracing::field::Visit for FieldVisitor {
                fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                    match field.name() {
                        "message" => self.message = Some(value.to_owned()),
                        "action" => self.action = Some(value.to_owned()),
                        "reason" => self.reason = Some(value.to_owned()),
                        _ => {}
                    }
                }

                fn record_debug(
                    &mut self,
                    field: &tracing::field::Field,
                    value: &dyn std::fmt::Debug,
                ) {
                    let text = format!("{value:?}").trim_matches('"').to_owned();
                    match field.name() {
                        "message" => self.message = Some(text),
                        "action" => self.action = Some(text),
                        "reason" => self.reason = Some(text),
                        _ => {}
                    }
                }
            }

            let mut visitor = FieldVisitor::default();
            event.record(&mut visitor);
            let mut state = self.state.lock().expect("select trace state lock");
            match visitor.message.as_deref() {
                Some("cascade.select") => state.actions.extend(visitor.action),
                Some("cascade.select.rejected") => state.rejections.extend(visitor.reason),
                _ => {}
            }
        }
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn select_events_are_emitted() {
        let trace_state = Arc::new(Mutex::new(SelectTraceState::default()));
        let subscriber = tracing_subscriber::registry().with(SelectTraceCapture {
            state: Arc::clone(&trace_state),
        });
        let _guard = tracing::subscriber::set_default(subscriber);
        tracing::callsite::rebuild_interest_cache();

        let tree = alerts();
        let state = SelectionState::empty(SelectMode::Multi);
        let state = apply_selection(&tree, &state, &p(["status", "active"]), SelectMode::Multi);
        let state = apply_selection(&tree, &state, &p(["status", "active"]), SelectMode::Multi);
        let _ = apply_selection(&tree, &state, &p(["inactive", "maintenance"]), SelectMode::Multi);

        tracing::callsite::rebuild_interest_cache();
        let snapshot = trace_state.lock().expect("select trace state lock");
        assert_eq!(snapshot.actions, ["select", "deselect"]);
        assert_eq!(snapshot.rejections, ["disabled"]);
    }
}
