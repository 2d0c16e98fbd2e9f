// Focus Resolution
// Picks the focused subtrees (or everything) and collects their runnable leaves

use crate::spec::{Diagnostic, Flag, NoduleId, SpecTree};

use serde::Serialize;

/// Number of focus and pending markers that shaped a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlagStat {
    pub focus_count: usize,
    pub skip_count: usize,
}

impl FlagStat {
    /// `Encountered ...` line of the summary, or `None` when both counts are zero
    pub fn notice(&self) -> Option<String> {
        let focus = (self.focus_count > 0).then(|| format!("{} focused node(s)", self.focus_count));
        let skip = (self.skip_count > 0).then(|| format!("{} pending node(s)", self.skip_count));
        match (focus, skip) {
            (Some(focus), Some(skip)) => Some(format!("Encountered {} and {}", focus, skip)),
            (Some(one), None) | (None, Some(one)) => Some(format!("Encountered {}", one)),
            (None, None) => None,
        }
    }
}

/// Outcome of focus resolution
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Leaves to run, in tree pre-order
    pub leaves: Vec<NoduleId>,
    pub stats: FlagStat,
    pub warnings: Vec<Diagnostic>,
}

pub struct FocusResolver;

impl FocusResolver {
    /// Select the focused nodes, falling back to every root when nothing is
    /// focused, and collect the leaves below them.
    pub fn select_leaves(tree: &SpecTree) -> Selection {
        let mut selection = Selection::default();

        let mut focused = Vec::new();
        for &root in tree.roots() {
            Self::find_focused(tree, root, &mut focused, &mut selection.warnings);
        }
        selection.stats.focus_count = focused.len();

        let starting = if focused.is_empty() {
            tree.roots().to_vec()
        } else {
            focused
        };

        for id in starting {
            Self::collect_leaves(tree, id, &mut selection);
        }

        tracing::debug!(
            leaves = selection.leaves.len(),
            focus_count = selection.stats.focus_count,
            skip_count = selection.stats.skip_count,
            "resolved focus"
        );
        selection
    }

    fn find_focused(
        tree: &SpecTree,
        id: NoduleId,
        focused: &mut Vec<NoduleId>,
        warnings: &mut Vec<Diagnostic>,
    ) {
        let nodule = &tree[id];
        if nodule.flag == Flag::Skip {
            return;
        }

        let before = focused.len();
        for &child in &nodule.children {
            Self::find_focused(tree, child, focused, warnings);
        }

        if nodule.flag == Flag::Focus {
            if focused.len() > before {
                let warning = Diagnostic::warning(format!(
                    "{}: This focused node has focused descendants. The focus of the descendants takes precedence and this focus is ignored.",
                    nodule.label()
                ));
                warning.trace();
                warnings.push(warning);
            } else {
                focused.push(id);
            }
        }
    }

    fn collect_leaves(tree: &SpecTree, id: NoduleId, selection: &mut Selection) {
        let nodule = &tree[id];
        if nodule.flag == Flag::Skip {
            selection.stats.skip_count += 1;
            return;
        }

        if nodule.is_leaf() {
            selection.leaves.push(id);
            return;
        }

        for &child in &nodule.children {
            Self::collect_leaves(tree, child, selection);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SpecFile;
    use crate::execution::{BoxRegistry, BoxResult};
    use crate::spec::SpecParser;

    fn tree_of(source: &str) -> SpecTree {
        let mut registry = BoxRegistry::new();
        registry.register("zoo", |_, _| -> BoxResult { Ok(()) });
        let mut parser = SpecParser::new(&registry);
        parser.parse_file(&SpecFile::virtual_file_dedent("focus.yaml", source));
        parser.finish()
    }

    fn leaf_names(tree: &SpecTree, selection: &Selection) -> Vec<String> {
        selection
            .leaves
            .iter()
            .map(|&id| tree[id].name.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_no_flags_selects_everything() {
        let tree = tree_of(
            "
            box: zoo
            content:
              - { name: a, input: {} }
              - { name: b, input: {} }
            ",
        );
        let selection = FocusResolver::select_leaves(&tree);
        assert_eq!(leaf_names(&tree, &selection), vec!["a", "b"]);
        assert_eq!(selection.stats, FlagStat::default());
        assert!(selection.warnings.is_empty());
    }

    #[test]
    fn test_pending_leaf_is_counted_not_run() {
        let tree = tree_of(
            "
            box: zoo
            content:
              - { name: a, flag: PENDING, input: {} }
              - { name: b, input: {} }
            ",
        );
        let selection = FocusResolver::select_leaves(&tree);
        assert_eq!(leaf_names(&tree, &selection), vec!["b"]);
        assert_eq!(selection.stats.skip_count, 1);
        assert_eq!(selection.stats.focus_count, 0);
    }

    #[test]
    fn test_focus_restricts_the_run() {
        let tree = tree_of(
            "
            box: zoo
            content:
              - { name: a, input: {} }
              - name: group
                flag: FOCUS
                content:
                  - { name: b, input: {} }
                  - { name: c, input: {} }
            ",
        );
        let selection = FocusResolver::select_leaves(&tree);
        assert_eq!(leaf_names(&tree, &selection), vec!["b", "c"]);
        assert_eq!(selection.stats.focus_count, 1);
    }

    #[test]
    fn test_descendant_focus_takes_precedence() {
        let tree = tree_of(
            "
            box: zoo
            content:
              - name: outer
                flag: FOCUS
                content:
                  - { name: b, input: {} }
                  - { name: c, flag: FOCUS, input: {} }
              - { name: d, flag: FOCUS, input: {} }
            ",
        );
        let selection = FocusResolver::select_leaves(&tree);
        assert_eq!(leaf_names(&tree, &selection), vec!["c", "d"]);
        assert_eq!(selection.stats.focus_count, 2);
        assert_eq!(selection.warnings.len(), 1);
        assert!(selection.warnings[0]
            .to_string()
            .starts_with(
                "Warning: Node outer(focus.yaml:3:5): This focused node has focused descendants."
            ));
    }

    #[test]
    fn test_pending_inside_focus_is_counted() {
        let tree = tree_of(
            "
            box: zoo
            content:
              - name: group
                flag: FOCUS
                content:
                  - { name: b, flag: PENDING, input: {} }
                  - { name: c, input: {} }
              - { name: d, flag: PENDING, input: {} }
            ",
        );
        let selection = FocusResolver::select_leaves(&tree);
        assert_eq!(leaf_names(&tree, &selection), vec!["c"]);
        // Only the marker on the walk from the focused node counts
        assert_eq!(selection.stats.skip_count, 1);
    }

    #[test]
    fn test_focus_inside_pending_is_ignored() {
        let tree = tree_of(
            "
            box: zoo
            content:
              - name: group
                flag: PENDING
                content:
                  - { name: b, flag: FOCUS, input: {} }
              - { name: c, input: {} }
            ",
        );
        let selection = FocusResolver::select_leaves(&tree);
        assert_eq!(leaf_names(&tree, &selection), vec!["c"]);
        assert_eq!(selection.stats.focus_count, 0);
        assert_eq!(selection.stats.skip_count, 1);
    }

    #[test]
    fn test_flag_stat_notice() {
        assert_eq!(FlagStat::default().notice(), None);
        assert_eq!(
            FlagStat { focus_count: 1, skip_count: 0 }.notice().as_deref(),
            Some("Encountered 1 focused node(s)")
        );
        assert_eq!(
            FlagStat { focus_count: 0, skip_count: 2 }.notice().as_deref(),
            Some("Encountered 2 pending node(s)")
        );
        assert_eq!(
            FlagStat { focus_count: 1, skip_count: 2 }.notice().as_deref(),
            Some("Encountered 1 focused node(s) and 2 pending node(s)")
        );
    }
}
