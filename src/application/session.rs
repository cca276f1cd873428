//! Editing session: the single entry point a renderer drives
//!
//! Holds the forest, the active mode and id source, and the link gesture in
//! progress. Every mutation takes `&mut self`, so edits are serialized.

use tracing::{debug, info, instrument, warn};

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::avl::avl_balance;
use crate::domain::binary::binary_insert;
use crate::domain::bst::bst_insert;
use crate::domain::error::DomainError;
use crate::domain::forest::{Forest, Handle};
use crate::domain::ids::{IdSource, SequentialIds};
use crate::domain::layout::{layout_forest, LayoutParams, Placement, Viewport};
use crate::domain::mode::TreeMode;
use crate::domain::node::{Edge, Node, NodeId, Value};
use crate::domain::traversal::{walk_forest, TraversalOrder, VisitEvent};
use crate::domain::tree::{contains_value, flatten, is_bst, max_fan_out};

/// Link gesture started on `source` from `handle`, not yet dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingLink {
    pub source: NodeId,
    pub handle: Handle,
}

#[derive(Debug, Clone)]
pub struct TreeSession<P = (), I = SequentialIds> {
    mode: TreeMode,
    forest: Forest<P>,
    ids: I,
    max_children: Option<usize>,
    layout_params: LayoutParams,
    pending_link: Option<PendingLink>,
}

impl<P> TreeSession<P, SequentialIds> {
    /// Empty session in `mode` with default layout and a fan-out limit of two.
    pub fn new(mode: TreeMode) -> Self {
        Self::with_ids(mode, SequentialIds::new())
    }

    /// Empty session configured from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut session = Self::new(settings.default_mode);
        session.max_children = settings.custom.fan_out_limit();
        session.layout_params = settings.layout;
        session
    }
}

impl<P, I: IdSource> TreeSession<P, I> {
    pub fn with_ids(mode: TreeMode, ids: I) -> Self {
        Self {
            mode,
            forest: Forest::new(),
            ids,
            max_children: Some(2),
            layout_params: LayoutParams::default(),
            pending_link: None,
        }
    }

    pub fn mode(&self) -> TreeMode {
        self.mode
    }

    pub fn roots(&self) -> &[Node<P>] {
        &self.forest.roots
    }

    pub fn edges(&self) -> &[Edge] {
        &self.forest.edges
    }

    pub fn forest(&self) -> &Forest<P> {
        &self.forest
    }

    pub fn find(&self, id: NodeId) -> Option<&Node<P>> {
        self.forest.find(id)
    }

    pub fn pending_link(&self) -> Option<PendingLink> {
        self.pending_link
    }

    /// Fan-out limit for custom links, `None` for unlimited.
    pub fn set_max_children(&mut self, max_children: Option<usize>) {
        self.max_children = max_children;
    }

    pub fn set_layout_params(&mut self, params: LayoutParams) {
        self.layout_params = params;
    }

    /// Begin a link gesture on `source`.
    pub fn begin_link(&mut self, source: NodeId, handle: Handle) -> ApplicationResult<()> {
        if self.forest.find(source).is_none() {
            return Err(DomainError::NodeNotFound(source).into());
        }
        debug!(%source, ?handle, "link started");
        self.pending_link = Some(PendingLink { source, handle });
        Ok(())
    }

    pub fn cancel_link(&mut self) {
        if let Some(link) = self.pending_link.take() {
            debug!(source = %link.source, "link cancelled");
        }
    }

    /// Drop the pending link on `target`.
    ///
    /// A top-handle drag makes the source a child of `target`, a bottom-handle
    /// drag makes `target` a child of the source. Returns `Ok(false)` when
    /// there was nothing to complete. The pending link is cleared either way.
    #[instrument(level = "debug", skip(self))]
    pub fn complete_link(&mut self, target: NodeId) -> ApplicationResult<bool> {
        let Some(link) = self.pending_link.take() else {
            return Ok(false);
        };
        let (child, parent) = match link.handle {
            Handle::Top => (link.source, target),
            Handle::Bottom => (target, link.source),
        };
        self.reparent(child, parent, link.handle)?;
        Ok(true)
    }

    /// Attach `child` below `parent`; custom mode only.
    pub fn reparent(
        &mut self,
        child: NodeId,
        parent: NodeId,
        handle: Handle,
    ) -> ApplicationResult<()> {
        if self.mode != TreeMode::Custom {
            warn!(mode = %self.mode, "links can only be drawn in custom mode");
            return Err(DomainError::ModeMismatch {
                mode: self.mode,
                reason: "links can only be drawn in custom mode".to_string(),
            }
            .into());
        }
        self.forest
            .reparent(child, parent, handle, self.max_children)
            .inspect_err(|e| warn!(error = %e, "link rejected"))?;
        Ok(())
    }

    /// Cut an edge. A structured mode falls back to custom first.
    pub fn delete_edge(&mut self, parent: NodeId, child: NodeId) -> ApplicationResult<()> {
        if !self.forest.edge_exists(parent, child) {
            return Err(DomainError::EdgeNotFound { parent, child }.into());
        }
        if self.mode != TreeMode::Custom {
            info!(from = %self.mode, "switching to custom mode to delete edge");
            self.mode = TreeMode::Custom;
        }
        self.forest.delete_edge(parent, child)?;
        Ok(())
    }

    /// Visit sequence over every root, in forest order.
    pub fn traversal(&self, order: TraversalOrder) -> Vec<VisitEvent> {
        walk_forest(&self.forest.roots, order).collect()
    }

    pub fn layout(&self, viewport: &Viewport) -> Vec<Placement> {
        layout_forest(&self.forest.roots, self.mode, viewport, &self.layout_params)
    }
}

impl<P: Clone + Default, I: IdSource> TreeSession<P, I> {
    /// Insert `value` according to the active mode.
    ///
    /// Returns the new node's id, or `None` when the value already exists
    /// and the mode rejects duplicates.
    #[instrument(level = "debug", skip(self), fields(mode = %self.mode))]
    pub fn insert(&mut self, value: Value) -> ApplicationResult<Option<NodeId>> {
        if !value.is_finite() {
            return Err(DomainError::InvalidValue(value).into());
        }
        if self.mode == TreeMode::Custom {
            return Ok(self.forest.custom_insert(value, &mut self.ids));
        }

        let Some(root) = self.forest.roots.first() else {
            let node = Node::new(value, self.ids.next_id());
            let id = node.id;
            self.forest.roots.push(node);
            debug!(%id, "root created");
            return Ok(Some(id));
        };

        let (tree, inserted) = match self.mode {
            TreeMode::Binary => {
                let (tree, edge) = binary_insert(root, value, &mut self.ids);
                (tree, Some(edge.child_id))
            }
            _ if contains_value(std::slice::from_ref(root), value) => {
                debug!(value, "duplicate value, not inserted");
                return Ok(None);
            }
            TreeMode::Avl => {
                let tree = avl_balance(&bst_insert(root, value, &mut self.ids));
                let id = id_of_value(&tree, value);
                (tree, id)
            }
            _ => {
                let tree = bst_insert(root, value, &mut self.ids);
                let id = id_of_value(&tree, value);
                (tree, id)
            }
        };
        self.forest.roots[0] = tree;
        self.forest.refresh_edges();
        Ok(inserted)
    }

    /// Switch the insertion mode.
    ///
    /// Ordered modes need at most one root that is a valid BST; switching to
    /// AVL balances that root once. Binary needs at most one root with no
    /// node holding more than two children. Custom accepts any forest.
    #[instrument(level = "debug", skip(self), fields(from = %self.mode))]
    pub fn set_mode(&mut self, mode: TreeMode) -> ApplicationResult<()> {
        if mode.is_structured() {
            if self.forest.roots.len() > 1 {
                return Err(mismatch(mode, "forest has more than one root"));
            }
            let root = self.forest.roots.first();
            if mode.is_ordered() && root.is_some_and(|r| !is_bst(r)) {
                return Err(mismatch(mode, "tree violates BST ordering"));
            }
            if mode == TreeMode::Binary && root.is_some_and(|r| max_fan_out(r) > 2) {
                return Err(mismatch(mode, "a node has more than two children"));
            }
        }
        if mode == TreeMode::Avl && self.mode != TreeMode::Avl {
            if let Some(root) = self.forest.roots.first() {
                let balanced = avl_balance(root);
                self.forest.roots[0] = balanced;
                self.forest.refresh_edges();
            }
        }
        info!(to = %mode, "mode changed");
        self.mode = mode;
        Ok(())
    }

    /// Delete `id` with its subtree. Clears a pending link whose source went
    /// with it.
    pub fn delete_node(&mut self, id: NodeId) -> ApplicationResult<()> {
        let removed: Vec<NodeId> = self
            .forest
            .find(id)
            .map(|node| flatten(node).into_iter().map(|n| n.id).collect())
            .unwrap_or_default();
        self.forest.delete_node(id)?;
        if self
            .pending_link
            .is_some_and(|link| removed.contains(&link.source))
        {
            self.pending_link = None;
        }
        Ok(())
    }
}

fn id_of_value<P>(tree: &Node<P>, value: Value) -> Option<NodeId> {
    flatten(tree)
        .into_iter()
        .find(|node| node.value == value)
        .map(|node| node.id)
}

fn mismatch(mode: TreeMode, reason: &str) -> ApplicationError {
    DomainError::ModeMismatch {
        mode,
        reason: reason.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(mode: TreeMode, values: &[Value]) -> TreeSession {
        let mut session = TreeSession::new(mode);
        for &value in values {
            session.insert(value).expect("finite value");
        }
        session
    }

    #[test]
    fn given_empty_session_when_inserting_then_creates_root() {
        let mut s: TreeSession = TreeSession::new(TreeMode::Bst);
        let id = s.insert(4.0).expect("finite");
        assert_eq!(id, Some(NodeId(1)));
        assert_eq!(s.roots().len(), 1);
        assert!(s.edges().is_empty());
    }

    #[test]
    fn given_bst_when_inserting_duplicate_then_returns_none() {
        let mut s = session(TreeMode::Bst, &[4.0, 2.0]);
        let before = s.roots().to_vec();
        assert_eq!(s.insert(2.0).expect("finite"), None);
        assert_eq!(s.roots(), before.as_slice());
    }

    #[test]
    fn given_nan_when_inserting_then_rejects() {
        let mut s: TreeSession = TreeSession::new(TreeMode::Bst);
        let result = s.insert(Value::NAN);
        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::InvalidValue(_)))
        ));
    }

    #[test]
    fn given_structured_mode_when_reparenting_then_rejects() {
        let mut s = session(TreeMode::Bst, &[4.0, 2.0]);
        let result = s.reparent(NodeId(2), NodeId(1), Handle::Bottom);
        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::ModeMismatch { .. }))
        ));
    }

    #[test]
    fn given_bst_when_deleting_edge_then_switches_to_custom() {
        let mut s = session(TreeMode::Bst, &[4.0, 2.0]);
        s.delete_edge(NodeId(1), NodeId(2)).expect("edge exists");
        assert_eq!(s.mode(), TreeMode::Custom);
        assert_eq!(s.roots().len(), 2);
    }

    #[test]
    fn given_forest_when_switching_to_bst_then_rejects_and_keeps_mode() {
        let mut s = session(TreeMode::Custom, &[1.0, 2.0]);
        assert!(s.set_mode(TreeMode::Bst).is_err());
        assert_eq!(s.mode(), TreeMode::Custom);
    }

    #[test]
    fn given_chain_when_switching_to_avl_then_balances_once() {
        let mut s = session(TreeMode::Bst, &[1.0, 2.0, 3.0]);
        s.set_mode(TreeMode::Avl).expect("valid bst");
        assert_eq!(s.roots()[0].value, 2.0);
        assert_eq!(s.edges().len(), 2);
    }

    #[test]
    fn given_top_handle_link_when_completed_then_source_becomes_child() {
        let mut s = session(TreeMode::Custom, &[1.0, 2.0]);
        s.begin_link(NodeId(2), Handle::Top).expect("node exists");
        assert!(s.complete_link(NodeId(1)).expect("valid link"));

        assert_eq!(s.roots().len(), 1);
        assert_eq!(s.find(NodeId(2)).and_then(|n| n.parent_id), Some(NodeId(1)));
        assert_eq!(s.pending_link(), None);
    }

    #[test]
    fn given_rejected_link_when_completed_then_pending_link_cleared() {
        let mut s = session(TreeMode::Custom, &[1.0]);
        s.begin_link(NodeId(1), Handle::Bottom).expect("node exists");
        assert!(s.complete_link(NodeId(1)).is_err());
        assert_eq!(s.pending_link(), None);
        assert!(!s.complete_link(NodeId(1)).expect("nothing pending"));
    }

    #[test]
    fn given_pending_link_when_source_deleted_then_link_cleared() {
        let mut s = session(TreeMode::Custom, &[1.0, 2.0]);
        s.begin_link(NodeId(2), Handle::Bottom).expect("node exists");
        s.delete_node(NodeId(2)).expect("node exists");
        assert_eq!(s.pending_link(), None);
    }
}
