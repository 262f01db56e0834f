// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The value tree and its relationship tables.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;
use understory_tpl::{ParamId, Site, TplId, TplKind};

use crate::build::{BuildError, BuildOptions, Expander};
use crate::node::{SlotFill, ValComponent, ValKind, ValNode};
use crate::selectable::{Selectable, SlotSelection, SlotTarget};
use crate::ValId;

/// Where an argument node was passed: the receiving component and the param.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SlotInfo {
    /// The component instance receiving the argument.
    pub val_component: ValId,
    /// The slot param the argument is bound to.
    pub param: ParamId,
}

/// A fully instantiated value tree.
///
/// Nodes live in an arena and never point at each other directly except for
/// downward content lists. Upward relations are side tables:
///
/// - **parent**: the structural parent. For argument nodes this is the
///   receiving component instance; for default slot content it is the slot.
/// - **owner**: the component instance whose own tree produced the node. The
///   system root has no owner; argument content is owned by the call site.
/// - **slot info**: for top argument nodes, the receiving instance and param.
/// - **val2slot**: for top argument nodes, the slot that renders them.
///
/// A `ValState` borrows the [`Site`] it was built from; nothing here mutates
/// after construction apart from [`ValState::add_detached`].
#[derive(Debug)]
pub struct ValState<'s> {
    site: &'s Site,
    pub(crate) nodes: Vec<ValNode>,
    pub(crate) parents: Vec<Option<ValId>>,
    pub(crate) owners: Vec<Option<ValId>>,
    pub(crate) slot_infos: HashMap<ValId, SlotInfo>,
    pub(crate) val2slot: HashMap<ValId, ValId>,
    pub(crate) by_full_key: HashMap<String, ValId>,
    pub(crate) sys_root: ValId,
}

impl<'s> ValState<'s> {
    /// Instantiates `root`, which must be a component instance, with default options.
    ///
    /// The root becomes the system root: it has no owner, and its expansion
    /// is the user-visible tree.
    pub fn build(site: &'s Site, root: TplId) -> Result<Self, BuildError> {
        crate::ValTreeBuilder::new(site).build(root)
    }

    /// Instantiates `root` with explicit options.
    pub fn build_with(
        site: &'s Site,
        root: TplId,
        options: BuildOptions,
    ) -> Result<Self, BuildError> {
        crate::ValTreeBuilder::with_options(site, options).build(root)
    }

    /// Creates a state holding only a system root that has not rendered yet.
    ///
    /// [`ValState::maybe_val_user_root`] returns `None` for such a state.
    pub fn unrendered(site: &'s Site, root: TplId) -> Result<Self, BuildError> {
        let TplKind::Component(tc) = &site.tpl(root).kind else {
            return Err(BuildError::RootNotComponent(root));
        };
        let mut state = Self::empty(site);
        let key = site.tpl(root).uuid.clone();
        state.sys_root = state.push_node(
            ValNode {
                tpl: root,
                key: key.clone(),
                full_key: key,
                detached: false,
                kind: ValKind::Component(ValComponent {
                    component: tc.component,
                    slot_args: Vec::new(),
                    contents: None,
                }),
            },
            None,
            None,
        );
        Ok(state)
    }

    pub(crate) fn empty(site: &'s Site) -> Self {
        Self {
            site,
            nodes: Vec::new(),
            parents: Vec::new(),
            owners: Vec::new(),
            slot_infos: HashMap::new(),
            val2slot: HashMap::new(),
            by_full_key: HashMap::new(),
            sys_root: ValId(0),
        }
    }

    pub(crate) fn push_node(
        &mut self,
        node: ValNode,
        parent: Option<ValId>,
        owner: Option<ValId>,
    ) -> ValId {
        let id = ValId(u32::try_from(self.nodes.len()).expect("too many value nodes"));
        let previous = self.by_full_key.insert(node.full_key.clone(), id);
        debug_assert!(previous.is_none(), "duplicate full key {}", node.full_key);
        self.nodes.push(node);
        self.parents.push(parent);
        self.owners.push(owner);
        id
    }

    /// Instantiates `root` outside the canvas stack.
    ///
    /// Detached nodes have no parent and no owner and are never selectable.
    /// Component instances inside still expand normally. Each detached root
    /// gets its own full-key prefix, so the same template may be detached
    /// more than once.
    pub fn add_detached(&mut self, root: TplId) -> Result<ValId, BuildError> {
        Expander::new(self, &BuildOptions::default(), true).run(root)
    }

    /// The site this tree was built from.
    #[must_use]
    pub fn site(&self) -> &'s Site {
        self.site
    }

    /// Number of nodes, including detached ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns a node.
    ///
    /// # Panics
    ///
    /// Panics if `val` does not belong to this state.
    #[must_use]
    pub fn node(&self, val: ValId) -> &ValNode {
        &self.nodes[val.idx()]
    }

    /// Iterates all node ids in build order.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "push_node keeps the arena within u32 range"
    )]
    pub fn ids(&self) -> impl Iterator<Item = ValId> + '_ {
        (0..self.nodes.len()).map(|i| ValId(i as u32))
    }

    /// The system root.
    #[must_use]
    pub fn val_sys_root(&self) -> ValId {
        self.sys_root
    }

    /// The first top node of the system root's expansion, if it has rendered.
    #[must_use]
    pub fn maybe_val_user_root(&self) -> Option<ValId> {
        self.node(self.sys_root)
            .as_component()?
            .contents
            .as_deref()?
            .first()
            .copied()
    }

    /// Structural parent of `val`.
    #[must_use]
    pub fn val_parent(&self, val: ValId) -> Option<ValId> {
        self.parents[val.idx()]
    }

    /// The component instance whose own tree produced `val`.
    #[must_use]
    pub fn val_owner(&self, val: ValId) -> Option<ValId> {
        self.owners[val.idx()]
    }

    /// Owner chain of `val`, nearest first, stopping before the system root.
    #[must_use]
    pub fn val_owners(&self, val: ValId) -> Vec<ValId> {
        let mut out = Vec::new();
        let mut cur = self.val_owner(val);
        while let Some(owner) = cur {
            if owner == self.sys_root {
                break;
            }
            out.push(owner);
            cur = self.val_owner(owner);
        }
        out
    }

    /// For a top argument node, the slot in the receiving component that renders it.
    #[must_use]
    pub fn val2slot(&self, val: ValId) -> Option<ValId> {
        self.val2slot.get(&val).copied()
    }

    /// For a top argument node, the receiving component and param.
    #[must_use]
    pub fn val2slot_info(&self, val: ValId) -> Option<SlotInfo> {
        self.slot_infos.get(&val).copied()
    }

    /// Parent in render order: the rendering slot for argument nodes, else
    /// the structural parent.
    #[must_use]
    pub fn rendered_parent(&self, val: ValId) -> Option<ValId> {
        self.val2slot(val).or_else(|| self.val_parent(val))
    }

    /// Walks up from `val` in render order and returns the first slot owned by
    /// `current` that renders argument content containing `val`.
    #[must_use]
    pub fn val_slot_containing_substituted_arg(
        &self,
        val: ValId,
        current: ValId,
    ) -> Option<ValId> {
        let mut cur = Some(val);
        while let Some(id) = cur {
            if let Some(slot) = self.val2slot(id)
                && self.val_owner(slot) == Some(current)
            {
                return Some(slot);
            }
            cur = self.rendered_parent(id);
        }
        None
    }

    /// Like [`ValState::val_slot_containing_substituted_arg`], as a slot
    /// selection on `current`.
    #[must_use]
    pub fn slot_containing_substituted_arg(
        &self,
        val: ValId,
        current: ValId,
    ) -> Option<SlotSelection> {
        let slot = self.val_slot_containing_substituted_arg(val, current)?;
        let param = self.node(slot).as_slot()?.param;
        Some(SlotSelection::for_val(current, param))
    }

    /// Looks up a node by full key.
    #[must_use]
    pub fn key2val(&self, full_key: &str) -> Option<ValId> {
        self.by_full_key.get(full_key).copied()
    }

    /// Argument nodes bound to the slot a selection names.
    ///
    /// `None` for selections anchored on authored nodes or on non-components.
    /// An empty slice when the param has no argument.
    #[must_use]
    pub fn slot_content(&self, sel: &SlotSelection) -> Option<&[ValId]> {
        let SlotTarget::Val(val) = sel.target else {
            return None;
        };
        let vc = self.node(val).as_component()?;
        Some(vc.args_for(sel.param).unwrap_or(&[]))
    }

    /// Render-order children of `val`.
    ///
    /// Tags yield their children, slots what they render, and components
    /// their expansion. Code components have no known expansion and yield
    /// one slot selection per param with bound arguments instead.
    #[must_use]
    pub fn get_val_children(&self, val: ValId) -> Vec<Selectable> {
        match &self.node(val).kind {
            ValKind::Tag(tag) => tag.children.iter().copied().map(Selectable::Val).collect(),
            ValKind::Slot(slot) => slot.fill.vals().iter().copied().map(Selectable::Val).collect(),
            ValKind::Component(vc) => {
                if self.site.is_code_component(vc.component) {
                    vc.slot_args
                        .iter()
                        .map(|args| SlotSelection::for_val(val, args.param).into())
                        .collect()
                } else {
                    vc.contents
                        .iter()
                        .flatten()
                        .copied()
                        .map(Selectable::Val)
                        .collect()
                }
            }
        }
    }

    /// All value nodes reachable from `root` in render order, pre-order,
    /// including `root`. Slot selections are entered but not emitted.
    #[must_use]
    pub fn flatten_vals(&self, root: ValId) -> Vec<ValId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(val) = stack.pop() {
            out.push(val);
            let children = self.get_val_children(val);
            for child in children.iter().rev() {
                match child {
                    Selectable::Val(v) => stack.push(*v),
                    Selectable::Slot(sel) => {
                        if let Some(content) = self.slot_content(sel) {
                            stack.extend(content.iter().rev().copied());
                        }
                    }
                }
            }
        }
        out
    }

    /// Returns `true` if `slot` is showing non-empty default content.
    #[must_use]
    pub fn slot_has_default_content(&self, slot: ValId) -> bool {
        self.node(slot)
            .as_slot()
            .is_some_and(|s| matches!(&s.fill, SlotFill::Default(v) if !v.is_empty()))
    }

    /// The nodes that participate in layout in place of `val`.
    ///
    /// Slots are transparent: they are replaced by what they render,
    /// recursively.
    #[must_use]
    pub fn layout_contents(&self, val: ValId) -> Vec<ValId> {
        let mut out = Vec::new();
        let mut stack = vec![val];
        while let Some(v) = stack.pop() {
            match self.node(v).as_slot() {
                Some(slot) => stack.extend(slot.fill.vals().iter().rev().copied()),
                None => out.push(v),
            }
        }
        out
    }

    /// Display label of a value node: `<slot>` for slots, else the tag or
    /// component name.
    #[must_use]
    pub fn label(&self, val: ValId) -> &'s str {
        let node = self.node(val);
        if node.is_slot() {
            return "<slot>";
        }
        self.site.tag_or_component_name(node.tpl).unwrap_or_default()
    }

    /// Returns `true` if both ids name the same logical node.
    #[must_use]
    pub fn represents_same_val_node(&self, a: ValId, b: ValId) -> bool {
        self.node(a).full_key == self.node(b).full_key
    }
}
