// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`FocusHeuristics`] selection policy.

use alloc::vec::Vec;

use understory_sel_query::{get_focus_trapping_ancestor, get_unlocked_ancestor, sq};
use understory_tpl::{Site, TplId, TplMgr};
use understory_val::{Selectable, SlotSelection, ValId, ValState};

/// The component instance whose internals are being edited.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentCtx {
    val_component: ValId,
}

impl ComponentCtx {
    /// Creates a context for editing `val_component`.
    #[must_use]
    pub const fn new(val_component: ValId) -> Self {
        Self { val_component }
    }

    /// The component instance being edited.
    #[must_use]
    pub const fn val_component(&self) -> ValId {
        self.val_component
    }
}

/// Options for [`FocusHeuristics::best_focus_val_target`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FocusOptions {
    /// Locked nodes may be selected.
    pub allow_locked: bool,
    /// Skip focus-trap promotion.
    pub deep_select: bool,
    /// The current selection, used to drill into focus traps.
    pub cur_focused: Option<Selectable>,
    /// Return the raw target without display heuristics.
    pub exact: bool,
}

/// Outcome of a focus decision.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FocusResult {
    /// Component context to edit in; `None` is the top level.
    pub component_ctx: Option<ComponentCtx>,
    /// What to select; `None` selects nothing.
    pub focus_target: Option<Selectable>,
}

impl FocusResult {
    const NOTHING: Self = Self {
        component_ctx: None,
        focus_target: None,
    };
}

/// Request to switch component contexts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ContainerSwitch {
    /// The context to enter; `None` is the top level.
    pub container: Option<ValId>,
}

/// Decides what a click on a rendered node should select.
///
/// Selection follows the nesting of component contexts. From the current
/// context, a click selects the next component one level deeper on the way
/// to the clicked node, or the node itself when it lives directly in the
/// current context. Clicking argument content that a slot of the current
/// context renders selects that slot instead, unless default slot content is
/// being shown for the context.
///
/// The current context and the default-content flag are explicit state of
/// each instance.
#[derive(Debug)]
pub struct FocusHeuristics<'a, M: TplMgr + ?Sized> {
    site: &'a Site,
    tpl_mgr: &'a M,
    val_state: &'a ValState<'a>,
    current_component_ctx: Option<ComponentCtx>,
    showing_default_slot_contents: bool,
}

impl<'a, M: TplMgr + ?Sized> FocusHeuristics<'a, M> {
    /// Creates the policy for one value tree and editing context.
    pub fn new(
        site: &'a Site,
        tpl_mgr: &'a M,
        val_state: &'a ValState<'a>,
        current_component_ctx: Option<ComponentCtx>,
        showing_default_slot_contents: bool,
    ) -> Self {
        Self {
            site,
            tpl_mgr,
            val_state,
            current_component_ctx,
            showing_default_slot_contents,
        }
    }

    /// The current component context.
    #[must_use]
    pub fn current_component_ctx(&self) -> Option<ComponentCtx> {
        self.current_component_ctx
    }

    /// Like [`FocusHeuristics::best_focus_val_target`], for any selectable.
    ///
    /// A slot selection is resolved through its component instance; when
    /// that instance is the answer, the slot selection is returned instead.
    ///
    /// # Panics
    ///
    /// Panics on a slot selection anchored on an authored node.
    #[must_use]
    pub fn best_focus_target(&self, focus: Selectable, opts: &FocusOptions) -> FocusResult {
        match focus {
            Selectable::Val(val) => self.best_focus_val_target(val, opts),
            Selectable::Slot(sel) => {
                let Some(val) = sel.val() else {
                    panic!("expected a value node in the slot selection");
                };
                let mut result = self.best_focus_val_target(val, opts);
                if result.focus_target == Some(Selectable::Val(val)) {
                    result.focus_target = Some(Selectable::Slot(sel));
                }
                result
            }
        }
    }

    /// Enclosing component instances of `val`, bottom-up, without the
    /// system root.
    #[must_use]
    pub fn parent_components(&self, val: ValId) -> Vec<ValId> {
        self.val_state.val_owners(val)
    }

    /// Decides what a click on `val` selects.
    #[must_use]
    pub fn best_focus_val_target(&self, val: ValId, opts: &FocusOptions) -> FocusResult {
        let state = self.val_state;
        if state.maybe_val_user_root().is_none()
            || state.val_owner(val).is_none()
            || state.node(val).detached
        {
            tracing::trace!(val = val.as_u32(), "node is not selectable");
            return FocusResult::NOTHING;
        }

        let current = self.current_val_component();
        if let Some(slot) = state.slot_containing_substituted_arg(val, current)
            && !self.showing_default_slot_contents_for(state.node(current).tpl)
        {
            tracing::trace!(val = val.as_u32(), "focus limited to slot");
            return FocusResult {
                component_ctx: self.current_component_ctx,
                focus_target: Some(slot.into()),
            };
        }

        // Both stacks are top-down.
        let mut current_stack = self.parent_components(current);
        current_stack.reverse();
        current_stack.push(current);
        let mut new_stack = self.parent_components(val);
        new_stack.reverse();

        let mut common = 0;
        while common < current_stack.len()
            && common < new_stack.len()
            && current_stack[common] == new_stack[common]
        {
            common += 1;
        }

        let component_ctx = common
            .checked_sub(1)
            .map(|last| ComponentCtx::new(new_stack[last]));
        if component_ctx != self.current_component_ctx {
            tracing::trace!(
                from = self.current_component_ctx.map(|c| c.val_component.as_u32()),
                to = component_ctx.map(|c| c.val_component.as_u32()),
                "component context changes"
            );
        }

        let raw = new_stack.get(common).copied().unwrap_or(val);
        let mut focus_target = Selectable::Val(raw);
        // A slot clicked from outside its freshly entered component is
        // selected as a slot position.
        if let Some(slot) = state.node(val).as_slot()
            && state.node(raw).is_component()
            && new_stack.last() == Some(&raw)
        {
            focus_target = SlotSelection::for_val(raw, slot.param).into();
        }

        if opts.exact {
            return FocusResult {
                component_ctx,
                focus_target: Some(focus_target),
            };
        }

        if let Selectable::Val(target) = focus_target
            && let Some(parent) = self.site.tpl(state.node(target).tpl).parent
            && self.site.is_plain_text_tpl_slot(parent)
            && !self.site.is_code_component_slot(parent)
        {
            tracing::trace!(val = target.as_u32(), "promoting text to its slot");
            if let Some(parent) = sq([target], state).parent().try_get() {
                focus_target = parent;
            }
        }

        let mut focus_target = Some(focus_target);
        if !opts.allow_locked {
            focus_target = focus_target.and_then(|target| {
                let unlocked = get_unlocked_ancestor(target, state);
                if unlocked != Some(target) {
                    tracing::trace!("promoting locked target");
                }
                unlocked
            });
        }

        if !opts.deep_select {
            focus_target = focus_target.map(|target| {
                let trapped = get_focus_trapping_ancestor(target, state, opts.cur_focused);
                if trapped != target {
                    tracing::trace!("promoting to focus trap");
                }
                trapped
            });
        }

        if let Some(Selectable::Val(target)) = focus_target
            && let Some(vc) = state.node(target).as_component()
            && self.site.is_context_code_component(vc.component)
        {
            tracing::trace!(val = target.as_u32(), "context component is not selectable");
            focus_target = None;
        }

        FocusResult {
            component_ctx,
            focus_target,
        }
    }

    /// Which context a double click on `focus` should enter.
    ///
    /// # Panics
    ///
    /// Panics on a slot selection anchored on an authored node, and under
    /// the same conditions as
    /// [`FocusHeuristics::containing_component_within_current_component_ctx_for_val`].
    #[must_use]
    pub fn containing_component_within_current_component_ctx(
        &self,
        focus: Selectable,
    ) -> Option<ContainerSwitch> {
        let Some(val) = focus.anchor_val() else {
            panic!("expected a value node in the slot selection");
        };
        self.containing_component_within_current_component_ctx_for_val(val)
    }

    /// Which context a double click on `val` should enter.
    ///
    /// Returns `None` to stay in the current context, or a switch to the
    /// outermost site-owned component that contains `val` below the current
    /// context. Argument content rendered by a slot of the current context
    /// pops exactly one level, to the current context's own owner, rather
    /// than jumping to the content's true owner.
    ///
    /// # Panics
    ///
    /// Panics if `val` is neither inside the current context nor argument
    /// content rendered by one of its slots.
    #[must_use]
    pub fn containing_component_within_current_component_ctx_for_val(
        &self,
        val: ValId,
    ) -> Option<ContainerSwitch> {
        let state = self.val_state;
        let current = self.current_component_ctx.map(|ctx| ctx.val_component);
        if let Some(current) = current
            && let Some(slot) = state.val_slot_containing_substituted_arg(val, current)
            && !state.slot_has_default_content(slot)
        {
            return Some(ContainerSwitch {
                container: self.parent_components(current).first().copied(),
            });
        }

        // Top-down.
        let mut parents = self.parent_components(val);
        parents.reverse();
        let below_current = match current {
            None => &parents[..],
            Some(current) => {
                let Some(pos) = parents.iter().position(|p| *p == current) else {
                    panic!("expected the current component in the component stack");
                };
                &parents[pos + 1..]
            }
        };
        if below_current.is_empty() {
            return None;
        }
        let container = below_current.iter().copied().find(|v| {
            state
                .node(*v)
                .as_component()
                .is_some_and(|vc| self.tpl_mgr.is_owned_by_site(vc.component))
        });
        Some(ContainerSwitch { container })
    }

    fn showing_default_slot_contents_for(&self, tpl: TplId) -> bool {
        let state = self.val_state;
        if tpl == state.node(state.val_sys_root()).tpl {
            return true;
        }
        self.showing_default_slot_contents && state.node(self.current_val_component()).tpl == tpl
    }

    fn current_val_component(&self) -> ValId {
        self.current_component_ctx
            .map_or(self.val_state.val_sys_root(), |ctx| ctx.val_component)
    }
}
