// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selectable handles: value nodes and slot selections.

use alloc::format;
use alloc::string::String;

use understory_tpl::{ParamId, TplId};

use crate::{ValId, ValState};

/// What a [`SlotSelection`] is anchored on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlotTarget {
    /// A value component instance.
    Val(ValId),
    /// An authored component instance, before it has been instantiated.
    Tpl(TplId),
}

/// A virtual handle naming one slot param of one component instance.
///
/// Slot selections let a user select "the `body` arg of this card" even when
/// the argument content is empty or spread over several top-level nodes.
/// Equality is structural: two selections are equal when they name the same
/// target and the same param.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SlotSelection {
    /// The component instance the slot belongs to.
    pub target: SlotTarget,
    /// The slot param.
    pub param: ParamId,
}

impl SlotSelection {
    /// Creates a slot selection anchored on a value component.
    #[must_use]
    pub const fn for_val(val: ValId, param: ParamId) -> Self {
        Self {
            target: SlotTarget::Val(val),
            param,
        }
    }

    /// Creates a slot selection anchored on an authored component instance.
    #[must_use]
    pub const fn for_tpl(tpl: TplId, param: ParamId) -> Self {
        Self {
            target: SlotTarget::Tpl(tpl),
            param,
        }
    }

    /// Returns the value component when anchored on one.
    #[must_use]
    pub const fn val(&self) -> Option<ValId> {
        match self.target {
            SlotTarget::Val(val) => Some(val),
            SlotTarget::Tpl(_) => None,
        }
    }

    /// Returns the authored component instance the selection refers to.
    #[must_use]
    pub fn tpl(&self, state: &ValState<'_>) -> TplId {
        match self.target {
            SlotTarget::Val(val) => state.node(val).tpl,
            SlotTarget::Tpl(tpl) => tpl,
        }
    }
}

/// Anything the user can select.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Selectable {
    /// A value node.
    Val(ValId),
    /// A slot of a component instance.
    Slot(SlotSelection),
}

impl Selectable {
    /// Returns the value node, if this is one.
    #[must_use]
    pub const fn as_val(&self) -> Option<ValId> {
        match self {
            Self::Val(val) => Some(*val),
            Self::Slot(_) => None,
        }
    }

    /// Returns the slot selection, if this is one.
    #[must_use]
    pub const fn as_slot(&self) -> Option<SlotSelection> {
        match self {
            Self::Val(_) => None,
            Self::Slot(sel) => Some(*sel),
        }
    }

    /// Returns the value node itself, or the component instance a slot
    /// selection is anchored on.
    #[must_use]
    pub const fn anchor_val(&self) -> Option<ValId> {
        match self {
            Self::Val(val) => Some(*val),
            Self::Slot(sel) => sel.val(),
        }
    }
}

impl From<ValId> for Selectable {
    fn from(val: ValId) -> Self {
        Self::Val(val)
    }
}

impl From<SlotSelection> for Selectable {
    fn from(sel: SlotSelection) -> Self {
        Self::Slot(sel)
    }
}

/// Key of a slot selection, derived from its component's key and param name.
///
/// Returns `None` for selections not anchored on a value node.
#[must_use]
pub fn make_slot_selection_key(sel: &SlotSelection, state: &ValState<'_>) -> Option<String> {
    let val = sel.val()?;
    Some(slot_key(&state.node(val).key, sel.param, state))
}

/// Full key of a slot selection. Unique within the value tree.
///
/// Returns `None` for selections not anchored on a value node.
#[must_use]
pub fn make_slot_selection_full_key(sel: &SlotSelection, state: &ValState<'_>) -> Option<String> {
    let val = sel.val()?;
    Some(slot_key(&state.node(val).full_key, sel.param, state))
}

fn slot_key(base: &str, param: ParamId, state: &ValState<'_>) -> String {
    format!("{base}~{}", state.site().param(param).name)
}
