// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value node types.

use alloc::string::String;
use alloc::vec::Vec;

use understory_tpl::{ComponentId, ParamId, TplId};

/// Identifier for a node in a [`ValState`](crate::ValState).
///
/// Ids are arena indices assigned in build order. Rebuilding from the same
/// authored trees assigns the same ids, but callers that persist a selection
/// across rebuilds should go through [`ValNode::full_key`] instead.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ValId(pub(crate) u32);

impl ValId {
    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw numeric id.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// An instantiated node.
#[derive(Clone, Debug)]
pub struct ValNode {
    /// The authored node this instantiates.
    pub tpl: TplId,
    /// Local key; unique among siblings produced by the same owner.
    pub key: String,
    /// Path-addressable key; unique within the whole value tree.
    pub full_key: String,
    /// Rendered outside the canvas stack; never selectable.
    pub detached: bool,
    /// The node variant.
    pub kind: ValKind,
}

/// Value node variants.
#[derive(Clone, Debug)]
pub enum ValKind {
    /// Instantiation of a tag.
    Tag(ValTag),
    /// Instantiation of a component instance.
    Component(ValComponent),
    /// Instantiation of a slot inside a component's own expansion.
    Slot(ValSlot),
}

/// An instantiated element.
#[derive(Clone, Debug, Default)]
pub struct ValTag {
    /// Structural children.
    pub children: Vec<ValId>,
}

/// An instantiated component.
#[derive(Clone, Debug)]
pub struct ValComponent {
    /// The instantiated component definition.
    pub component: ComponentId,
    /// Argument nodes per slot param, for every param with content bound.
    pub slot_args: Vec<SlotArgs>,
    /// Roots of the component's own expansion.
    ///
    /// `None` when the internals are not known: code components, and a
    /// system root that has not rendered yet.
    pub contents: Option<Vec<ValId>>,
}

impl ValComponent {
    /// Returns the argument nodes bound to `param`, if any.
    #[must_use]
    pub fn args_for(&self, param: ParamId) -> Option<&[ValId]> {
        self.slot_args
            .iter()
            .find(|args| args.param == param)
            .map(|args| args.vals.as_slice())
    }
}

/// Argument nodes bound to one slot param.
#[derive(Clone, Debug)]
pub struct SlotArgs {
    /// The slot param.
    pub param: ParamId,
    /// Top nodes of the argument content.
    pub vals: Vec<ValId>,
}

/// An instantiated slot.
#[derive(Clone, Debug)]
pub struct ValSlot {
    /// The slot param rendered here.
    pub param: ParamId,
    /// What the slot currently shows.
    pub fill: SlotFill,
}

/// Content of a [`ValSlot`].
///
/// A slot shows either its own default content or substituted arguments,
/// never both.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SlotFill {
    /// Nothing is rendered.
    #[default]
    Empty,
    /// The component's own default content, owned by the component.
    Default(Vec<ValId>),
    /// Argument content from the call site, owned by the call site.
    Args(Vec<ValId>),
}

impl SlotFill {
    /// Returns the rendered nodes regardless of where they came from.
    #[must_use]
    pub fn vals(&self) -> &[ValId] {
        match self {
            Self::Empty => &[],
            Self::Default(vals) | Self::Args(vals) => vals,
        }
    }
}

impl ValNode {
    /// Returns `true` for a tag node.
    #[must_use]
    pub fn is_tag(&self) -> bool {
        matches!(self.kind, ValKind::Tag(_))
    }

    /// Returns `true` for a component node.
    #[must_use]
    pub fn is_component(&self) -> bool {
        matches!(self.kind, ValKind::Component(_))
    }

    /// Returns `true` for a slot node.
    #[must_use]
    pub fn is_slot(&self) -> bool {
        matches!(self.kind, ValKind::Slot(_))
    }

    /// Returns the component data of a component node.
    #[must_use]
    pub fn as_component(&self) -> Option<&ValComponent> {
        match &self.kind {
            ValKind::Component(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the slot data of a slot node.
    #[must_use]
    pub fn as_slot(&self) -> Option<&ValSlot> {
        match &self.kind {
            ValKind::Slot(s) => Some(s),
            _ => None,
        }
    }
}
