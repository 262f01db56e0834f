// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the authored model: identifiers, node variants and component definitions.

use alloc::string::String;
use alloc::vec::Vec;

/// Identifier for an authored node in a [`Site`](crate::Site).
///
/// Handles are plain arena indices. The authored model only grows while a
/// value tree is built from it, so a `TplId` never dangles within a site.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TplId(pub(crate) u32);

impl TplId {
    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw numeric id.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// Identifier for a [`Component`] definition.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ComponentId(pub(crate) u32);

impl ComponentId {
    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Identifier for a slot [`Param`] declared by a component.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ParamId(pub(crate) u32);

impl ParamId {
    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw numeric id.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// An authored node.
#[derive(Clone, Debug)]
pub struct TplNode {
    /// Stable identity, unique within the site.
    pub uuid: String,
    /// Parent within the authored tree.
    ///
    /// Argument contents of a component instance have that instance as parent.
    /// Tree roots have no parent.
    pub parent: Option<TplId>,
    /// Explicit lock state. `None` inherits from the nearest ancestor that sets one.
    pub locked: Option<bool>,
    /// The node variant.
    pub kind: TplKind,
}

/// Authored node variants.
#[derive(Clone, Debug)]
pub enum TplKind {
    /// A plain element.
    Tag(TplTag),
    /// An instantiation of a component.
    Component(TplComponent),
    /// A slot placeholder inside a component's own tree.
    Slot(TplSlot),
}

/// What kind of element a [`TplTag`] renders.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TagType {
    /// A generic element such as a `div`.
    #[default]
    Element,
    /// A text run.
    Text,
    /// An image.
    Image,
}

/// A plain element node.
#[derive(Clone, Debug, Default)]
pub struct TplTag {
    /// Element tag name, e.g. `div`.
    pub tag: String,
    /// Element kind.
    pub tag_type: TagType,
    /// Whether the node carries any styles of its own.
    pub styled: bool,
    /// Child nodes in render order.
    pub children: Vec<TplId>,
}

/// A component instantiation site.
#[derive(Clone, Debug)]
pub struct TplComponent {
    /// The instantiated component.
    pub component: ComponentId,
    /// Slot arguments passed at this call site, in declaration order.
    pub args: Vec<SlotArg>,
}

impl TplComponent {
    /// Returns the argument contents for `param`, if any were passed.
    #[must_use]
    pub fn arg(&self, param: ParamId) -> Option<&[TplId]> {
        self.args
            .iter()
            .find(|arg| arg.param == param)
            .map(|arg| arg.contents.as_slice())
    }
}

/// Argument content passed to one slot param at a call site.
#[derive(Clone, Debug)]
pub struct SlotArg {
    /// The slot param receiving the content.
    pub param: ParamId,
    /// Root nodes of the argument content.
    pub contents: Vec<TplId>,
}

/// A slot placeholder.
#[derive(Clone, Debug)]
pub struct TplSlot {
    /// The param this slot renders.
    pub param: ParamId,
    /// Content rendered when no argument is passed.
    pub default_contents: Vec<TplId>,
}

bitflags::bitflags! {
    /// Behavioral flags of a component definition.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ComponentFlags: u8 {
        /// Rendered by host code; its internals are not part of the authored model.
        const CODE        = 0b0000_0001;
        /// A non-visual code component that only provides context to its slots.
        const CONTEXT     = 0b0000_0010;
        /// Selection stops at instances of this component until explicitly entered.
        const TRAPS_FOCUS = 0b0000_0100;
    }
}

/// A reusable component definition.
#[derive(Clone, Debug)]
pub struct Component {
    /// Display name, also used as the selection label of its instances.
    pub name: String,
    /// Declared slot params.
    pub params: Vec<ParamId>,
    /// Root of the component's own tree, if it has one.
    pub tpl_tree: Option<TplId>,
    /// Behavioral flags.
    pub flags: ComponentFlags,
}

/// A slot param declared by a component.
#[derive(Clone, Debug)]
pub struct Param {
    /// Param name.
    pub name: String,
    /// The declaring component.
    pub component: ComponentId,
    /// Argument content is treated as part of the owning instance for selection.
    pub merge_with_parent: bool,
}
