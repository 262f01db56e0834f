// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`SelQuery`] traversal type.

use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use smallvec::SmallVec;
use understory_val::{Selectable, SlotSelection, SlotTarget, ValId, ValKind, ValState};

/// Label used for slot selections in label paths.
pub const SLOT_SELECTION_LABEL: &str = "(slot)";

/// Errors reported by the fallible [`SelQuery`] entry points.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SelectionError {
    /// A slot selection anchored on an authored node was passed where a
    /// value-anchored one is required.
    TplSlotSelection,
    /// An operation required exactly one selected element.
    NotSingleton {
        /// How many elements were selected.
        len: usize,
    },
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TplSlotSelection => f.write_str("not expecting a tpl slot selection"),
            Self::NotSingleton { len } => {
                write!(f, "expected exactly one selected element, found {len}")
            }
        }
    }
}

impl core::error::Error for SelectionError {}

type Elems = SmallVec<[Selectable; 4]>;

/// A chainable, immutable traversal over a sequence of [`Selectable`]s.
///
/// Every operation returns a new query; neither the value tree nor the
/// receiver changes. A query runs in one of two modes:
///
/// - **Local** (the default) stays inside the authoring frame of the current
///   selection. Component instances show their bound slots as opaque
///   [`SlotSelection`]s, argument content climbs to its slot selection, and
///   parents stop at component boundaries.
/// - **Fullstack** crosses every component boundary and walks rendered
///   nodes, including slots and the expansion of component instances.
///
/// Operations that inspect "the" element ([`SelQuery::parent`],
/// [`SelQuery::children`], [`SelQuery::get`], ...) return an empty query
/// on an empty selection and panic on a selection with more than one
/// element.
#[derive(Clone, Debug)]
pub struct SelQuery<'a> {
    selection: Elems,
    state: &'a ValState<'a>,
    fullstack: bool,
}

/// Creates a local-mode query over `selection`.
///
/// Accepts anything iterable over selectables: `None`, `Some(x)`, `[x]` or a
/// `Vec`.
///
/// # Panics
///
/// Panics if `selection` contains a slot selection anchored on an authored
/// node.
pub fn sq<'a, I, S>(selection: I, state: &'a ValState<'a>) -> SelQuery<'a>
where
    I: IntoIterator<Item = S>,
    S: Into<Selectable>,
{
    SelQuery::new(selection, state, false)
}

impl<'a> SelQuery<'a> {
    /// Creates a query in the given mode.
    ///
    /// # Panics
    ///
    /// Panics if `selection` contains a slot selection anchored on an
    /// authored node. Use [`SelQuery::try_new`] to get an error instead.
    pub fn new<I, S>(selection: I, state: &'a ValState<'a>, fullstack: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Selectable>,
    {
        match Self::try_new(selection, state, fullstack) {
            Ok(query) => query,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a query, rejecting slot selections anchored on authored nodes.
    pub fn try_new<I, S>(
        selection: I,
        state: &'a ValState<'a>,
        fullstack: bool,
    ) -> Result<Self, SelectionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Selectable>,
    {
        let selection: Elems = selection.into_iter().map(Into::into).collect();
        let tpl_anchored = selection.iter().any(|s| {
            matches!(
                s,
                Selectable::Slot(SlotSelection {
                    target: SlotTarget::Tpl(_),
                    ..
                })
            )
        });
        if tpl_anchored {
            return Err(SelectionError::TplSlotSelection);
        }
        Ok(Self {
            selection,
            state,
            fullstack,
        })
    }

    /// The value tree this query walks.
    #[must_use]
    pub fn val_state(&self) -> &'a ValState<'a> {
        self.state
    }

    /// Returns `true` in fullstack mode.
    #[must_use]
    pub fn is_fullstack(&self) -> bool {
        self.fullstack
    }

    /// The same selection in the given mode.
    #[must_use]
    pub fn fullstack(&self, fullstack: bool) -> Self {
        Self {
            selection: self.selection.clone(),
            state: self.state,
            fullstack,
        }
    }

    /// A query over `selection` in this query's mode and value tree.
    #[must_use]
    pub fn wrap<I, S>(&self, selection: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Selectable>,
    {
        Self::new(selection, self.state, self.fullstack)
    }

    fn empty(&self) -> Self {
        self.wrap(None::<Selectable>)
    }

    /// Parent in the current mode.
    #[must_use]
    pub fn parent(&self) -> Self {
        if self.fullstack {
            self.parent_fullstack()
        } else {
            self.parent_local()
        }
    }

    /// Parent in render order: slot selections climb to their component,
    /// argument content to the slot rendering it.
    ///
    /// Code components render no slots, so their arguments climb to the slot
    /// selection they were passed through, as they appear among the
    /// component's fullstack children.
    #[must_use]
    pub fn parent_fullstack(&self) -> Self {
        let Some(sel) = self.single() else {
            return self.empty();
        };
        let val = match sel {
            Selectable::Slot(s) => return self.wrap(s.val()),
            Selectable::Val(val) => val,
        };
        if self.state.val2slot(val).is_none()
            && let Some(info) = self.state.val2slot_info(val)
            && self
                .state
                .node(info.val_component)
                .as_component()
                .is_some_and(|vc| self.state.site().is_code_component(vc.component))
        {
            return self.wrap([SlotSelection::for_val(info.val_component, info.param)]);
        }
        self.wrap(self.state.rendered_parent(val))
    }

    /// Parent within the current authoring frame.
    ///
    /// Argument content climbs to a fresh slot selection on the receiving
    /// instance. A component's own root has no local parent, nor does a node
    /// whose structural parent belongs to another owner.
    #[must_use]
    pub fn parent_local(&self) -> Self {
        let Some(sel) = self.single() else {
            return self.empty();
        };
        let val = match sel {
            Selectable::Slot(s) => return self.wrap(s.val()),
            Selectable::Val(val) => val,
        };
        if let Some(info) = self.state.val2slot_info(val) {
            return self.wrap([SlotSelection::for_val(info.val_component, info.param)]);
        }
        let Some(parent) = self.state.val_parent(val) else {
            return self.empty();
        };
        if self.state.node(parent).is_component()
            || self.state.val_owner(parent) != self.state.val_owner(val)
        {
            return self.empty();
        }
        self.wrap([parent])
    }

    /// Children in the current mode.
    #[must_use]
    pub fn children(&self) -> Self {
        if self.fullstack {
            self.children_fullstack()
        } else {
            self.children_local()
        }
    }

    /// Rendered children: slot selection content, or the structural children
    /// of a value node including component expansions.
    #[must_use]
    pub fn children_fullstack(&self) -> Self {
        let Some(sel) = self.single() else {
            return self.empty();
        };
        match sel {
            Selectable::Slot(s) => self.wrap(self.slot_content(&s).iter().copied()),
            Selectable::Val(val) => self.wrap(self.state.get_val_children(val)),
        }
    }

    /// Children within the current authoring frame.
    ///
    /// Component instances yield one slot selection per bound param. Slots
    /// yield only default content they are showing; substituted arguments
    /// belong to another frame.
    #[must_use]
    pub fn children_local(&self) -> Self {
        let Some(sel) = self.single() else {
            return self.empty();
        };
        let val = match sel {
            Selectable::Slot(s) => return self.wrap(self.slot_content(&s).iter().copied()),
            Selectable::Val(val) => val,
        };
        match &self.state.node(val).kind {
            ValKind::Slot(_) => {
                if self.state.slot_has_default_content(val) {
                    self.wrap(self.state.get_val_children(val))
                } else {
                    self.empty()
                }
            }
            ValKind::Component(vc) => self.wrap(
                vc.slot_args
                    .iter()
                    .map(|args| SlotSelection::for_val(val, args.param)),
            ),
            ValKind::Tag(_) => self.children_fullstack(),
        }
    }

    /// [`SelQuery::children`] with slots replaced by their layout content.
    #[must_use]
    pub fn layout_children(&self) -> Self {
        self.children().layout_content()
    }

    /// Replaces every slot and slot selection, recursively, with the layout
    /// content of its children. Other elements are kept as they are.
    #[must_use]
    pub fn layout_content(&self) -> Self {
        let mut out = Elems::new();
        let mut stack: Vec<Selectable> = self.selection.iter().rev().copied().collect();
        while let Some(sel) = stack.pop() {
            let slotlike = match sel {
                Selectable::Slot(_) => true,
                Selectable::Val(val) => self.state.node(val).is_slot(),
            };
            if slotlike {
                let children = self.wrap([sel]).children();
                stack.extend(children.selection.iter().rev().copied());
            } else {
                out.push(sel);
            }
        }
        self.wrap(out)
    }

    /// The nearest tag ancestor, skipping slots and component instances.
    #[must_use]
    pub fn layout_parent(&self) -> Self {
        self.parents()
            .val_nodes()
            .into_iter()
            .find(|val| self.state.node(*val).is_tag())
            .map_or_else(|| self.empty(), |val| self.wrap([val]))
    }

    /// Pre-order walk in the current mode, each element included.
    #[must_use]
    pub fn descendants_dfs(&self) -> Self {
        if self.fullstack {
            self.descendants_dfs_fullstack()
        } else {
            self.descendants_dfs_local()
        }
    }

    /// Pre-order walk using local children.
    #[must_use]
    pub fn descendants_dfs_local(&self) -> Self {
        self.descendants_with(Self::children_local)
    }

    /// Pre-order walk using fullstack children.
    #[must_use]
    pub fn descendants_dfs_fullstack(&self) -> Self {
        self.descendants_with(Self::children_fullstack)
    }

    fn descendants_with(&self, children: impl Fn(&Self) -> Self) -> Self {
        let mut out = Elems::new();
        let mut stack: Vec<Selectable> = self.selection.iter().rev().copied().collect();
        while let Some(sel) = stack.pop() {
            out.push(sel);
            let kids = children(&self.wrap([sel]));
            stack.extend(kids.selection.iter().rev().copied());
        }
        self.wrap(out)
    }

    /// First child in the current mode.
    #[must_use]
    pub fn first_child(&self) -> Self {
        self.children().first()
    }

    /// The first element.
    #[must_use]
    pub fn first(&self) -> Self {
        self.at(0)
    }

    /// The last element.
    #[must_use]
    pub fn last(&self) -> Self {
        self.wrap(self.selection.last().copied())
    }

    /// The element at `index`, or an empty query.
    #[must_use]
    pub fn at(&self, index: usize) -> Self {
        self.wrap(self.selection.get(index).copied())
    }

    /// The next sibling under the current mode's parent.
    #[must_use]
    pub fn next(&self) -> Self {
        self.sibling(1)
    }

    /// The previous sibling under the current mode's parent.
    #[must_use]
    pub fn prev(&self) -> Self {
        self.sibling(-1)
    }

    fn sibling(&self, offset: isize) -> Self {
        let parent = self.parent();
        if parent.is_empty() {
            return parent;
        }
        let cur = self.get();
        let siblings = parent.children();
        siblings
            .selection
            .iter()
            .position(|s| *s == cur)
            .and_then(|pos| pos.checked_add_signed(offset))
            .map_or_else(|| self.empty(), |pos| siblings.at(pos))
    }

    /// Returns `true` if nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    /// Number of selected elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.selection.len()
    }

    /// The only element.
    ///
    /// # Panics
    ///
    /// Panics unless exactly one element is selected.
    #[must_use]
    pub fn get(&self) -> Selectable {
        match self.try_only() {
            Ok(sel) => sel,
            Err(err) => panic!("{err}"),
        }
    }

    /// The first element, if any.
    #[must_use]
    pub fn try_get(&self) -> Option<Selectable> {
        self.selection.first().copied()
    }

    /// The only element, or an error naming how many there are.
    pub fn try_only(&self) -> Result<Selectable, SelectionError> {
        match self.selection.as_slice() {
            [only] => Ok(*only),
            other => Err(SelectionError::NotSingleton { len: other.len() }),
        }
    }

    /// `None` when empty, the element when single.
    ///
    /// # Panics
    ///
    /// Panics on more than one element.
    fn single(&self) -> Option<Selectable> {
        if self.is_empty() {
            None
        } else {
            Some(self.get())
        }
    }

    /// The selected elements.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Selectable> {
        self.selection.to_vec()
    }

    /// The selected value nodes, dropping slot selections.
    #[must_use]
    pub fn val_nodes(&self) -> Vec<ValId> {
        self.selection.iter().filter_map(Selectable::as_val).collect()
    }

    /// Iterates the selected elements.
    pub fn iter(&self) -> impl Iterator<Item = Selectable> + '_ {
        self.selection.iter().copied()
    }

    /// The element followed by its ancestors in the current mode, bottom-up.
    #[must_use]
    pub fn ancestors(&self) -> Self {
        let mut out = Elems::new();
        let mut current = self.clone();
        while !current.is_empty() {
            out.push(current.get());
            current = current.parent();
        }
        self.wrap(out)
    }

    /// [`SelQuery::ancestors`] without the element itself.
    #[must_use]
    pub fn parents(&self) -> Self {
        self.wrap(self.ancestors().selection.iter().skip(1).copied())
    }

    /// Returns `true` if the only element equals `other`.
    ///
    /// # Panics
    ///
    /// Panics unless exactly one element is selected.
    #[must_use]
    pub fn is(&self, other: Selectable) -> bool {
        self.get() == other
    }

    /// Follows a label path produced by [`SelQuery::labels_path`] down from
    /// the current element.
    ///
    /// An unparsable path selects nothing.
    #[must_use]
    pub fn select_by_labels(&self, path: &str) -> Self {
        let mut current = self.clone();
        for part in path.split_whitespace() {
            let (label, ordinal) = part.rsplit_once(':').unwrap_or((part, "0"));
            let Ok(ordinal) = ordinal.parse::<usize>() else {
                tracing::debug!(path, part, "unparsable label path part");
                return self.empty();
            };
            let children = current.children();
            let found = children
                .iter()
                .filter(|child| escape_label(self.label(*child)) == label)
                .nth(ordinal);
            current = self.wrap(found);
        }
        current
    }

    /// Follows child indexes down from the current element.
    #[must_use]
    pub fn select_by_indexes(&self, indexes: &[usize]) -> Self {
        indexes
            .iter()
            .fold(self.clone(), |current, &index| current.children().at(index))
    }

    /// Child positions leading from the topmost ancestor down to the element.
    ///
    /// `None` if some step is not among its parent's children.
    #[must_use]
    pub fn index_path(&self) -> Option<Vec<usize>> {
        self.path_steps()
            .into_iter()
            .map(|(sel, siblings)| siblings.iter().position(|s| *s == sel))
            .collect()
    }

    /// Space-separated `label:ordinal` parts leading from the topmost
    /// ancestor down to the element. Ordinals count siblings sharing the
    /// label.
    ///
    /// Whitespace, `:` and `%` inside a label are written as `%XX` escapes of
    /// their UTF-8 bytes, so every part holds exactly one unescaped `:`.
    #[must_use]
    pub fn labels_path(&self) -> Option<String> {
        let parts = self
            .path_steps()
            .into_iter()
            .map(|(sel, siblings)| {
                let label = self.label(sel);
                let ordinal = siblings
                    .iter()
                    .filter(|s| self.label(**s) == label)
                    .position(|s| *s == sel)?;
                Some(format!("{}:{ordinal}", escape_label(label)))
            })
            .collect::<Option<Vec<String>>>()?;
        Some(parts.join(" "))
    }

    /// Each ancestor below the top, top-down, paired with its parent's children.
    fn path_steps(&self) -> Vec<(Selectable, Vec<Selectable>)> {
        let ancestors = self.ancestors();
        ancestors
            .selection
            .iter()
            .rev()
            .skip(1)
            .map(|sel| (*sel, self.wrap([*sel]).parent().children().to_vec()))
            .collect()
    }

    /// Display label used by label paths.
    #[must_use]
    pub fn label(&self, sel: Selectable) -> &'a str {
        match sel {
            Selectable::Val(val) => self.state.label(val),
            Selectable::Slot(_) => SLOT_SELECTION_LABEL,
        }
    }

    /// Enclosing component instances, bottom-up, excluding the element
    /// itself and the system root.
    #[must_use]
    pub fn owners(&self) -> Self {
        self.wrap(self.owners_array_up())
    }

    /// [`SelQuery::owners`] as plain ids.
    #[must_use]
    pub fn owners_array_up(&self) -> Vec<ValId> {
        match self.single().and_then(|sel| sel.anchor_val()) {
            Some(val) => self.state.val_owners(val),
            None => Vec::new(),
        }
    }

    /// Depth of the element's authoring frame below the system root.
    #[must_use]
    pub fn frame_num(&self) -> usize {
        self.owners_array_up().len()
    }

    /// Value nodes one level down, looking through one layer of slot
    /// selections.
    #[must_use]
    pub fn val_children(&self) -> Self {
        let children = self.children();
        match children.try_get() {
            None => children,
            Some(Selectable::Slot(_)) => {
                let mut out = Elems::new();
                for child in children.iter() {
                    out.extend(self.wrap([child]).children().iter());
                }
                self.wrap(out)
            }
            Some(Selectable::Val(_)) => children,
        }
    }

    fn slot_content(&self, sel: &SlotSelection) -> &'a [ValId] {
        self.state.slot_content(sel).unwrap_or(&[])
    }
}

fn needs_escape(c: char) -> bool {
    c == '%' || c == ':' || c.is_whitespace()
}

/// Escapes a label for use as one label path part.
fn escape_label(label: &str) -> Cow<'_, str> {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    if !label.contains(needs_escape) {
        return Cow::Borrowed(label);
    }
    let mut out = String::with_capacity(label.len() + 8);
    let mut buf = [0_u8; 4];
    for c in label.chars() {
        if !needs_escape(c) {
            out.push(c);
            continue;
        }
        for &byte in c.encode_utf8(&mut buf).as_bytes() {
            out.push('%');
            out.push(char::from(HEX[usize::from(byte >> 4)]));
            out.push(char::from(HEX[usize::from(byte & 0xF)]));
        }
    }
    Cow::Owned(out)
}
