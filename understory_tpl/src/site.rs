// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Site`] arena: construction helpers and read-only model predicates.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};

use crate::types::{
    Component, ComponentFlags, ComponentId, Param, ParamId, SlotArg, TagType, TplComponent,
    TplId, TplKind, TplNode, TplSlot, TplTag,
};

/// Ownership queries over components.
///
/// Editors can only enter components that the current site owns; components
/// imported from dependencies are opaque.
pub trait TplMgr {
    /// Returns `true` if `component` is defined by this site rather than imported.
    fn is_owned_by_site(&self, component: ComponentId) -> bool;
}

/// Owns every authored node, component and slot param of a project.
///
/// Constructors wire parent pointers as nodes are composed, so trees are
/// built bottom-up:
///
/// ```rust
/// use understory_tpl::Site;
///
/// let mut site = Site::new();
/// let card = site.add_component("Card");
/// let body = site.add_slot_param(card, "body");
/// let slot = site.slot(body, []);
/// let root = site.tag("div", [slot]);
/// site.set_tpl_tree(card, root);
///
/// let content = site.tag("div", []);
/// let instance = site.instance(card, [(body, [content])]);
/// assert_eq!(site.tpl(content).parent, Some(instance));
/// assert_eq!(site.tag_or_component_name(instance), Some("Card"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Site {
    tpls: Vec<TplNode>,
    components: Vec<Component>,
    params: Vec<Param>,
    imported: HashSet<ComponentId>,
    tree_owners: HashMap<TplId, ComponentId>,
}

impl Site {
    /// Creates an empty site.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a component owned by this site.
    pub fn add_component(&mut self, name: impl Into<String>) -> ComponentId {
        let id = ComponentId(index_u32(self.components.len()));
        self.components.push(Component {
            name: name.into(),
            params: Vec::new(),
            tpl_tree: None,
            flags: ComponentFlags::empty(),
        });
        id
    }

    /// Defines a component imported from a dependency.
    pub fn add_imported_component(&mut self, name: impl Into<String>) -> ComponentId {
        let id = self.add_component(name);
        self.imported.insert(id);
        id
    }

    /// Replaces the flags of `component`.
    pub fn set_component_flags(&mut self, component: ComponentId, flags: ComponentFlags) {
        self.components[component.idx()].flags = flags;
    }

    /// Declares a new slot param on `component`.
    pub fn add_slot_param(&mut self, component: ComponentId, name: impl Into<String>) -> ParamId {
        let id = ParamId(index_u32(self.params.len()));
        self.params.push(Param {
            name: name.into(),
            component,
            merge_with_parent: false,
        });
        self.components[component.idx()].params.push(id);
        id
    }

    /// Marks whether argument content of `param` merges with its owning instance.
    pub fn set_merge_with_parent(&mut self, param: ParamId, merge: bool) {
        self.params[param.idx()].merge_with_parent = merge;
    }

    /// Sets the root of `component`'s own tree.
    ///
    /// # Panics
    ///
    /// Panics if `root` already has a parent.
    pub fn set_tpl_tree(&mut self, component: ComponentId, root: TplId) {
        assert!(
            self.tpls[root.idx()].parent.is_none(),
            "component tree root must not have a parent"
        );
        if let Some(old) = self.components[component.idx()].tpl_tree.replace(root) {
            self.tree_owners.remove(&old);
        }
        self.tree_owners.insert(root, component);
    }

    /// Creates an element node with the given children.
    pub fn tag(&mut self, tag: &str, children: impl IntoIterator<Item = TplId>) -> TplId {
        self.push_tag(tag, TagType::Element, children.into_iter().collect())
    }

    /// Creates an unstyled text node.
    pub fn text(&mut self) -> TplId {
        self.push_tag("div", TagType::Text, Vec::new())
    }

    /// Creates an image node.
    pub fn image(&mut self) -> TplId {
        self.push_tag("img", TagType::Image, Vec::new())
    }

    /// Creates a slot placeholder for `param` with the given default contents.
    pub fn slot(&mut self, param: ParamId, default_contents: impl IntoIterator<Item = TplId>) -> TplId {
        let default_contents: Vec<TplId> = default_contents.into_iter().collect();
        let id = self.push(TplKind::Slot(TplSlot {
            param,
            default_contents: default_contents.clone(),
        }));
        for child in default_contents {
            self.adopt(child, id);
        }
        id
    }

    /// Creates an instance of `component` passing `args` as slot arguments.
    pub fn instance<I, C>(&mut self, component: ComponentId, args: I) -> TplId
    where
        I: IntoIterator<Item = (ParamId, C)>,
        C: IntoIterator<Item = TplId>,
    {
        let args: Vec<SlotArg> = args
            .into_iter()
            .map(|(param, contents)| SlotArg {
                param,
                contents: contents.into_iter().collect(),
            })
            .collect();
        let children: Vec<TplId> = args
            .iter()
            .flat_map(|arg| arg.contents.iter().copied())
            .collect();
        let id = self.push(TplKind::Component(TplComponent { component, args }));
        for child in children {
            self.adopt(child, id);
        }
        id
    }

    /// Creates an instance of `component` without slot arguments.
    pub fn instance_of(&mut self, component: ComponentId) -> TplId {
        self.push(TplKind::Component(TplComponent {
            component,
            args: Vec::new(),
        }))
    }

    /// Sets the explicit lock state of `tpl`.
    pub fn set_locked(&mut self, tpl: TplId, locked: Option<bool>) {
        self.tpls[tpl.idx()].locked = locked;
    }

    /// Marks whether a tag node carries styles of its own.
    pub fn set_styled(&mut self, tpl: TplId, styled: bool) {
        if let TplKind::Tag(tag) = &mut self.tpls[tpl.idx()].kind {
            tag.styled = styled;
        }
    }

    /// Returns the node for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this site.
    #[must_use]
    pub fn tpl(&self, id: TplId) -> &TplNode {
        &self.tpls[id.idx()]
    }

    /// Returns the component definition for `id`.
    #[must_use]
    pub fn component(&self, id: ComponentId) -> &Component {
        &self.components[id.idx()]
    }

    /// Returns the slot param for `id`.
    #[must_use]
    pub fn param(&self, id: ParamId) -> &Param {
        &self.params[id.idx()]
    }

    /// Returns the number of authored nodes.
    #[must_use]
    pub fn tpl_count(&self) -> usize {
        self.tpls.len()
    }

    /// Tag name of an element or display name of an instantiated component.
    ///
    /// Slots have no such name.
    #[must_use]
    pub fn tag_or_component_name(&self, tpl: TplId) -> Option<&str> {
        match &self.tpl(tpl).kind {
            TplKind::Tag(tag) => Some(tag.tag.as_str()),
            TplKind::Component(c) => Some(self.component(c.component).name.as_str()),
            TplKind::Slot(_) => None,
        }
    }

    /// Returns the ancestors of `tpl`, top-down, ending with `tpl` itself.
    ///
    /// Argument contents continue into their call site.
    #[must_use]
    pub fn ancestors(&self, tpl: TplId) -> Vec<TplId> {
        let mut out = Vec::new();
        let mut cur = Some(tpl);
        while let Some(id) = cur {
            out.push(id);
            cur = self.tpl(id).parent;
        }
        out.reverse();
        out
    }

    /// Returns the component whose own tree is rooted at `tpl`.
    #[must_use]
    pub fn tree_owner(&self, tpl: TplId) -> Option<ComponentId> {
        self.tree_owners.get(&tpl).copied()
    }

    /// Returns `true` for an unstyled text node.
    #[must_use]
    pub fn is_plain_text(&self, tpl: TplId) -> bool {
        matches!(
            &self.tpl(tpl).kind,
            TplKind::Tag(TplTag { tag_type: TagType::Text, styled: false, .. })
        )
    }

    /// Returns `true` for a slot whose only default content is plain text.
    #[must_use]
    pub fn is_plain_text_tpl_slot(&self, tpl: TplId) -> bool {
        match &self.tpl(tpl).kind {
            TplKind::Slot(slot) => {
                slot.default_contents.len() == 1 && self.is_plain_text(slot.default_contents[0])
            }
            _ => false,
        }
    }

    /// Returns `true` if `component` is rendered by host code.
    #[must_use]
    pub fn is_code_component(&self, component: ComponentId) -> bool {
        self.component(component).flags.contains(ComponentFlags::CODE)
    }

    /// Returns `true` for a code component that only provides context.
    #[must_use]
    pub fn is_context_code_component(&self, component: ComponentId) -> bool {
        self.component(component)
            .flags
            .contains(ComponentFlags::CODE | ComponentFlags::CONTEXT)
    }

    /// Returns `true` if instances of `component` trap focus.
    #[must_use]
    pub fn traps_focus(&self, component: ComponentId) -> bool {
        self.component(component)
            .flags
            .contains(ComponentFlags::TRAPS_FOCUS)
    }

    /// Returns `true` if `tpl` is the root of a code component's tree.
    #[must_use]
    pub fn is_code_component_root(&self, tpl: TplId) -> bool {
        self.tree_owner(tpl)
            .is_some_and(|component| self.is_code_component(component))
    }

    /// Returns `true` for a slot placed directly under a code component's root.
    #[must_use]
    pub fn is_code_component_slot(&self, tpl: TplId) -> bool {
        let node = self.tpl(tpl);
        matches!(node.kind, TplKind::Slot(_))
            && node
                .parent
                .is_some_and(|parent| self.is_code_component_root(parent))
    }

    fn push_tag(&mut self, tag: &str, tag_type: TagType, children: Vec<TplId>) -> TplId {
        let id = self.push(TplKind::Tag(TplTag {
            tag: tag.into(),
            tag_type,
            styled: false,
            children: children.clone(),
        }));
        for child in children {
            self.adopt(child, id);
        }
        id
    }

    fn push(&mut self, kind: TplKind) -> TplId {
        let id = TplId(index_u32(self.tpls.len()));
        self.tpls.push(TplNode {
            uuid: format!("t{}", id.0),
            parent: None,
            locked: None,
            kind,
        });
        id
    }

    fn adopt(&mut self, child: TplId, parent: TplId) {
        let node = &mut self.tpls[child.idx()];
        assert!(
            node.parent.is_none(),
            "tpl {} already has a parent",
            node.uuid
        );
        node.parent = Some(parent);
    }
}

impl TplMgr for Site {
    fn is_owned_by_site(&self, component: ComponentId) -> bool {
        component.idx() < self.components.len() && !self.imported.contains(&component)
    }
}

fn index_u32(len: usize) -> u32 {
    u32::try_from(len).expect("site arena exceeds u32::MAX entries")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_wire_parents() {
        let mut site = Site::new();
        let comp = site.add_component("Button");
        let label = site.add_slot_param(comp, "label");
        let text = site.text();
        let slot = site.slot(label, [text]);
        let root = site.tag("button", [slot]);
        site.set_tpl_tree(comp, root);

        assert_eq!(site.tpl(text).parent, Some(slot));
        assert_eq!(site.tpl(slot).parent, Some(root));
        assert_eq!(site.tpl(root).parent, None);
        assert_eq!(site.tree_owner(root), Some(comp));
        assert_eq!(site.ancestors(text), [root, slot, text]);
    }

    #[test]
    fn plain_text_slot_detection() {
        let mut site = Site::new();
        let comp = site.add_component("Button");
        let label = site.add_slot_param(comp, "label");
        let text = site.text();
        let plain = site.slot(label, [text]);
        assert!(site.is_plain_text_tpl_slot(plain));

        let styled = site.text();
        site.set_styled(styled, true);
        let other = site.slot(label, [styled]);
        assert!(!site.is_plain_text_tpl_slot(other));

        let empty = site.slot(label, []);
        assert!(!site.is_plain_text_tpl_slot(empty));
    }

    #[test]
    fn code_component_slots() {
        let mut site = Site::new();
        let comp = site.add_component("Carousel");
        site.set_component_flags(comp, ComponentFlags::CODE);
        let items = site.add_slot_param(comp, "items");
        let slot = site.slot(items, []);
        let root = site.tag("div", [slot]);
        site.set_tpl_tree(comp, root);

        assert!(site.is_code_component_root(root));
        assert!(site.is_code_component_slot(slot));
        assert!(!site.is_context_code_component(comp));

        site.set_component_flags(comp, ComponentFlags::CODE | ComponentFlags::CONTEXT);
        assert!(site.is_context_code_component(comp));
    }

    #[test]
    fn imported_components_are_not_owned() {
        let mut site = Site::new();
        let own = site.add_component("Own");
        let dep = site.add_imported_component("Dep");
        assert!(site.is_owned_by_site(own));
        assert!(!site.is_owned_by_site(dep));
    }

    #[test]
    #[should_panic(expected = "already has a parent")]
    fn reusing_a_child_panics() {
        let mut site = Site::new();
        let child = site.tag("span", []);
        let _a = site.tag("div", [child]);
        let _b = site.tag("div", [child]);
    }
}
