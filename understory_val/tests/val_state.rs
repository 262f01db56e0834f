// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `understory_val` crate.
//!
//! These build small documents with nested components and slots and check the
//! ownership and slot relations the selection layer relies on.

use understory_tpl::{ParamId, Site, TplId};
use understory_val::{Selectable, SlotSelection, ValId, ValState};

struct Doc {
    site: Site,
    root: TplId,
    children: ParamId,
    inner_span: TplId,
    leaf: TplId,
}

/// `Page` renders `Outer { children: [Slotted { children: [leaf] }] }` where
/// `Outer` renders `<div>[slot(children)]<span/></div>` and `Slotted`
/// renders `<div>[slot(children)]</div>`.
fn doc() -> Doc {
    let mut site = Site::new();

    let slotted = site.add_component("Slotted");
    let children = site.add_slot_param(slotted, "children");
    let slot = site.slot(children, []);
    let slotted_root = site.tag("div", [slot]);
    site.set_tpl_tree(slotted, slotted_root);

    let outer = site.add_component("Outer");
    let outer_children = site.add_slot_param(outer, "children");
    let outer_slot = site.slot(outer_children, []);
    let inner_span = site.tag("span", []);
    let outer_root = site.tag("div", [outer_slot, inner_span]);
    site.set_tpl_tree(outer, outer_root);

    let leaf = site.tag("b", []);
    let inner_usage = site.instance(slotted, [(children, [leaf])]);
    let outer_usage = site.instance(outer, [(outer_children, [inner_usage])]);

    let page = site.add_component("Page");
    site.set_tpl_tree(page, outer_usage);
    let root = site.instance_of(page);

    Doc {
        site,
        root,
        children,
        inner_span,
        leaf,
    }
}

fn find(state: &ValState<'_>, tpl: TplId) -> ValId {
    state.ids().find(|v| state.node(*v).tpl == tpl).unwrap()
}

#[test]
fn owners_skip_the_system_root() {
    let doc = doc();
    let state = ValState::build(&doc.site, doc.root).unwrap();
    let outer = state.maybe_val_user_root().unwrap();

    let span = find(&state, doc.inner_span);
    assert_eq!(state.val_owners(span), [outer]);

    // Argument content belongs to the page, so it has no non-root owners.
    let leaf = find(&state, doc.leaf);
    assert!(state.val_owners(leaf).is_empty());
    assert!(state.val_owners(outer).is_empty());
}

#[test]
fn val2slot_and_slot_info_agree() {
    let doc = doc();
    let state = ValState::build(&doc.site, doc.root).unwrap();
    for val in state.ids() {
        let Some(slot) = state.val2slot(val) else {
            continue;
        };
        let info = state.val2slot_info(val).unwrap();
        assert_eq!(state.val_owner(slot), Some(info.val_component));
        assert_eq!(state.node(slot).as_slot().unwrap().param, info.param);
    }
}

#[test]
fn substituted_arg_resolves_to_slot_of_current_component() {
    let doc = doc();
    let state = ValState::build(&doc.site, doc.root).unwrap();
    let leaf = find(&state, doc.leaf);
    let slotted = state.val_parent(leaf).unwrap();

    assert_eq!(
        state.slot_containing_substituted_arg(leaf, slotted),
        Some(SlotSelection::for_val(slotted, doc.children))
    );
    // The leaf is also inside `Outer`'s slot, via the `Slotted` instance.
    let outer = state.maybe_val_user_root().unwrap();
    let outer_slot = state.val_slot_containing_substituted_arg(leaf, outer).unwrap();
    assert_eq!(state.val_owner(outer_slot), Some(outer));

    // Nodes of a component's own tree are not substituted content.
    let span = find(&state, doc.inner_span);
    assert_eq!(state.slot_containing_substituted_arg(span, outer), None);
}

#[test]
fn owners_are_stable_across_rebuilds() {
    let doc = doc();
    let first = ValState::build(&doc.site, doc.root).unwrap();
    let second = ValState::build(&doc.site, doc.root).unwrap();

    for val in first.ids() {
        let key = &first.node(val).full_key;
        let other = second.key2val(key).unwrap();
        let owners_a: Vec<_> = first
            .val_owners(val)
            .iter()
            .map(|o| first.node(*o).full_key.clone())
            .collect();
        let owners_b: Vec<_> = second
            .val_owners(other)
            .iter()
            .map(|o| second.node(*o).full_key.clone())
            .collect();
        assert_eq!(owners_a, owners_b);
    }
}

#[test]
fn flatten_follows_render_order() {
    let doc = doc();
    let state = ValState::build(&doc.site, doc.root).unwrap();
    let labels: Vec<&str> = state
        .flatten_vals(state.val_sys_root())
        .into_iter()
        .map(|v| state.label(v))
        .collect();
    assert_eq!(
        labels,
        [
            "Page", "Outer", "div", "<slot>", "Slotted", "div", "<slot>", "b", "span"
        ]
    );
}

#[test]
fn children_of_components_are_their_expansion() {
    let doc = doc();
    let state = ValState::build(&doc.site, doc.root).unwrap();
    let outer = state.maybe_val_user_root().unwrap();
    let children = state.get_val_children(outer);
    assert_eq!(children.len(), 1);
    let Selectable::Val(div) = children[0] else {
        panic!("expected a value node");
    };
    assert_eq!(state.label(div), "div");
    assert_eq!(state.val_parent(div), Some(outer));
    assert_eq!(state.val_owner(div), Some(outer));
}
