// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Free functions over selectables: locks, keys, focus traps and tpl lookup.

use alloc::string::String;
use alloc::vec::Vec;

use understory_tpl::TplId;
use understory_val::{
    Selectable, SlotSelection, SlotTarget, ValId, ValState, make_slot_selection_full_key,
    make_slot_selection_key,
};

use crate::query::sq;

/// The nearest local ancestor of `sel`, itself included, that is not locked.
#[must_use]
pub fn get_unlocked_ancestor(sel: Selectable, state: &ValState<'_>) -> Option<Selectable> {
    sq([sel], state)
        .ancestors()
        .iter()
        .find(|ancestor| !is_selectable_locked(*ancestor, state))
}

/// Whether `sel` is locked.
///
/// The nearest local ancestor with an explicit lock state decides; slot
/// selections never carry one. Nothing explicit means unlocked.
#[must_use]
pub fn is_selectable_locked(sel: Selectable, state: &ValState<'_>) -> bool {
    let site = state.site();
    sq([sel], state)
        .ancestors()
        .val_nodes()
        .into_iter()
        .find_map(|val| site.tpl(state.node(val).tpl).locked)
        .unwrap_or(false)
}

/// Local key of a selectable, for persisting a selection.
///
/// `None` for slot selections anchored on authored nodes.
#[must_use]
pub fn make_selectable_key(sel: Selectable, state: &ValState<'_>) -> Option<String> {
    match sel {
        Selectable::Val(val) => Some(state.node(val).key.clone()),
        Selectable::Slot(slot) => make_slot_selection_key(&slot, state),
    }
}

/// Full key of a selectable, unique within the value tree.
///
/// `None` for slot selections anchored on authored nodes.
#[must_use]
pub fn make_selectable_full_key(sel: Selectable, state: &ValState<'_>) -> Option<String> {
    match sel {
        Selectable::Val(val) => Some(state.node(val).full_key.clone()),
        Selectable::Slot(slot) => make_slot_selection_full_key(&slot, state),
    }
}

/// The highest focus-trapping ancestor of `sel` below `cur_focused`.
///
/// Walks local ancestors bottom-up. The candidate starts at `sel` and moves
/// to the owning instance when the walk crosses a slot whose param merges
/// with its parent, or to any focus-trapping component instance other than
/// the system root. The walk stops as soon as it meets the ancestor chain
/// of `cur_focused`, so repeated clicks drill one trap deeper each time.
#[must_use]
pub fn get_focus_trapping_ancestor(
    sel: Selectable,
    state: &ValState<'_>,
    cur_focused: Option<Selectable>,
) -> Selectable {
    let site = state.site();
    let sys_root = state.val_sys_root();
    // Tpl-anchored slot selections have no value ancestors to cross.
    let cur_ancestors: Option<Vec<Selectable>> = cur_focused
        .filter(|cur| cur.anchor_val().is_some())
        .map(|cur| sq([cur], state).ancestors().to_vec());
    let crossed = |sel: Selectable| {
        cur_ancestors
            .as_ref()
            .is_some_and(|ancestors| ancestors.contains(&sel))
    };

    let mut candidate = sel;
    for ancestor in sq([sel], state).ancestors().iter() {
        if crossed(ancestor) {
            return candidate;
        }
        match ancestor {
            Selectable::Slot(SlotSelection {
                target: SlotTarget::Val(vc),
                param,
            }) if site.param(param).merge_with_parent && vc != sys_root => {
                if crossed(Selectable::Val(vc)) {
                    return candidate;
                }
                candidate = Selectable::Val(vc);
            }
            Selectable::Val(val) if val != sys_root => {
                let traps = state
                    .node(val)
                    .as_component()
                    .is_some_and(|vc| site.traps_focus(vc.component));
                if traps {
                    candidate = ancestor;
                }
            }
            _ => {}
        }
    }
    candidate
}

/// What [`best_val_for_tpl`] looks for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TplTarget {
    /// An authored node.
    Node(TplId),
    /// A slot of an authored component instance.
    Slot(SlotSelection),
}

/// Finds the value node instantiating `target` in frame `frame_num` that
/// best reuses the path of `initial`.
///
/// Frame 0 is the user root's frame; frame `n` is the expansion of the
/// `n`-th owner of `initial`, counted top-down. The value path inside the
/// target frame is followed while it agrees with the authored ancestors of
/// `target`; from the first mismatch on, the first instance of each
/// remaining authored node is taken.
///
/// Returns `None` when the frame does not exist, when nothing in it
/// instantiates `target`, or, for slot targets, when the instance is hidden.
#[must_use]
pub fn best_val_for_tpl(
    target: TplTarget,
    frame_num: usize,
    state: &ValState<'_>,
    initial: Selectable,
) -> Option<Selectable> {
    match target {
        TplTarget::Node(tpl) => {
            best_val_for_tpl_node(tpl, frame_num, state, initial).map(Selectable::Val)
        }
        TplTarget::Slot(slot) => {
            let tpl = slot.tpl(state);
            let val = best_val_for_tpl_node(tpl, frame_num, state, initial)?;
            state
                .node(val)
                .is_component()
                .then(|| SlotSelection::for_val(val, slot.param).into())
        }
    }
}

fn best_val_for_tpl_node(
    target: TplId,
    frame_num: usize,
    state: &ValState<'_>,
    initial: Selectable,
) -> Option<ValId> {
    let site = state.site();
    let mut owners = sq([initial], state).owners_array_up();
    owners.reverse();
    if frame_num > owners.len() {
        return None;
    }

    // The deepest node of the target frame on the way to `initial`: the
    // owner that starts the next frame, or `initial` itself in the last one.
    let recurser = owners
        .get(frame_num)
        .map_or(initial, |owner| Selectable::Val(*owner));
    let mut val_path = sq([recurser], state).ancestors().to_vec();
    val_path.reverse();
    let mut tpl_path = site.ancestors(target);
    if frame_num == 0 {
        let user_root = state.node(state.maybe_val_user_root()?).tpl;
        let start = tpl_path.iter().position(|tpl| *tpl == user_root)?;
        tpl_path.drain(..start);
    }

    let tpl_of = |sel: Option<&Selectable>| match sel {
        Some(Selectable::Val(val)) => Some(state.node(*val).tpl),
        _ => None,
    };

    // Follow the value path while it matches, skipping slot selections.
    let mut val_index = 0;
    let mut tpl_index = 0;
    loop {
        let mut next_val = val_index + 1;
        if matches!(val_path.get(next_val), Some(Selectable::Slot(_))) {
            next_val += 1;
        }
        let next_tpl = tpl_index + 1;
        match (tpl_of(val_path.get(next_val)), tpl_path.get(next_tpl)) {
            (Some(val_tpl), Some(tpl)) if val_tpl == *tpl => {
                val_index = next_val;
                tpl_index = next_tpl;
            }
            _ => break,
        }
    }
    if tpl_of(val_path.get(val_index)) != tpl_path.get(tpl_index).copied() {
        return None;
    }
    let Some(Selectable::Val(mut current)) = val_path.get(val_index).copied() else {
        return None;
    };

    // Take the first instance of each remaining authored node.
    for tpl in &tpl_path[tpl_index + 1..] {
        current = sq([current], state)
            .val_children()
            .val_nodes()
            .into_iter()
            .find(|child| state.node(*child).tpl == *tpl)?;
    }
    Some(current)
}
