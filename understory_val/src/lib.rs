// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_val --heading-base-level=0

//! Understory Val: the instantiated value tree of a UI document.
//!
//! Authored trees ([`understory_tpl`]) describe components statically. A
//! [`ValState`] is their expansion for one rendered frame: every component
//! instance becomes a [`ValComponent`] whose own tree is expanded beneath it,
//! every slot becomes a [`ValSlot`] that renders either the component's
//! default content or the arguments passed at the call site.
//!
//! Three relations drive everything built on top of this crate:
//!
//! - **Parent**: structural nesting. Argument content hangs off the receiving
//!   component instance; the slot that renders it is reachable via
//!   [`ValState::val2slot`].
//! - **Owner**: the component instance whose own tree produced a node.
//!   Substituted argument content keeps the owner of the call site.
//! - **Slot info**: which instance and param an argument was passed to.
//!
//! Selection code works on [`Selectable`]s: either a value node or a
//! [`SlotSelection`] naming one slot param of one instance, which stays
//! meaningful even when nothing is passed to that slot.
//!
//! ## Example
//!
//! ```rust
//! use understory_tpl::Site;
//! use understory_val::{SlotFill, ValState};
//!
//! let mut site = Site::new();
//!
//! // `Card` renders `<section>[slot(body)]</section>`.
//! let card = site.add_component("Card");
//! let body = site.add_slot_param(card, "body");
//! let body_slot = site.slot(body, []);
//! let section = site.tag("section", [body_slot]);
//! site.set_tpl_tree(card, section);
//!
//! // `Page` renders `Card { body: <div/> }`.
//! let page = site.add_component("Page");
//! let div = site.tag("div", []);
//! let usage = site.instance(card, [(body, [div])]);
//! site.set_tpl_tree(page, usage);
//! let root = site.instance_of(page);
//!
//! let state = ValState::build(&site, root).unwrap();
//! let card_val = state.maybe_val_user_root().unwrap();
//! let div_val = state.ids().find(|v| state.node(*v).tpl == div).unwrap();
//!
//! // The div is owned by the page, not by the card that renders it.
//! assert_eq!(state.val_owner(div_val), Some(state.val_sys_root()));
//! let slot = state.val2slot(div_val).unwrap();
//! assert_eq!(state.val_owner(slot), Some(card_val));
//! assert_eq!(state.node(slot).as_slot().unwrap().fill, SlotFill::Args(vec![div_val]));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod build;
mod node;
mod selectable;
mod state;

pub use build::{BuildError, BuildOptions, ValTreeBuilder};
pub use node::{SlotArgs, SlotFill, ValComponent, ValId, ValKind, ValNode, ValSlot, ValTag};
pub use selectable::{
    Selectable, SlotSelection, SlotTarget, make_slot_selection_full_key, make_slot_selection_key,
};
pub use state::{SlotInfo, ValState};
