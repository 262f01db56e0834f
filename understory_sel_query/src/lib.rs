// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_sel_query --heading-base-level=0

//! Understory Sel Query: jQuery-style traversal over value trees.
//!
//! [`SelQuery`] wraps an ordered list of [`Selectable`]s together with the
//! [`ValState`] they live in and a traversal mode. Each method returns a new
//! query, so traversals read as chains:
//!
//! ```rust
//! use understory_sel_query::sq;
//! use understory_tpl::Site;
//! use understory_val::{Selectable, SlotSelection, ValState};
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
//! // `Page` renders `<main>[Card { body: <div/> }]</main>`.
//! let page = site.add_component("Page");
//! let div = site.tag("div", []);
//! let usage = site.instance(card, [(body, [div])]);
//! let main = site.tag("main", [usage]);
//! site.set_tpl_tree(page, main);
//! let root = site.instance_of(page);
//!
//! let state = ValState::build(&site, root).unwrap();
//! let main_val = state.maybe_val_user_root().unwrap();
//! let card_val = state.ids().find(|v| state.node(*v).tpl == usage).unwrap();
//!
//! // Locally, the card shows its bound slot as an opaque position...
//! let slot = sq([card_val], &state).children();
//! assert_eq!(slot.get(), Selectable::Slot(SlotSelection::for_val(card_val, body)));
//!
//! // ...whose content is the page's own div.
//! let div_val = slot.children().get();
//! assert_eq!(sq([div_val], &state).parent().parent().get(), Selectable::Val(card_val));
//!
//! // Fullstack descends into the card's own tree instead.
//! let inside = sq([card_val], &state).fullstack(true).children().get();
//! assert_eq!(state.label(inside.as_val().unwrap()), "section");
//!
//! // Paths round-trip.
//! let path = sq([div_val], &state).labels_path().unwrap();
//! assert_eq!(path, "Card:0 (slot):0 div:0");
//! assert_eq!(sq([main_val], &state).select_by_labels(&path).get(), div_val);
//! ```
//!
//! ## Local and fullstack
//!
//! Local mode answers questions from the point of view of whoever authors the
//! current frame. Component instances are opaque: their children are one
//! [`SlotSelection`](understory_val::SlotSelection) per bound slot param,
//! argument content climbs to that slot selection, and a component's own root
//! has no parent. Fullstack mode walks the rendered tree across every
//! component boundary.
//!
//! ## Helpers
//!
//! [`get_unlocked_ancestor`] and [`is_selectable_locked`] resolve lock
//! inheritance. [`get_focus_trapping_ancestor`] implements drill-in for
//! focus-trapping components. [`make_selectable_key`] and
//! [`make_selectable_full_key`] persist selections, and [`best_val_for_tpl`]
//! maps an authored node back to a value node near a previous selection.
//!
//! This crate is `no_std` and uses `alloc`.
//!
//! [`Selectable`]: understory_val::Selectable
//! [`ValState`]: understory_val::ValState

#![no_std]

extern crate alloc;

mod functions;
mod query;

pub use functions::{
    TplTarget, best_val_for_tpl, get_focus_trapping_ancestor, get_unlocked_ancestor,
    is_selectable_locked, make_selectable_full_key, make_selectable_key,
};
pub use query::{SLOT_SELECTION_LABEL, SelQuery, SelectionError, sq};
