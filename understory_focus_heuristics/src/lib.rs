// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_focus_heuristics --heading-base-level=0

//! Understory Focus Heuristics: what a click on a rendered node selects.
//!
//! Editing happens inside a component context: the top level, or one
//! component instance that was entered by double clicking. [`FocusHeuristics`]
//! answers two questions for that context:
//!
//! - [`best_focus_target`](FocusHeuristics::best_focus_target): on a single
//!   click, which [`Selectable`](understory_val::Selectable) to select and in
//!   which context. Clicks select the nearest component one level below the
//!   current context, argument content of the current context's slots selects
//!   the slot, and locks, plain-text slots, focus traps and context-only code
//!   components adjust the result.
//! - [`containing_component_within_current_component_ctx`](FocusHeuristics::containing_component_within_current_component_ctx):
//!   on a double click, which context to enter.
//!
//! ```rust
//! use understory_focus_heuristics::{ComponentCtx, FocusHeuristics, FocusOptions};
//! use understory_tpl::Site;
//! use understory_val::{Selectable, ValState};
//!
//! let mut site = Site::new();
//!
//! // `Card` renders `<div>[<span/>]</div>`.
//! let card = site.add_component("Card");
//! let span = site.tag("span", []);
//! let card_root = site.tag("div", [span]);
//! site.set_tpl_tree(card, card_root);
//!
//! // `Page` renders `<main>[Card]</main>`.
//! let page = site.add_component("Page");
//! let usage = site.instance_of(card);
//! let main = site.tag("main", [usage]);
//! site.set_tpl_tree(page, main);
//! let root = site.instance_of(page);
//!
//! let state = ValState::build(&site, root).unwrap();
//! let card_val = state.ids().find(|v| state.node(*v).tpl == usage).unwrap();
//! let span_val = state.ids().find(|v| state.node(*v).tpl == span).unwrap();
//!
//! // From the top level, clicking the span selects the card.
//! let top = FocusHeuristics::new(&site, &site, &state, None, false);
//! let result = top.best_focus_val_target(span_val, &FocusOptions::default());
//! assert_eq!(result.focus_target, Some(Selectable::Val(card_val)));
//! assert_eq!(result.component_ctx, None);
//!
//! // Double clicking enters the card.
//! let switch = top.containing_component_within_current_component_ctx_for_val(span_val);
//! assert_eq!(switch.unwrap().container, Some(card_val));
//!
//! // Inside the card, the span itself is selected.
//! let ctx = Some(ComponentCtx::new(card_val));
//! let inside = FocusHeuristics::new(&site, &site, &state, ctx, false);
//! let result = inside.best_focus_val_target(span_val, &FocusOptions::default());
//! assert_eq!(result.focus_target, Some(Selectable::Val(span_val)));
//! assert_eq!(result.component_ctx, ctx);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod heuristics;

pub use heuristics::{ComponentCtx, ContainerSwitch, FocusHeuristics, FocusOptions, FocusResult};
