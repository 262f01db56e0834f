// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_tpl --heading-base-level=0

//! Understory Tpl: the authored model of a UI document.
//!
//! A [`Site`] owns three arenas:
//!
//! - **Tpl nodes** ([`TplNode`]): the static, declarative structure of component
//!   trees. A node is a plain element ([`TplTag`]), an instantiation of another
//!   component ([`TplComponent`]), or a slot placeholder ([`TplSlot`]).
//! - **Components** ([`Component`]): named, reusable trees with declared slot
//!   params and behavioral [`ComponentFlags`].
//! - **Params** ([`Param`]): slot parameters. Call sites pass argument content
//!   for them; the component's slot renders that content in place of its own
//!   defaults.
//!
//! Nothing here is evaluated. Expanding component instances into concrete
//! rendered nodes is the job of `understory_val`; this crate only answers
//! read-only questions about the authored model (names, ancestry, lock
//! state, slot and component predicates) and ownership via [`TplMgr`].
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_tpl::{ComponentFlags, Site, TplKind};
//!
//! let mut site = Site::new();
//!
//! // A `Card` component with `header` and `body` slots.
//! let card = site.add_component("Card");
//! let header = site.add_slot_param(card, "header");
//! let body = site.add_slot_param(card, "body");
//! let header_slot = site.slot(header, []);
//! let body_slot = site.slot(body, []);
//! let card_root = site.tag("section", [header_slot, body_slot]);
//! site.set_tpl_tree(card, card_root);
//! site.set_component_flags(card, ComponentFlags::TRAPS_FOCUS);
//!
//! // A page using it.
//! let title = site.text();
//! let content = site.tag("div", []);
//! let usage = site.instance(card, [(header, [title]), (body, [content])]);
//!
//! assert!(matches!(site.tpl(usage).kind, TplKind::Component(_)));
//! assert!(site.traps_focus(card));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod site;
mod types;

pub use site::{Site, TplMgr};
pub use types::{
    Component, ComponentFlags, ComponentId, Param, ParamId, SlotArg, TagType, TplComponent, TplId,
    TplKind, TplNode, TplSlot, TplTag,
};
