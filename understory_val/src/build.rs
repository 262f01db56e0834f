// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Expansion of authored trees into a value tree.

use alloc::format;
use alloc::vec::Vec;
use core::fmt;

use smallvec::SmallVec;
use understory_tpl::{ComponentId, ParamId, Site, TplId, TplKind};

use crate::node::{SlotArgs, SlotFill, ValComponent, ValKind, ValNode, ValSlot, ValTag};
use crate::state::{SlotInfo, ValState};
use crate::ValId;

/// Errors produced while building a value tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BuildError {
    /// The root handed to the builder is not a component instance.
    RootNotComponent(TplId),
    /// A component is instantiated, directly or indirectly, inside its own tree.
    RecursiveComponent {
        /// The component being re-entered.
        component: ComponentId,
        /// The offending instance.
        tpl: TplId,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotComponent(tpl) => {
                write!(f, "root tpl {} is not a component instance", tpl.as_u32())
            }
            Self::RecursiveComponent { tpl, .. } => write!(
                f,
                "tpl {} instantiates a component inside its own tree",
                tpl.as_u32()
            ),
        }
    }
}

impl core::error::Error for BuildError {}

/// Options for [`ValTreeBuilder`].
#[derive(Clone, Debug, Default)]
pub struct BuildOptions {
    /// Instances of this component tpl render their slots' default content
    /// even when arguments were passed.
    pub show_default_slot_contents_for: Option<TplId>,
}

/// Builds a [`ValState`] from a root component instance.
///
/// ```rust
/// use understory_tpl::Site;
/// use understory_val::{ValState, ValTreeBuilder};
///
/// let mut site = Site::new();
/// let page = site.add_component("Page");
/// let body = site.tag("body", []);
/// site.set_tpl_tree(page, body);
/// let root = site.instance_of(page);
///
/// let state = ValTreeBuilder::new(&site).build(root).unwrap();
/// let user_root = state.maybe_val_user_root().unwrap();
/// assert_eq!(state.node(user_root).tpl, body);
/// assert_eq!(state.val_owner(user_root), Some(state.val_sys_root()));
/// ```
#[derive(Debug)]
pub struct ValTreeBuilder<'s> {
    site: &'s Site,
    options: BuildOptions,
}

impl<'s> ValTreeBuilder<'s> {
    /// Creates a builder with default options.
    #[must_use]
    pub fn new(site: &'s Site) -> Self {
        Self::with_options(site, BuildOptions::default())
    }

    /// Creates a builder with explicit options.
    #[must_use]
    pub fn with_options(site: &'s Site, options: BuildOptions) -> Self {
        Self { site, options }
    }

    /// Expands `root` into a fresh value tree. `root` becomes the system root.
    pub fn build(&self, root: TplId) -> Result<ValState<'s>, BuildError> {
        if !matches!(self.site.tpl(root).kind, TplKind::Component(_)) {
            return Err(BuildError::RootNotComponent(root));
        }
        tracing::debug!(root = root.as_u32(), "building value tree");
        let mut state = ValState::empty(self.site);
        let sys_root = Expander::new(&mut state, &self.options, false).run(root)?;
        state.sys_root = sys_root;
        tracing::debug!(nodes = state.len(), "value tree built");
        Ok(state)
    }
}

/// Where a freshly built node gets attached.
#[derive(Copy, Clone, Debug)]
enum Place {
    Root,
    TagChild(ValId),
    Contents(ValId),
    Arg { component: ValId, param: ParamId },
    SlotDefault(ValId),
}

#[derive(Copy, Clone, Debug)]
struct Task {
    tpl: TplId,
    /// Owner of the node to build.
    frame: Option<ValId>,
    parent: Option<ValId>,
    place: Place,
}

pub(crate) struct Expander<'a, 's> {
    state: &'a mut ValState<'s>,
    options: &'a BuildOptions,
    detached: bool,
}

impl<'a, 's> Expander<'a, 's> {
    pub(crate) fn new(state: &'a mut ValState<'s>, options: &'a BuildOptions, detached: bool) -> Self {
        Self {
            state,
            options,
            detached,
        }
    }

    /// Builds the subtree rooted at `root` and returns the new root node.
    pub(crate) fn run(mut self, root: TplId) -> Result<ValId, BuildError> {
        let mut stack: SmallVec<[Task; 32]> = SmallVec::new();
        let root_id = self.visit(
            Task {
                tpl: root,
                frame: None,
                parent: None,
                place: Place::Root,
            },
            &mut stack,
        )?;
        while let Some(task) = stack.pop() {
            self.visit(task, &mut stack)?;
        }
        Ok(root_id)
    }

    fn visit(&mut self, task: Task, stack: &mut SmallVec<[Task; 32]>) -> Result<ValId, BuildError> {
        let site = self.state.site();
        let tpl = site.tpl(task.tpl);
        let key = tpl.uuid.clone();
        let full_key = match task.parent {
            Some(parent) => format!("{}/{key}", self.state.node(parent).full_key),
            // Detached roots may repeat a template; key them by arena position.
            None if self.detached => format!("~{}/{key}", self.state.len()),
            None => key.clone(),
        };

        let kind = match &tpl.kind {
            TplKind::Tag(_) => ValKind::Tag(ValTag::default()),
            TplKind::Component(tc) => {
                self.check_recursion(tc.component, task)?;
                let contents = if site.is_code_component(tc.component) {
                    None
                } else {
                    Some(Vec::new())
                };
                ValKind::Component(ValComponent {
                    component: tc.component,
                    slot_args: tc
                        .args
                        .iter()
                        .filter(|arg| !arg.contents.is_empty())
                        .map(|arg| SlotArgs {
                            param: arg.param,
                            vals: Vec::new(),
                        })
                        .collect(),
                    contents,
                })
            }
            TplKind::Slot(ts) => ValKind::Slot(ValSlot {
                param: ts.param,
                fill: SlotFill::Empty,
            }),
        };

        let id = self.state.push_node(
            ValNode {
                tpl: task.tpl,
                key,
                full_key,
                detached: self.detached,
                kind,
            },
            task.parent,
            task.frame,
        );
        self.attach(id, task.place);

        match &tpl.kind {
            TplKind::Tag(tag) => {
                for &child in tag.children.iter().rev() {
                    stack.push(Task {
                        tpl: child,
                        frame: task.frame,
                        parent: Some(id),
                        place: Place::TagChild(id),
                    });
                }
            }
            TplKind::Component(tc) => {
                let component = site.component(tc.component);
                tracing::trace!(
                    component = component.name.as_str(),
                    key = self.state.node(id).full_key.as_str(),
                    "expanding component"
                );
                // Contents go below the args on the stack: a slot can only be
                // filled once every argument of its frame exists.
                if !site.is_code_component(tc.component)
                    && let Some(tree) = component.tpl_tree
                {
                    stack.push(Task {
                        tpl: tree,
                        frame: Some(id),
                        parent: Some(id),
                        place: Place::Contents(id),
                    });
                }
                for arg in tc.args.iter().rev() {
                    for &content in arg.contents.iter().rev() {
                        stack.push(Task {
                            tpl: content,
                            frame: task.frame,
                            parent: Some(id),
                            place: Place::Arg {
                                component: id,
                                param: arg.param,
                            },
                        });
                    }
                }
            }
            TplKind::Slot(ts) => {
                let args = self.frame_args(task.frame, ts.param);
                if !args.is_empty() && !self.showing_defaults(task.frame) {
                    for &arg in &args {
                        self.state.val2slot.insert(arg, id);
                    }
                    self.set_fill(id, SlotFill::Args(args));
                } else if !ts.default_contents.is_empty() {
                    self.set_fill(id, SlotFill::Default(Vec::new()));
                    for &content in ts.default_contents.iter().rev() {
                        stack.push(Task {
                            tpl: content,
                            frame: task.frame,
                            parent: Some(id),
                            place: Place::SlotDefault(id),
                        });
                    }
                }
            }
        }
        Ok(id)
    }

    fn attach(&mut self, id: ValId, place: Place) {
        match place {
            Place::Root => {}
            Place::TagChild(parent) => {
                if let ValKind::Tag(tag) = &mut self.state.nodes[parent.idx()].kind {
                    tag.children.push(id);
                }
            }
            Place::Contents(vc) => {
                if let ValKind::Component(c) = &mut self.state.nodes[vc.idx()].kind {
                    c.contents.get_or_insert_with(Vec::new).push(id);
                }
            }
            Place::Arg { component, param } => {
                if let ValKind::Component(c) = &mut self.state.nodes[component.idx()].kind
                    && let Some(args) = c.slot_args.iter_mut().find(|a| a.param == param)
                {
                    args.vals.push(id);
                }
                self.state.slot_infos.insert(
                    id,
                    SlotInfo {
                        val_component: component,
                        param,
                    },
                );
            }
            Place::SlotDefault(slot) => {
                if let ValKind::Slot(s) = &mut self.state.nodes[slot.idx()].kind
                    && let SlotFill::Default(vals) = &mut s.fill
                {
                    vals.push(id);
                }
            }
        }
    }

    fn set_fill(&mut self, slot: ValId, fill: SlotFill) {
        if let ValKind::Slot(s) = &mut self.state.nodes[slot.idx()].kind {
            s.fill = fill;
        }
    }

    fn frame_args(&self, frame: Option<ValId>, param: ParamId) -> Vec<ValId> {
        frame
            .and_then(|f| self.state.node(f).as_component())
            .and_then(|vc| vc.args_for(param))
            .map(<[ValId]>::to_vec)
            .unwrap_or_default()
    }

    fn showing_defaults(&self, frame: Option<ValId>) -> bool {
        frame.is_some_and(|f| {
            self.options.show_default_slot_contents_for == Some(self.state.node(f).tpl)
        })
    }

    fn check_recursion(&self, component: ComponentId, task: Task) -> Result<(), BuildError> {
        let mut cur = task.frame;
        while let Some(frame) = cur {
            if self
                .state
                .node(frame)
                .as_component()
                .is_some_and(|vc| vc.component == component)
            {
                tracing::warn!(
                    component = self.state.site().component(component).name.as_str(),
                    tpl = task.tpl.as_u32(),
                    "rejecting recursive component instantiation"
                );
                return Err(BuildError::RecursiveComponent {
                    component,
                    tpl: task.tpl,
                });
            }
            cur = self.state.val_owner(frame);
        }
        Ok(())
    }
}
