// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use understory_focus_heuristics::{ComponentCtx, FocusHeuristics, FocusOptions};
use understory_tpl::{Site, TplId};
use understory_val::ValState;

/// `depth` nested instances of `Wrap`, which renders `<div>[slot(children)]</div>`,
/// with a span at the bottom.
fn nested_wraps(depth: usize) -> (Site, TplId, TplId) {
    let mut site = Site::new();
    let wrap = site.add_component("Wrap");
    let children = site.add_slot_param(wrap, "children");
    let slot = site.slot(children, []);
    let div = site.tag("div", [slot]);
    site.set_tpl_tree(wrap, div);

    let leaf = site.tag("span", []);
    let mut content = leaf;
    for _ in 0..depth {
        content = site.instance(wrap, [(children, [content])]);
    }
    let main = site.tag("main", [content]);
    let page = site.add_component("Page");
    site.set_tpl_tree(page, main);
    let root = site.instance_of(page);
    (site, root, leaf)
}

fn bench_best_focus_target(c: &mut Criterion) {
    let mut group = c.benchmark_group("focus/best_focus_val_target");
    for depth in [4usize, 32, 256] {
        let (site, root, leaf) = nested_wraps(depth);
        let state = ValState::build(&site, root).unwrap();
        let leaf = state.ids().find(|v| state.node(*v).tpl == leaf).unwrap();
        // The innermost wrap renders the leaf.
        let innermost = state.val_parent(leaf).unwrap();

        let top = FocusHeuristics::new(&site, &site, &state, None, false);
        group.bench_with_input(BenchmarkId::new("top_level", depth), &leaf, |b, leaf| {
            b.iter(|| black_box(top.best_focus_val_target(*leaf, &FocusOptions::default())));
        });

        let ctx = Some(ComponentCtx::new(innermost));
        let inside = FocusHeuristics::new(&site, &site, &state, ctx, false);
        group.bench_with_input(BenchmarkId::new("slot_limited", depth), &leaf, |b, leaf| {
            b.iter(|| black_box(inside.best_focus_val_target(*leaf, &FocusOptions::default())));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_best_focus_target);
criterion_main!(benches);
