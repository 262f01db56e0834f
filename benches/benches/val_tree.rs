// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_sel_query::sq;
use understory_tpl::{Site, TplId};
use understory_val::ValState;

/// A page with `cards` instances of a two-slot `Card`, each receiving a
/// header text and a body of `rows` spans.
fn card_page(cards: usize, rows: usize) -> (Site, TplId) {
    let mut site = Site::new();

    let card = site.add_component("Card");
    let header = site.add_slot_param(card, "header");
    let body = site.add_slot_param(card, "body");
    let fallback = site.text();
    let header_slot = site.slot(header, [fallback]);
    let h1 = site.tag("h1", [header_slot]);
    let body_slot = site.slot(body, []);
    let section = site.tag("section", [h1, body_slot]);
    site.set_tpl_tree(card, section);

    let mut instances = Vec::with_capacity(cards);
    for _ in 0..cards {
        let hi = site.text();
        let spans: Vec<TplId> = (0..rows).map(|_| site.tag("span", [])).collect();
        let div = site.tag("div", spans);
        instances.push(site.instance(card, [(header, [hi]), (body, [div])]));
    }
    let main = site.tag("main", instances);
    let page = site.add_component("Page");
    site.set_tpl_tree(page, main);
    let root = site.instance_of(page);
    (site, root)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("val_tree/build");
    for cards in [16usize, 128, 1_024] {
        let (site, root) = card_page(cards, 8);
        group.throughput(Throughput::Elements(cards as u64));
        group.bench_with_input(BenchmarkId::from_parameter(cards), &root, |b, root| {
            b.iter(|| black_box(ValState::build(&site, *root).unwrap().len()));
        });
    }
    group.finish();
}

fn bench_descendants(c: &mut Criterion) {
    let mut group = c.benchmark_group("val_tree/descendants_dfs");
    for cards in [16usize, 128, 1_024] {
        let (site, root) = card_page(cards, 8);
        let state = ValState::build(&site, root).unwrap();
        let main = state.maybe_val_user_root().unwrap();
        group.throughput(Throughput::Elements(state.len() as u64));

        group.bench_with_input(BenchmarkId::new("local", cards), &main, |b, main| {
            b.iter(|| black_box(sq([*main], &state).descendants_dfs().len()));
        });
        group.bench_with_input(BenchmarkId::new("fullstack", cards), &main, |b, main| {
            b.iter(|| {
                black_box(
                    sq([*main], &state)
                        .fullstack(true)
                        .descendants_dfs()
                        .len(),
                )
            });
        });
    }
    group.finish();
}

fn bench_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("val_tree/paths");
    for cards in [16usize, 128] {
        let (site, root) = card_page(cards, 8);
        let state = ValState::build(&site, root).unwrap();
        let main = state.maybe_val_user_root().unwrap();
        // The last span of the last card sits furthest from the root.
        let deepest = sq([main], &state).descendants_dfs().last();
        let path = deepest.labels_path().unwrap();

        group.bench_with_input(BenchmarkId::new("labels_path", cards), &deepest, |b, q| {
            b.iter(|| black_box(q.labels_path()));
        });
        group.bench_with_input(BenchmarkId::new("select_by_labels", cards), &path, |b, p| {
            b.iter(|| black_box(sq([main], &state).select_by_labels(p).len()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_descendants, bench_paths);
criterion_main!(benches);
