use arbor_core::{Children, HostId, MemoryPlatform, Renderer, RendererOptions, VNode};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const LIST_SIZES: &[usize] = &[16, 64, 256, 1024];

fn keyed_list(keys: &[usize]) -> VNode {
    let items = keys.iter().map(|key| {
        VNode::element("li")
            .key(*key as u64)
            .child(VNode::text(key.to_string()))
    });
    VNode::element("ul").with_children(Children::keyed(items))
}

struct DiffFixture {
    renderer: Renderer<MemoryPlatform>,
    root: HostId,
    trees: [VNode; 2],
    flip: bool,
}

impl DiffFixture {
    fn new(from: Vec<usize>, to: Vec<usize>) -> Self {
        let mut platform = MemoryPlatform::new();
        let root = platform.create_root("root");
        let renderer = Renderer::with_options(platform, RendererOptions::default().dev_mode(false));
        let mut fixture = Self {
            renderer,
            root,
            trees: [keyed_list(&from), keyed_list(&to)],
            flip: false,
        };
        fixture.step();
        fixture
    }

    /// Renders the other ordering so every pass is a real diff.
    fn step(&mut self) {
        self.flip = !self.flip;
        let tree = self.trees[usize::from(self.flip)].clone();
        self.renderer.render(Some(tree), self.root).expect("render");
        self.renderer.platform_mut().take_ops();
    }
}

fn reversed(len: usize) -> (Vec<usize>, Vec<usize>) {
    let from: Vec<usize> = (0..len).collect();
    let to = from.iter().rev().copied().collect();
    (from, to)
}

/// Deterministic shuffle so runs stay comparable.
fn shuffled(len: usize) -> (Vec<usize>, Vec<usize>) {
    let from: Vec<usize> = (0..len).collect();
    let mut to = from.clone();
    let mut seed = 0x9e37_79b9_u64;
    for index in (1..len).rev() {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        to.swap(index, (seed % (index as u64 + 1)) as usize);
    }
    (from, to)
}

fn appended(len: usize) -> (Vec<usize>, Vec<usize>) {
    let from: Vec<usize> = (0..len).collect();
    let to = (0..len + len / 4).collect();
    (from, to)
}

fn bench_scenario(c: &mut Criterion, name: &str, scenario: fn(usize) -> (Vec<usize>, Vec<usize>)) {
    let mut group = c.benchmark_group(name);
    for &len in LIST_SIZES {
        group.bench_with_input(BenchmarkId::new("items", len), &len, |b, &len| {
            let (from, to) = scenario(len);
            let mut fixture = DiffFixture::new(from, to);
            b.iter(|| {
                fixture.step();
                black_box(fixture.renderer.last_stats());
            });
        });
    }
    group.finish();
}

fn bench_reverse(c: &mut Criterion) {
    bench_scenario(c, "keyed_reverse", reversed);
}

fn bench_shuffle(c: &mut Criterion) {
    bench_scenario(c, "keyed_shuffle", shuffled);
}

fn bench_append(c: &mut Criterion) {
    bench_scenario(c, "keyed_append", appended);
}

criterion_group!(keyed_diff, bench_reverse, bench_shuffle, bench_append);
criterion_main!(keyed_diff);
