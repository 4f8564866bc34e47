//! Benchmarks for include translation.
//!
//! Compares the direct and cached include strategies on specifications with
//! one, three and chained include steps, plus the bare cost of resolution.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use sift_query::{
    Entity, Filter, FilterValue, IncludeStrategy, NavigationVisitor, OrderBy, QueryResult,
    Queryable, Selector, Specification, SpecificationEvaluator, TranslationSet, TypeInfo,
};

#[derive(Clone)]
struct Order;
#[derive(Clone)]
struct Customer;
#[derive(Clone)]
struct Address;
#[derive(Clone)]
struct Line;
#[derive(Clone)]
struct Product;

macro_rules! entity {
    ($ty:ident { $($nav:ident: $target:ident),* }) => {
        impl Entity for $ty {
            const NAME: &'static str = stringify!($ty);

            fn field(&self, _name: &str) -> Option<FilterValue> {
                None
            }

            fn navigations<V: NavigationVisitor<Self>>(_visitor: &mut V) {
                $(_visitor.visit::<$target>(stringify!($nav));)*
            }
        }
    };
}

entity!(Order { customer: Customer, lines: Line });
entity!(Customer { address: Address });
entity!(Address {});
entity!(Line { product: Product });
entity!(Product {});

const CUSTOMER: Selector<Order, Customer> = Selector::new("customer");
const ADDRESS: Selector<Customer, Address> = Selector::new("address");
const LINES: Selector<Order, Line> = Selector::new("lines");
const PRODUCT: Selector<Line, Product> = Selector::new("product");

/// A query that only counts what is applied to it.
struct CountingQuery {
    steps: usize,
}

impl Queryable for CountingQuery {
    type Entity = Order;

    fn filter(mut self, _filter: Filter) -> Self {
        self.steps += 1;
        self
    }

    fn order_by(mut self, _order: OrderBy) -> Self {
        self.steps += 1;
        self
    }

    fn skip(mut self, _n: u64) -> Self {
        self.steps += 1;
        self
    }

    fn take(mut self, _n: u64) -> Self {
        self.steps += 1;
        self
    }

    fn include<S: Entity, P: Entity>(mut self, _selector: &Selector<S, P>) -> QueryResult<Self> {
        self.steps += 1;
        Ok(self)
    }
}

fn specs() -> Vec<(&'static str, Specification<Order>)> {
    vec![
        ("single", Specification::builder().include(&CUSTOMER).build()),
        (
            "chained",
            Specification::builder()
                .include(&CUSTOMER)
                .then_include(&ADDRESS)
                .build(),
        ),
        (
            "wide",
            Specification::builder()
                .include(&CUSTOMER)
                .then_include(&ADDRESS)
                .include(&LINES)
                .then_include(&PRODUCT)
                .build(),
        ),
    ]
}

fn bench_include_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("include_strategies");

    for strategy in [IncludeStrategy::Direct, IncludeStrategy::Cached] {
        let evaluator = SpecificationEvaluator::<CountingQuery>::new(strategy);
        for (name, spec) in specs() {
            group.bench_with_input(BenchmarkId::new(strategy.as_str(), name), &spec, |b, spec| {
                b.iter(|| {
                    let query = evaluator
                        .get_query(CountingQuery { steps: 0 }, black_box(spec))
                        .map(|q| q.steps);
                    black_box(query)
                })
            });
        }
    }

    group.finish();
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("translation_resolution");
    let translations = TranslationSet::<CountingQuery>::for_root();

    group.bench_function("for_root", |b| {
        b.iter(|| black_box(TranslationSet::<CountingQuery>::for_root().len()))
    });

    group.bench_function("resolve_and_specialize", |b| {
        b.iter(|| {
            let invoker = translations
                .resolve(TypeInfo::of::<Line>(), TypeInfo::of::<Product>())
                .map(|t| t.specialize());
            black_box(invoker.is_ok())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_include_strategies, bench_resolution);
criterion_main!(benches);
