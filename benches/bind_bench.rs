//! Benchmarks for binding and normalization
//!
//! Run with: cargo bench --bench bind_bench

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use data_binding_sdk::metadata::{ClassMeta, FieldMeta, TypeDescriptor};
use data_binding_sdk::model::{Arguments, Bindable, ConstructError, Typed};
use data_binding_sdk::{Binder, CamelCaseNaming, Context, Rule};
use serde_json::{Value, json};

#[derive(Debug, Clone)]
struct Line {
    sku: String,
    qty: i64,
    price: f64,
}

impl Bindable for Line {
    const TYPE_ID: &'static str = "Line";

    fn describe() -> ClassMeta {
        ClassMeta::builder(Self::TYPE_ID)
            .field(
                FieldMeta::new("sku", TypeDescriptor::string())
                    .rule(Rule::pattern("^[A-Z]{3}-[0-9]+$")),
            )
            .field(FieldMeta::new("qty", TypeDescriptor::int()).rule(Rule::Min(1.0)))
            .field(FieldMeta::new("price", TypeDescriptor::float()))
            .build()
    }

    fn construct(args: &mut Arguments) -> Result<Self, ConstructError> {
        Ok(Self {
            sku: args.take("sku")?,
            qty: args.take("qty")?,
            price: args.take("price")?,
        })
    }

    fn field_value(&self, field: &str) -> Option<Typed> {
        match field {
            "sku" => Some(self.sku.clone().into()),
            "qty" => Some(self.qty.into()),
            "price" => Some(self.price.into()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Order {
    order_id: String,
    customer_email: String,
    lines: Vec<Line>,
}

impl Bindable for Order {
    const TYPE_ID: &'static str = "Order";

    fn describe() -> ClassMeta {
        ClassMeta::builder(Self::TYPE_ID)
            .field(FieldMeta::new("order_id", TypeDescriptor::string()))
            .field(FieldMeta::new("customer_email", TypeDescriptor::string()).rule(Rule::Email))
            .field(FieldMeta::new("lines", TypeDescriptor::list(TypeDescriptor::object::<Line>())))
            .build()
    }

    fn construct(args: &mut Arguments) -> Result<Self, ConstructError> {
        Ok(Self {
            order_id: args.take("order_id")?,
            customer_email: args.take("customer_email")?,
            lines: args.take_objects("lines")?,
        })
    }

    fn field_value(&self, field: &str) -> Option<Typed> {
        match field {
            "order_id" => Some(self.order_id.clone().into()),
            "customer_email" => Some(self.customer_email.clone().into()),
            "lines" => Some(Typed::objects(&self.lines)),
            _ => None,
        }
    }
}

/// Generate an order input with `count` lines, keys in camelCase
fn generate_order(count: usize) -> Value {
    let lines: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "sku": format!("SKU-{}", i),
                "qty": format!("{}", 1 + i % 9),
                "price": 9.5 + i as f64,
            })
        })
        .collect();
    json!({ "orderId": "A-1", "customerEmail": "buyer@example.com", "lines": lines })
}

fn bench_bind(c: &mut Criterion) {
    let mut group = c.benchmark_group("bind");
    let binder = Binder::new();
    let ctx = Context::default().with_naming(CamelCaseNaming);

    for count in [1, 10, 100].iter() {
        let input = generate_order(*count);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("order_lines", count), &input, |b, input| {
            b.iter(|| black_box(binder.bind::<Order>(input.clone(), &ctx)));
        });
    }

    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");
    let binder = Binder::new();
    let ctx = Context::default().with_naming(CamelCaseNaming);

    for count in [1, 10, 100].iter() {
        let order: Order = match binder.bind(generate_order(*count), &ctx) {
            Ok(order) => order,
            Err(e) => panic!("benchmark input must bind: {}", e),
        };
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("to_json", count), &order, |b, order| {
            b.iter(|| black_box(binder.to_json(order, &ctx)));
        });
    }

    group.finish();
}

fn bench_metadata(c: &mut Criterion) {
    let binder = Binder::new();
    c.bench_function("metadata_cache_hit", |b| {
        b.iter(|| black_box(binder.metadata::<Order>()));
    });
}

criterion_group!(benches, bench_bind, bench_serialize, bench_metadata);
criterion_main!(benches);
