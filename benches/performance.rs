use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cartograph::analysis::FileAnalyzer;
use cartograph::core::entity::{Entity, Reference, Role};
use cartograph::core::ReferenceResolver;

fn synthetic_entities(count: usize) -> Vec<Entity> {
    (0..count)
        .map(|i| {
            let next = (i + 1) % count;
            Entity::new(
                format!("Component{i}"),
                Role::Component,
                format!("components/component-{i}.tsx"),
            )
            .with_exports(vec![format!("Component{i}")])
            .with_uses(vec![
                Reference::Unresolved(format!("Component{next}")),
                Reference::Unresolved(format!("component-{next}")),
                Reference::Unresolved("somethingUnknown".to_string()),
            ])
        })
        .collect()
}

fn benchmark_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("relationship_resolution");

    for size in [100usize, 1000] {
        let entities = synthetic_entities(size);
        group.bench_function(format!("resolve_{size}_entities"), |b| {
            b.iter(|| {
                let mut working = entities.clone();
                let mut resolver = ReferenceResolver::new();
                resolver.build_indexes(black_box(&working));
                resolver.resolve(black_box(&mut working));
                black_box(working)
            });
        });
    }

    group.finish();
}

fn benchmark_file_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_analysis");

    let content = r#"
import Button from './button';
import { usePricing } from '../hooks/usePricing';

interface ProductCardProps {
    title: string;
    price?: number;
}

export default function ProductCard({ title, price }: ProductCardProps) {
    const { format } = usePricing();
    return (
        <div>
            <h2>{title}</h2>
            <Button>{format(price)}</Button>
        </div>
    );
}
"#;

    group.bench_function("component_file", |b| {
        let mut analyzer = FileAnalyzer::new().unwrap();
        b.iter(|| {
            black_box(analyzer.analyze(
                black_box("components/product-card.tsx"),
                black_box(content),
            ))
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_resolution, benchmark_file_analysis);
criterion_main!(benches);
