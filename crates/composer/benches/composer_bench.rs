use async_trait::async_trait;
use composer::{
    ComposerConfig, NoOpObserver, OngoingComposition, ParticipationError, Participator,
    ParticipatorRegistry, ServiceComposer,
};
use criterion::{Criterion, criterion_group, criterion_main};

use std::sync::Arc;

struct Query(u32);

#[derive(Default)]
struct Row {
    id: u32,
    price: u32,
    stock: u32,
}

struct Seed;

#[async_trait]
impl Participator<Query, Vec<Row>> for Seed {
    fn is_structure_initializer(&self) -> bool {
        true
    }

    async fn participate(
        &self,
        request: &Query,
        composition: &OngoingComposition<Vec<Row>>,
    ) -> Result<(), ParticipationError> {
        composition.response_mut().extend((0..request.0).map(|id| Row {
            id,
            ..Row::default()
        }));
        Ok(())
    }
}

struct Price;

#[async_trait]
impl Participator<Query, Vec<Row>> for Price {
    fn ready(&self, composition: &OngoingComposition<Vec<Row>>) -> bool {
        composition.structure_initialized()
    }

    async fn participate(
        &self,
        _request: &Query,
        composition: &OngoingComposition<Vec<Row>>,
    ) -> Result<(), ParticipationError> {
        for row in composition.response_mut().iter_mut() {
            row.price = row.id * 100;
        }
        Ok(())
    }
}

struct Stock;

#[async_trait]
impl Participator<Query, Vec<Row>> for Stock {
    fn ready(&self, composition: &OngoingComposition<Vec<Row>>) -> bool {
        composition.structure_initialized()
    }

    async fn participate(
        &self,
        _request: &Query,
        composition: &OngoingComposition<Vec<Row>>,
    ) -> Result<(), ParticipationError> {
        for row in composition.response_mut().iter_mut() {
            row.stock = row.id + 1;
        }
        Ok(())
    }
}

fn composer() -> ServiceComposer<ParticipatorRegistry> {
    let mut builder = ParticipatorRegistry::builder();
    builder
        .register::<Query, Vec<Row>, _>(Seed)
        .register::<Query, Vec<Row>, _>(Price)
        .register::<Query, Vec<Row>, _>(Stock);
    ServiceComposer::with_observer(
        builder.build().unwrap(),
        ComposerConfig::default(),
        Arc::new(NoOpObserver),
    )
}

fn bench_compose_10_rows(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let composer = composer();

    c.bench_function("composer/compose_10_rows", |b| {
        b.iter(|| {
            rt.block_on(async {
                composer.compose(&Query(10), Vec::<Row>::new()).await.unwrap();
            });
        });
    });
}

fn bench_compose_1000_rows(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let composer = composer();

    c.bench_function("composer/compose_1000_rows", |b| {
        b.iter(|| {
            rt.block_on(async {
                composer.compose(&Query(1000), Vec::<Row>::new()).await.unwrap();
            });
        });
    });
}

criterion_group!(benches, bench_compose_10_rows, bench_compose_1000_rows);
criterion_main!(benches);
