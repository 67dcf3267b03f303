use criterion::{criterion_group, criterion_main, Criterion};
use sim_core::{CostCurve, Effect, Gate, UpgradeEntry};
use sim_runtime::{Autoplayer, Catalog, Quantity, Session};
use std::time::Duration;

fn catalog() -> Catalog {
    let mut entries = Vec::new();
    for i in 0..24u32 {
        let base = 10.0 * 4f64.powi(i as i32);
        let effect = match i % 4 {
            0 => Effect::ClickFlat(u64::from(i) + 1),
            1 => Effect::IncomeFlat(base / 20.0),
            2 => Effect::ClickMult(0.05),
            _ => Effect::IncomeMult(0.1),
        };
        let mut e = UpgradeEntry::new(
            format!("u{i}"),
            "Upgrade",
            base,
            CostCurve::Geometric { growth: 1.15 },
            effect,
        );
        if i > 0 {
            e = e.with_requirement(format!("u{}", i - 1), Gate::AtLeast(1));
        }
        entries.push(e);
    }
    Catalog::new(entries).unwrap()
}

fn bench_autoplay(c: &mut Criterion) {
    c.bench_function("autoplay_10_minutes", |b| {
        b.iter(|| {
            let mut session = Session::new(catalog());
            let mut bot = Autoplayer::new(42);
            for _ in 0..600 {
                bot.step(&mut session, Duration::from_secs(1));
            }
            session.state().money()
        })
    });
}

fn bench_offers(c: &mut Criterion) {
    let mut session = Session::new(catalog());
    let mut bot = Autoplayer::new(7).with_prestige_threshold(0);
    for _ in 0..300 {
        bot.step(&mut session, Duration::from_secs(1));
    }
    c.bench_function("offers_max", |b| b.iter(|| session.offers(Quantity::Max)));
}

criterion_group!(benches, bench_autoplay, bench_offers);
criterion_main!(benches);
