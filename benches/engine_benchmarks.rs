use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use dictr::engine::confetti::{Confetti, ConfettiSettings, Viewport};
use dictr::engine::normalize::{normalize, sentences_match};
use dictr::engine::template::Template;
use dictr::session::dictation::DictationState;
use dictr::session::input::process_char;

const SENTENCE: &str =
    "How much wood would a woodchuck chuck if a woodchuck could chuck wood? Quite a lot, 42 logs!";

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize (one sentence)", |b| {
        b.iter(|| normalize(black_box(SENTENCE)))
    });

    let typed = normalize(SENTENCE);
    c.bench_function("sentences_match", |b| {
        b.iter(|| sentences_match(black_box(SENTENCE), black_box(&typed)))
    });
}

fn bench_dictation(c: &mut Criterion) {
    c.bench_function("template build", |b| {
        b.iter(|| Template::build(black_box(SENTENCE)))
    });

    let typed = normalize(SENTENCE);
    c.bench_function("type full sentence", |b| {
        b.iter(|| {
            let mut state = DictationState::new(SENTENCE);
            for ch in typed.chars() {
                process_char(&mut state, black_box(ch));
            }
            state
        })
    });
}

fn bench_confetti(c: &mut Criterion) {
    let viewport = Viewport { width: 1280.0 };

    c.bench_function("confetti burst, 156 frames", |b| {
        b.iter(|| {
            let mut rng = SmallRng::seed_from_u64(42);
            let mut confetti = Confetti::new(ConfettiSettings::default());
            let id = confetti.activate(viewport, &mut rng);
            for _ in 0..156 {
                confetti.frame(id);
            }
            confetti.expire(id)
        })
    });
}

criterion_group!(benches, bench_normalize, bench_dictation, bench_confetti);
criterion_main!(benches);
