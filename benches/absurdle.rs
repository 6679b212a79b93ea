//! Candidate elimination throughput.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use wordle_arena::core::{DeterministicRng, WordList};
use wordle_arena::game::absurdle::eliminate;
use wordle_arena::game::{GameConfig, GameMode, GameModeKind};

/// `n` distinct five-letter words spread over the alphabet.
fn synthetic_words(n: usize) -> Vec<String> {
    let mut rng = DeterministicRng::new(0xABCD);
    let mut words = std::collections::BTreeSet::new();
    while words.len() < n {
        let word: String = (0..5)
            .map(|_| (b'A' + (rng.next_u64() % 26) as u8) as char)
            .collect();
        words.insert(word);
    }
    words.into_iter().collect()
}

fn bench_eliminate(c: &mut Criterion) {
    let mut group = c.benchmark_group("eliminate");

    for size in [100usize, 1_000, 10_000] {
        let words = synthetic_words(size);
        let list = WordList::new(&words).unwrap();
        let alive = list.all_indices();
        let guess = words[size / 2].clone();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            let mut rng = DeterministicRng::new(1);
            b.iter(|| eliminate(black_box(&list), black_box(&alive), black_box(&guess), &mut rng))
        });
    }

    group.finish();
}

fn bench_full_game(c: &mut Criterion) {
    let words = synthetic_words(2_000);
    let config = GameConfig { word_list: words.clone(), max_rounds: 6 };

    c.bench_function("absurdle_six_guesses", |b| {
        b.iter(|| {
            let mut game = GameMode::new(
                GameModeKind::Absurdle,
                &config,
                Box::new(DeterministicRng::new(7)),
            )
            .unwrap();
            for word in words.iter().step_by(331).take(6) {
                let _ = game.guess("bench", black_box(word));
            }
        })
    });
}

criterion_group!(benches, bench_eliminate, bench_full_game);
criterion_main!(benches);
