//! Benchmarks for the extraction pipeline and classifier training.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use film_intent::catalog::ConceptCatalog;
use film_intent::classify::{Classifier, CountVectorizer, LogisticRegression, Perceptron};
use film_intent::extract::IntentExtractor;

const SYLLABLES: &[&str] = &["ma", "ri", "lo", "be", "tan", "sel", "mor", "vi", "gu", "dre"];

fn random_name(rng: &mut rand::rngs::StdRng) -> String {
    let mut word = |n: usize| -> String {
        (0..n)
            .map(|_| *SYLLABLES.choose(&mut *rng).unwrap_or(&"a"))
            .collect()
    };
    let first = word(2);
    let last = word(3);
    format!("{first} {last}")
}

/// 500 actors, 200 titles, a handful of genres and years.
fn synthetic_catalog() -> ConceptCatalog {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    let actors: Vec<String> = (0..500).map(|_| random_name(&mut rng)).collect();
    let titles: Vec<String> = (0..200).map(|_| random_name(&mut rng)).collect();
    let years: Vec<String> = (0..30).map(|_| rng.gen_range(1950..2024).to_string()).collect();
    ConceptCatalog::from_concepts([
        ("titre", titles),
        ("acteur", actors),
        ("genre", vec!["Drame".into(), "Comédie".into(), "Action".into()]),
        ("annee", years),
    ])
    .unwrap()
}

fn bench_extract(c: &mut Criterion) {
    let catalog = synthetic_catalog();
    let extractor = IntentExtractor::default();
    let query = "Montrez le titre des films où Meryl Streep joue après 2005 dans un drame";

    c.bench_function("extract_730_values", |bench| {
        bench.iter(|| black_box(extractor.extract(black_box(query), &catalog)))
    });
}

fn training_set() -> (Vec<String>, Vec<String>) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(1);
    let columns = ["titre", "genre", "annee", "acteur"];
    (0..400)
        .map(|i| {
            let column = columns[i % columns.len()];
            let filler = random_name(&mut rng);
            (
                format!("montrez le {column} des films avec {filler}"),
                format!("select=['{column}']"),
            )
        })
        .unzip()
}

fn bench_fit(c: &mut Criterion) {
    let (docs, labels) = training_set();
    let mut vectorizer = CountVectorizer::new();
    let x = vectorizer.fit_transform(&docs);

    c.bench_function("perceptron_fit_400", |bench| {
        bench.iter(|| {
            let mut model = Perceptron::new();
            model.fit(&x, &labels).unwrap();
            black_box(model)
        })
    });

    c.bench_function("logistic_fit_400", |bench| {
        bench.iter(|| {
            let mut model = LogisticRegression::default();
            model.max_iter = 100;
            model.fit(&x, &labels).unwrap();
            black_box(model)
        })
    });
}

criterion_group!(benches, bench_extract, bench_fit);
criterion_main!(benches);
