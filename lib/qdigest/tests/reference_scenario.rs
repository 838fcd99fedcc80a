//! The worked example from the original q-digest test suite: fifteen values over a domain of eight, with `k = 5`.

use qdigest::{QDigest, QDigestConfig, QDigestError};

const DATA: [u64; 15] = [0, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 4, 5, 6, 7];
const SIGMA: u64 = 8;
const K: u64 = 5;

fn digest() -> QDigest {
    QDigest::new(&DATA, K, SIGMA).unwrap()
}

/// The value at `floor(n * fraction) - 1` in the sorted data.
fn exact(fraction: f64) -> u64 {
    let index = (DATA.len() as f64 * fraction).floor() as usize - 1;
    DATA[index]
}

#[test]
fn tree_size() {
    assert_eq!(digest().tree_size(), 15);
}

#[test]
fn serialize() {
    assert_eq!(digest().serialize(), vec![(0, 1), (5, 2), (6, 2), (9, 4), (10, 6)]);
}

#[test]
fn median() {
    assert_eq!(digest().quantile(0.5).unwrap(), exact(0.5));
}

#[test]
fn lower_quartile() {
    assert_eq!(digest().quantile(0.25).unwrap(), exact(0.25));
}

#[test]
fn upper_quartile_within_error_bound() {
    let digest = digest();
    let error = (SIGMA as f64).log2() * DATA.len() as f64 / K as f64;
    assert_eq!(digest.error_bound(), error);

    let actual = digest.quantile(0.75).unwrap();
    assert_eq!(actual, DATA[11]);

    let actual = actual as f64;
    let expected = exact(0.75) as f64;
    assert!(
        (actual - expected).abs() <= error,
        "expected {} (+/-{}), got {}",
        expected,
        error,
        actual
    );
}

#[test]
fn built_from_config() {
    let config: QDigestConfig = QDigestConfig::new(K, SIGMA);
    let digest = config.build(&DATA).unwrap();

    assert_eq!(digest, self::digest());
    assert_eq!(digest.config(), &config);
    assert!(digest.check_invariants().is_ok());
}

#[test]
fn repeated_queries_are_stable() {
    let digest = digest();
    let first = (0..=20).map(|i| digest.quantile(i as f64 / 20.0).unwrap()).collect::<Vec<_>>();
    let second = (0..=20).map(|i| digest.quantile(i as f64 / 20.0).unwrap()).collect::<Vec<_>>();

    assert_eq!(first, second);
    assert!(first.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(digest.serialize(), digest.serialize());
}

#[test]
fn shared_across_threads() {
    let digest = std::sync::Arc::new(digest());

    let handles = (0..4)
        .map(|i| {
            let digest = digest.clone();
            std::thread::spawn(move || digest.quantile(0.25 * i as f64))
        })
        .collect::<Vec<_>>();

    let results = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect::<Result<Vec<_>, QDigestError>>()
        .unwrap();
    assert_eq!(results, vec![0, 2, 3, 4]);
}
