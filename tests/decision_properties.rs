// Randomized checks of the decision policy over many distributions.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tag_genie::tagging::{decide, LabelSet, ScoreDistribution, ABSTENTION_LABEL};

const CASES: usize = 500;

fn random_case(rng: &mut StdRng) -> (LabelSet, Vec<f32>) {
    let tag_count = rng.random_range(1..=8);
    let tags: Vec<String> = (0..tag_count).map(|i| format!("tag-{i}")).collect();
    let labels = LabelSet::new(&tags).unwrap();

    let weights: Vec<f32> = (0..labels.len())
        .map(|_| rng.random_range(0.001f32..1.0))
        .collect();
    let total: f32 = weights.iter().sum();
    let scores = weights.iter().map(|w| w / total).collect();
    (labels, scores)
}

#[test]
fn ranked_covers_every_label_in_descending_order() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..CASES {
        let (labels, scores) = random_case(&mut rng);
        let result = decide(ScoreDistribution::new(&labels, &scores).unwrap());

        assert_eq!(result.ranked().len(), labels.len());
        assert!(result
            .ranked()
            .windows(2)
            .all(|pair| pair[0].1 >= pair[1].1));
        let sum: f32 = result.ranked().iter().map(|(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-3);
    }
}

#[test]
fn confidence_is_the_raw_maximum() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..CASES {
        let (labels, scores) = random_case(&mut rng);
        let max = scores.iter().copied().fold(f32::MIN, f32::max);
        let result = decide(ScoreDistribution::new(&labels, &scores).unwrap());
        assert_eq!(result.confidence(), max);
    }
}

#[test]
fn strict_winner_decides_the_label() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..CASES {
        let (labels, scores) = random_case(&mut rng);
        let max = scores.iter().copied().fold(f32::MIN, f32::max);
        let winners: Vec<usize> = (0..scores.len()).filter(|&i| scores[i] == max).collect();
        if winners.len() != 1 {
            continue;
        }

        let expected = labels.labels()[winners[0]].as_str();
        let result = decide(ScoreDistribution::new(&labels, &scores).unwrap());
        assert_eq!(result.predicted_label(), expected);
        assert_eq!(
            result.is_abstention(),
            expected == ABSTENTION_LABEL,
            "abstention flag must follow the winner"
        );
    }
}

#[test]
fn abstention_loses_every_exact_tie() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..CASES {
        let tag_count = rng.random_range(1..=6);
        let tags: Vec<String> = (0..tag_count).map(|i| format!("tag-{i}")).collect();
        let labels = LabelSet::new(&tags).unwrap();

        // One random tag ties with the abstention label at the top.
        let tied = rng.random_range(0..tag_count);
        let n = labels.len();
        if n == 2 {
            // Only the tied tag and abstention; pick 0.5 each.
            let result = decide(ScoreDistribution::new(&labels, &[0.5, 0.5]).unwrap());
            assert_eq!(result.predicted_label(), labels.labels()[0]);
            continue;
        }
        let top = 0.4f32;
        let rest = (1.0 - 2.0 * top) / (n - 2) as f32;
        let scores: Vec<f32> = (0..n)
            .map(|i| {
                if i == tied || i == n - 1 {
                    top
                } else {
                    rest
                }
            })
            .collect();

        let result = decide(ScoreDistribution::new(&labels, &scores).unwrap());
        assert_eq!(result.predicted_label(), labels.labels()[tied]);
        assert!(!result.is_abstention());
    }
}
