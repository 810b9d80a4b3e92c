//! Property-based tests for the threshold merge.
//!
//! Random spanning trees are generated with a seeded RNG, their edges sorted by
//! weight, and the merge is checked against a breadth-first search oracle and
//! the partition laws a threshold cut must obey: a full cut is the identity,
//! no cut is a single component, results are repeatable, raising the
//! threshold only coarsens, and an edge at the threshold is kept.

use std::collections::{HashMap, VecDeque};

use arid_test_support::proptest_profile::proptest_config;
use proptest::prelude::*;
use proptest::test_runner::{TestCaseError, TestCaseResult};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rstest::rstest;
use test_strategy::Arbitrary;

use super::{MstEdge, compute_components};

const MAX_NODES: usize = 64;

/// How parents are chosen when growing the random tree.
#[derive(Arbitrary, Clone, Copy, Debug, Eq, PartialEq)]
enum TreeShape {
    /// Each node attaches to its predecessor.
    Chain,
    /// Every node attaches to one hub.
    Star,
    /// Each node attaches to a uniformly chosen earlier node.
    Random,
}

/// How edge weights are drawn.
#[derive(Arbitrary, Clone, Copy, Debug, Eq, PartialEq)]
enum WeightProfile {
    /// Continuous weights, ties are practically absent.
    Distinct,
    /// A handful of integral weights shared by many edges.
    Tied,
}

#[derive(Clone, Debug)]
struct TreeFixture {
    node_count: usize,
    edges: Vec<MstEdge>,
}

impl TreeFixture {
    fn generate(shape: TreeShape, profile: WeightProfile, node_count: usize, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut ids: Vec<usize> = (0..node_count).collect();
        ids.shuffle(&mut rng);

        let pool: Vec<f64> = (0..rng.gen_range(1..=3))
            .map(|_| f64::from(rng.gen_range(1_u8..=10)))
            .collect();

        let mut edges: Vec<MstEdge> = (1..node_count)
            .map(|child| {
                let parent = match shape {
                    TreeShape::Chain => child - 1,
                    TreeShape::Star => 0,
                    TreeShape::Random => rng.gen_range(0..child),
                };
                let weight = match profile {
                    WeightProfile::Distinct => rng.gen_range(0.0..100.0),
                    WeightProfile::Tied => pool[rng.gen_range(0..pool.len())],
                };
                let (source, target) = if rng.gen_bool(0.5) {
                    (ids[parent], ids[child])
                } else {
                    (ids[child], ids[parent])
                };
                MstEdge::new(source, target, weight)
            })
            .collect();
        edges.sort_by(|left, right| left.weight().total_cmp(&right.weight()));

        Self { node_count, edges }
    }

    fn labels(&self, threshold: f64) -> Result<Vec<usize>, TestCaseError> {
        compute_components(self.node_count, &self.edges, threshold)
            .map(crate::ComponentLabels::into_vec)
            .map_err(|err| TestCaseError::fail(format!("merge failed: {err}")))
    }
}

fn fixture_strategy() -> impl Strategy<Value = TreeFixture> {
    (
        any::<TreeShape>(),
        any::<WeightProfile>(),
        1..=MAX_NODES,
        any::<u64>(),
    )
        .prop_map(|(shape, profile, node_count, seed)| {
            TreeFixture::generate(shape, profile, node_count, seed)
        })
}

/// Numbers the blocks of a partition by first appearance so two labellings of
/// the same partition compare equal.
fn canonical(labels: &[usize]) -> Vec<usize> {
    let mut ids = HashMap::new();
    labels
        .iter()
        .map(|label| {
            let next = ids.len();
            *ids.entry(*label).or_insert(next)
        })
        .collect()
}

fn oracle_partition(fixture: &TreeFixture, threshold: f64) -> Vec<usize> {
    let mut adjacency = vec![Vec::new(); fixture.node_count];
    for edge in fixture.edges.iter().filter(|edge| edge.weight() <= threshold) {
        adjacency[edge.source()].push(edge.target());
        adjacency[edge.target()].push(edge.source());
    }

    let mut component = vec![usize::MAX; fixture.node_count];
    let mut next = 0;
    for start in 0..fixture.node_count {
        if component[start] != usize::MAX {
            continue;
        }
        component[start] = next;
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for &neighbour in &adjacency[node] {
                if component[neighbour] == usize::MAX {
                    component[neighbour] = next;
                    queue.push_back(neighbour);
                }
            }
        }
        next += 1;
    }
    component
}

fn thresholds(fixture: &TreeFixture) -> Vec<f64> {
    let mut values: Vec<f64> = fixture.edges.iter().map(MstEdge::weight).collect();
    values.extend([f64::NEG_INFINITY, -1.0, 50.0, f64::INFINITY]);
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
}

fn run_oracle_equivalence(fixture: &TreeFixture) -> TestCaseResult {
    for threshold in thresholds(fixture) {
        let labels = fixture.labels(threshold)?;
        prop_assert_eq!(
            canonical(&labels),
            oracle_partition(fixture, threshold),
            "partition differs from BFS at threshold {}",
            threshold
        );
    }
    Ok(())
}

fn run_extreme_thresholds(fixture: &TreeFixture) -> TestCaseResult {
    let joined = fixture.labels(f64::INFINITY)?;
    prop_assert!(joined.windows(2).all(|pair| pair[0] == pair[1]));

    let split = fixture.labels(f64::NEG_INFINITY)?;
    let identity: Vec<usize> = (0..fixture.node_count).collect();
    prop_assert_eq!(split, identity);
    Ok(())
}

fn run_monotonic_coarsening(fixture: &TreeFixture) -> TestCaseResult {
    let levels = thresholds(fixture);
    for pair in levels.windows(2) {
        let finer = fixture.labels(pair[0])?;
        let coarser = fixture.labels(pair[1])?;
        let mut image = HashMap::new();
        for (node, (&fine, &coarse)) in finer.iter().zip(&coarser).enumerate() {
            let mapped = *image.entry(fine).or_insert(coarse);
            prop_assert_eq!(
                mapped,
                coarse,
                "node {} splits a component when raising {} to {}",
                node,
                pair[0],
                pair[1]
            );
        }
    }
    Ok(())
}

fn run_boundary_inclusive(fixture: &TreeFixture) -> TestCaseResult {
    for edge in &fixture.edges {
        let labels = fixture.labels(edge.weight())?;
        prop_assert_eq!(labels[edge.source()], labels[edge.target()]);
    }
    Ok(())
}

fn run_idempotence(fixture: &TreeFixture) -> TestCaseResult {
    for threshold in thresholds(fixture) {
        prop_assert_eq!(fixture.labels(threshold)?, fixture.labels(threshold)?);
    }
    Ok(())
}

proptest! {
    #![proptest_config(proptest_config(128))]

    #[test]
    fn merge_matches_bfs_oracle(fixture in fixture_strategy()) {
        run_oracle_equivalence(&fixture)?;
    }

    #[test]
    fn extreme_thresholds_join_or_split_everything(fixture in fixture_strategy()) {
        run_extreme_thresholds(&fixture)?;
    }

    #[test]
    fn raising_threshold_only_coarsens(fixture in fixture_strategy()) {
        run_monotonic_coarsening(&fixture)?;
    }

    #[test]
    fn edges_at_threshold_are_kept(fixture in fixture_strategy()) {
        run_boundary_inclusive(&fixture)?;
    }

    #[test]
    fn repeated_runs_are_identical(fixture in fixture_strategy()) {
        run_idempotence(&fixture)?;
    }
}

#[rstest]
#[case::chain_distinct(TreeShape::Chain, WeightProfile::Distinct, 42)]
#[case::chain_tied(TreeShape::Chain, WeightProfile::Tied, 42)]
#[case::star_distinct(TreeShape::Star, WeightProfile::Distinct, 7)]
#[case::star_tied(TreeShape::Star, WeightProfile::Tied, 999)]
#[case::random_distinct(TreeShape::Random, WeightProfile::Distinct, 1234)]
#[case::random_tied(TreeShape::Random, WeightProfile::Tied, 7777)]
fn seeded_fixtures_satisfy_all_properties(
    #[case] shape: TreeShape,
    #[case] profile: WeightProfile,
    #[case] seed: u64,
) {
    let fixture = TreeFixture::generate(shape, profile, MAX_NODES, seed);
    run_oracle_equivalence(&fixture).expect("oracle equivalence must hold");
    run_extreme_thresholds(&fixture).expect("extreme thresholds must hold");
    run_monotonic_coarsening(&fixture).expect("coarsening must hold");
    run_boundary_inclusive(&fixture).expect("boundary inclusivity must hold");
    run_idempotence(&fixture).expect("idempotence must hold");
}

#[test]
fn oracle_agrees_on_hand_built_chain() {
    let fixture = TreeFixture {
        node_count: 4,
        edges: vec![
            MstEdge::new(0, 1, 1.0),
            MstEdge::new(1, 2, 2.0),
            MstEdge::new(2, 3, 3.0),
        ],
    };
    assert_eq!(oracle_partition(&fixture, 2.0), vec![0, 0, 0, 1]);
}
