//! End-to-end tests for the 3D placement strategies.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use u_cubepack_core::geometry::{is_permutation_of, Geometry};
use u_cubepack_core::population::PopulationConfig;
use u_cubepack_d3::capacity::{catalog_upper_bound, estimate};
use u_cubepack_d3::geometry::{block_catalog, expand_instances, sort_instances};
use u_cubepack_d3::greedy::run_greedy;
use u_cubepack_d3::hybrid::combine;
use u_cubepack_d3::orientation::catalog_from_dims;
use u_cubepack_d3::stochastic::run_stochastic;
use u_cubepack_d3::{
    audit, solve_exact, BlockType, Config, Container, ExactConfig, GreedyConfig, OccupancyGrid,
    Packer3D, Placement, SearchOrder, SolutionStatus, Solver, Strategy,
};

const ALL_STRATEGIES: [Strategy; 5] = [
    Strategy::Greedy,
    Strategy::Stochastic,
    Strategy::Exact,
    Strategy::HybridStochastic,
    Strategy::HybridExact,
];

fn random_blocks(rng: &mut StdRng, types: usize, max_edge: u32) -> Vec<BlockType> {
    (0..types)
        .map(|i| {
            BlockType::new(
                format!("T{}", i),
                rng.gen_range(1..=max_edge),
                rng.gen_range(1..=max_edge),
                rng.gen_range(1..=max_edge),
            )
            .with_quantity(rng.gen_range(1..=4))
        })
        .collect()
}

/// Replays placements checking `fits` before every commit.
fn assert_valid(container: &Container, placements: &[Placement]) {
    let mut grid = OccupancyGrid::new(container);
    for (i, p) in placements.iter().enumerate() {
        assert!(
            grid.fits(p.origin, p.dims),
            "placement {} {:?} at {:?} does not fit",
            i,
            p.dims,
            p.origin
        );
        grid.commit(p.origin, p.dims);
    }
}

mod scenarios {
    use super::*;

    #[test]
    fn domino_tiling_exact_optimum_is_thirty() {
        let container = Container::new(3, 4, 5).unwrap();
        let catalog = catalog_from_dims(&[[1, 1, 2], [2, 1, 1], [1, 2, 1]]);
        let solution = solve_exact(&container, &catalog, &ExactConfig::default()).unwrap();

        assert_eq!(solution.placements.len(), 30);
        assert_eq!(solution.result.status, SolutionStatus::Optimal);
        assert_valid(&container, &solution.placements);
        for p in &solution.placements {
            assert!(catalog.iter().any(|e| e.dims == p.dims));
        }
    }

    #[test]
    fn five_blocks_fit_with_room_to_spare() {
        let container = Container::new(30, 40, 50).unwrap();
        let blocks = vec![BlockType::new("B", 9, 7, 10).with_quantity(5)];
        let instances = expand_instances(&blocks);

        let outcome = run_greedy(&container, &instances, &GreedyConfig::default());
        assert_eq!(outcome.placements.len(), 5);
        assert!(outcome.placements.iter().all(|p| p.dims == [9, 7, 10]));
        assert_valid(&container, &outcome.placements);

        let result = Packer3D::default_config().solve(&blocks, &container).unwrap();
        assert_eq!(result.placements.len(), 5);
        assert_relative_eq!(result.utilization, 5.0 * 630.0 / 60000.0, epsilon = 1e-12);
    }

    #[test]
    fn oversized_block_yields_zero_placements_everywhere() {
        let container = Container::new(1, 1, 1).unwrap();
        let blocks = vec![BlockType::new("long", 2, 1, 1)];
        let instances = expand_instances(&blocks);
        let catalog = block_catalog(&blocks, true);

        let greedy = run_greedy(&container, &instances, &GreedyConfig::default());
        assert!(greedy.placements.is_empty());

        let config = PopulationConfig::new().with_population_size(16).with_seed(1);
        let stochastic = run_stochastic(&container, &catalog, 4, &config);
        assert!(stochastic.placements.is_empty());

        let exact = solve_exact(&container, &catalog, &ExactConfig::default()).unwrap();
        assert!(exact.placements.is_empty());
        assert!(exact.result.has_solution());

        for strategy in ALL_STRATEGIES {
            let result = Packer3D::new(Config::default().with_strategy(strategy).with_seed(1))
                .solve(&blocks, &container)
                .unwrap();
            assert_eq!(result.placements.len(), 0, "{:?}", strategy);
        }
    }

    #[test]
    fn single_individual_with_no_instances_is_empty() {
        let catalog = catalog_from_dims(&[[1, 1, 1], [2, 3, 4]]);
        for dims in [[1, 1, 1], [5, 5, 5], [2, 9, 3]] {
            let container = Container::from_dims(dims).unwrap();
            let config = PopulationConfig::new().with_population_size(1).with_seed(0);
            let outcome = run_stochastic(&container, &catalog, 0, &config);
            assert!(outcome.placements.is_empty());
        }
    }
}

mod properties {
    use super::*;

    #[test]
    fn every_strategy_is_non_overlapping_in_bounds_and_sound() {
        let mut rng = StdRng::seed_from_u64(2024);
        for round in 0..6 {
            let container = Container::new(
                rng.gen_range(3..=6),
                rng.gen_range(3..=6),
                rng.gen_range(3..=6),
            )
            .unwrap();
            let blocks = random_blocks(&mut rng, 3, 3);

            for strategy in ALL_STRATEGIES {
                let config = Config::default()
                    .with_strategy(strategy)
                    .with_seed(round)
                    .with_population_size(30)
                    .with_time_limit(300);
                let result = Packer3D::new(config).solve(&blocks, &container).unwrap();
                assert_valid(&container, &result.placements);
                assert!(audit(&container, &result.placements).is_ok());

                for p in &result.placements {
                    let block = blocks.iter().find(|b| b.id() == &p.block_id).unwrap();
                    assert!(
                        is_permutation_of(p.dims, block.dimensions()),
                        "{:?}: {:?} is not an orientation of {}",
                        strategy,
                        p.dims,
                        block.id()
                    );
                }
            }
        }
    }

    #[test]
    fn greedy_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(77);
        let container = Container::new(10, 8, 6).unwrap();
        let blocks = random_blocks(&mut rng, 6, 5);
        let mut instances = expand_instances(&blocks);
        sort_instances(&mut instances, SearchOrder::VolumeDescending);

        let first = run_greedy(&container, &instances, &GreedyConfig::default());
        let second = run_greedy(&container, &instances, &GreedyConfig::default());
        assert_eq!(first.placements, second.placements);
        assert_eq!(format!("{:?}", first), format!("{:?}", second));
    }

    #[test]
    fn hybrid_never_drops_accepted_warm_placements() {
        let mut rng = StdRng::seed_from_u64(5);
        for seed in 0..5 {
            let container = Container::new(6, 6, 6).unwrap();
            let blocks = random_blocks(&mut rng, 4, 3);
            let instances = expand_instances(&blocks);
            let catalog = block_catalog(&blocks, true);

            let config = PopulationConfig::new().with_population_size(20).with_seed(seed);
            let warm = run_stochastic(&container, &catalog, instances.len(), &config);
            let hybrid = combine(
                &container,
                &instances,
                &warm.placements,
                &GreedyConfig::default(),
            );

            assert!(hybrid.placements.len() >= hybrid.warm_accepted);
            assert_eq!(
                hybrid.placements.len(),
                hybrid.warm_accepted + hybrid.greedy_added
            );
            assert_eq!(
                hybrid.warm_accepted + hybrid.warm_rejected + hybrid.warm_unmatched,
                warm.placements.len()
            );
            // accepted warm placements lead the output, in warm order
            let mut remaining_warm = warm.placements.iter();
            for h in &hybrid.placements[..hybrid.warm_accepted] {
                assert!(remaining_warm.any(|w| w.origin == h.origin && w.dims == h.dims));
            }
            assert_valid(&container, &hybrid.placements);
        }
    }

    #[test]
    fn capacity_bound_is_never_exceeded() {
        let mut rng = StdRng::seed_from_u64(9);
        for round in 0..8 {
            let container = Container::new(
                rng.gen_range(2..=7),
                rng.gen_range(2..=7),
                rng.gen_range(2..=7),
            )
            .unwrap();
            let blocks = random_blocks(&mut rng, 4, 4);
            let bound = estimate(&blocks, &container, true);

            for strategy in ALL_STRATEGIES {
                let config = Config::default()
                    .with_strategy(strategy)
                    .with_seed(round)
                    .with_instance_count(64)
                    .with_time_limit(300);
                let result = Packer3D::new(config).solve(&blocks, &container).unwrap();
                assert!(
                    result.placements.len() <= bound.count_upper_bound,
                    "{:?} placed {} > bound {}",
                    strategy,
                    result.placements.len(),
                    bound.count_upper_bound
                );
                assert_eq!(
                    result.placements.len() + result.unplaced.len(),
                    result.requested,
                    "{:?}",
                    strategy
                );
            }

            let catalog = block_catalog(&blocks, true);
            let exact_config = ExactConfig::default().with_time_limit_ms(300);
            let exact = solve_exact(&container, &catalog, &exact_config).unwrap();
            assert!(exact.placements.len() <= catalog_upper_bound(&catalog, &container));
        }
    }
}

mod packer {
    use super::*;
    use u_cubepack_core::{Error, FailurePolicy};

    #[test]
    fn summary_counts_match_request() {
        let container = Container::new(4, 4, 4).unwrap();
        let blocks = vec![
            BlockType::new("cube", 2, 2, 2).with_quantity(9),
            BlockType::new("giant", 5, 5, 5),
        ];
        let config = Config::default().with_failure_policy(FailurePolicy::SkipAndContinue);
        let result = Packer3D::new(config).solve(&blocks, &container).unwrap();

        assert_eq!(result.requested, 10);
        assert_eq!(result.placed_count(), 8);
        assert_eq!(result.placements.len() + result.unplaced.len(), result.requested);
        assert_eq!(result.unplaceable, vec!["giant".to_string()]);
        assert_relative_eq!(result.utilization, 1.0);
    }

    #[test]
    fn rotation_can_be_disabled() {
        let container = Container::new(1, 1, 3).unwrap();
        let blocks = vec![BlockType::new("rod", 3, 1, 1)];

        let rotated = Packer3D::default_config().solve(&blocks, &container).unwrap();
        assert_eq!(rotated.placements.len(), 1);
        assert_eq!(rotated.placements[0].dims, [1, 1, 3]);

        let packer = Packer3D::new(Config::default().with_rotation(false));
        let fixed = packer.solve(&blocks, &container).unwrap();
        assert!(fixed.placements.is_empty());
        match packer.check_placeable(&blocks, &container) {
            Err(Error::Unplaceable { block, .. }) => assert_eq!(block, "rod"),
            other => panic!("expected unplaceable, got {:?}", other),
        }
    }

    #[test]
    fn hybrid_exact_fills_after_exact_warm_start() {
        let container = Container::new(3, 4, 5).unwrap();
        let blocks = vec![
            BlockType::new("domino", 1, 1, 2).with_quantity(20),
            BlockType::new("unit", 1, 1, 1).with_quantity(20),
        ];
        let config = Config::default().with_strategy(Strategy::HybridExact);
        let result = Packer3D::new(config).solve(&blocks, &container).unwrap();

        assert!(result.exact.as_ref().is_some_and(|e| e.has_solution()));
        assert_valid(&container, &result.placements);
        let volume: u64 = result.placements.iter().map(|p| p.volume()).sum();
        assert_eq!(volume, 60);
    }

    #[test]
    fn catalog_strategies_never_place_more_than_requested() {
        let container = Container::new(2, 2, 2).unwrap();
        let blocks = vec![BlockType::new("unit", 1, 1, 1)];

        for strategy in [Strategy::Exact, Strategy::Stochastic] {
            let config = Config::default()
                .with_strategy(strategy)
                .with_seed(3)
                .with_instance_count(8);
            let result = Packer3D::new(config).solve(&blocks, &container).unwrap();

            assert!(result.placements.len() <= 1, "{:?}", strategy);
            assert_eq!(result.placements.len() + result.unplaced.len(), 1);
            for p in &result.placements {
                assert_eq!(p.block_id, "unit");
                assert_eq!(p.instance, 0);
            }
        }

        let exact = Packer3D::new(Config::default().with_strategy(Strategy::Exact))
            .solve(&blocks, &container)
            .unwrap();
        assert_eq!(exact.placements.len(), 1);
        assert!(exact.all_placed());
    }

    #[test]
    fn hybrid_exact_falls_back_to_greedy_when_model_is_too_large() {
        let container = Container::new(30, 40, 50).unwrap();
        let blocks = vec![BlockType::new("brick", 1, 2, 3).with_quantity(5)];

        let hybrid = Packer3D::new(Config::default().with_strategy(Strategy::HybridExact))
            .solve(&blocks, &container)
            .unwrap();
        assert_eq!(hybrid.placements.len(), 5);
        assert!(hybrid.unplaced.is_empty());
        assert_valid(&container, &hybrid.placements);
        let status = hybrid.exact.as_ref().map(|e| e.status);
        assert_eq!(status, Some(SolutionStatus::Error));

        let err = Packer3D::new(Config::default().with_strategy(Strategy::Exact))
            .solve(&blocks, &container)
            .unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn duplicate_ids_are_searched_per_block_type() {
        let container = Container::new(2, 2, 2).unwrap();
        let blocks = vec![
            BlockType::new("crate", 1, 1, 1).with_quantity(2),
            BlockType::new("crate", 3, 3, 3),
        ];
        let result = Packer3D::default_config().solve(&blocks, &container).unwrap();

        assert_eq!(result.placements.len(), 2);
        assert_eq!(result.unplaceable, vec!["crate".to_string()]);
        assert_eq!(result.unplaced, vec!["crate".to_string()]);
        assert_eq!(result.requested, 3);
    }
}
