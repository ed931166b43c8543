//! Integration tests for u-cubepack-core.

use approx::assert_relative_eq;
use rand::Rng;
use u_cubepack_core::exact::{ExactResult, SolutionStatus};
use u_cubepack_core::geometry::{is_permutation_of, sorted_dims, volume};
use u_cubepack_core::placement::{Placement, PlacementStats};
use u_cubepack_core::population::{PopulationConfig, PopulationProblem, PopulationRunner};
use u_cubepack_core::result::{SolveResult, SolveSummary};
use u_cubepack_core::{Axis, Config, Error, Strategy};

mod geometry_tests {
    use super::*;

    #[test]
    fn test_sorted_dims_and_permutations() {
        assert_eq!(sorted_dims([9, 7, 10]), [7, 9, 10]);
        assert!(is_permutation_of([1, 2, 3], [3, 1, 2]));
        assert!(!is_permutation_of([1, 2, 3], [1, 2, 2]));
        assert_eq!(volume([u32::MAX, 2, 1]), u32::MAX as u64 * 2);
    }

    #[test]
    fn test_placement_overlap_is_cell_based() {
        let a = Placement::new("A", 0, [0, 0, 0], [2, 2, 2], 0);
        let touching = Placement::new("B", 0, [2, 0, 0], [2, 2, 2], 0);
        let crossing = Placement::new("C", 0, [1, 1, 1], [2, 2, 2], 0);
        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&crossing));
        assert_eq!(a.max_corner(), [2, 2, 2]);
    }
}

mod result_tests {
    use super::*;

    #[test]
    fn test_summary_from_result() {
        let mut result = SolveResult::new().with_strategy(Strategy::Greedy.name());
        result.requested = 4;
        result.placements = vec![
            Placement::new("A", 0, [0, 0, 0], [2, 2, 2], 0),
            Placement::new("A", 1, [2, 0, 0], [2, 2, 2], 1),
        ];
        result.update_utilization(64);

        let summary = SolveSummary::from(&result);
        assert_eq!(summary.total_requested, 4);
        assert_eq!(summary.total_placed, 2);
        assert_relative_eq!(summary.utilization_percent, 25.0);
        assert_eq!(summary.strategy, "Greedy");

        let stats: PlacementStats = result.placement_stats();
        assert_eq!(stats.total_volume, 16);
        assert_eq!(stats.rotated, 1);
    }

    #[test]
    fn test_timeout_is_distinguishable_from_zero_optimum() {
        let mut zero = SolveResult::new();
        zero.exact = Some(ExactResult::optimal(0.0));
        assert!(!zero.timed_out_without_solution());
        assert_eq!(zero.solution_status(), Some(SolutionStatus::Optimal));

        let mut timeout = SolveResult::new();
        timeout.exact = Some(ExactResult::timeout(None, 12.0));
        assert!(timeout.timed_out_without_solution());
        assert_eq!(timeout.placements.len(), zero.placements.len());
    }
}

mod error_tests {
    use super::*;

    #[test]
    fn test_unplaceable_carries_block_and_axis() {
        let err = Error::Unplaceable {
            block: "pallet".to_string(),
            dimensions: [120, 80, 15],
            axis: Axis::X,
            container_length: 100,
        };
        assert!(err.is_unplaceable());
        let msg = err.to_string();
        assert!(msg.contains("pallet"));
        assert!(msg.contains("x (width)"));
    }

    #[test]
    fn test_config_rejects_gap_out_of_range() {
        assert!(Config::default().with_gap_tolerance(-0.1).validate().is_err());
        assert!(Config::default().with_gap_tolerance(0.05).validate().is_ok());
    }
}

mod population_tests {
    use super::*;

    /// Individuals are 8-bit masks; fitness is the number of set bits.
    struct Bits;

    impl PopulationProblem for Bits {
        type Individual = u8;
        type Fitness = u32;

        fn random_individual<R: Rng>(&self, rng: &mut R) -> u8 {
            rng.gen()
        }

        fn fitness(&self, individual: &u8) -> u32 {
            individual.count_ones()
        }
    }

    #[test]
    fn test_parallel_scores_match_sequential() {
        let config = PopulationConfig::new().with_population_size(500).with_seed(3);
        let result = PopulationRunner::new(config, Bits).run();
        assert_eq!(result.fitness.len(), 500);

        let mut rng = PopulationConfig::new().with_seed(3).rng();
        let population = Bits.initialize_population(500, &mut rng);
        let sequential: Vec<u32> = population.iter().map(|i| Bits.fitness(i)).collect();
        assert_eq!(result.fitness, sequential);
    }
}
