//! Property-based tests using proptest.
//!
//! These tests verify invariants of the distance kernel, the visit
//! scheduler and the projection engines.

use proptest::prelude::*;
use proyectar::numeric::hypot2;
use proyectar::prelude::*;
use proyectar::scheduler::VisitOrder;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn layout_strategy(n: usize) -> impl Strategy<Value = Matrix<f64>> {
    proptest::collection::vec(-100.0f64..100.0, n * 2)
        .prop_map(move |data| Matrix::from_vec(n, 2, data).expect("valid test layout"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn hypot_is_symmetric(dx in -1e150f64..1e150, dy in -1e150f64..1e150) {
        prop_assert_eq!(hypot2(dx, dy), hypot2(dy, dx));
    }

    #[test]
    fn hypot_is_non_negative_and_finite(dx in -1e150f64..1e150, dy in -1e150f64..1e150) {
        let d = hypot2(dx, dy);
        prop_assert!(d >= 0.0);
        prop_assert!(d.is_finite());
    }

    #[test]
    fn hypot_bounded_by_component_sums(dx in -1e8f64..1e8, dy in -1e8f64..1e8) {
        let d = hypot2(dx, dy);
        prop_assert!(d + 1e-9 >= dx.abs().max(dy.abs()));
        prop_assert!(d <= dx.abs() + dy.abs() + 1e-9);
    }

    #[test]
    fn hypot_scales_linearly(dx in -1e3f64..1e3, dy in -1e3f64..1e3, s in 0.1f64..10.0) {
        let scaled = hypot2(s * dx, s * dy);
        let reference = s * hypot2(dx, dy);
        prop_assert!((scaled - reference).abs() <= 1e-9 * reference.max(1.0));
    }

    #[test]
    fn shuffle_is_always_a_bijection(seed in any::<u64>(), n in 0usize..64) {
        let mut order = VisitOrder::new(n);
        order.reshuffle(&mut StdRng::seed_from_u64(seed));

        let mut seen = vec![false; n];
        for &i in order.indices() {
            prop_assert!(i < n);
            prop_assert!(!seen[i]);
            seen[i] = true;
        }
    }

    #[test]
    fn force_scheme_preserves_shape_and_stays_finite(
        y0 in layout_strategy(6),
        seed in any::<u64>(),
    ) {
        // Symmetric target built from a reference layout.
        let mut d = Matrix::zeros(6, 6);
        for i in 0..6 {
            for j in 0..6 {
                let dist = hypot2(
                    y0.get(i, 0) - y0.get(j, 0),
                    y0.get(i, 1) - y0.get(j, 1),
                );
                d.set(i, j, dist);
            }
        }

        let fs = ForceScheme::new().with_max_iter(5).with_random_state(seed);
        let y = fs.project(&y0, &d).expect("valid inputs");
        prop_assert_eq!(y.shape(), (6, 2));
        for &v in y.as_slice() {
            prop_assert!(v.is_finite());
        }
    }

    #[test]
    fn force_scheme_report_delta_is_non_negative(
        y0 in layout_strategy(5),
        seed in any::<u64>(),
    ) {
        let mut d = Matrix::zeros(5, 5);
        for i in 0..5 {
            for j in 0..5 {
                if i != j {
                    d.set(i, j, 1.0);
                }
            }
        }

        let report = ForceScheme::new()
            .with_max_iter(3)
            .with_random_state(seed)
            .project_with_report(&y0, &d)
            .expect("valid inputs");
        prop_assert!(report.delta_sum >= 0.0);
        prop_assert!(report.n_iter >= 1);
    }
}
