//! End-to-end SPH scenarios: a dam-break-style water drop inside a closed
//! box. The full-resolution run takes minutes and is ignored by default; the
//! coarse run checks the same observables at test-suite speed.

use glam::DVec2;
use riptide_fluids::{
    Frame, PhysicsAnimation, RigidBodyCollider2, SphSolver2, VolumeParticleEmitter2,
};
use riptide_geom::{Box2, BoundingBox2, ImplicitSurfaceSet2, Plane2, Sphere2};

struct WaterDropObservations {
    count_at_frame_5: usize,
    final_count: usize,
    mean_y_at_frame_1: f64,
    mean_y_at_last_frame: f64,
}

/// Build the scene: a pool filling the bottom quarter of the domain plus a
/// floating drop at the domain midpoint, enclosed by an inward-facing box.
fn run_water_drop(target_spacing: f64, frames: u32, sample_frame: u32) -> WaterDropObservations {
    let domain = BoundingBox2::new(DVec2::ZERO, DVec2::new(1.0, 2.0));

    let mut solver = SphSolver2::new();
    solver.set_pseudo_viscosity_coefficient(0.0);
    {
        let particles = solver.sph_system_data_mut();
        particles.set_target_density(1000.0);
        particles.set_target_spacing(target_spacing);
    }

    let mut source = ImplicitSurfaceSet2::new();
    source.add_explicit_surface(Box::new(Plane2::new(
        DVec2::Y,
        DVec2::new(0.0, 0.25 * domain.height()),
    )));
    source.add_explicit_surface(Box::new(Sphere2::new(
        domain.mid_point(),
        0.15 * domain.width(),
    )));

    let mut source_bound = domain;
    source_bound.expand(-target_spacing);
    solver.set_emitter(Box::new(VolumeParticleEmitter2::new(
        Box::new(source),
        source_bound,
        target_spacing,
        DVec2::ZERO,
    )));

    solver.set_collider(Box::new(RigidBodyCollider2::new(Box::new(
        Box2::new(domain).with_flipped_normal(),
    ))));

    let mut observations = WaterDropObservations {
        count_at_frame_5: 0,
        final_count: 0,
        mean_y_at_frame_1: 0.0,
        mean_y_at_last_frame: 0.0,
    };

    for index in 1..=frames {
        solver.update(Frame::new(index, 1.0 / 60.0)).unwrap();

        let data = solver.sph_system_data();
        let count = data.number_of_particles();
        assert!(count > 0, "no particles emitted by frame {index}");

        // Nothing may leave the box at any frame.
        for p in data.base().positions() {
            assert!(
                domain.contains(*p),
                "particle at {p:?} escaped the domain at frame {index}"
            );
        }

        let mean_y = data.base().positions().iter().map(|p| p.y).sum::<f64>() / count as f64;
        if index == 1 {
            observations.mean_y_at_frame_1 = mean_y;
        }
        if index == 5 {
            observations.count_at_frame_5 = count;
        }
        if index == sample_frame {
            observations.mean_y_at_last_frame = mean_y;
        }
        observations.final_count = count;
    }

    observations
}

#[test]
fn water_drop_settles_inside_the_box() {
    let observations = run_water_drop(0.05, 60, 60);

    assert_eq!(observations.count_at_frame_5, observations.final_count);
    assert!(
        observations.mean_y_at_last_frame <= 0.9 * observations.mean_y_at_frame_1,
        "mean y went from {} to {}",
        observations.mean_y_at_frame_1,
        observations.mean_y_at_last_frame
    );
}

#[test]
#[ignore = "full-resolution run, several minutes; run with --ignored"]
fn water_drop_full_resolution() {
    let observations = run_water_drop(0.02, 120, 60);

    assert_eq!(observations.count_at_frame_5, observations.final_count);
    assert!(
        observations.mean_y_at_last_frame <= 0.85 * observations.mean_y_at_frame_1,
        "mean y went from {} to {}",
        observations.mean_y_at_frame_1,
        observations.mean_y_at_last_frame
    );
}
