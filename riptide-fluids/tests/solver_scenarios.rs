//! End-to-end particle-solver scenarios.

use glam::DVec2;
use riptide_fluids::{
    ConstantVectorField2, Frame, ParticleSystemSolver2, PhysicsAnimation,
    PointParticleEmitter2, RigidBodyCollider2,
};
use riptide_geom::Plane2;

/// A fountain emitter over a ground plane, pushed sideways by wind: the
/// emission pacing is exact, and the plume drifts downwind.
#[test]
fn point_emitter_fountain_under_wind() {
    let dt = 1.0 / 60.0;

    let mut solver = ParticleSystemSolver2::new();
    solver.set_collider(Box::new(RigidBodyCollider2::new(Box::new(Plane2::new(
        DVec2::Y,
        DVec2::ZERO,
    )))));
    solver.set_wind(Box::new(ConstantVectorField2::new(DVec2::new(1.0, 0.0))));

    let emitter = PointParticleEmitter2::new(DVec2::new(0.0, 3.0), DVec2::new(0.0, 1.0), 5.0, 45.0)
        .with_max_particle_rate(100.0);
    solver.set_emitter(Box::new(emitter));

    for k in 1..=360u32 {
        solver.update(Frame::new(k, dt)).unwrap();

        let expected = (((k - 1) as f64 * dt + dt) * 100.0).ceil() as usize;
        assert_eq!(
            solver.particle_system_data().number_of_particles(),
            expected,
            "frame {k}"
        );
    }

    // Wind drag bends every steady-state trajectory toward +x.
    let data = solver.particle_system_data();
    let n = data.number_of_particles() as f64;
    let mean_x: f64 = data.positions().iter().map(|p| p.x).sum::<f64>() / n;
    let mean_vx: f64 = data.velocities().iter().map(|v| v.x).sum::<f64>() / n;
    assert!(mean_x > 0.1, "mean x was {mean_x}");
    assert!(mean_vx > 0.0, "mean vx was {mean_vx}");

    // Nobody tunnels through the ground.
    for p in data.positions() {
        assert!(p.y >= 0.0);
    }
}

/// With every force switched off, stepping is an exact no-op on positions.
#[test]
fn force_free_round_trip_is_exact() {
    let mut solver = ParticleSystemSolver2::new();
    solver.set_gravity(DVec2::ZERO);
    solver.set_drag_coefficient(0.0);

    let seeds = [
        DVec2::new(0.0, 0.0),
        DVec2::new(-3.25, 7.5),
        DVec2::new(1e-3, -1e6),
        DVec2::new(123.456, 789.0),
    ];
    solver
        .particle_system_data_mut()
        .add_particles(&seeds, &[], &[])
        .unwrap();

    for k in 1..=97u32 {
        solver.update(Frame::new(k, 1.0 / 60.0)).unwrap();
    }

    let data = solver.particle_system_data();
    assert_eq!(data.positions(), &seeds[..]);
    assert!(data.velocities().iter().all(|v| *v == DVec2::ZERO));
    assert!(data.forces().iter().all(|f| *f == DVec2::ZERO));
}
