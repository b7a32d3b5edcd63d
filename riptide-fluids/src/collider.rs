use glam::DVec2;
use riptide_geom::Surface2;

/// Resolves particle penetration against an implicit surface.
///
/// The resolution algorithm is shared by every collider: query the closest
/// surface point and normal, and if the particle sits inside the surface or
/// within its skin `radius`, project it onto `closest + radius * normal` and
/// reflect the inward normal velocity component by `-restitution`. The
/// tangential component passes through untouched unless the collider reports
/// a positive friction coefficient.
pub trait Collider2: Send + Sync {
    fn surface(&self) -> &dyn Surface2;

    /// Velocity of the collider surface at `point` (zero for static shapes).
    fn velocity_at(&self, point: DVec2) -> DVec2;

    fn friction_coefficient(&self) -> f64 {
        0.0
    }

    /// Called once per sub-timestep before force accumulation. Static
    /// colliders have nothing to do.
    fn update(&mut self, _current_time_in_seconds: f64, _time_interval_in_seconds: f64) {}

    fn resolve_collision(
        &self,
        radius: f64,
        restitution: f64,
        position: &mut DVec2,
        velocity: &mut DVec2,
    ) {
        let surface = self.surface();
        let closest_point = surface.closest_point(*position);
        let closest_normal = surface.closest_normal(*position);

        let is_penetrating =
            surface.is_inside(*position) || position.distance(closest_point) < radius;
        if !is_penetrating {
            return;
        }

        let target_normal = closest_normal;
        let target_point = closest_point + radius * target_normal;
        let collider_velocity = self.velocity_at(target_point);

        let relative_velocity = *velocity - collider_velocity;
        let normal_dot_relative = target_normal.dot(relative_velocity);

        if normal_dot_relative < 0.0 {
            let relative_velocity_n = normal_dot_relative * target_normal;
            let mut relative_velocity_t = relative_velocity - relative_velocity_n;
            let delta_relative_velocity_n = (-restitution - 1.0) * relative_velocity_n;
            let relative_velocity_n = -restitution * relative_velocity_n;

            let friction = self.friction_coefficient();
            if friction > 0.0 && relative_velocity_t.length_squared() > 0.0 {
                let friction_scale = (1.0
                    - friction * delta_relative_velocity_n.length()
                        / relative_velocity_t.length())
                .max(0.0);
                relative_velocity_t *= friction_scale;
            }

            *velocity = relative_velocity_n + relative_velocity_t + collider_velocity;
        }

        *position = target_point;
    }
}

/// A collider wrapping a static rigid surface with an optional constant
/// surface velocity.
pub struct RigidBodyCollider2 {
    surface: Box<dyn Surface2>,
    pub linear_velocity: DVec2,
    friction_coefficient: f64,
}

impl RigidBodyCollider2 {
    pub fn new(surface: Box<dyn Surface2>) -> Self {
        Self {
            surface,
            linear_velocity: DVec2::ZERO,
            friction_coefficient: 0.0,
        }
    }

    pub fn with_linear_velocity(mut self, velocity: DVec2) -> Self {
        self.linear_velocity = velocity;
        self
    }

    pub fn set_friction_coefficient(&mut self, friction: f64) {
        self.friction_coefficient = friction.max(0.0);
    }
}

impl Collider2 for RigidBodyCollider2 {
    fn surface(&self) -> &dyn Surface2 {
        self.surface.as_ref()
    }

    fn velocity_at(&self, _point: DVec2) -> DVec2 {
        self.linear_velocity
    }

    fn friction_coefficient(&self) -> f64 {
        self.friction_coefficient
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riptide_geom::Plane2;

    fn ground_collider() -> RigidBodyCollider2 {
        RigidBodyCollider2::new(Box::new(Plane2::new(DVec2::Y, DVec2::ZERO)))
    }

    #[test]
    fn particle_above_surface_is_untouched() {
        let collider = ground_collider();
        let mut position = DVec2::new(0.0, 1.0);
        let mut velocity = DVec2::new(1.0, -1.0);
        collider.resolve_collision(0.1, 0.5, &mut position, &mut velocity);
        assert_eq!(position, DVec2::new(0.0, 1.0));
        assert_eq!(velocity, DVec2::new(1.0, -1.0));
    }

    #[test]
    fn penetrating_particle_is_projected_out() {
        let collider = ground_collider();
        let mut position = DVec2::new(2.0, -0.5);
        let mut velocity = DVec2::new(1.0, -3.0);
        collider.resolve_collision(0.1, 0.5, &mut position, &mut velocity);

        assert_eq!(position, DVec2::new(2.0, 0.1));
        // Normal component reflected by -restitution, tangential untouched.
        assert!((velocity.y - 1.5).abs() < 1e-12);
        assert!((velocity.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn separating_velocity_is_preserved() {
        let collider = ground_collider();
        let mut position = DVec2::new(0.0, 0.05);
        let mut velocity = DVec2::new(0.0, 2.0);
        collider.resolve_collision(0.1, 0.5, &mut position, &mut velocity);

        // Still inside the skin, so the position snaps out, but an already
        // separating velocity is not reflected.
        assert_eq!(position, DVec2::new(0.0, 0.1));
        assert_eq!(velocity, DVec2::new(0.0, 2.0));
    }

    #[test]
    fn friction_damps_tangential_motion() {
        let mut collider = ground_collider();
        collider.set_friction_coefficient(0.5);
        let mut position = DVec2::new(0.0, -0.1);
        let mut velocity = DVec2::new(1.0, -1.0);
        collider.resolve_collision(0.0, 0.0, &mut position, &mut velocity);

        assert!(velocity.x < 1.0);
        assert!(velocity.x >= 0.0);
        assert_eq!(velocity.y, 0.0);
    }

    #[test]
    fn moving_surface_drags_particles() {
        let collider = ground_collider().with_linear_velocity(DVec2::new(2.0, 0.0));
        let mut position = DVec2::new(0.0, -0.2);
        let mut velocity = DVec2::ZERO;
        collider.resolve_collision(0.0, 0.0, &mut position, &mut velocity);

        // Relative velocity (0,0)-(2,0) has no inward normal component, so
        // only the projection applies.
        assert_eq!(position, DVec2::new(0.0, 0.0));
        assert_eq!(velocity, DVec2::ZERO);
    }
}
