use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Smoothed normal of everything the character is currently touching.
///
/// Zero means no contact.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct ContactTracker {
    normal: Vec3,
}

impl ContactTracker {
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Folds this tick's contact normals into the running normal.
    pub fn accumulate(&mut self, normals: impl IntoIterator<Item = Vec3>) {
        let sum: Vec3 = normals.into_iter().sum();
        self.normal = (self.normal + sum).normalize_or_zero();
    }

    pub fn clear(&mut self) {
        self.normal = Vec3::ZERO;
    }
}

/// Feeds rapier's active contact manifolds into each tracker.
pub fn track_contacts(
    context: Res<RapierContext>,
    mut query: Query<(Entity, &mut ContactTracker)>,
) {
    for (entity, mut tracker) in &mut query {
        let mut normals = Vec::new();
        for pair in context.contacts_with(entity) {
            if !pair.has_any_active_contacts() {
                continue;
            }
            // Manifold normals point from collider1 into collider2.
            let flip = if pair.collider1() == entity { -1.0 } else { 1.0 };
            normals.extend(
                pair.manifolds()
                    .filter(|manifold| manifold.num_points() > 0)
                    .map(|manifold| manifold.normal() * flip),
            );
        }

        if normals.is_empty() {
            tracker.clear();
        } else {
            tracker.accumulate(normals);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn accumulated_normal_is_unit() {
        let mut tracker = ContactTracker::default();
        tracker.accumulate([Vec3::Y, Vec3::X]);
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!((tracker.normal() - expected).length() < EPS);
    }

    #[test]
    fn previous_normal_smooths_next_tick() {
        let mut tracker = ContactTracker::default();
        tracker.accumulate([Vec3::Y]);
        tracker.accumulate([Vec3::X]);
        assert!(tracker.normal().y > 0.0 && tracker.normal().x > 0.0);
    }

    #[test]
    fn cancelling_contacts_and_clear_give_zero() {
        let mut tracker = ContactTracker::default();
        tracker.accumulate([Vec3::X, Vec3::NEG_X]);
        assert_eq!(tracker.normal(), Vec3::ZERO);

        tracker.accumulate([Vec3::Z]);
        tracker.clear();
        assert_eq!(tracker.normal(), Vec3::ZERO);
    }
}
