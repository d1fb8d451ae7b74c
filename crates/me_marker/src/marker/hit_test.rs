use glam::{UVec2, Vec2};

use super::{MarkerAttribute, MarkerDescriptor};

/// Screen space rectangle used to detect taps on a marker.
///
/// The coordinates are in physical pixels, relative to the projected screen point of the marker's location.
/// To test a tap, either translate the box to the projected point or subtract the projected point from the tap.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HitBox {
    pub min: Vec2,
    pub max: Vec2,
}

impl HitBox {
    /// `image_size` and the marker's anchor point / offset / hit test size are in points.
    /// `screen_scale` is the number of physical pixels per point.
    ///
    /// When the marker overrides the hit test size, the box has that size and is centered on the anchor.
    /// Otherwise, the box covers the marker image placed with its anchor point on the location.
    /// Without an override and without an image size, there's nothing to hit.
    pub fn for_marker(
        marker: &MarkerDescriptor,
        image_size: Option<UVec2>,
        screen_scale: f32,
    ) -> Option<Self> {
        let anchor = if marker.kind.supports(MarkerAttribute::Offset) {
            marker.offset * screen_scale
        } else {
            Vec2::ZERO
        };
        if let Some(size) = marker.hit_test_override() {
            let half = size.abs() * screen_scale * 0.5;
            return Some(Self {
                min: anchor - half,
                max: anchor + half,
            });
        }
        let image_size = image_size?.as_vec2() * screen_scale;
        let min = anchor - marker.anchor_point * screen_scale;
        Some(Self {
            min,
            max: min + image_size,
        })
    }
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
    /// edges are inclusive
    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
    pub fn translate(self, by: Vec2) -> Self {
        Self {
            min: self.min + by,
            max: self.max + by,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{GeoCoordinate, MarkerDescriptor};
    use glam::{uvec2, vec2};
    use rstest::*;
    use similar_asserts::assert_eq;

    #[fixture]
    fn marker() -> MarkerDescriptor {
        let mut marker = MarkerDescriptor::dynamic("pin", GeoCoordinate::new(10.0, 20.0));
        marker.anchor_point = vec2(16.0, 32.0);
        marker
    }

    #[rstest]
    fn default_box_covers_image_around_anchor(marker: MarkerDescriptor) {
        let hit_box = HitBox::for_marker(&marker, Some(uvec2(32, 32)), 1.0).expect("no hit box");
        assert_eq!(
            hit_box,
            HitBox {
                min: vec2(-16.0, -32.0),
                max: vec2(16.0, 0.0)
            }
        );
        assert!(hit_box.contains(vec2(0.0, -10.0)));
        assert!(!hit_box.contains(vec2(0.0, 5.0)));
    }

    #[rstest]
    fn default_box_needs_image(marker: MarkerDescriptor) {
        assert_eq!(HitBox::for_marker(&marker, None, 2.0), None);
    }

    #[rstest]
    fn override_is_scaled_and_centered(mut marker: MarkerDescriptor) {
        marker.hit_test_size = vec2(44.0, 20.0);
        let hit_box = HitBox::for_marker(&marker, Some(uvec2(4, 4)), 2.0).expect("no hit box");
        assert_eq!(hit_box.size(), vec2(88.0, 40.0));
        assert_eq!(hit_box.center(), Vec2::ZERO);
    }

    #[rstest]
    fn single_non_zero_dimension_overrides(mut marker: MarkerDescriptor) {
        marker.hit_test_size = vec2(0.0, 10.0);
        let hit_box = HitBox::for_marker(&marker, Some(uvec2(32, 32)), 1.0).expect("no hit box");
        assert_eq!(hit_box.size(), vec2(0.0, 10.0));
    }

    #[rstest]
    fn offset_moves_the_box(mut marker: MarkerDescriptor) {
        marker.offset = vec2(5.0, -5.0);
        marker.hit_test_size = vec2(10.0, 10.0);
        let hit_box = HitBox::for_marker(&marker, None, 3.0).expect("no hit box");
        assert_eq!(hit_box.center(), vec2(15.0, -15.0));

        // legacy markers have no offset
        marker.kind = crate::MarkerKind::LegacyFast;
        let hit_box = HitBox::for_marker(&marker, None, 3.0).expect("no hit box");
        assert_eq!(hit_box.center(), Vec2::ZERO);
    }

    #[rstest]
    fn translate_to_screen_point() {
        let hit_box = HitBox {
            min: vec2(-1.0, -1.0),
            max: vec2(1.0, 1.0),
        }
        .translate(vec2(100.0, 50.0));
        assert!(hit_box.contains(vec2(101.0, 49.0)));
        assert!(!hit_box.contains(vec2(98.0, 50.0)));
    }
}
