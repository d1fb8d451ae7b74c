use me_marker::{LayoutOutput, MarkerId, ResolvedMarker, SkippedMarker};

fn id_to_string(id: &MarkerId) -> String {
    match id {
        MarkerId::Name(name) => format!("'{name}'"),
        MarkerId::Uid(uid) => format!("#{uid}"),
    }
}

pub fn format_resolved(marker: &ResolvedMarker) -> String {
    let mut line = format!(
        "{} at ({:.5}, {:.5}) angle {:.1} image {}x{} {:?} ({} bytes) {:?} hit [{:.1}, {:.1}]..[{:.1}, {:.1}]",
        id_to_string(&marker.id),
        marker.location.latitude,
        marker.location.longitude,
        marker.screen_angle,
        marker.image.width(),
        marker.image.height(),
        marker.texture_format,
        marker.texture_format.texture_bytes(&marker.image),
        marker.sampling,
        marker.hit_box.min.x,
        marker.hit_box.min.y,
        marker.hit_box.max.x,
        marker.hit_box.max.y,
    );
    if let Some([r, g, b, a]) = marker.tint {
        line.push_str(&format!(" tint #{r:02x}{g:02x}{b:02x}{a:02x}"));
    }
    line
}

pub fn format_skipped(skipped: &SkippedMarker) -> String {
    format!("{} skipped: {:?}", id_to_string(&skipped.id), skipped.reason)
}

pub fn print_output(title: &str, output: &LayoutOutput) {
    println!(
        "{title}: {} resolved, {} skipped",
        output.markers.len(),
        output.skipped.len()
    );
    for marker in &output.markers {
        println!("  {}", format_resolved(marker));
    }
    for skipped in &output.skipped {
        println!("  {}", format_skipped(skipped));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use me_marker::{
        GeoCoordinate, MarkerDescriptor, MarkerImage, MarkerLayer, SkipReason, TextureCache,
    };
    use rstest::*;
    use similar_asserts::assert_eq;

    #[rstest]
    fn resolved_line() {
        let mut cache = TextureCache::new();
        cache.insert(
            "pin",
            MarkerImage::from_rgba(2, 4, vec![255; 32]).expect("failed to create image"),
        );
        let mut marker = MarkerDescriptor::dynamic("pin", GeoCoordinate::new(1.5, -2.25));
        marker.cached_image_name = Some("pin".into());
        marker.hit_test_size = [10.0, 10.0].into();
        let layer = MarkerLayer::default();
        let resolved = layer
            .resolve(&marker, &cache, &layer.context(0, 0.0))
            .expect("failed to resolve");
        assert_eq!(
            format_resolved(&resolved),
            "'pin' at (1.50000, -2.25000) angle 0.0 image 2x4 Rgba8888 (32 bytes) Bilinear hit [-5.0, -5.0]..[5.0, 5.0]"
        );
    }

    #[rstest]
    fn skipped_line() {
        let skipped = SkippedMarker {
            id: MarkerId::Uid(3),
            reason: SkipReason::Hidden,
        };
        assert_eq!(format_skipped(&skipped), "#3 skipped: Hidden");
    }
}
