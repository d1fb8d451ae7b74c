use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A color at a weight. color is sRGBA8
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub weight: f64,
    pub color: [u8; 4],
}

/// Height color bar of a dynamic marker layer.
/// The weight of a dynamic marker is the parameter (altitude) used to pick its tint.
///
/// stops are always sorted by weight and weights are unique and finite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ColorStop>", into = "Vec<ColorStop>")]
pub struct ColorBar {
    stops: Vec<ColorStop>,
}

impl ColorBar {
    pub fn new(stops: impl IntoIterator<Item = ColorStop>) -> Self {
        let mut bar = Self::default();
        for stop in stops {
            bar.add_stop(stop.weight, stop.color);
        }
        bar
    }
    /// inserts a stop. A stop with the same weight is replaced. non-finite weights are ignored.
    pub fn add_stop(&mut self, weight: f64, color: [u8; 4]) {
        if !weight.is_finite() {
            tracing::warn!(weight, "ignoring color stop with non-finite weight");
            return;
        }
        match self
            .stops
            .binary_search_by(|stop| stop.weight.total_cmp(&weight))
        {
            Ok(index) => self.stops[index].color = color,
            Err(index) => self.stops.insert(index, ColorStop { weight, color }),
        }
    }
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
    /// linearly interpolates between the two stops around weight.
    /// weights outside of the bar are clamped to the first / last stop.
    pub fn color_for(&self, weight: f64) -> Option<[u8; 4]> {
        if weight.is_nan() {
            return None;
        }
        let first = self.stops.first()?;
        let last = self.stops.last()?;
        if weight <= first.weight {
            return Some(first.color);
        }
        if weight >= last.weight {
            return Some(last.color);
        }
        let (low, high) = self
            .stops
            .iter()
            .tuple_windows()
            .find(|(_, high)| weight <= high.weight)?;
        let t = (weight - low.weight) / (high.weight - low.weight);
        let mut color = [0u8; 4];
        for (channel, (a, b)) in color.iter_mut().zip(low.color.iter().zip(high.color.iter())) {
            let a = *a as f64;
            let b = *b as f64;
            *channel = (a + (b - a) * t).round().clamp(0.0, 255.0) as u8;
        }
        Some(color)
    }
}

impl From<Vec<ColorStop>> for ColorBar {
    fn from(value: Vec<ColorStop>) -> Self {
        Self::new(value)
    }
}
impl From<ColorBar> for Vec<ColorStop> {
    fn from(value: ColorBar) -> Self {
        value.stops
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::*;
    use similar_asserts::assert_eq;

    #[fixture]
    fn bar() -> ColorBar {
        ColorBar::new([
            ColorStop {
                weight: 1000.0,
                color: [255, 255, 255, 255],
            },
            ColorStop {
                weight: 0.0,
                color: [0, 0, 255, 255],
            },
            ColorStop {
                weight: 500.0,
                color: [0, 255, 0, 255],
            },
        ])
    }

    #[rstest]
    fn stops_are_sorted(bar: ColorBar) {
        let weights: Vec<f64> = bar.stops().iter().map(|stop| stop.weight).collect();
        assert_eq!(weights, vec![0.0, 500.0, 1000.0]);
    }

    #[rstest]
    #[case(-10.0, Some([0, 0, 255, 255]))]
    #[case(0.0, Some([0, 0, 255, 255]))]
    #[case(250.0, Some([0, 128, 128, 255]))]
    #[case(500.0, Some([0, 255, 0, 255]))]
    #[case(750.0, Some([128, 255, 128, 255]))]
    #[case(5000.0, Some([255, 255, 255, 255]))]
    #[case(f64::NAN, None)]
    fn interpolation(bar: ColorBar, #[case] weight: f64, #[case] expected: Option<[u8; 4]>) {
        assert_eq!(bar.color_for(weight), expected);
    }

    #[rstest]
    fn empty_bar_has_no_color() {
        assert_eq!(ColorBar::default().color_for(1.0), None);
    }

    #[rstest]
    fn same_weight_replaces(mut bar: ColorBar) {
        bar.add_stop(500.0, [1, 2, 3, 4]);
        bar.add_stop(f64::INFINITY, [9, 9, 9, 9]);
        assert_eq!(bar.stops().len(), 3);
        assert_eq!(bar.color_for(500.0), Some([1, 2, 3, 4]));
    }

    #[rstest]
    fn json_keeps_invariants() {
        let bar: ColorBar = serde_json::from_str(
            r#"[{"weight": 10.0, "color": [0, 0, 0, 255]}, {"weight": -5.0, "color": [255, 0, 0, 255]}]"#,
        )
        .expect("failed to parse color bar");
        assert_eq!(bar.stops()[0].weight, -5.0);
        assert_eq!(bar.color_for(2.5), Some([128, 0, 0, 255]));
    }
}
