use eframe::egui::{Galley, text::CCursor};
use jotpad_core::{CaretMeasure, CaretPoint, MeasureError};

/// Reads the caret position straight off the editor's laid-out galley, so
/// the result follows the live font metrics and soft wrapping.
pub(crate) struct GalleyMeasure<'a> {
    pub(crate) galley: &'a Galley,
}

impl CaretMeasure for GalleyMeasure<'_> {
    fn measure(&self, text: &str, caret: usize) -> Result<CaretPoint, MeasureError> {
        // An edit applied after layout (Tab indent) leaves the galley behind.
        if self.galley.text() != text {
            return Err(MeasureError::StaleLayout);
        }
        let rect = self.galley.pos_from_cursor(CCursor::new(caret));
        Ok(CaretPoint {
            x: rect.min.x,
            y: rect.min.y,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use eframe::egui;
    use jotpad_core::{ApproximateMeasure, CaretEstimator};

    use super::*;

    fn layout(text: &str, font_size: f32) -> Option<Arc<Galley>> {
        let ctx = egui::Context::default();
        let mut galley = None;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                galley = Some(ui.painter().layout_no_wrap(
                    text.to_owned(),
                    egui::FontId::monospace(font_size),
                    egui::Color32::WHITE,
                ));
            });
        });
        galley
    }

    #[test]
    fn follows_galley_rows() {
        let text = "ab\ncd\nef";
        let galley = layout(text, 16.0);
        assert!(galley.is_some());
        let Some(galley) = galley else {
            return;
        };
        let measure = GalleyMeasure { galley: &galley };

        let start = measure.measure(text, 0).ok().unwrap_or_default();
        assert_eq!(start, CaretPoint::default());

        let second = measure.measure(text, 3).ok().unwrap_or_default();
        assert!(second.x.abs() < f32::EPSILON);
        assert!(second.y > 0.0);

        let third = measure.measure(text, 6).ok().unwrap_or_default();
        assert!((third.y - 2.0 * second.y).abs() < 0.5);

        let end_of_first = measure.measure(text, 2).ok().unwrap_or_default();
        assert!(end_of_first.x > 0.0);
        assert!(end_of_first.y.abs() < f32::EPSILON);
    }

    #[test]
    fn row_height_comes_from_the_font_not_a_guess() {
        let text = "a\nb";
        let galley = layout(text, 16.0);
        assert!(galley.is_some());
        let Some(galley) = galley else {
            return;
        };
        let measured = GalleyMeasure { galley: &galley }
            .measure(text, 2)
            .ok()
            .unwrap_or_default();
        let row_height = galley.rect.height() / 2.0;
        assert!((measured.y - row_height).abs() < 0.5);
        assert!(measured.y < 16.0 * 1.4);
    }

    #[test]
    fn stale_galley_falls_back_to_the_approximation() {
        let galley = layout("ab", 16.0);
        assert!(galley.is_some());
        let Some(galley) = galley else {
            return;
        };
        let measure = GalleyMeasure { galley: &galley };
        assert!(matches!(
            measure.measure("    ab", 4),
            Err(MeasureError::StaleLayout)
        ));

        let fallback = ApproximateMeasure {
            glyph_width: 10.0,
            line_height: 20.0,
        };
        let estimator = CaretEstimator::new(Some(measure), fallback);
        assert_eq!(estimator.estimate("    ab", 4), CaretPoint { x: 40.0, y: 0.0 });
    }
}
