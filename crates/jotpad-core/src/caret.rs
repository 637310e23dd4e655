//! Caret position estimates for decorative overlays (custom caret glyph,
//! inline count bubble). Nothing here needs to be pixel exact.

use unicode_width::UnicodeWidthChar as _;

use crate::error::MeasureError;

const TAB_CELLS: usize = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CaretPoint {
    pub x: f32,
    pub y: f32,
}

/// Estimate where the caret sits, relative to the top-left of the text.
///
/// `caret` is a char offset; offsets past the end are clamped.
pub trait CaretMeasure {
    fn measure(&self, text: &str, caret: usize) -> Result<CaretPoint, MeasureError>;
}

/// Fixed average glyph width times column, line height times line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ApproximateMeasure {
    pub glyph_width: f32,
    pub line_height: f32,
}

impl ApproximateMeasure {
    pub fn for_font_size(font_size_px: f32) -> Self {
        Self {
            glyph_width: font_size_px * 0.6,
            line_height: font_size_px * 1.4,
        }
    }

    pub fn estimate(&self, text: &str, caret: usize) -> CaretPoint {
        let mut row = 0usize;
        let mut col = 0usize;
        for c in text.chars().take(caret) {
            if c == '\n' {
                row += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        CaretPoint {
            x: col as f32 * self.glyph_width,
            y: row as f32 * self.line_height,
        }
    }
}

impl CaretMeasure for ApproximateMeasure {
    fn measure(&self, text: &str, caret: usize) -> Result<CaretPoint, MeasureError> {
        Ok(self.estimate(text, caret))
    }
}

/// Lays the text out on a monospace cell grid: wide glyphs take two cells,
/// combining marks none, tabs four, and lines soft-wrap at `wrap_width`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellMeasure {
    pub cell_width: f32,
    pub line_height: f32,
    pub wrap_width: Option<f32>,
}

impl CaretMeasure for CellMeasure {
    fn measure(&self, text: &str, caret: usize) -> Result<CaretPoint, MeasureError> {
        let metrics_ok = [self.cell_width, self.line_height]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0);
        if !metrics_ok {
            return Err(MeasureError::BadMetrics);
        }
        let wrap_width = self
            .wrap_width
            .filter(|w| w.is_finite())
            .ok_or(MeasureError::NoWrapWidth)?;
        let columns = (wrap_width / self.cell_width).floor() as usize;
        if columns < 2 {
            return Err(MeasureError::WrapTooNarrow {
                wrap_width,
                cell_width: self.cell_width,
            });
        }

        let mut row = 0usize;
        let mut col = 0usize;
        for c in text.chars().take(caret) {
            if c == '\n' {
                row += 1;
                col = 0;
                continue;
            }
            let cells = if c == '\t' {
                TAB_CELLS - col % TAB_CELLS
            } else {
                c.width().unwrap_or(0)
            };
            if col + cells > columns && col > 0 {
                row += 1;
                col = 0;
            }
            col += cells;
        }

        Ok(CaretPoint {
            x: col as f32 * self.cell_width,
            y: row as f32 * self.line_height,
        })
    }
}

/// Tries a precise strategy first and falls back to the approximation
/// whenever it fails or is absent.
#[derive(Clone, Debug)]
pub struct CaretEstimator<P> {
    precise: Option<P>,
    fallback: ApproximateMeasure,
}

impl<P: CaretMeasure> CaretEstimator<P> {
    pub const fn new(precise: Option<P>, fallback: ApproximateMeasure) -> Self {
        Self { precise, fallback }
    }

    pub fn estimate(&self, text: &str, caret: usize) -> CaretPoint {
        if let Some(precise) = &self.precise {
            match precise.measure(text, caret) {
                Ok(point) => return point,
                Err(err) => tracing::trace!(%err, "precise caret measure failed; approximating"),
            }
        }
        self.fallback.estimate(text, caret)
    }
}

impl CaretEstimator<CellMeasure> {
    /// Cell layout sized for `font_size_px`, wrapping at `wrap_width` when known.
    pub fn for_font_size(font_size_px: f32, wrap_width: Option<f32>) -> Self {
        let fallback = ApproximateMeasure::for_font_size(font_size_px);
        Self::new(
            Some(CellMeasure {
                cell_width: fallback.glyph_width,
                line_height: fallback.line_height,
                wrap_width,
            }),
            fallback,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APPROX: ApproximateMeasure = ApproximateMeasure {
        glyph_width: 10.0,
        line_height: 20.0,
    };

    fn cells(wrap_width: Option<f32>) -> CellMeasure {
        CellMeasure {
            cell_width: 10.0,
            line_height: 20.0,
            wrap_width,
        }
    }

    struct Broken;

    impl CaretMeasure for Broken {
        fn measure(&self, _text: &str, _caret: usize) -> Result<CaretPoint, MeasureError> {
            Err(MeasureError::NoWrapWidth)
        }
    }

    #[test]
    fn approximate_uses_row_and_column() {
        assert_eq!(APPROX.estimate("ab\ncde", 5), CaretPoint { x: 20.0, y: 20.0 });
        assert_eq!(APPROX.estimate("", 0), CaretPoint::default());
        assert_eq!(APPROX.estimate("abc", 99), CaretPoint { x: 30.0, y: 0.0 });
    }

    #[test]
    fn y_grows_with_line_number() {
        let text = "one\ntwo\n\nfour\nfive is a much longer line than the others\nsix";
        let estimators = [
            CaretEstimator::new(Some(cells(Some(80.0))), APPROX),
            CaretEstimator::new(Some(cells(None)), APPROX),
        ];
        for estimator in &estimators {
            let mut last_y = -1.0f32;
            let mut offset = 0usize;
            for line in text.split('\n') {
                let point = estimator.estimate(text, offset);
                assert!(point.y > last_y, "line {line:?}: {} <= {last_y}", point.y);
                last_y = point.y;
                offset += line.chars().count() + 1;
            }
        }
    }

    #[test]
    fn cells_wrap_and_count_wide_glyphs() {
        let measure = cells(Some(40.0));
        let point = measure.measure("abcdef", 6).ok();
        assert_eq!(point, Some(CaretPoint { x: 20.0, y: 20.0 }));

        let point = measure.measure("日本", 2).ok();
        assert_eq!(point, Some(CaretPoint { x: 40.0, y: 0.0 }));

        let point = measure.measure("a\tb", 2).ok();
        assert_eq!(point, Some(CaretPoint { x: 40.0, y: 0.0 }));
    }

    #[test]
    fn cells_reject_unusable_metrics() {
        assert!(matches!(cells(None).measure("a", 1), Err(MeasureError::NoWrapWidth)));
        assert!(matches!(
            cells(Some(15.0)).measure("a", 1),
            Err(MeasureError::WrapTooNarrow { .. })
        ));
        let bad = CellMeasure {
            cell_width: f32::NAN,
            line_height: 20.0,
            wrap_width: Some(100.0),
        };
        assert!(matches!(bad.measure("a", 1), Err(MeasureError::BadMetrics)));
    }

    #[test]
    fn estimator_falls_back_when_precise_fails_or_is_absent() {
        let broken = CaretEstimator::new(Some(Broken), APPROX);
        assert_eq!(broken.estimate("ab\nc", 4), CaretPoint { x: 10.0, y: 20.0 });

        let absent: CaretEstimator<Broken> = CaretEstimator::new(None, APPROX);
        assert_eq!(absent.estimate("ab\nc", 4), CaretPoint { x: 10.0, y: 20.0 });
    }

    #[test]
    fn estimator_never_panics_on_odd_input() {
        let estimator = CaretEstimator::for_font_size(16.0, Some(1.0));
        for (text, caret) in [("", 5), ("\n\n\n", 2), ("\u{301}e\u{301}", 3), ("🦀🦀", 1)] {
            let point = estimator.estimate(text, caret);
            assert!(point.x.is_finite() && point.y.is_finite());
        }
    }
}
