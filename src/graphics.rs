use std::{fmt::Write, path::Path};

use log::debug;

use crate::{DataError, stats};

const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
}

impl Bin {
    // the last bin is closed on the right
    fn contains(&self, x: f64, last: bool) -> bool {
        x >= self.lo && (x < self.hi || (last && x <= self.hi))
    }
}

/// Equal-width histogram of a data set, with its mean and median.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    bins: Vec<Bin>,
    mean: f64,
    median: f64,
}

impl Histogram {
    pub fn new(data: &[f64], bins: usize) -> Result<Self, DataError> {
        if data.is_empty() {
            return Err(DataError::EmptyInput);
        }
        if bins == 0 {
            return Err(DataError::InvalidData {
                reason: "the number of bins must be at least 1".to_string(),
            });
        }
        if let Some(bad) = data.iter().find(|x| !x.is_finite()) {
            return Err(DataError::InvalidData {
                reason: format!("`{bad}` cannot be placed in a histogram"),
            });
        }

        let (mut lo, mut hi) = data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                (lo.min(x), hi.max(x))
            });
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let mut edges: Vec<Bin> = (0..bins)
            .map(|i| Bin {
                lo: lo + width * i as f64,
                hi: if i + 1 == bins {
                    hi
                } else {
                    lo + width * (i + 1) as f64
                },
                count: 0,
            })
            .collect();

        for &x in data {
            let index = (((x - lo) / width) as usize).min(bins - 1);
            edges[index].count += 1;
        }

        let histogram = Histogram {
            bins: edges,
            mean: stats::mean(data)?,
            median: stats::median(data)?,
        };
        debug!(
            "built histogram of {} values in {bins} bins over [{lo}, {hi}]",
            data.len()
        );
        Ok(histogram)
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn median(&self) -> f64 {
        self.median
    }

    fn title(label: Option<&str>) -> String {
        match label {
            Some(label) => format!("Histogram - {label}"),
            None => "Histogram".to_string(),
        }
    }

    fn bin_of(&self, x: f64) -> Option<usize> {
        let last = self.bins.len() - 1;
        self.bins
            .iter()
            .enumerate()
            .position(|(i, bin)| bin.contains(x, i == last))
    }

    /// One bar per bin; the bins holding the mean and the median are marked.
    pub fn render_text(&self, label: Option<&str>) -> String {
        let tallest = self.bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
        let mean_bin = self.bin_of(self.mean);
        let median_bin = self.bin_of(self.median);

        let mut out = String::new();
        let _ = writeln!(out, "{}", Self::title(label));
        for (i, bin) in self.bins.iter().enumerate() {
            let bar = "#".repeat(bin.count * BAR_WIDTH / tallest);
            let _ = write!(
                out,
                "[{:>10.4}, {:>10.4}{} | {bar:<width$} {}",
                bin.lo,
                bin.hi,
                if i + 1 == self.bins.len() { ']' } else { ')' },
                bin.count,
                width = BAR_WIDTH
            );
            if mean_bin == Some(i) {
                out.push_str("  <- mean");
            }
            if median_bin == Some(i) {
                out.push_str("  <- median");
            }
            out.push('\n');
        }
        let _ = writeln!(out, "mean={:.4}", self.mean);
        let _ = writeln!(out, "median={:.4}", self.median);
        out
    }

    /// Bars plus a dashed mean line and a dash-dot median line.
    #[cfg(feature = "svg")]
    pub fn render_svg(&self, label: Option<&str>) -> String {
        const WIDTH: f64 = 640.0;
        const HEIGHT: f64 = 400.0;
        const MARGIN: f64 = 40.0;

        let lo = self.bins.first().map_or(0.0, |b| b.lo);
        let hi = self.bins.last().map_or(1.0, |b| b.hi);
        let tallest = self.bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64;
        let plot_w = WIDTH - 2.0 * MARGIN;
        let plot_h = HEIGHT - 2.0 * MARGIN;
        let x_of = |v: f64| MARGIN + (v - lo) / (hi - lo) * plot_w;

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
        );
        let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle" font-family="sans-serif" font-size="16">{}</text>"#,
            WIDTH / 2.0,
            MARGIN / 2.0 + 6.0,
            escape(&Self::title(label))
        );

        for bin in &self.bins {
            let h = bin.count as f64 / tallest * plot_h;
            let _ = writeln!(
                svg,
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="steelblue" fill-opacity="0.7" stroke="white"/>"#,
                x_of(bin.lo),
                HEIGHT - MARGIN - h,
                x_of(bin.hi) - x_of(bin.lo),
                h
            );
        }

        let markers = [
            (self.mean, "red", "6,4", format!("mean={:.4}", self.mean)),
            (self.median, "green", "8,3,2,3", format!("median={:.4}", self.median)),
        ];
        for (i, (value, colour, dash, legend)) in markers.iter().enumerate() {
            let x = x_of(*value);
            let _ = writeln!(
                svg,
                r#"<line x1="{x:.2}" y1="{MARGIN}" x2="{x:.2}" y2="{}" stroke="{colour}" stroke-width="2" stroke-dasharray="{dash}"/>"#,
                HEIGHT - MARGIN
            );
            let _ = writeln!(
                svg,
                r#"<text x="{}" y="{}" font-family="sans-serif" font-size="12" fill="{colour}" text-anchor="end">{legend}</text>"#,
                WIDTH - MARGIN,
                MARGIN + 16.0 * (i + 1) as f64
            );
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// Writes the SVG rendering to `path`. Image output is an optional
    /// capability, checked here rather than at startup.
    pub fn save_svg(&self, path: &Path, label: Option<&str>) -> Result<(), DataError> {
        #[cfg(feature = "svg")]
        {
            std::fs::write(path, self.render_svg(label)).map_err(|source| DataError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            debug!("saved histogram to {}", path.display());
            Ok(())
        }
        #[cfg(not(feature = "svg"))]
        {
            let _ = (path, label);
            Err(DataError::MissingDependency {
                capability: "histogram image output",
                remedy: "rebuild with the `svg` feature: cargo build --features svg",
            })
        }
    }
}

#[cfg(feature = "svg")]
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [f64; 10] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];

    #[test]
    fn counts_cover_every_value() {
        let histogram = Histogram::new(&SAMPLE, 5).unwrap();
        let counts: Vec<_> = histogram.bins().iter().map(|b| b.count).collect();
        assert_eq!(counts, [2, 2, 2, 2, 2]);
        assert_eq!(histogram.bins()[0].lo, 1.0);
        assert_eq!(histogram.bins()[4].hi, 10.0);
    }

    #[test]
    fn single_distinct_value() {
        let histogram = Histogram::new(&[3.0, 3.0], 4).unwrap();
        assert_eq!(histogram.bins().iter().map(|b| b.count).sum::<usize>(), 2);
        assert_eq!(histogram.mean(), 3.0);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(Histogram::new(&[], 5), Err(DataError::EmptyInput)));
        assert!(matches!(
            Histogram::new(&[1.0], 0),
            Err(DataError::InvalidData { .. })
        ));
        assert!(matches!(
            Histogram::new(&[1.0, f64::INFINITY], 3),
            Err(DataError::InvalidData { .. })
        ));
    }

    #[test]
    fn text_marks_mean_and_median() {
        let histogram = Histogram::new(&[0.0, 0.0, 0.0, 30.0], 6).unwrap();
        let text = histogram.render_text(Some("skewed"));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Histogram - skewed");
        assert!(lines[1].ends_with("3  <- median"));
        assert!(lines[2].ends_with("0  <- mean"));
        assert_eq!(lines[7], "mean=7.5000");
        assert_eq!(lines[8], "median=0.0000");
    }

    #[cfg(feature = "svg")]
    #[test]
    fn svg_has_bars_and_markers() {
        let svg = Histogram::new(&SAMPLE, 5).unwrap().render_svg(Some("a<b"));
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("fill=\"steelblue\"").count(), 5);
        assert!(svg.contains("stroke=\"red\""));
        assert!(svg.contains("median=5.5000"));
        assert!(svg.contains("Histogram - a&lt;b"));
    }

    #[cfg(not(feature = "svg"))]
    #[test]
    fn image_output_needs_feature() {
        let histogram = Histogram::new(&SAMPLE, 5).unwrap();
        assert!(matches!(
            histogram.save_svg(Path::new("unused.svg"), None),
            Err(DataError::MissingDependency { .. })
        ));
    }
}
