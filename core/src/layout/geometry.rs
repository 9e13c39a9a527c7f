use serde::{Deserialize, Serialize};

use crate::layout::format::{DisplayFormat, LayoutState, Scale, Zoom};
use crate::layout::ordering::ChannelOrder;

const MIN_AUTO_SCALE: f64 = 1.0;
const MIN_AUTO_ZOOM: f64 = 0.1;
const MAX_AUTO_ZOOM: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains_x(&self, x: f64) -> bool {
        x >= self.x && x < self.x + self.width
    }
}

/// Display-density facts plus the non-auto fallbacks for speed and amplitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    pub pixels_per_mm: f64,
    pub default_speed: f64,
    pub default_amplitude: f64,
}

/// Dataset facts the geometry depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceExtent {
    pub sample_rate: f64,
    pub total_samples: usize,
    /// Recording duration in seconds.
    pub duration: f64,
    /// Millivolt cells per row, shared by every channel.
    pub millivolt_cells: f64,
}

/// Resolved geometry for one viewport and layout state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreferredSize {
    pub width: f64,
    pub height: f64,
    pub second_width_px: f64,
    pub millivolt_height_px: f64,
    pub mm_per_second: f64,
    pub mm_per_millivolt: f64,
    pub zoom: f64,
    pub seconds: f64,
    pub seconds_per_cell: f64,
    pub columns: usize,
    pub rows: usize,
}

/// Largest value in `[1, ceiling]` that fits `available` pixels when each unit
/// costs `pixels_per_unit`. Degenerate inputs fall back to the ceiling.
fn fit_scale(available: f64, pixels_per_unit: f64, ceiling: f64) -> f64 {
    let ceiling = ceiling.max(MIN_AUTO_SCALE);
    let fitted = available / pixels_per_unit;
    if fitted.is_finite() {
        fitted.clamp(MIN_AUTO_SCALE, ceiling)
    } else {
        ceiling
    }
}

pub fn compute_preferred_size(
    viewport: Size,
    state: &LayoutState,
    order: &ChannelOrder,
    metrics: &PageMetrics,
    trace: &TraceExtent,
) -> PreferredSize {
    let seconds = state.format.seconds_to_display(trace.duration);
    let rows = order.rows().max(1);
    let columns = order.columns.max(1);
    let ppmm = metrics.pixels_per_mm;
    let row_mv = rows as f64 * trace.millivolt_cells;

    let base_zoom = match state.zoom {
        Zoom::Factor(z) => z,
        Zoom::Auto => 1.0,
    };

    let mm_per_second = match state.speed {
        Scale::Fixed(speed) => speed,
        Scale::Auto => fit_scale(
            viewport.width,
            seconds * ppmm * base_zoom,
            metrics.default_speed,
        ),
    };
    let mm_per_millivolt = match state.amplitude {
        Scale::Fixed(amplitude) => amplitude,
        Scale::Auto => fit_scale(
            viewport.height,
            row_mv * ppmm * base_zoom,
            metrics.default_amplitude,
        ),
    };

    let zoom = match state.zoom {
        Zoom::Factor(z) => z,
        Zoom::Auto => {
            let by_width = viewport.width / (seconds * mm_per_second * ppmm);
            let by_height = viewport.height / (row_mv * mm_per_millivolt * ppmm);
            let fitted = by_width.min(by_height);
            if fitted.is_finite() {
                fitted.clamp(MIN_AUTO_ZOOM, MAX_AUTO_ZOOM)
            } else {
                1.0
            }
        }
    };

    let second_width_px = mm_per_second * ppmm * zoom;
    let millivolt_height_px = mm_per_millivolt * ppmm * zoom;

    PreferredSize {
        width: seconds * second_width_px,
        height: row_mv * millivolt_height_px,
        second_width_px,
        millivolt_height_px,
        mm_per_second,
        mm_per_millivolt,
        zoom,
        seconds,
        seconds_per_cell: seconds / columns as f64,
        columns,
        rows,
    }
}

/// Where one channel is drawn and which samples it shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelPlacement {
    pub channel: usize,
    pub name: String,
    pub rect: Rect,
    pub first_sample: usize,
    pub end_sample: usize,
    pub rhythm: bool,
    pub cell_seconds: f64,
    pub sample_rate: f64,
    pub millivolt_cells: f64,
}

impl ChannelPlacement {
    pub fn sample_to_x(&self, sample: usize) -> f64 {
        let offset = sample as f64 - self.first_sample as f64;
        self.rect.x + offset / (self.cell_seconds * self.sample_rate) * self.rect.width
    }

    /// Nearest sample under `x`, or `None` outside this cell's window.
    pub fn x_to_sample(&self, x: f64) -> Option<usize> {
        if !self.rect.contains_x(x) || self.rect.width <= 0.0 {
            return None;
        }
        let seconds = (x - self.rect.x) / self.rect.width * self.cell_seconds;
        let sample = self.first_sample as f64 + (seconds * self.sample_rate).round();
        if sample.is_finite() && sample >= 0.0 && (sample as usize) < self.end_sample {
            Some(sample as usize)
        } else {
            None
        }
    }

    /// Baseline sits at the vertical centre of the cell.
    pub fn microvolts_to_y(&self, microvolts: f64) -> f64 {
        let millivolt_px = self.rect.height / self.millivolt_cells;
        self.rect.y + self.rect.height / 2.0 - microvolts / 1000.0 * millivolt_px
    }

    /// Pixel width of one cell column, used for drag translation.
    pub fn seconds_per_pixel(&self) -> f64 {
        self.cell_seconds / self.rect.width
    }
}

fn window(
    format: DisplayFormat,
    column: usize,
    seconds_per_cell: f64,
    trace: &TraceExtent,
) -> (usize, usize) {
    let n = trace.total_samples;
    if format == DisplayFormat::Default {
        return (0, n);
    }
    let span = (seconds_per_cell * trace.sample_rate).round() as usize;
    let start = ((column as f64 * seconds_per_cell * trace.sample_rate).round() as usize).min(n);
    (start, (start + span).min(n))
}

/// Splits `container` into the grid of `order` and assigns each channel its
/// rectangle and sample window. The rhythm channel spans the bottom row.
pub fn layout_channels(
    container: Size,
    format: DisplayFormat,
    order: &ChannelOrder,
    names: &[String],
    trace: &TraceExtent,
) -> Vec<ChannelPlacement> {
    let columns = order.columns.max(1);
    let rows = order.rows().max(1);
    let cell_width = container.width / columns as f64;
    let cell_height = container.height / rows as f64;
    let seconds = format.seconds_to_display(trace.duration);
    let seconds_per_cell = seconds / columns as f64;

    let placement = |channel: usize, rect: Rect, window: (usize, usize), rhythm: bool, cell_seconds: f64| {
        ChannelPlacement {
            channel,
            name: names.get(channel).cloned().unwrap_or_default(),
            rect,
            first_sample: window.0,
            end_sample: window.1,
            rhythm,
            cell_seconds,
            sample_rate: trace.sample_rate,
            millivolt_cells: trace.millivolt_cells,
        }
    };

    let mut placements: Vec<ChannelPlacement> = order
        .slots
        .iter()
        .enumerate()
        .filter_map(|(slot, channel)| channel.map(|c| (slot, c)))
        .map(|(slot, channel)| {
            let (row, column) = (slot / columns, slot % columns);
            let rect = Rect {
                x: column as f64 * cell_width,
                y: row as f64 * cell_height,
                width: cell_width,
                height: cell_height,
            };
            let window = window(format, column, seconds_per_cell, trace);
            placement(channel, rect, window, false, seconds_per_cell)
        })
        .collect();

    if let Some(rhythm) = order.rhythm {
        let rect = Rect {
            x: 0.0,
            y: order.grid_rows() as f64 * cell_height,
            width: container.width,
            height: cell_height,
        };
        let end = ((seconds * trace.sample_rate).round() as usize).min(trace.total_samples);
        placements.push(placement(rhythm, rect, (0, end), true, seconds));
    }

    placements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ordering::{LeadOrdering, STANDARD_LEADS};
    use approx::assert_relative_eq;

    fn metrics() -> PageMetrics {
        PageMetrics {
            pixels_per_mm: 96.0 / 25.4,
            default_speed: 25.0,
            default_amplitude: 10.0,
        }
    }

    fn trace() -> TraceExtent {
        TraceExtent {
            sample_rate: 500.0,
            total_samples: 5000,
            duration: 10.0,
            millivolt_cells: 4.0,
        }
    }

    fn leads() -> Vec<String> {
        STANDARD_LEADS.iter().map(|l| format!("Lead {}", l)).collect()
    }

    #[test]
    fn fixed_scales_give_physical_dimensions() {
        let order = LeadOrdering::select(&leads(), None).order(DisplayFormat::FourColumn);
        let state = LayoutState {
            format: DisplayFormat::FourColumn,
            ..LayoutState::default()
        };
        let m = metrics();
        let size = compute_preferred_size(Size::new(800.0, 600.0), &state, &order, &m, &trace());
        assert_relative_eq!(size.second_width_px, 25.0 * m.pixels_per_mm);
        assert_relative_eq!(size.width, 10.0 * 25.0 * m.pixels_per_mm);
        assert_relative_eq!(size.height, 3.0 * 4.0 * 10.0 * m.pixels_per_mm);
        assert_relative_eq!(size.seconds_per_cell, 2.5);
        assert_eq!(size.rows, 3);
    }

    #[test]
    fn auto_speed_stays_within_bounds() {
        let order = LeadOrdering::select(&leads(), None).order(DisplayFormat::TwoColumn);
        let state = LayoutState {
            format: DisplayFormat::TwoColumn,
            speed: Scale::Auto,
            amplitude: Scale::Auto,
            ..LayoutState::default()
        };
        let m = metrics();
        for viewport in [
            Size::new(0.0, 0.0),
            Size::new(1.0, 1.0),
            Size::new(640.0, 480.0),
            Size::new(1.0e9, 1.0e9),
            Size::new(f64::INFINITY, 0.0),
        ] {
            let size = compute_preferred_size(viewport, &state, &order, &m, &trace());
            assert!(size.mm_per_second >= 1.0 && size.mm_per_second <= 25.0);
            assert!(size.second_width_px >= m.pixels_per_mm);
            assert!(size.second_width_px <= 25.0 * m.pixels_per_mm + 1e-9);
            assert!(size.mm_per_millivolt >= 1.0 && size.mm_per_millivolt <= 10.0);
        }
    }

    #[test]
    fn auto_speed_fits_viewport_width() {
        let order = LeadOrdering::select(&leads(), None).order(DisplayFormat::FourColumn);
        let state = LayoutState {
            format: DisplayFormat::FourColumn,
            speed: Scale::Auto,
            ..LayoutState::default()
        };
        let m = metrics();
        let width = 10.0 * 12.5 * m.pixels_per_mm;
        let size = compute_preferred_size(Size::new(width, 2000.0), &state, &order, &m, &trace());
        assert_relative_eq!(size.mm_per_second, 12.5, epsilon = 1e-9);
        assert_relative_eq!(size.width, width, epsilon = 1e-9);
    }

    #[test]
    fn auto_zoom_is_clamped() {
        let order = LeadOrdering::select(&leads(), None).order(DisplayFormat::Default);
        let state = LayoutState {
            zoom: Zoom::Auto,
            ..LayoutState::default()
        };
        let tiny = compute_preferred_size(Size::new(0.0, 0.0), &state, &order, &metrics(), &trace());
        assert_relative_eq!(tiny.zoom, 0.1);
        let huge = compute_preferred_size(Size::new(1e9, 1e9), &state, &order, &metrics(), &trace());
        assert_relative_eq!(huge.zoom, 10.0);
    }

    #[test]
    fn four_column_cells_show_consecutive_windows() {
        let names = leads();
        let order = LeadOrdering::select(&names, None).order(DisplayFormat::FourColumnWithRhythm);
        let placements = layout_channels(
            Size::new(1000.0, 400.0),
            DisplayFormat::FourColumnWithRhythm,
            &order,
            &names,
            &trace(),
        );
        assert_eq!(placements.len(), 13);

        let v4 = &placements[3];
        assert_eq!(v4.name, "Lead V4");
        assert_relative_eq!(v4.rect.x, 750.0);
        assert_eq!((v4.first_sample, v4.end_sample), (3750, 5000));

        let avl = &placements[5];
        assert_eq!(avl.name, "Lead aVL");
        assert_relative_eq!(avl.rect.y, 100.0);
        assert_eq!((avl.first_sample, avl.end_sample), (1250, 2500));

        let rhythm = &placements[12];
        assert!(rhythm.rhythm);
        assert_eq!(rhythm.name, "Lead II");
        assert_relative_eq!(rhythm.rect.width, 1000.0);
        assert_relative_eq!(rhythm.rect.y, 300.0);
        assert_eq!((rhythm.first_sample, rhythm.end_sample), (0, 5000));
    }

    #[test]
    fn pointer_mapping_follows_cell_window() {
        let names = leads();
        let order = LeadOrdering::select(&names, None).order(DisplayFormat::TwoColumn);
        let placements =
            layout_channels(Size::new(1000.0, 600.0), DisplayFormat::TwoColumn, &order, &names, &trace());
        let v1 = &placements[1];
        assert_eq!(v1.first_sample, 2500);
        assert_relative_eq!(v1.sample_to_x(2500), 500.0);
        assert_relative_eq!(v1.sample_to_x(3750), 750.0);
        assert_eq!(v1.x_to_sample(750.0), Some(3750));
        assert_eq!(v1.x_to_sample(499.0), None);
        assert_eq!(v1.x_to_sample(1000.0), None);

        assert_relative_eq!(v1.microvolts_to_y(0.0), 50.0);
        // 100 px tall cell over 4 mV cells: 25 px per mV
        assert_relative_eq!(v1.microvolts_to_y(1000.0), 25.0);
        assert_relative_eq!(v1.microvolts_to_y(-2000.0), 100.0);
    }

    #[test]
    fn short_recording_leaves_late_cells_empty() {
        let names = leads();
        let short = TraceExtent {
            total_samples: 1000,
            duration: 2.0,
            ..trace()
        };
        let order = LeadOrdering::select(&names, None).order(DisplayFormat::FourColumn);
        let placements =
            layout_channels(Size::new(400.0, 300.0), DisplayFormat::FourColumn, &order, &names, &short);
        assert_eq!((placements[0].first_sample, placements[0].end_sample), (0, 1000));
        assert_eq!((placements[1].first_sample, placements[1].end_sample), (1000, 1000));
        assert_eq!(placements[1].x_to_sample(150.0), None);
    }
}
