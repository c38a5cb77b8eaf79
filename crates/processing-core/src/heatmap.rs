//! Decaying motion heatmap for centroid tracking.
//!
//! # Algorithm
//!
//! Each tick:
//! 1. **Decay** every cell by a fixed factor (short memory window).
//! 2. **Diff** the current frame against the previous one on a strided
//!    pixel lattice (sum of absolute RGB differences).
//! 3. **Accumulate** a weighted increment into the pixel's grid cell when
//!    the diff clears the noise threshold. Skin-tone pixels weigh more so
//!    tracking favours faces over background motion.
//! 4. **Clamp** every cell to `[0, 100]`.
//!
//! With the default decay of 0.96 a cell falls to 1/e of its value in
//! about 25 ticks without new motion.

use attentrack_common::config::HeatmapConfig;
use attentrack_signal_model::frame::FrameBuffer;

/// Upper bound of a heatmap cell.
pub const CELL_MAX: f64 = 100.0;

/// Largest possible summed RGB difference for one pixel.
const MAX_PIXEL_DIFF: f64 = 765.0;

/// Maps pixel coordinates onto heatmap cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMapper {
    frame_width: u32,
    frame_height: u32,
    cols: usize,
    rows: usize,
}

impl CellMapper {
    pub fn new(frame_width: u32, frame_height: u32, cols: usize, rows: usize) -> Self {
        Self {
            frame_width: frame_width.max(1),
            frame_height: frame_height.max(1),
            cols: cols.max(1),
            rows: rows.max(1),
        }
    }

    /// Grid cell `(col, row)` containing pixel `(px, py)`.
    pub fn cell_of(&self, px: u32, py: u32) -> Option<(usize, usize)> {
        if px >= self.frame_width || py >= self.frame_height {
            return None;
        }
        let col = px as usize * self.cols / self.frame_width as usize;
        let row = py as usize * self.rows / self.frame_height as usize;
        Some((col, row))
    }

    /// Convert grid coordinates to percent of the frame.
    pub fn grid_to_percent(&self, gx: f64, gy: f64) -> (f64, f64) {
        (
            gx / self.cols as f64 * 100.0,
            gy / self.rows as f64 * 100.0,
        )
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
}

/// Fixed RGB-relationship skin heuristic.
pub fn is_skin_tone([r, g, b]: [u8; 3]) -> bool {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    r > 95 && g > 40 && b > 20 && r > g && r > b && r - g > 15 && max - min > 15
}

/// A rectangular block of grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRegion {
    pub col: usize,
    pub row: usize,
    pub cols: usize,
    pub rows: usize,
}

impl GridRegion {
    pub fn new(col: usize, row: usize, cols: usize, rows: usize) -> Self {
        Self {
            col,
            row,
            cols,
            rows,
        }
    }
}

/// Energy-weighted centroid of a region, in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub x: f64,
    pub y: f64,
    pub energy: f64,
}

/// Motion observed inside a region.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RegionMotion {
    /// Sum of normalised pixel diffs seen on the latest tick.
    pub motion: f64,
    /// Pixels sampled inside the region on the latest tick.
    pub sampled: usize,
    /// Accumulated (decayed) heatmap energy.
    pub energy: f64,
}

impl RegionMotion {
    /// Motion per sampled pixel, 0 when nothing was sampled.
    pub fn density(&self) -> f64 {
        if self.sampled == 0 {
            return 0.0;
        }
        self.motion / self.sampled as f64
    }
}

/// The motion heatmap.
#[derive(Debug, Clone)]
pub struct MotionHeatmap {
    config: HeatmapConfig,
    mapper: CellMapper,
    cells: Vec<f64>,
    tick_motion: Vec<f64>,
    tick_sampled: Vec<usize>,
    changed_pixels: usize,
}

impl MotionHeatmap {
    /// Create an empty heatmap with the given configuration.
    pub fn new(config: HeatmapConfig) -> Self {
        let mapper = CellMapper::new(
            config.frame_width,
            config.frame_height,
            config.grid_cols,
            config.grid_rows,
        );
        let len = mapper.cols() * mapper.rows();
        Self {
            config,
            mapper,
            cells: vec![0.0; len],
            tick_motion: vec![0.0; len],
            tick_sampled: vec![0; len],
            changed_pixels: 0,
        }
    }

    /// Create a heatmap with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(HeatmapConfig::default())
    }

    /// Decay, then accumulate motion between `previous` and `current`.
    ///
    /// Without a previous frame (first tick) only the decay step runs.
    pub fn ingest(&mut self, current: &FrameBuffer, previous: Option<&FrameBuffer>) {
        let decay = self.config.decay;
        for cell in &mut self.cells {
            *cell *= decay;
        }
        self.tick_motion.fill(0.0);
        self.tick_sampled.fill(0);
        self.changed_pixels = 0;

        let Some(previous) = previous else {
            return;
        };
        if !previous.same_size(current) {
            tracing::debug!(
                current = %format!("{}x{}", current.width(), current.height()),
                previous = %format!("{}x{}", previous.width(), previous.height()),
                "Skipping diff for frames of different size"
            );
            return;
        }

        let mapper = if current.width() == self.config.frame_width
            && current.height() == self.config.frame_height
        {
            self.mapper
        } else {
            CellMapper::new(
                current.width(),
                current.height(),
                self.mapper.cols(),
                self.mapper.rows(),
            )
        };

        let stride = self.config.stride.max(1);
        for py in (0..current.height()).step_by(stride) {
            for px in (0..current.width()).step_by(stride) {
                let (Some(now), Some(before), Some((col, row))) = (
                    current.rgb(px, py),
                    previous.rgb(px, py),
                    mapper.cell_of(px, py),
                ) else {
                    continue;
                };

                let idx = row * self.mapper.cols() + col;
                self.tick_sampled[idx] += 1;

                let diff: u32 = now
                    .iter()
                    .zip(before.iter())
                    .map(|(a, b)| a.abs_diff(*b) as u32)
                    .sum();
                if diff <= self.config.noise_threshold {
                    continue;
                }

                self.changed_pixels += 1;
                self.tick_motion[idx] += diff as f64 / MAX_PIXEL_DIFF;
                self.cells[idx] += if is_skin_tone(now) {
                    self.config.skin_weight
                } else {
                    self.config.motion_weight
                };
            }
        }

        for cell in &mut self.cells {
            *cell = cell.clamp(0.0, CELL_MAX);
        }
    }

    /// Energy-weighted centroid of `region`.
    ///
    /// Cells under the noise floor are ignored; returns `None` when the
    /// remaining energy is below the validity threshold.
    pub fn centroid_of(&self, region: GridRegion) -> Option<Centroid> {
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut energy = 0.0;

        for (col, row) in self.region_cells(region) {
            let value = self.cells[row * self.mapper.cols() + col];
            if value < self.config.cell_noise_floor {
                continue;
            }
            sum_x += value * (col as f64 + 0.5);
            sum_y += value * (row as f64 + 0.5);
            energy += value;
        }

        if energy < self.config.min_centroid_energy || energy <= 0.0 {
            return None;
        }
        Some(Centroid {
            x: sum_x / energy,
            y: sum_y / energy,
            energy,
        })
    }

    /// Latest-tick motion, sample count and accumulated energy in `region`.
    pub fn region_motion(&self, region: GridRegion) -> RegionMotion {
        self.region_cells(region)
            .map(|(col, row)| row * self.mapper.cols() + col)
            .fold(RegionMotion::default(), |acc, idx| RegionMotion {
                motion: acc.motion + self.tick_motion[idx],
                sampled: acc.sampled + self.tick_sampled[idx],
                energy: acc.energy + self.cells[idx],
            })
    }

    fn region_cells(&self, region: GridRegion) -> impl Iterator<Item = (usize, usize)> {
        let col_end = region.col.saturating_add(region.cols).min(self.mapper.cols());
        let row_end = region.row.saturating_add(region.rows).min(self.mapper.rows());
        let col_start = region.col.min(col_end);
        (region.row.min(row_end)..row_end)
            .flat_map(move |row| (col_start..col_end).map(move |col| (col, row)))
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.mapper.cols() || row >= self.mapper.rows() {
            return None;
        }
        Some(self.cells[row * self.mapper.cols() + col])
    }

    /// Row-major cell values.
    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    pub fn max_value(&self) -> f64 {
        self.cells.iter().copied().fold(0.0_f64, f64::max)
    }

    /// Pixels that cleared the noise threshold on the latest tick.
    pub fn changed_pixels(&self) -> usize {
        self.changed_pixels
    }

    pub fn mapper(&self) -> &CellMapper {
        &self.mapper
    }

    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    /// Clear all accumulated energy.
    pub fn reset(&mut self) {
        self.cells.fill(0.0);
        self.tick_motion.fill(0.0);
        self.tick_sampled.fill(0);
        self.changed_pixels = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKIN: [u8; 3] = [200, 140, 110];
    const WALL: [u8; 3] = [20, 20, 30];

    fn small_config() -> HeatmapConfig {
        HeatmapConfig {
            frame_width: 64,
            frame_height: 48,
            grid_cols: 8,
            grid_rows: 6,
            stride: 2,
            ..Default::default()
        }
    }

    fn frame_with_blob(x: u32, y: u32, rgb: [u8; 3]) -> FrameBuffer {
        let mut frame = FrameBuffer::filled(64, 48, WALL);
        frame.fill_rect(x, y, 16, 16, rgb);
        frame
    }

    #[test]
    fn test_cell_mapper_edges() {
        let mapper = CellMapper::new(320, 240, 32, 24);
        assert_eq!(mapper.cell_of(0, 0), Some((0, 0)));
        assert_eq!(mapper.cell_of(319, 239), Some((31, 23)));
        assert_eq!(mapper.cell_of(10, 10), Some((1, 1)));
        assert_eq!(mapper.cell_of(320, 0), None);
    }

    #[test]
    fn test_cell_mapper_uneven_ratio() {
        let mapper = CellMapper::new(100, 10, 3, 1);
        assert_eq!(mapper.cell_of(33, 0), Some((0, 0)));
        assert_eq!(mapper.cell_of(34, 0), Some((1, 0)));
        assert_eq!(mapper.cell_of(99, 9), Some((2, 0)));
    }

    #[test]
    fn test_grid_to_percent() {
        let mapper = CellMapper::new(320, 240, 32, 24);
        assert_eq!(mapper.grid_to_percent(16.0, 6.0), (50.0, 25.0));
    }

    #[test]
    fn test_skin_tone_heuristic() {
        assert!(is_skin_tone(SKIN));
        assert!(!is_skin_tone(WALL));
        assert!(!is_skin_tone([120, 110, 100])); // r - g too small
        assert!(!is_skin_tone([90, 50, 30])); // too dark
    }

    #[test]
    fn test_first_tick_only_decays() {
        let mut heatmap = MotionHeatmap::new(small_config());
        heatmap.cells[0] = 50.0;
        heatmap.ingest(&frame_with_blob(0, 0, SKIN), None);
        assert!((heatmap.cells[0] - 48.0).abs() < 1e-9);
        assert_eq!(heatmap.changed_pixels(), 0);
    }

    #[test]
    fn test_decay_without_motion() {
        let mut heatmap = MotionHeatmap::new(small_config());
        heatmap.cells[3] = 100.0;
        let frame = FrameBuffer::filled(64, 48, WALL);

        for n in 1..=40 {
            heatmap.ingest(&frame, Some(&frame));
            let bound = 100.0 * 0.96f64.powi(n) + 1e-9;
            let value = heatmap.cell(3, 0).unwrap();
            assert!(value <= bound, "tick {n}: {value} > {bound}");
            assert!(value >= 0.0);
        }
    }

    #[test]
    fn test_motion_accumulates_in_blob_cells() {
        let mut heatmap = MotionHeatmap::new(small_config());
        let before = FrameBuffer::filled(64, 48, WALL);
        let after = frame_with_blob(0, 0, SKIN);
        heatmap.ingest(&after, Some(&before));

        // Blob covers pixels 0..16 → cells (0..2, 0..2).
        assert!(heatmap.cell(0, 0).unwrap() > 0.0);
        assert!(heatmap.cell(1, 1).unwrap() > 0.0);
        assert_eq!(heatmap.cell(4, 4).unwrap(), 0.0);
        assert!(heatmap.changed_pixels() > 0);
    }

    #[test]
    fn test_skin_motion_outweighs_other_motion() {
        let before = FrameBuffer::filled(64, 48, WALL);
        let mut skin = MotionHeatmap::new(small_config());
        skin.ingest(&frame_with_blob(0, 0, SKIN), Some(&before));
        let mut other = MotionHeatmap::new(small_config());
        other.ingest(&frame_with_blob(0, 0, [40, 200, 220]), Some(&before));

        assert!(skin.cell(0, 0).unwrap() > other.cell(0, 0).unwrap());
    }

    #[test]
    fn test_cells_clamp_to_max() {
        let mut heatmap = MotionHeatmap::new(small_config());
        let a = FrameBuffer::filled(64, 48, WALL);
        let b = frame_with_blob(0, 0, SKIN);
        for i in 0..200 {
            let (cur, prev) = if i % 2 == 0 { (&b, &a) } else { (&a, &b) };
            heatmap.ingest(cur, Some(prev));
        }
        assert!(heatmap.max_value() <= CELL_MAX);
        assert!(heatmap.cells().iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn test_centroid_follows_blob() {
        let mut heatmap = MotionHeatmap::new(small_config());
        let before = FrameBuffer::filled(64, 48, WALL);
        let after = frame_with_blob(32, 16, SKIN);
        for _ in 0..3 {
            heatmap.ingest(&after, Some(&before));
        }

        let centroid = heatmap
            .centroid_of(GridRegion::new(0, 0, 8, 6))
            .expect("blob should produce a centroid");
        // Blob spans pixels 32..48 x 16..32 → cells 4..6 x 2..4.
        assert!((centroid.x - 5.0).abs() < 0.01);
        assert!((centroid.y - 3.0).abs() < 0.01);
    }

    #[test]
    fn test_centroid_none_for_quiet_region() {
        let mut heatmap = MotionHeatmap::new(small_config());
        let before = FrameBuffer::filled(64, 48, WALL);
        heatmap.ingest(&frame_with_blob(0, 0, SKIN), Some(&before));
        assert!(heatmap.centroid_of(GridRegion::new(4, 3, 4, 3)).is_none());
    }

    #[test]
    fn test_region_motion_density() {
        let mut heatmap = MotionHeatmap::new(small_config());
        let before = FrameBuffer::filled(64, 48, WALL);
        heatmap.ingest(&frame_with_blob(0, 0, SKIN), Some(&before));

        let region = heatmap.region_motion(GridRegion::new(0, 0, 4, 3));
        // 32x24 pixel quadrant sampled at stride 2.
        assert_eq!(region.sampled, 16 * 12);
        assert!(region.density() > 0.0 && region.density() <= 1.0);

        let quiet = heatmap.region_motion(GridRegion::new(4, 3, 4, 3));
        assert_eq!(quiet.density(), 0.0);
    }

    #[test]
    fn test_region_clipped_to_grid() {
        let heatmap = MotionHeatmap::new(small_config());
        let motion = heatmap.region_motion(GridRegion::new(6, 5, 10, 10));
        assert_eq!(motion, RegionMotion::default());
        assert!(heatmap.centroid_of(GridRegion::new(20, 20, 2, 2)).is_none());
    }

    #[test]
    fn test_mismatched_previous_frame_skips_diff() {
        let mut heatmap = MotionHeatmap::new(small_config());
        let small = FrameBuffer::filled(32, 24, WALL);
        heatmap.ingest(&frame_with_blob(0, 0, SKIN), Some(&small));
        assert_eq!(heatmap.max_value(), 0.0);
    }

    #[test]
    fn test_reset_clears_energy() {
        let mut heatmap = MotionHeatmap::new(small_config());
        let before = FrameBuffer::filled(64, 48, WALL);
        heatmap.ingest(&frame_with_blob(0, 0, SKIN), Some(&before));
        heatmap.reset();
        assert_eq!(heatmap.max_value(), 0.0);
    }
}
