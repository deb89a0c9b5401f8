use std::collections::VecDeque;

use log::debug;

use crate::{
    Region,
    analysis::segmentation::{DifferenceMask, FOREGROUND},
};

const NEIGHBORS_8: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

const NEIGHBORS_4: [(i64, i64); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

pub struct RegionExtractor {
    min_region_area: u32,
}

struct Component {
    bounds: Region,
    external: bool,
}

impl RegionExtractor {
    pub fn new() -> Self {
        Self { min_region_area: 0 }
    }

    pub fn with_min_region_area(mut self, area: u32) -> Self {
        self.min_region_area = area;
        self
    }

    /// Bounding boxes of the outermost 8-connected foreground components,
    /// in raster order of discovery.
    pub fn extract(&self, mask: &DifferenceMask) -> Vec<Region> {
        let (width, height) = mask.dimensions();
        let grid = Grid::new(mask);
        let outside = grid.outside_background();

        let mut labelled = vec![false; grid.len()];
        let mut components = Vec::new();

        for y in 0..height {
            for x in 0..width {
                let idx = grid.index(x, y);
                if !grid.foreground[idx] || labelled[idx] {
                    continue;
                }
                components.push(grid.trace_component(x, y, &mut labelled, &outside));
            }
        }

        let found = components.len();
        let regions = components
            .into_iter()
            .filter(|c| c.external)
            .map(|c| c.bounds)
            .filter(|r| r.area() >= self.min_region_area as u64)
            .collect::<Vec<_>>();

        debug!(
            "RegionExtractor: {} components, {} external regions kept (min area {})",
            found,
            regions.len(),
            self.min_region_area
        );

        regions
    }
}

impl Default for RegionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

struct Grid {
    width: u32,
    height: u32,
    foreground: Vec<bool>,
}

impl Grid {
    fn new(mask: &DifferenceMask) -> Self {
        let (width, height) = mask.dimensions();
        let foreground = mask
            .as_image()
            .pixels()
            .map(|p| p[0] == FOREGROUND)
            .collect();

        Self {
            width,
            height,
            foreground,
        }
    }

    fn len(&self) -> usize {
        self.foreground.len()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn neighbor(&self, x: u32, y: u32, (dx, dy): (i64, i64)) -> Option<(u32, u32)> {
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
            return None;
        }
        Some((nx as u32, ny as u32))
    }

    fn on_border(&self, x: u32, y: u32) -> bool {
        x == 0 || y == 0 || x + 1 == self.width || y + 1 == self.height
    }

    /// Background pixels 4-connected to the image border. Anything else in
    /// the background is a hole enclosed by some component.
    fn outside_background(&self) -> Vec<bool> {
        let mut outside = vec![false; self.len()];
        let mut queue = VecDeque::new();

        for y in 0..self.height {
            for x in 0..self.width {
                let idx = self.index(x, y);
                if self.on_border(x, y) && !self.foreground[idx] {
                    outside[idx] = true;
                    queue.push_back((x, y));
                }
            }
        }

        while let Some((x, y)) = queue.pop_front() {
            for step in NEIGHBORS_4 {
                if let Some((nx, ny)) = self.neighbor(x, y, step) {
                    let n = self.index(nx, ny);
                    if !self.foreground[n] && !outside[n] {
                        outside[n] = true;
                        queue.push_back((nx, ny));
                    }
                }
            }
        }

        outside
    }

    fn trace_component(
        &self,
        x0: u32,
        y0: u32,
        labelled: &mut [bool],
        outside: &[bool],
    ) -> Component {
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
        let mut external = false;
        let mut queue = VecDeque::from([(x0, y0)]);
        labelled[self.index(x0, y0)] = true;

        while let Some((x, y)) = queue.pop_front() {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);

            if self.on_border(x, y) {
                external = true;
            }

            for step in NEIGHBORS_8 {
                let Some((nx, ny)) = self.neighbor(x, y, step) else {
                    continue;
                };
                let n = self.index(nx, ny);
                if self.foreground[n] {
                    if !labelled[n] {
                        labelled[n] = true;
                        queue.push_back((nx, ny));
                    }
                } else if outside[n] && NEIGHBORS_4.contains(&step) {
                    external = true;
                }
            }
        }

        Component {
            bounds: Region {
                x: min_x,
                y: min_y,
                width: max_x - min_x + 1,
                height: max_y - min_y + 1,
            },
            external,
        }
    }
}
