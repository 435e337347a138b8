/// Field localisation: coarse seed scan, first-pixel walk and serpentine boundary refinement
use log::{debug, warn};

use crate::config::SeedScanParams;
use crate::error::{Result, StripError, WhiteBalanceIssue};
use crate::models::{
    EdgeMap, Field, FieldSpec, FieldType, PixelImage, PixelRect, PointI, StripLayout,
    WhiteBalance, WhiteBalanceBounds,
};

const RIGHT: i64 = 1;

/// Locates fields of a given type in one image
pub struct FieldFinder<'a> {
    image: &'a PixelImage,
    edges: &'a EdgeMap,
    layout: &'a StripLayout,
    seeds: SeedScanParams,
    white_balance: Option<WhiteBalance>,
}

impl<'a> FieldFinder<'a> {
    pub fn new(
        image: &'a PixelImage,
        edges: &'a EdgeMap,
        layout: &'a StripLayout,
        seeds: SeedScanParams,
    ) -> Self {
        Self {
            image,
            edges,
            layout,
            seeds,
            white_balance: None,
        }
    }

    /// Compensate every non-anchor sample with `white_balance`
    pub fn with_white_balance(mut self, white_balance: WhiteBalance) -> Self {
        self.white_balance = Some(white_balance);
        self
    }

    fn spec(&self, field_type: FieldType) -> &FieldSpec {
        self.layout.spec(field_type)
    }

    fn matches(&self, spec: &FieldSpec, x: i64, y: i64) -> bool {
        self.image.get(x, y).is_some_and(|c| spec.accepts(c))
    }

    /// One pixel in each of up to `count` distinct fields of `field_type`.
    ///
    /// Raster scan with a stride that starts at resolution / 500 and shrinks by
    /// one after every full pass; the stride-1 pass visits every pixel and
    /// ends the scan. A match closer than the expected field size to an
    /// accepted seed belongs to the same field and is skipped.
    pub fn seed_pixels(&self, field_type: FieldType, count: usize) -> Vec<PointI> {
        let spec = self.spec(field_type);
        let (width, height) = (self.image.width(), self.image.height());
        let resolution = self.image.resolution();
        let separation = self.seeds.separation(resolution);

        let mut found: Vec<PointI> = Vec::with_capacity(count);
        let mut increment = self.seeds.initial_stride(resolution);
        let (mut x, mut y) = (0usize, 0usize);

        while found.len() < count {
            if spec.accepts(self.image.pixel(x, y)) {
                let candidate = PointI::new(x as i64, y as i64);
                if found.iter().all(|p| p.distance(&candidate) >= separation) {
                    debug!("{} seed at ({}, {})", field_type, x, y);
                    found.push(candidate);
                }
            }

            x += increment;
            if x >= width {
                x %= width;
                y += 1;
            }
            if y >= height {
                if increment == 1 {
                    break;
                }
                y = 0;
                increment -= 1;
            }
        }

        found
    }

    /// Walk from `start` toward the image origin, left before up, while a
    /// neighbour still matches; returns the field's top-left-most pixel.
    pub fn first_pixel_of_field(&self, field_type: FieldType, start: PointI) -> Result<PointI> {
        let spec = self.spec(field_type);
        let mut current = start;
        loop {
            if current.x <= 0 || current.y <= 0 {
                return Err(StripError::not_found(
                    field_type,
                    format!(
                        "reached the image border from ({}, {}) looking for the first pixel",
                        start.x, start.y
                    ),
                ));
            }
            if self.matches(spec, current.x - 1, current.y) {
                current.x -= 1;
            } else if self.matches(spec, current.x, current.y - 1) {
                current.y -= 1;
            } else {
                return Ok(current);
            }
        }
    }

    /// Serpentine walk from `first`, collecting matching samples row by row.
    ///
    /// Matching pixels reset the miss counter. A miss keeps the walk going in
    /// its direction until it has left the field: on a row that already
    /// matched, the first non-edge miss outside the discovered column range
    /// turns it around on the row below; on a row without a match it sweeps the
    /// discovered range widened by `search_slack` before turning. The walk
    /// converges once the misses since the last match exceed
    /// `2 * width + search_slack`.
    pub fn refine(&self, field_type: FieldType, first: PointI) -> Result<Field> {
        let spec = self.spec(field_type);
        let (width, height) = (self.image.width() as i64, self.image.height() as i64);
        let compensation = self.white_balance.filter(|_| field_type.is_compensated());
        let slack = self.seeds.search_slack as i64;

        let mut samples = Vec::new();
        let mut bounds: Option<PixelRect> = None;
        let (mut x, mut y) = (first.x, first.y);
        let (mut left, mut right) = (first.x, first.x);
        let mut direction = RIGHT;
        let mut misses = 0i64;
        let mut row_matched = false;

        loop {
            if x <= 0 || y <= 0 || x >= width - 1 || y >= height - 1 {
                return Err(StripError::not_found(
                    field_type,
                    format!("boundary search reached the image border at ({}, {})", x, y),
                ));
            }

            let color = self.image.pixel(x as usize, y as usize);
            if spec.accepts(color) {
                samples.push(match compensation {
                    Some(wb) => wb.compensate(color),
                    None => color,
                });
                let p = PointI::new(x, y);
                match bounds.as_mut() {
                    Some(b) => b.include(p),
                    None => bounds = Some(PixelRect::at(p)),
                }
                left = left.min(x);
                right = right.max(x);
                misses = 0;
                row_matched = true;
            } else {
                misses += 1;
                if misses > 2 * (right - left) + slack {
                    break;
                }
                let left_field = if row_matched {
                    (x < left || x > right) && !self.edges.contains(x, y)
                } else if direction == RIGHT {
                    x >= (right + slack).min(width - 2)
                } else {
                    x <= (left - slack).max(1)
                };
                if left_field {
                    // The pixel below the turn is the first one of the next row
                    direction = -direction;
                    y += 1;
                    row_matched = false;
                    continue;
                }
            }
            x += direction;
        }

        match bounds {
            Some(bounds) => Ok(Field::new(field_type, samples)?.with_bounds(bounds)),
            None => Err(StripError::not_found(
                field_type,
                format!("no matching pixel near ({}, {})", first.x, first.y),
            )),
        }
    }

    /// Locate a field at its expected position in the layout
    pub fn locate_field(&self, field_type: FieldType) -> Result<Field> {
        let spec = self.spec(field_type);
        let start = PointI::new(
            spec.x_in(self.image.width()) as i64,
            spec.y_in(self.image.height()) as i64,
        );
        self.locate_from(field_type, start)
    }

    /// Locate a field from an explicit starting pixel
    pub fn locate_from(&self, field_type: FieldType, start: PointI) -> Result<Field> {
        if !self.matches(self.spec(field_type), start.x, start.y) {
            return Err(StripError::not_found(
                field_type,
                format!(
                    "expected position ({}, {}) does not have a permitted colour",
                    start.x, start.y
                ),
            ));
        }
        let first = self.first_pixel_of_field(field_type, start)?;
        let field = self.refine(field_type, first)?;
        debug!(
            "{} field: {} samples, average {}",
            field_type,
            field.len(),
            field.average_color()
        );
        Ok(field)
    }

    /// Locate `count` separate fields of the same type anywhere in the image
    pub fn locate_fields(&self, field_type: FieldType, count: usize) -> Result<Vec<Field>> {
        let seeds = self.seed_pixels(field_type, count);
        if seeds.len() < count {
            warn!("found {} of {} {} fields", seeds.len(), count, field_type);
            return Err(StripError::not_found(
                field_type,
                format!("found {} of {} fields", seeds.len(), count),
            ));
        }
        seeds
            .into_iter()
            .map(|seed| {
                let first = self.first_pixel_of_field(field_type, seed)?;
                self.refine(field_type, first)
            })
            .collect()
    }

    /// Locate the anchor patch and check it against `bounds`
    pub fn locate_white_balance(&self, bounds: &WhiteBalanceBounds) -> Result<WhiteBalance> {
        let field = self
            .locate_field(FieldType::WhiteBalance)
            .map_err(|e| match e {
                StripError::FieldNotFound { reason, .. } => {
                    StripError::WhiteBalanceRejected(WhiteBalanceIssue::NotLocated(reason))
                }
                other => other,
            })?;
        let white_balance = WhiteBalance::new(field.average_color());
        if let Err(e) = white_balance.validate(bounds) {
            warn!("{}", e);
            return Err(e);
        }
        debug!(
            "white balance {} (red {:+}, blue {:+})",
            white_balance.reference(),
            white_balance.red_offset(),
            white_balance.blue_offset()
        );
        Ok(white_balance)
    }
}
