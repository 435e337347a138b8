use crate::models::PointI;

/// Compact bit set of the pixels flagged as edges in one image.
///
/// Coordinates outside the image are never stored; lookups outside return false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMap {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl EdgeMap {
    /// Create an empty edge map for an image of the given size
    pub fn new(width: usize, height: usize) -> Self {
        let bytes_needed = (width * height).div_ceil(8);
        Self {
            width,
            height,
            data: vec![0; bytes_needed],
        }
    }

    /// Pack a row-major boolean mask
    pub fn from_mask(width: usize, height: usize, mask: &[bool]) -> Self {
        let mut map = Self::new(width, height);
        for (index, _) in mask.iter().enumerate().filter(|(_, flagged)| **flagged) {
            map.data[index / 8] |= 1 << (index % 8);
        }
        map
    }

    /// Unpack into a row-major boolean mask
    pub fn to_mask(&self) -> Vec<bool> {
        (0..self.width * self.height)
            .map(|index| (self.data[index / 8] >> (index % 8)) & 1 == 1)
            .collect()
    }

    /// Width of the underlying image
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the underlying image
    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Whether (x, y) is an edge pixel
    pub fn contains(&self, x: i64, y: i64) -> bool {
        match self.index(x, y) {
            Some(index) => (self.data[index / 8] >> (index % 8)) & 1 == 1,
            None => false,
        }
    }

    /// Flag (x, y) as an edge; ignored outside the image
    pub fn insert(&mut self, x: i64, y: i64) {
        if let Some(index) = self.index(x, y) {
            self.data[index / 8] |= 1 << (index % 8);
        }
    }

    /// Clear the edge flag at (x, y)
    pub fn remove(&mut self, x: i64, y: i64) {
        if let Some(index) = self.index(x, y) {
            self.data[index / 8] &= !(1 << (index % 8));
        }
    }

    /// Number of edge pixels
    pub fn len(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// True when no pixel is flagged
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }

    /// Edge pixels in raster order
    pub fn iter(&self) -> impl Iterator<Item = PointI> + '_ {
        (0..self.width * self.height)
            .filter(|&index| (self.data[index / 8] >> (index % 8)) & 1 == 1)
            .map(|index| PointI::new((index % self.width) as i64, (index / self.width) as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_map() {
        let mut edges = EdgeMap::new(8, 8);
        assert!(edges.is_empty());

        edges.insert(3, 4);
        assert!(edges.contains(3, 4));
        assert!(!edges.contains(3, 3));
        assert_eq!(edges.len(), 1);

        edges.remove(3, 4);
        assert!(!edges.contains(3, 4));
        assert!(edges.is_empty());
    }

    #[test]
    fn test_out_of_bounds() {
        let mut edges = EdgeMap::new(8, 8);
        edges.insert(10, 10);
        edges.insert(-1, 2);
        assert!(!edges.contains(10, 10));
        assert!(!edges.contains(-1, 2));
        assert!(edges.is_empty());
    }

    #[test]
    fn test_mask_round_trip_and_iter() {
        let mut mask = vec![false; 5 * 3];
        mask[1] = true;
        mask[2 * 5 + 4] = true;
        let edges = EdgeMap::from_mask(5, 3, &mask);
        assert_eq!(edges.to_mask(), mask);
        let points: Vec<PointI> = edges.iter().collect();
        assert_eq!(points, vec![PointI::new(1, 0), PointI::new(4, 2)]);
    }
}
