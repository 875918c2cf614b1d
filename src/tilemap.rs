/// A dense 2D grid addressed by tile `(x, z)`, stored row-major by `z`.
///
/// City maps do not wrap: lookups outside the grid return `None` from the
/// checked accessors, and the unchecked accessors panic.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub depth: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, depth: usize) -> Self {
        Self {
            width,
            depth,
            data: vec![T::default(); width * depth],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, depth: usize, value: T) -> Self {
        Self {
            width,
            depth,
            data: vec![value; width * depth],
        }
    }
}

impl<T> Tilemap<T> {
    /// Build a tilemap from row-major data. Returns `None` when the data
    /// length does not match `width * depth`.
    pub fn from_vec(width: usize, depth: usize, data: Vec<T>) -> Option<Self> {
        if data.len() != width * depth {
            return None;
        }
        Some(Self { width, depth, data })
    }

    pub fn in_bounds(&self, x: i64, z: i64) -> bool {
        x >= 0 && z >= 0 && (x as u64) < self.width as u64 && (z as u64) < self.depth as u64
    }

    fn index(&self, x: usize, z: usize) -> usize {
        z * self.width + x
    }

    pub fn get(&self, x: usize, z: usize) -> &T {
        &self.data[self.index(x, z)]
    }

    /// Bounds-checked lookup with signed coordinates, so callers can probe
    /// neighbours at `x - 1` without underflow.
    pub fn get_checked(&self, x: i64, z: i64) -> Option<&T> {
        if self.in_bounds(x, z) {
            Some(self.get(x as usize, z as usize))
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, x: usize, z: usize) -> &mut T {
        let idx = self.index(x, z);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, z: usize, value: T) {
        let idx = self.index(x, z);
        self.data[idx] = value;
    }

    /// The four edge neighbours in the order left, right, up, down.
    /// Sides that fall outside the grid are `None`.
    pub fn neighbors_4(&self, x: usize, z: usize) -> [Option<&T>; 4] {
        let (x, z) = (x as i64, z as i64);
        [
            self.get_checked(x - 1, z),
            self.get_checked(x + 1, z),
            self.get_checked(x, z - 1),
            self.get_checked(x, z + 1),
        ]
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width.max(1);
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % width;
            let z = idx / width;
            (x, z, val)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_lookup_rejects_outside_cells() {
        let map = Tilemap::new_with(3, 2, 1u8);
        assert_eq!(map.get_checked(2, 1), Some(&1));
        assert_eq!(map.get_checked(3, 0), None);
        assert_eq!(map.get_checked(0, 2), None);
        assert_eq!(map.get_checked(-1, 0), None);
    }

    #[test]
    fn test_neighbors_do_not_wrap() {
        let mut map = Tilemap::new(2, 2);
        map.set(1, 0, 7u8);
        let [left, right, up, down] = map.neighbors_4(0, 0);
        assert_eq!(left, None);
        assert_eq!(right, Some(&7));
        assert_eq!(up, None);
        assert_eq!(down, Some(&0));
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(Tilemap::from_vec(2, 2, vec![0.0f32; 3]).is_none());
        let map = Tilemap::from_vec(2, 2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(*map.get(1, 1), 4);
    }
}
