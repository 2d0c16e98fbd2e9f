// Matrix Expansion
// Expands a leaf's matrix axes into the ordered cartesian product of tiles

use super::tile::Tile;
use crate::spec::Nodule;
use crate::value::Value;

use indexmap::IndexMap;

/// Matrix expander for spec leaves
pub struct MatrixExpander;

impl MatrixExpander {
    /// Lazily expand a leaf into tiles. The last-declared axis varies fastest.
    pub fn expand(leaf: &Nodule) -> TileIter<'_> {
        TileIter::new(&leaf.input, &leaf.matrix)
    }

    /// Number of tiles `expand` yields, without building them. Saturates
    /// at `usize::MAX`; the parser rejects such matrices.
    pub fn tile_count(leaf: &Nodule) -> usize {
        Self::combination_count(&leaf.matrix).unwrap_or(usize::MAX)
    }

    /// Product of the axis sizes, `None` on overflow
    pub fn combination_count(matrix: &IndexMap<String, Vec<Value>>) -> Option<usize> {
        matrix
            .values()
            .try_fold(1usize, |count, values| count.checked_mul(values.len()))
    }

    /// Check if a leaf declares at least one matrix axis
    pub fn has_matrix(leaf: &Nodule) -> bool {
        !leaf.matrix.is_empty()
    }
}

/// Odometer over matrix axes, yielding one [`Tile`] per combination
#[derive(Debug, Clone)]
pub struct TileIter<'a> {
    input: &'a IndexMap<String, Value>,
    axes: Vec<(&'a str, &'a [Value])>,
    /// Current index into each axis; `None` once exhausted
    odometer: Option<Vec<usize>>,
    index: usize,
    remaining: usize,
}

impl<'a> TileIter<'a> {
    pub fn new(
        input: &'a IndexMap<String, Value>,
        matrix: &'a IndexMap<String, Vec<Value>>,
    ) -> Self {
        let axes: Vec<(&str, &[Value])> = matrix
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
            .collect();
        let remaining = MatrixExpander::combination_count(matrix).unwrap_or(usize::MAX);
        let odometer = (remaining > 0).then(|| vec![0; axes.len()]);

        Self {
            input,
            axes,
            odometer,
            index: 0,
            remaining,
        }
    }

    fn advance(&mut self) {
        let Some(counters) = self.odometer.as_mut() else {
            return;
        };
        for (position, (_, values)) in self.axes.iter().enumerate().rev() {
            counters[position] += 1;
            if counters[position] < values.len() {
                return;
            }
            counters[position] = 0;
        }
        // Carried past the first axis
        self.odometer = None;
    }
}

impl Iterator for TileIter<'_> {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        let counters = self.odometer.as_ref()?;

        let mut bindings = self.input.clone();
        for ((name, values), &at) in self.axes.iter().zip(counters) {
            bindings.insert((*name).to_string(), values[at].clone());
        }
        let tile = Tile::new(self.index, bindings);

        self.index += 1;
        self.remaining -= 1;
        self.advance();
        Some(tile)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for TileIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(axes: &[(&str, Vec<Value>)]) -> IndexMap<String, Vec<Value>> {
        axes.iter()
            .map(|(name, values)| (name.to_string(), values.clone()))
            .collect()
    }

    fn render(tile: &Tile) -> String {
        tile.bindings
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn test_last_declared_axis_varies_fastest() {
        let input = IndexMap::new();
        let matrix = matrix(&[
            ("a", vec![1.into(), 2.into()]),
            ("b", vec!["x".into(), "y".into(), "z".into()]),
        ]);

        let tiles: Vec<String> = TileIter::new(&input, &matrix).map(|t| render(&t)).collect();
        assert_eq!(
            tiles,
            vec!["a=1,b=x", "a=1,b=y", "a=1,b=z", "a=2,b=x", "a=2,b=y", "a=2,b=z"]
        );
    }

    #[test]
    fn test_tile_indices_count_up() {
        let input = IndexMap::new();
        let matrix = matrix(&[("a", vec![1.into(), 2.into(), 3.into()])]);
        let indices: Vec<usize> = TileIter::new(&input, &matrix).map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_product_of_axis_sizes() {
        let input = IndexMap::new();
        let matrix = matrix(&[
            ("a", vec![1.into(), 2.into()]),
            ("b", vec![1.into(), 2.into(), 3.into()]),
            ("c", vec![1.into(), 2.into(), 3.into(), 4.into()]),
        ]);
        let iter = TileIter::new(&input, &matrix);
        assert_eq!(iter.len(), 24);

        let mut seen: Vec<String> = iter.map(|t| render(&t)).collect();
        assert_eq!(seen[0], "a=1,b=1,c=1");
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 24);
    }

    #[test]
    fn test_combination_count_detects_overflow() {
        let ten: Vec<Value> = (0..10).map(Value::Int).collect();
        let small = matrix(&[("a", ten.clone()), ("b", ten.clone())]);
        assert_eq!(MatrixExpander::combination_count(&small), Some(100));

        let axes: Vec<(String, Vec<Value>)> =
            (0..20).map(|i| (format!("axis{}", i), ten.clone())).collect();
        let huge: IndexMap<String, Vec<Value>> = axes.into_iter().collect();
        assert_eq!(MatrixExpander::combination_count(&huge), None);

        let input = IndexMap::new();
        let iter = TileIter::new(&input, &huge);
        assert_eq!(iter.size_hint().0, usize::MAX);
        assert_eq!(MatrixExpander::combination_count(&IndexMap::new()), Some(1));
    }

    #[test]
    fn test_empty_axis_yields_nothing() {
        let input = IndexMap::new();
        let matrix = matrix(&[("a", vec![1.into()]), ("b", vec![])]);
        let mut iter = TileIter::new(&input, &matrix);
        assert_eq!(iter.size_hint(), (0, Some(0)));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_no_matrix_yields_the_input_once() {
        let input: IndexMap<String, Value> = [("animal".to_string(), Value::from("cat"))]
            .into_iter()
            .collect();
        let matrix = IndexMap::new();
        let tiles: Vec<Tile> = TileIter::new(&input, &matrix).collect();
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].bindings, input);
    }

    #[test]
    fn test_axis_overrides_input_in_place() {
        let input: IndexMap<String, Value> = [
            ("animal".to_string(), Value::from("cat")),
            ("keeper".to_string(), Value::from("ann")),
        ]
        .into_iter()
        .collect();
        let matrix = matrix(&[("animal", vec!["dog".into()])]);

        let tile = TileIter::new(&input, &matrix).next().unwrap();
        assert_eq!(render(&tile), "animal=dog,keeper=ann");
        // The leaf's own input is untouched
        assert_eq!(input["animal"], Value::from("cat"));
    }

    #[test]
    fn test_iterator_restarts_when_cloned() {
        let input = IndexMap::new();
        let matrix = matrix(&[("a", vec![1.into(), 2.into()])]);
        let fresh = TileIter::new(&input, &matrix);

        let first: Vec<String> = fresh.clone().map(|t| render(&t)).collect();
        let second: Vec<String> = fresh.map(|t| render(&t)).collect();
        assert_eq!(first, second);
    }
}
