use crate::settings::WriteOptions;
use ndarray::Array3;
use std::io::{self, Write};

const VALUES_PER_LINE: usize = 10;

/// Scalar types that can appear in a grid array.
pub trait ArrayValue: Copy + PartialEq {
    fn render(&self, opts: &WriteOptions) -> String;
}

impl ArrayValue for f64 {
    fn render(&self, opts: &WriteOptions) -> String {
        opts.float(*self)
    }
}

impl ArrayValue for i32 {
    fn render(&self, _opts: &WriteOptions) -> String {
        self.to_string()
    }
}

/// A grid-shaped array in the compact form it is written in.
#[derive(Debug, Clone, PartialEq)]
pub enum GridArray<T> {
    /// One value for every cell
    Constant(T),
    /// One value per layer
    Layered(Vec<T>),
    /// Every value, layer-major
    Internal(Vec<T>),
}

impl<T: ArrayValue> GridArray<T> {
    /// Picks the most compact representation for `values`.
    pub fn from_array3(values: &Array3<T>) -> Self {
        let mut iter = values.iter();
        let Some(&first) = iter.next() else {
            return GridArray::Internal(Vec::new());
        };
        if iter.all(|&v| v == first) {
            return GridArray::Constant(first);
        }

        let per_layer: Vec<T> = values
            .outer_iter()
            .filter_map(|layer| {
                let v = *layer.iter().next()?;
                layer.iter().all(|&x| x == v).then_some(v)
            })
            .collect();
        if per_layer.len() == values.dim().0 {
            GridArray::Layered(per_layer)
        } else {
            GridArray::Internal(values.iter().copied().collect())
        }
    }

    pub fn write(
        &self,
        out: &mut dyn Write,
        opts: &WriteOptions,
        name: &str,
    ) -> io::Result<()> {
        let pad = opts.indent(1);
        let inner = opts.indent(2);
        match self {
            GridArray::Constant(v) => {
                writeln!(out, "{pad}{name}")?;
                writeln!(out, "{inner}CONSTANT {}", v.render(opts))?;
            }
            GridArray::Layered(values) => {
                writeln!(out, "{pad}{name}  LAYERED")?;
                for v in values {
                    writeln!(out, "{inner}CONSTANT {}", v.render(opts))?;
                }
            }
            GridArray::Internal(values) => {
                writeln!(out, "{pad}{name}")?;
                writeln!(out, "{inner}INTERNAL  FACTOR  1")?;
                let data = opts.indent(3);
                for chunk in values.chunks(VALUES_PER_LINE) {
                    let text: Vec<String> = chunk.iter().map(|v| v.render(opts)).collect();
                    writeln!(out, "{data}{}", text.join(" "))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<T: ArrayValue>(array: &GridArray<T>) -> String {
        let mut buf = Vec::new();
        array.write(&mut buf, &WriteOptions::default(), "strt").unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn uniform_array_collapses_to_constant() {
        let values = Array3::from_elem((10, 4, 4), 100.0);
        let array = GridArray::from_array3(&values);
        assert_eq!(array, GridArray::Constant(100.0));
        assert_eq!(render(&array), "  strt\n    CONSTANT    100.00000000\n");
    }

    #[test]
    fn per_layer_values_are_layered() {
        let mut values = Array3::from_elem((2, 3, 3), 1);
        values.index_axis_mut(ndarray::Axis(0), 1).fill(2);
        let array = GridArray::from_array3(&values);
        assert_eq!(array, GridArray::Layered(vec![1, 2]));
        assert!(render(&array).contains("strt  LAYERED\n    CONSTANT 1\n    CONSTANT 2\n"));
    }

    #[test]
    fn varying_array_is_written_internal_and_wrapped() {
        let values = Array3::from_shape_fn((1, 3, 5), |(_, i, j)| (i * 5 + j) as i32);
        let array = GridArray::from_array3(&values);
        let text = render(&array);
        assert!(text.contains("INTERNAL  FACTOR  1"));
        let data_lines: Vec<_> = text.lines().skip(2).collect();
        assert_eq!(data_lines.len(), 2);
        assert!(data_lines[1].ends_with("14"));
    }
}
