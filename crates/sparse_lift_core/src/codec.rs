//! Row-major text serialization of rational sparse matrices
//!
//! Each row is one line: `<nnz> <pos_0> .. <pos_{nnz-1}> <val_0> .. <val_{nnz-1}>`,
//! positions in decimal, values as base-32 rationals (`n` or `n/d`). The
//! format is stable; stored matrices must keep decoding.
//!
//! The file form used by the CLI prepends a `<nrows> <ncols>` header line.

use std::io::{BufRead, Write};

use num_traits::Zero;

use crate::error::{LinalgError, Result};
use crate::rational::{Rational, RationalField};
use crate::sparse::{RationalSparseMatrix, SparseMatrix};
use crate::vector::SparseVector;

/// Radix of serialized values
pub const VALUE_RADIX: u32 = 32;

/// Text codec for `RationalSparseMatrix`
#[derive(Debug, Clone, Copy, Default)]
pub struct RowMajorTextCodec;

impl RowMajorTextCodec {
    /// One line per row, newline-terminated
    pub fn encode_rows(m: &RationalSparseMatrix) -> String {
        let mut out = String::new();
        for row in m.rows() {
            out.push_str(&Self::encode_row(row));
            out.push('\n');
        }
        out
    }

    fn encode_row(row: &SparseVector<Rational>) -> String {
        let mut tokens = Vec::with_capacity(1 + 2 * row.num_nonzero());
        tokens.push(row.num_nonzero().to_string());
        tokens.extend(row.positions().map(|j| j.to_string()));
        tokens.extend(row.iter().map(|(_, x)| x.to_str_radix(VALUE_RADIX)));
        tokens.join(" ")
    }

    /// Parse `nrows` row lines of a matrix with `ncols` columns
    pub fn decode_rows(nrows: usize, ncols: usize, text: &str) -> Result<RationalSparseMatrix> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.len() != nrows {
            return Err(LinalgError::Value(format!(
                "expected {} row lines, found {}",
                nrows,
                lines.len()
            )));
        }
        let rows = lines
            .iter()
            .enumerate()
            .map(|(i, line)| Self::decode_row(i, ncols, line))
            .collect::<Result<Vec<_>>>()?;
        Ok(SparseMatrix::from_parts(nrows, ncols, RationalField, rows))
    }

    fn decode_row(i: usize, ncols: usize, line: &str) -> Result<SparseVector<Rational>> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((count, rest)) = tokens.split_first() else {
            return Err(LinalgError::Value(format!("row {}: empty line", i)));
        };
        let nnz: usize = count
            .parse()
            .map_err(|_| LinalgError::Value(format!("row {}: bad entry count '{}'", i, count)))?;
        if rest.len() != 2 * nnz {
            return Err(LinalgError::Value(format!(
                "row {}: declared {} entries but found {} tokens after the count",
                i,
                nnz,
                rest.len()
            )));
        }

        let (pos_tokens, val_tokens) = rest.split_at(nnz);
        let mut entries = Vec::new();
        entries.try_reserve_exact(nnz)?;
        let mut last: Option<usize> = None;
        for (p, v) in pos_tokens.iter().zip(val_tokens) {
            let j: usize = p
                .parse()
                .map_err(|_| LinalgError::Value(format!("row {}: bad position '{}'", i, p)))?;
            if j >= ncols {
                return Err(LinalgError::Value(format!(
                    "row {}: position {} out of range for {} columns",
                    i, j, ncols
                )));
            }
            if last.is_some_and(|l| j <= l) {
                return Err(LinalgError::Value(format!(
                    "row {}: positions must be strictly increasing",
                    i
                )));
            }
            last = Some(j);

            let x = Rational::from_str_radix(v, VALUE_RADIX)
                .map_err(|e| LinalgError::Value(format!("row {}: {}", i, e)))?;
            if x.numer().is_zero() {
                return Err(LinalgError::Value(format!("row {}: stored zero at {}", i, j)));
            }
            entries.push((j, x));
        }
        SparseVector::from_pairs(ncols, RationalField, entries)
    }

    /// Write the header line and the row lines
    pub fn write_matrix<W: Write>(m: &RationalSparseMatrix, out: &mut W) -> Result<()> {
        writeln!(out, "{} {}", m.nrows(), m.ncols())?;
        out.write_all(Self::encode_rows(m).as_bytes())?;
        Ok(())
    }

    /// Read a matrix written by `write_matrix`
    pub fn read_matrix<R: BufRead>(input: R) -> Result<RationalSparseMatrix> {
        let mut lines = input.lines();
        let header = lines
            .next()
            .ok_or_else(|| LinalgError::Value("missing '<nrows> <ncols>' header".to_string()))??;
        let dims: Vec<usize> = header
            .split_whitespace()
            .map(str::parse)
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| LinalgError::Value(format!("bad header '{}'", header)))?;
        let &[nrows, ncols] = dims.as_slice() else {
            return Err(LinalgError::Value(format!(
                "header must be '<nrows> <ncols>', got '{}'",
                header
            )));
        };

        let mut body = String::new();
        for line in lines {
            body.push_str(&line?);
            body.push('\n');
        }
        Self::decode_rows(nrows, ncols, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64, d: i64) -> Rational {
        Rational::from_ratio(n, d)
    }

    fn sample() -> RationalSparseMatrix {
        let rows = vec![
            vec![q(0, 1), q(33, 1), q(0, 1), q(-1, 2)],
            vec![q(0, 1), q(0, 1), q(0, 1), q(0, 1)],
            vec![q(1, 1), q(0, 1), q(-34, 3), q(0, 1)],
        ];
        SparseMatrix::from_rows(4, RationalField, &rows).unwrap()
    }

    #[test]
    fn test_encode_format() {
        let text = RowMajorTextCodec::encode_rows(&sample());
        assert_eq!(text, "2 1 3 11 -1/2\n0\n2 0 2 1 -12/3\n");
    }

    #[test]
    fn test_round_trip() {
        let m = sample();
        let text = RowMajorTextCodec::encode_rows(&m);
        let back = RowMajorTextCodec::decode_rows(3, 4, &text).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        let bad = [
            ("2 0 1 1\n", "count mismatch"),
            ("1 0 1 1\n", "extra token"),
            ("x 0 1\n", "bad count"),
            ("1 4 1\n", "position out of range"),
            ("2 1 1 1 1\n", "repeated position"),
            ("2 2 1 1 1\n", "decreasing positions"),
            ("1 0 0\n", "stored zero"),
            ("1 0 1/0\n", "zero denominator"),
            ("1 0 z\n", "not base 32"),
            ("1 -1 1\n", "negative position"),
            ("\n", "empty line"),
        ];
        for (text, why) in bad {
            assert!(
                matches!(
                    RowMajorTextCodec::decode_rows(1, 4, text),
                    Err(LinalgError::Value(_))
                ),
                "{}",
                why
            );
        }
        assert!(RowMajorTextCodec::decode_rows(2, 4, "0\n").is_err());
    }

    #[test]
    fn test_file_form() {
        let m = sample();
        let mut buf = Vec::new();
        RowMajorTextCodec::write_matrix(&m, &mut buf).unwrap();
        assert!(buf.starts_with(b"3 4\n"));
        let back = RowMajorTextCodec::read_matrix(buf.as_slice()).unwrap();
        assert_eq!(back, m);

        assert!(RowMajorTextCodec::read_matrix("".as_bytes()).is_err());
        assert!(RowMajorTextCodec::read_matrix("3\n".as_bytes()).is_err());
    }
}
