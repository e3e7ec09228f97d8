//! Vector index adapter
//!
//! Exhaustive nearest-neighbour search over a flat FAISS index file. Vectors
//! are addressed by position; position `i` corresponds to metadata record `i`.

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{Error, Result};

const FOURCC_FLAT_IP: &[u8; 4] = b"IxFI";
const FOURCC_FLAT_L2: &[u8; 4] = b"IxF2";

/// Similarity metric the index was built with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Inner product; cosine similarity for unit vectors
    InnerProduct,
    /// Squared Euclidean distance
    L2,
}

impl Metric {
    fn faiss_code(self) -> i32 {
        match self {
            Metric::InnerProduct => 0,
            Metric::L2 => 1,
        }
    }
}

/// Top-k hits for one query, best first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    /// Similarity scores (higher is better)
    pub scores: Vec<f32>,
    /// Index positions
    pub ids: Vec<usize>,
}

impl SearchHits {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// `(id, score)` pairs in rank order
    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.ids.iter().copied().zip(self.scores.iter().copied())
    }
}

/// Nearest-neighbour search over fixed-dimension vectors
pub trait VectorIndex: Send + Sync {
    /// Vector dimensionality
    fn dimension(&self) -> usize;

    /// Number of stored vectors
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the `min(k, len)` most similar vectors, ordered by descending similarity
    ///
    /// `k` is clamped to at least 1.
    fn search(&self, query: &[f32], k: usize) -> Result<SearchHits>;
}

/// Flat (brute-force) index held in memory
#[derive(Debug, Clone)]
pub struct FlatIndex {
    vectors: Array2<f32>,
    metric: Metric,
}

impl FlatIndex {
    /// Build an index from row vectors
    pub fn from_vectors(metric: Metric, dimension: usize, rows: &[Vec<f32>]) -> Result<Self> {
        if let Some(bad) = rows.iter().find(|r| r.len() != dimension) {
            return Err(Error::DimensionMismatch {
                encoder: bad.len(),
                index: dimension,
            });
        }
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        let vectors = Array2::from_shape_vec((rows.len(), dimension), flat)
            .map_err(|e| Error::internal(format!("Invalid index shape: {}", e)))?;
        Ok(Self { vectors, metric })
    }

    /// Load a flat FAISS index written by `faiss.write_index`
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "Vector index not found: {}",
                path.display()
            )));
        }

        let file = File::open(path).map_err(|e| {
            Error::CorruptIndex(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let index = Self::read_from(&mut BufReader::new(file))
            .map_err(|e| match e {
                Error::CorruptIndex(msg) => {
                    Error::CorruptIndex(format!("{}: {}", path.display(), msg))
                }
                other => other,
            })?;

        tracing::info!(
            "Loaded vector index {} ({} vectors, dim {}, {:?})",
            path.display(),
            index.len(),
            index.dimension(),
            index.metric
        );
        Ok(index)
    }

    /// Parse the flat index binary layout
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut fourcc = [0u8; 4];
        reader.read_exact(&mut fourcc).map_err(truncated)?;
        let metric = match &fourcc {
            FOURCC_FLAT_IP => Metric::InnerProduct,
            FOURCC_FLAT_L2 => Metric::L2,
            other => {
                return Err(Error::CorruptIndex(format!(
                    "unsupported index type {:?} (only flat IP/L2 indexes are readable)",
                    String::from_utf8_lossy(other)
                )))
            }
        };

        let d = reader.read_i32::<LittleEndian>().map_err(truncated)?;
        let ntotal = reader.read_i64::<LittleEndian>().map_err(truncated)?;
        // Two unused header fields
        reader.read_i64::<LittleEndian>().map_err(truncated)?;
        reader.read_i64::<LittleEndian>().map_err(truncated)?;
        let _is_trained = reader.read_u8().map_err(truncated)?;
        let metric_type = reader.read_i32::<LittleEndian>().map_err(truncated)?;
        if metric_type > 1 {
            reader.read_f32::<LittleEndian>().map_err(truncated)?;
        }

        if metric_type != metric.faiss_code() {
            return Err(Error::CorruptIndex(format!(
                "metric type {} does not match index type {:?}",
                metric_type, metric
            )));
        }
        if d <= 0 || ntotal < 0 {
            return Err(Error::CorruptIndex(format!(
                "invalid header (d={}, ntotal={})",
                d, ntotal
            )));
        }

        let (d, ntotal) = (d as usize, ntotal as usize);
        let count = reader.read_u64::<LittleEndian>().map_err(truncated)? as usize;
        if Some(count) != d.checked_mul(ntotal) {
            return Err(Error::CorruptIndex(format!(
                "expected {} floats for {} vectors of dim {}, found {}",
                d.saturating_mul(ntotal),
                ntotal,
                d,
                count
            )));
        }

        // Read only what is present so a bogus header cannot force a huge allocation
        let byte_len = count.checked_mul(4).ok_or_else(|| {
            Error::CorruptIndex(format!("vector payload of {} floats is too large", count))
        })?;
        let mut bytes = Vec::new();
        reader
            .by_ref()
            .take(byte_len as u64)
            .read_to_end(&mut bytes)
            .map_err(truncated)?;
        if bytes.len() != byte_len {
            return Err(Error::CorruptIndex(format!(
                "unexpected end of index data (expected {} bytes of vectors, found {})",
                byte_len,
                bytes.len()
            )));
        }

        let mut data = vec![0f32; count];
        LittleEndian::read_f32_into(&bytes, &mut data);

        let vectors = Array2::from_shape_vec((ntotal, d), data)
            .map_err(|e| Error::CorruptIndex(e.to_string()))?;
        Ok(Self { vectors, metric })
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    fn similarities(&self, query: ArrayView1<f32>) -> Array1<f32> {
        match self.metric {
            Metric::InnerProduct => self.vectors.dot(&query),
            // Squared distance mapped onto cosine similarity for unit vectors
            Metric::L2 => self.vectors.map_axis(Axis(1), |row| {
                let dist: f32 = row.iter().zip(query.iter()).map(|(a, b)| (a - b) * (a - b)).sum();
                1.0 - dist / 2.0
            }),
        }
    }
}

impl VectorIndex for FlatIndex {
    fn dimension(&self) -> usize {
        self.vectors.ncols()
    }

    fn len(&self) -> usize {
        self.vectors.nrows()
    }

    fn search(&self, query: &[f32], k: usize) -> Result<SearchHits> {
        if query.len() != self.dimension() {
            return Err(Error::DimensionMismatch {
                encoder: query.len(),
                index: self.dimension(),
            });
        }

        let k = k.max(1).min(self.len());
        let scores = self.similarities(ArrayView1::from(query));

        let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
        // Ties resolve to the lower position
        ranked.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(k);

        Ok(SearchHits {
            scores: ranked.iter().map(|(_, s)| *s).collect(),
            ids: ranked.iter().map(|(i, _)| *i).collect(),
        })
    }
}

fn truncated(e: std::io::Error) -> Error {
    Error::CorruptIndex(format!("unexpected end of index data ({})", e))
}
