//! Truncated SVD projection
//!
//! Randomized range finder with power iterations (Halko, Martinsson, Tropp)
//! over sparse rows. The small dense factor left at the end is decomposed
//! through the eigenvectors of `B Bᵀ`, found with cyclic Jacobi rotations,
//! so no LAPACK backend is needed.

use super::FeatureError;
use crate::nlp::SparseVector;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use tracing::debug;

const MAX_JACOBI_SWEEPS: usize = 64;

/// Truncated SVD settings
#[derive(Debug, Clone)]
pub struct TruncatedSvd {
    n_components: usize,
    n_oversamples: usize,
    n_iter: usize,
    seed: u64,
}

impl TruncatedSvd {
    pub fn new(n_components: usize) -> Self {
        Self {
            n_components,
            n_oversamples: 10,
            n_iter: 5,
            seed: 42,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fit on sparse rows with `n_terms` columns
    ///
    /// The output width is always `n_components`. When the data has lower
    /// rank than that, the surplus components are zero.
    pub fn fit(&self, rows: &[SparseVector], n_terms: usize) -> Result<Projection, FeatureError> {
        if self.n_components == 0 {
            return Err(FeatureError::InvalidDimensionality);
        }
        if rows.is_empty() {
            return Err(FeatureError::EmptyTrainingSet);
        }

        let n_docs = rows.len();
        let rank_cap = n_docs.min(n_terms);
        let k = self.n_components.min(rank_cap);
        let mut loadings = Array2::<f64>::zeros((n_terms, self.n_components));
        let mut singular_values = Array1::<f64>::zeros(self.n_components);

        if k > 0 {
            let l = (k + self.n_oversamples).min(rank_cap);
            let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

            let omega = Array2::from_shape_simple_fn((n_terms, l), || StandardNormal.sample(&mut rng));
            let mut q = orthonormalize(sparse_mul(rows, &omega));

            for _ in 0..self.n_iter {
                let z = orthonormalize(sparse_t_mul(rows, &q, n_terms));
                q = orthonormalize(sparse_mul(rows, &z));
            }

            // B = Qᵀ X, shape (l, n_terms)
            let b = sparse_t_mul(rows, &q, n_terms).reversed_axes();
            let gram = b.dot(&b.t());
            let (eigenvalues, eigenvectors) = symmetric_eigen(gram);

            for i in 0..k {
                let sigma = eigenvalues[i].max(0.0).sqrt();
                if sigma <= 1e-10 {
                    break;
                }
                let mut v = eigenvectors.column(i).dot(&b) / sigma;

                // Largest loading positive, so the sign is reproducible
                let pivot = v
                    .iter()
                    .copied()
                    .fold(0.0f64, |best, x| if x.abs() > best.abs() { x } else { best });
                if pivot < 0.0 {
                    v.mapv_inplace(|x| -x);
                }

                loadings.column_mut(i).assign(&v);
                singular_values[i] = sigma;
            }
        }

        let explained_variance_ratio = explained_variance_ratio(rows, &loadings, n_terms);

        debug!(
            n_docs,
            n_terms,
            n_components = self.n_components,
            effective_rank = singular_values.iter().filter(|&&s| s > 0.0).count(),
            explained = explained_variance_ratio.sum(),
            "Fitted truncated SVD"
        );

        Ok(Projection {
            loadings,
            singular_values,
            explained_variance_ratio,
        })
    }
}

/// Frozen linear map from term space to the reduced space
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Components stored column-wise: (n_terms, n_components)
    loadings: Array2<f64>,
    singular_values: Array1<f64>,
    explained_variance_ratio: Array1<f64>,
}

impl Projection {
    pub fn n_components(&self) -> usize {
        self.loadings.ncols()
    }

    pub fn n_terms(&self) -> usize {
        self.loadings.nrows()
    }

    /// Components as rows: (n_components, n_terms)
    pub fn components(&self) -> ArrayView2<f64> {
        self.loadings.t()
    }

    pub fn singular_values(&self) -> &Array1<f64> {
        &self.singular_values
    }

    pub fn explained_variance_ratio(&self) -> &Array1<f64> {
        &self.explained_variance_ratio
    }

    /// Project one sparse row
    pub fn transform(&self, row: &SparseVector) -> Array1<f64> {
        let mut out = Array1::<f64>::zeros(self.n_components());
        for (&j, &value) in row.indices.iter().zip(row.values.iter()) {
            out.scaled_add(value, &self.loadings.row(j));
        }
        out
    }
}

/// X · M for sparse X (n_docs rows) and dense M (n_terms, c)
fn sparse_mul(rows: &[SparseVector], dense: &Array2<f64>) -> Array2<f64> {
    let mut out = Array2::<f64>::zeros((rows.len(), dense.ncols()));
    for (r, row) in rows.iter().enumerate() {
        let mut target = out.row_mut(r);
        for (&j, &value) in row.indices.iter().zip(row.values.iter()) {
            target.scaled_add(value, &dense.row(j));
        }
    }
    out
}

/// Xᵀ · M for sparse X and dense M (n_docs, c)
fn sparse_t_mul(rows: &[SparseVector], dense: &Array2<f64>, n_terms: usize) -> Array2<f64> {
    let mut out = Array2::<f64>::zeros((n_terms, dense.ncols()));
    for (r, row) in rows.iter().enumerate() {
        let source = dense.row(r);
        for (&j, &value) in row.indices.iter().zip(row.values.iter()) {
            out.row_mut(j).scaled_add(value, &source);
        }
    }
    out
}

/// Modified Gram-Schmidt on the columns; dependent columns become zero
fn orthonormalize(m: Array2<f64>) -> Array2<f64> {
    // Rows of the transpose are contiguous
    let mut basis = m.t().as_standard_layout().into_owned();

    for j in 0..basis.nrows() {
        let (done, mut rest) = basis.view_mut().split_at(Axis(0), j);
        let mut current = rest.row_mut(0);

        for i in 0..j {
            let proj = done.row(i).dot(&current);
            if proj != 0.0 {
                current.scaled_add(-proj, &done.row(i));
            }
        }

        let norm = current.dot(&current).sqrt();
        if norm > 1e-12 {
            current.mapv_inplace(|x| x / norm);
        } else {
            current.fill(0.0);
        }
    }

    basis.t().as_standard_layout().into_owned()
}

/// Eigen-decomposition of a symmetric matrix by cyclic Jacobi rotations
///
/// Returns eigenvalues in descending order and the matching eigenvectors as
/// columns.
fn symmetric_eigen(mut a: Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = a.nrows();
    let mut v = Array2::<f64>::eye(n);

    let total: f64 = a.iter().map(|x| x * x).sum();
    for _ in 0..MAX_JACOBI_SWEEPS {
        let mut off = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off += a[[p, q]] * a[[p, q]];
            }
        }
        if off <= 1e-24 * total || off == 0.0 {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq.abs() < 1e-300 {
                    continue;
                }
                let app = a[[p, p]];
                let aqq = a[[q, q]];
                let theta = (aqq - app) / (2.0 * apq);
                let t = if theta.abs() > 1e150 {
                    0.5 / theta
                } else {
                    theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt())
                };
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for r in 0..n {
                    if r != p && r != q {
                        let arp = a[[r, p]];
                        let arq = a[[r, q]];
                        a[[r, p]] = c * arp - s * arq;
                        a[[p, r]] = a[[r, p]];
                        a[[r, q]] = s * arp + c * arq;
                        a[[q, r]] = a[[r, q]];
                    }
                }
                a[[p, p]] = app - t * apq;
                a[[q, q]] = aqq + t * apq;
                a[[p, q]] = 0.0;
                a[[q, p]] = 0.0;

                for r in 0..n {
                    let vrp = v[[r, p]];
                    let vrq = v[[r, q]];
                    v[[r, p]] = c * vrp - s * vrq;
                    v[[r, q]] = s * vrp + c * vrq;
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| {
        a[[j, j]]
            .partial_cmp(&a[[i, i]])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(i.cmp(&j))
    });

    let eigenvalues = Array1::from_iter(order.iter().map(|&i| a[[i, i]]));
    let eigenvectors = v.select(Axis(1), &order);
    (eigenvalues, eigenvectors)
}

/// Variance of each projected column over the total variance of X
fn explained_variance_ratio(rows: &[SparseVector], loadings: &Array2<f64>, n_terms: usize) -> Array1<f64> {
    let n = rows.len() as f64;
    let n_components = loadings.ncols();

    let mut col_sum = vec![0.0; n_terms];
    let mut col_sq = vec![0.0; n_terms];
    for row in rows {
        for (&j, &value) in row.indices.iter().zip(row.values.iter()) {
            col_sum[j] += value;
            col_sq[j] += value * value;
        }
    }
    let total_variance: f64 = col_sum
        .iter()
        .zip(col_sq.iter())
        .map(|(&s, &sq)| sq / n - (s / n).powi(2))
        .sum();

    if total_variance <= 0.0 {
        return Array1::zeros(n_components);
    }

    let projected = sparse_mul(rows, loadings);
    projected.var_axis(Axis(0), 0.0) / total_variance
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn dense_rows(m: &Array2<f64>) -> Vec<SparseVector> {
        m.rows()
            .into_iter()
            .map(|row| {
                let (indices, values): (Vec<usize>, Vec<f64>) = row
                    .iter()
                    .enumerate()
                    .filter(|(_, &v)| v != 0.0)
                    .map(|(i, &v)| (i, v))
                    .unzip();
                SparseVector { indices, values }
            })
            .collect()
    }

    #[test]
    fn test_symmetric_eigen() {
        let a = array![[2.0, 1.0], [1.0, 2.0]];
        let (values, vectors) = symmetric_eigen(a.clone());

        assert!((values[0] - 3.0).abs() < 1e-10);
        assert!((values[1] - 1.0).abs() < 1e-10);

        for i in 0..2 {
            let v = vectors.column(i);
            let av = a.dot(&v);
            for r in 0..2 {
                assert!((av[r] - values[i] * v[r]).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn test_orthonormalize() {
        let m = array![[1.0, 1.0, 2.0], [0.0, 1.0, 2.0], [1.0, 0.0, 0.0]];
        let q = orthonormalize(m);
        let gram = q.t().dot(&q);

        assert!((gram[[0, 0]] - 1.0).abs() < 1e-12);
        assert!((gram[[1, 1]] - 1.0).abs() < 1e-12);
        assert!(gram[[0, 1]].abs() < 1e-12);
    }

    #[test]
    fn test_recovers_singular_values() {
        // Rank-2 matrix with singular values 3 and 2
        let x = array![
            [3.0, 0.0, 0.0, 0.0],
            [0.0, 2.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
        ];
        let rows = dense_rows(&x);
        let projection = TruncatedSvd::new(2).with_seed(1).fit(&rows, 4).unwrap();

        let s = projection.singular_values();
        assert!((s[0] - 3.0).abs() < 1e-8);
        assert!((s[1] - 2.0).abs() < 1e-8);

        let total: f64 = projection.explained_variance_ratio().sum();
        assert!((total - 1.0).abs() < 1e-8);
    }

    #[test]
    fn test_width_fixed_when_rank_is_low() {
        let x = array![[1.0, 0.0], [0.0, 1.0]];
        let rows = dense_rows(&x);
        let projection = TruncatedSvd::new(5).fit(&rows, 2).unwrap();

        assert_eq!(projection.n_components(), 5);
        let out = projection.transform(&rows[0]);
        assert_eq!(out.len(), 5);
        assert!(out.iter().skip(2).all(|&v| v == 0.0));
    }

    #[test]
    fn test_transform_matches_components() {
        let x = array![
            [1.0, 2.0, 0.0, 0.5],
            [0.0, 1.0, 3.0, 0.0],
            [2.0, 0.0, 1.0, 1.0],
            [0.5, 0.5, 0.5, 0.5],
        ];
        let rows = dense_rows(&x);
        let projection = TruncatedSvd::new(2).fit(&rows, 4).unwrap();

        let expected = x.row(1).dot(&projection.components().t());
        let got = projection.transform(&rows[1]);
        for i in 0..2 {
            assert!((expected[i] - got[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_empty_rows_rejected() {
        assert!(matches!(
            TruncatedSvd::new(2).fit(&[], 3),
            Err(FeatureError::EmptyTrainingSet)
        ));
    }
}
