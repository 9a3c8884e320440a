use crate::prelude_crate::*;

pub fn uniform_scalar(value: Float, num_sites: usize) -> Vec<Float> {
    vec![value; num_sites]
}

pub fn uniform_vector(value: Vec<Float>, num_sites: usize) -> Vec<Vec<Float>> {
    vec![value; num_sites]
}

/// Number of allocated sites for a local extent `n` surrounded by a halo
/// of width `nhalo` on every face.
pub fn allocated_sites(n: &[usize], nhalo: usize) -> usize {
    n.iter().map(|n_x| n_x + 2 * nhalo).product()
}

pub(crate) fn dot_product(a: &[Float], b: &[Float]) -> Float {
    a.iter().zip(b.iter()).map(|(a_x, b_x)| a_x * b_x).sum()
}

pub(crate) fn cross_product(a: &[Float], b: &[Float]) -> Vec<Float> {
    vec![
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub(crate) fn vector_add(a: &[Float], b: &[Float]) -> Vec<Float> {
    a.iter().zip(b.iter()).map(|(a_x, b_x)| a_x + b_x).collect()
}

pub(crate) fn direction_vector(c_i: &[i32]) -> Vec<Float> {
    c_i.iter().map(|&c_x| c_x as Float).collect()
}
