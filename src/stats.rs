/// Indices that would sort `data` ascending.
///
/// The sort is stable: equal values keep their original relative order.
///
/// # Errors
/// Returns `Error::NonFiniteData` if `data` contains NaN or infinities.
///
/// # Example
/// ```
/// use rumble::stats::argsort;
///
/// assert_eq!(argsort(&[3.0, 1.0, 2.0]).unwrap(), vec![1, 2, 0]);
/// ```
pub fn argsort(data: &[f64]) -> crate::Result<Vec<usize>> {
    if data.iter().any(|v| !v.is_finite()) {
        return Err(crate::Error::NonFiniteData);
    }
    let mut indices: Vec<usize> = (0..data.len()).collect();
    indices.sort_by(|&a, &b| data[a].total_cmp(&data[b]));
    Ok(indices)
}

/// Rank the values of `data`, averaging ties.
///
/// Ranks begin at 1. Equal values are assigned the average of the ranks
/// that would otherwise have been assigned to the whole tied run.
///
/// # Errors
/// Returns `Error::NonFiniteData` if `data` contains NaN or infinities.
///
/// # Example
/// ```
/// use rumble::stats::rankdata;
///
/// let ranks = rankdata(&[0.0, 2.0, 2.0, 3.0]).unwrap();
/// assert_eq!(ranks, vec![1.0, 2.5, 2.5, 4.0]);
/// ```
pub fn rankdata(data: &[f64]) -> crate::Result<Vec<f64>> {
    let order = argsort(data)?;
    let mut ranks = vec![0.0f64; data.len()];

    let mut sum_ranks = 0usize;
    let mut dup_count = 0usize;
    for i in 0..data.len() {
        sum_ranks += i;
        dup_count += 1;
        let run_ends =
            i == data.len() - 1 || data[order[i]] != data[order[i + 1]];
        if run_ends {
            let rank = sum_ranks as f64 / dup_count as f64 + 1.0;
            for &idx in &order[i + 1 - dup_count..=i] {
                ranks[idx] = rank;
            }
            sum_ranks = 0;
            dup_count = 0;
        }
    }
    Ok(ranks)
}
