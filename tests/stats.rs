use rumble::stats::{argsort, rankdata};

#[test]
fn ranks_average_ties() {
    let ranks = rankdata(&[0.0, 2.0, 2.0, 3.0]).unwrap();
    assert_eq!(ranks, vec![1.0, 2.5, 2.5, 4.0]);
}

#[test]
fn ranks_distinct_values() {
    let ranks = rankdata(&[10.0, -4.0, 3.0]).unwrap();
    assert_eq!(ranks, vec![3.0, 1.0, 2.0]);
}

#[test]
fn ranks_all_equal() {
    let ranks = rankdata(&[5.0; 7]).unwrap();
    assert!(ranks.iter().all(|&r| r == 4.0));
}

#[test]
fn ranks_sum_is_invariant() {
    let data = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0];
    let ranks = rankdata(&data).unwrap();
    let n = data.len() as f64;
    let sum: f64 = ranks.iter().sum();
    assert!((sum - n * (n + 1.0) / 2.0).abs() < 1e-9);
}

#[test]
fn ranks_empty_input() {
    assert!(rankdata(&[]).unwrap().is_empty());
}

#[test]
fn ranks_reject_non_finite() {
    assert!(rankdata(&[1.0, f64::NAN]).is_err());
    assert!(rankdata(&[1.0, f64::INFINITY]).is_err());
    assert!(argsort(&[f64::NEG_INFINITY]).is_err());
}

#[test]
fn argsort_orders_indices() {
    assert_eq!(argsort(&[3.0, 1.0, 2.0]).unwrap(), vec![1, 2, 0]);
    assert_eq!(argsort(&[]).unwrap(), Vec::<usize>::new());
}

#[test]
fn argsort_is_stable_for_ties() {
    let order = argsort(&[2.0, 1.0, 2.0, 1.0]).unwrap();
    assert_eq!(order, vec![1, 3, 0, 2]);
}
