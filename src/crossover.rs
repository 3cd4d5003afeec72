//! Gene alignment between two genomes, and the compatibility distance built on it.

use crate::{config::Config, genome::Connection};
use fxhash::{FxHashMap, FxHashSet};

/// Number of genes present in exactly one of `l` and `r`
pub fn disjoint_excess_count(l: &[Connection], r: &[Connection]) -> usize {
    let l_innos = l.iter().map(|c| c.inno).collect::<FxHashSet<_>>();
    let r_innos = r.iter().map(|c| c.inno).collect::<FxHashSet<_>>();
    l_innos.symmetric_difference(&r_innos).count()
}

/// Average weight difference over matching genes.
/// if genomes share no genes, their average diff should be 0
pub fn avg_param_diff(l: &[Connection], r: &[Connection]) -> f64 {
    let (short, long) = match (l.len(), r.len()) {
        (0, _) | (_, 0) => return 0.,
        (l_len, r_len) if l_len < r_len => (l, r),
        _ => (r, l),
    };

    let s_genes = short
        .iter()
        .map(|c| (c.inno, c))
        .collect::<FxHashMap<usize, &Connection>>();

    let mut diffs = long
        .iter()
        .filter_map(|c| s_genes.get(&c.inno).map(|s| (c.inno, s.param_diff(c))))
        .collect::<Vec<_>>();
    if diffs.is_empty() {
        return 0.;
    }

    // summed in innovation order so that argument order can't change the result
    diffs.sort_unstable_by_key(|&(inno, _)| inno);
    diffs.iter().map(|(_, d)| d).sum::<f64>() / diffs.len() as f64
}

/// Compatibility distance between two gene lists. Symmetric, and 0 for identical lists.
pub fn delta(l: &[Connection], r: &[Connection], config: &Config) -> f64 {
    let size = l.len().max(r.len()).max(1) as f64;
    config.compatibility_disjoint_coefficient * disjoint_excess_count(l, r) as f64 / size
        + config.compatibility_weight_coefficient * avg_param_diff(l, r)
}
