use itertools::Itertools;
use varisat::{Lit, Var};

/// Clauses asserting that exactly `k` of `vars` are true.
///
/// Direct encoding: any `k + 1` of the variables include a false one, and any
/// `n - k + 1` of them include a true one. Intended for small `n` (a cell has at most four
/// neighbors); clause count grows combinatorially.
///
/// When fewer than `k` variables exist the constraint is unsatisfiable outright, expressed as
/// the empty clause.
pub(crate) fn exactly_k(vars: Vec<Var>, k: usize) -> Vec<Vec<Lit>> {
    if vars.len() < k {
        return vec![vec![]];
    }

    let mut clauses = Vec::new();

    // at most k; for any choice of k + 1 vars, at least one is false
    clauses.extend(vars.iter()
        .combinations(k + 1)
        .map(|selection| selection.into_iter().map(|v| v.negative()).collect_vec())
    );
    // at least k; for any choice of n - k + 1 vars, at least one is true
    clauses.extend(vars.iter()
        .combinations(vars.len() - k + 1)
        .map(|selection| selection.into_iter().map(|v| v.positive()).collect_vec())
    );

    clauses
}

pub(crate) fn exactly_one(vars: Vec<Var>) -> Vec<Vec<Lit>> {
    exactly_k(vars, 1)
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use varisat::{Lit, Var};

    use super::{exactly_k, exactly_one};

    fn satisfied(clauses: &[Vec<Lit>], assignment: &[bool]) -> bool {
        clauses.iter().all(|clause| {
            clause.iter().any(|lit| assignment[lit.var().index()] == lit.is_positive())
        })
    }

    fn assert_counts_exactly(n: usize, k: usize) {
        let vars = (0..n).map(Var::from_index).collect_vec();
        let clauses = exactly_k(vars, k);

        for bits in 0..(1u32 << n) {
            let assignment = (0..n).map(|i| bits & (1 << i) != 0).collect_vec();
            let true_count = assignment.iter().filter(|b| **b).count();
            assert_eq!(
                satisfied(&clauses, &assignment),
                true_count == k,
                "n = {}, k = {}, assignment = {:?}",
                n,
                k,
                assignment,
            );
        }
    }

    #[test]
    fn exactly_k_matches_brute_force() {
        for n in 1..=4 {
            for k in 1..=n {
                assert_counts_exactly(n, k);
            }
        }
    }

    #[test]
    fn exactly_one_is_the_k_equals_one_case() {
        let vars = (0..3).map(Var::from_index).collect_vec();
        assert_eq!(exactly_one(vars.clone()), exactly_k(vars, 1));
    }

    #[test]
    fn too_few_vars_yields_the_empty_clause() {
        let clauses = exactly_k(vec![Var::from_index(0)], 2);
        assert!(clauses.contains(&vec![]));

        let clauses = exactly_k(vec![], 2);
        assert!(clauses.contains(&vec![]));
    }
}
