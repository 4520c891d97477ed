#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::collections::HashMap;

use crate::model::StudentId;

/// Sort key demoting students without a numeric average below everyone
/// else.
fn demotion_key(average: Option<f64>) -> f64 {
    match average {
        Some(v) => -v,
        None => 1000.0,
    }
}

/// Sorts `(average, student)` pairs by descending average. Students
/// without a numeric average sink to the bottom, ordered by their
/// alphabetical rank.
pub fn sort_by_average_desc(
    rows: &mut [(Option<f64>, StudentId)],
    alpha_rank: &HashMap<StudentId, usize>,
) {
    rows.sort_by(|a, b| {
        demotion_key(a.0)
            .total_cmp(&demotion_key(b.0))
            .then_with(|| {
                let ra = alpha_rank.get(&a.1).copied().unwrap_or(usize::MAX);
                let rb = alpha_rank.get(&b.1).copied().unwrap_or(usize::MAX);
                ra.cmp(&rb)
            })
    });
}

/// Computes rank strings from a list already sorted by descending average.
///
/// Tied averages share the rank of the first of the tie, suffixed with
/// `" ex"`: `"1 ex", "1 ex", "3"`. Students without an average all tie
/// with each other.
pub fn compute_ranks(sorted: &[(Option<f64>, StudentId)]) -> HashMap<StudentId, String> {
    let mut ranks = HashMap::new();
    let mut ties = 0usize; // consecutive ex-aequo seen so far
    for (i, (average, student)) in sorted.iter().enumerate() {
        let next = sorted.get(i + 1).map(|(avg, _)| *avg);
        let rank = if ties > 0 {
            let rank = format!("{} ex", i + 1 - ties);
            if next == Some(*average) {
                ties += 1;
            } else {
                ties = 0;
            }
            rank
        } else if next == Some(*average) {
            ties = 1;
            format!("{} ex", i + 1)
        } else {
            format!("{}", i + 1)
        };
        ranks.insert(*student, rank);
    }
    ranks
}
