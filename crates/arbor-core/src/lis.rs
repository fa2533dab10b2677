//! Longest increasing subsequence over keyed-diff source positions.

/// Returns the indices of a longest strictly increasing subsequence of the
/// non-zero values in `sequence`. Zero marks a position to ignore.
///
/// Patience sorting with binary search and predecessor links: O(n log n)
/// time, O(n) extra space. Ties are resolved by the left-to-right scan, so
/// the result is deterministic for a given input.
pub fn longest_increasing_subsequence(sequence: &[usize]) -> Vec<usize> {
    let mut predecessors = vec![usize::MAX; sequence.len()];
    // tails[k] is the index of the smallest tail of an increasing run of length k + 1
    let mut tails: Vec<usize> = Vec::new();

    for (index, &value) in sequence.iter().enumerate() {
        if value == 0 {
            continue;
        }
        let position = tails.partition_point(|&tail| sequence[tail] < value);
        if position > 0 {
            predecessors[index] = tails[position - 1];
        }
        if position == tails.len() {
            tails.push(index);
        } else {
            tails[position] = index;
        }
    }

    let mut result = vec![0; tails.len()];
    let mut cursor = tails.last().copied().unwrap_or(usize::MAX);
    for slot in result.iter_mut().rev() {
        *slot = cursor;
        cursor = predecessors[cursor];
    }
    result
}

#[cfg(test)]
#[path = "tests/lis_tests.rs"]
mod tests;
