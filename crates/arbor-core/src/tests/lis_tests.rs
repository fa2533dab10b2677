use super::*;

fn values(sequence: &[usize]) -> Vec<usize> {
    longest_increasing_subsequence(sequence)
        .into_iter()
        .map(|index| sequence[index])
        .collect()
}

fn is_strictly_increasing(values: &[usize]) -> bool {
    values.windows(2).all(|pair| pair[0] < pair[1])
}

#[test]
fn empty_and_all_zero_inputs_yield_nothing() {
    assert!(longest_increasing_subsequence(&[]).is_empty());
    assert!(longest_increasing_subsequence(&[0, 0, 0]).is_empty());
}

#[test]
fn zeros_are_ignored() {
    let sequence = [2, 1, 3, 0, 4];
    let result = longest_increasing_subsequence(&sequence);
    assert_eq!(result.len(), 3);
    assert_eq!(result, vec![1, 2, 4]);
    assert!(result.iter().all(|&index| sequence[index] != 0));
}

#[test]
fn rotation_keeps_the_untouched_run() {
    assert_eq!(longest_increasing_subsequence(&[2, 3, 4, 1]), vec![0, 1, 2]);
    assert_eq!(longest_increasing_subsequence(&[4, 1, 2, 3]), vec![1, 2, 3]);
}

#[test]
fn reversed_input_has_length_one() {
    let sequence = [5, 4, 3, 2, 1];
    let result = longest_increasing_subsequence(&sequence);
    assert_eq!(result.len(), 1);
    assert_eq!(values(&sequence), vec![1]);
}

#[test]
fn sorted_input_is_returned_whole() {
    let sequence = [1, 2, 3, 4, 5, 6];
    assert_eq!(longest_increasing_subsequence(&sequence), vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn classic_fixture_lengths() {
    let fixtures: &[(&[usize], usize)] = &[
        (&[10, 9, 2, 5, 3, 7, 101, 18], 4),
        (&[0, 8, 4, 12, 2, 10, 6, 14, 1, 9, 5, 13, 3, 11, 7, 15], 5),
        (&[3, 10, 2, 1, 20], 3),
        (&[50, 3, 10, 7, 40, 80], 4),
        (&[7, 7, 7, 7], 1),
    ];
    for (sequence, expected) in fixtures {
        let found = values(sequence);
        assert_eq!(found.len(), *expected, "sequence {sequence:?}");
        assert!(is_strictly_increasing(&found), "sequence {sequence:?}");
    }
}

#[test]
fn result_is_deterministic() {
    let sequence = [3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5, 8, 9, 7, 9];
    let first = longest_increasing_subsequence(&sequence);
    for _ in 0..4 {
        assert_eq!(longest_increasing_subsequence(&sequence), first);
    }
    let picked = values(&sequence);
    assert!(is_strictly_increasing(&picked));
    assert_eq!(picked.len(), 6);
}

#[test]
fn indices_are_increasing() {
    let sequence = [9, 0, 2, 8, 0, 3, 7, 4, 0, 5];
    let result = longest_increasing_subsequence(&sequence);
    assert!(is_strictly_increasing(&result));
    assert_eq!(values(&sequence), vec![2, 3, 4, 5]);
}
