/// Checks that two alphabets consist of the same characters, regardless of
/// ordering.
pub fn alphabet_equal(a: &[char], b: &[char]) -> bool {
    let mut left = a.to_vec();
    let mut right = b.to_vec();
    left.sort_unstable();
    right.sort_unstable();
    left == right
}
