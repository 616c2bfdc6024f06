/// Splits `count` items over `parts` receivers, rounding up.
pub fn share_per_part(count: usize, parts: usize) -> usize {
    if parts == 0 {
        return 0;
    }
    (count + parts - 1) / parts
}
