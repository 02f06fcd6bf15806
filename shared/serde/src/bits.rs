/// Number of bits needed to distinguish `n` values: 0 for `n <= 1`,
/// otherwise the smallest `bits` such that `2^bits >= n`.
///
/// Every width in the bit-packed format comes from this function, applied to
/// the sibling count the node has *at the time of the call*. Encoder and
/// decoder agree on field widths only because they both evaluate it against
/// the same tree shape.
pub fn bits_required(n: usize) -> u32 {
    if n <= 1 {
        return 0;
    }
    usize::BITS - (n - 1).leading_zeros()
}
