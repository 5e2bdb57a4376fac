/// Totals known once an AVI session has been finalized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AviSummary {
    pub frame_count: u32,
    /// Length of the finished file in bytes.
    pub file_size: u64,
    /// Value written into the `movi` list length field.
    pub movie_list_size: u32,
    /// Length of the `idx1` block, header included.
    pub index_size: u64,
}
