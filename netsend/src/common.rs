/// Capacity of the buffer used to move file data into the connection,
/// also the largest single read issued against the source.
pub const TRANSFER_BUF_SIZE: usize = 8192;

/// Exit status reported for every validation or I/O failure
pub const FAILURE_EXIT_CODE: u8 = 1;
