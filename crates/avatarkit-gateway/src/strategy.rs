use avatarkit_core::constants::MIN_PROVIDER_CHUNK_SIZE;

/// How a file is pushed to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStrategy {
    /// One request carrying the whole body.
    SingleShot,
    /// Fixed-size pieces, for bodies the provider would refuse in one request.
    Chunked { chunk_size: u64 },
}

impl TransferStrategy {
    /// Single-shot below `large_file_threshold`, chunked at or above it.
    ///
    /// A caller chunk size override wins over the configured default, but is
    /// kept between the provider minimum and the file size.
    pub fn choose(
        size_bytes: u64,
        large_file_threshold: u64,
        chunk_size_override: Option<u64>,
        default_chunk_size: u64,
    ) -> Self {
        if size_bytes < large_file_threshold {
            TransferStrategy::SingleShot
        } else {
            let chunk_size = match chunk_size_override.filter(|c| *c > 0) {
                Some(c) => c
                    .max(MIN_PROVIDER_CHUNK_SIZE)
                    .min(size_bytes.max(MIN_PROVIDER_CHUNK_SIZE)),
                None => default_chunk_size,
            };
            TransferStrategy::Chunked { chunk_size }
        }
    }
}
