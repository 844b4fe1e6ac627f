/// Content hash of an artifact archive.
///
/// MD5 hex digest over the raw bytes. The catalog publishes MD5 for every
/// file inside an archive, so archive and per-file hashes share one format
/// and hash lookups can compare either.
pub fn hash_artifact(bytes: &[u8]) -> String {
    format!("{:x}", md5::compute(bytes))
}
