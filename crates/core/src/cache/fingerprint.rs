/// Fingerprint of a normalized query: the first `len` upper-case hex characters
/// of its MD5 digest.
///
/// With the default length of 6 the keyspace is 24 bits, so distinct queries
/// can collide. The length is configurable for deployments that need more.
pub fn fingerprint(normalized_query: &str, len: usize) -> String {
    let digest = format!("{:X}", md5::compute(normalized_query.as_bytes()));
    digest.chars().take(len).collect()
}
