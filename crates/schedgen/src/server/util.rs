use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of the ids attached to request log lines.
const CORRELATION_ID_LEN: usize = 12;

/// Generates a random id used to tie together the log lines of one request.
pub fn generate_correlation_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CORRELATION_ID_LEN)
        .map(char::from)
        .collect()
}
