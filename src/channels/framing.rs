//! Splitting drained bytes into envelopes.

use std::mem;

use crate::config::Framing;

/// Take every complete envelope out of `pending`.
///
/// With [`Framing::Blob`] the whole buffer is one envelope, so two messages
/// written within one poll interval arrive glued together and fail to
/// decode. With [`Framing::Lines`] each newline-terminated line is an
/// envelope and an unterminated tail stays in `pending` for the next poll.
pub fn take_envelopes(framing: Framing, pending: &mut Vec<u8>) -> Vec<Vec<u8>> {
    match framing {
        Framing::Blob => {
            if pending.is_empty() {
                Vec::new()
            } else {
                vec![mem::take(pending)]
            }
        }
        Framing::Lines => {
            let Some(last_newline) = pending.iter().rposition(|b| *b == b'\n') else {
                return Vec::new();
            };
            let tail = pending.split_off(last_newline + 1);
            let complete = mem::replace(pending, tail);
            complete
                .split(|b| *b == b'\n')
                .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
                .map(<[u8]>::to_vec)
                .collect()
        }
    }
}
