use flate2::read::GzDecoder;
use std::io::Read;

/// Wraps `payload` in a single gRPC frame: `[compression:1][length:u32 BE][payload]`.
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(5 + payload.len());
    out.push(0); // identity, we never compress outbound frames
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

/// Splits a response body into its constituent gRPC frames, decompressing
/// any frame marked gzip. Stops silently on a short or malformed tail
/// rather than erroring, since a body may legitimately end after its
/// last complete frame.
pub fn unframe(body: &[u8]) -> Vec<Vec<u8>> {
    let mut frames = Vec::new();
    let mut pos = 0usize;
    while body.len().saturating_sub(pos) >= 5 {
        let compression = body[pos];
        let len = u32::from_be_bytes([body[pos + 1], body[pos + 2], body[pos + 3], body[pos + 4]]) as usize;
        let payload_start = pos + 5;
        if payload_start + len > body.len() {
            break;
        }
        let payload = &body[payload_start..payload_start + len];
        let decoded = match compression {
            1 => match gunzip(payload) {
                Some(d) => d,
                None => payload.to_vec(),
            },
            _ => payload.to_vec(),
        };
        frames.push(decoded);
        pos = payload_start + len;
    }
    frames
}

fn gunzip(payload: &[u8]) -> Option<Vec<u8>> {
    let mut decoder = GzDecoder::new(payload);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).ok()?;
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_frame_roundtrips() {
        let payload = b"hello cascade";
        let framed = frame(payload);
        let frames = unframe(&framed);
        assert_eq!(frames, vec![payload.to_vec()]);
    }

    #[test]
    fn concatenated_frames_split_in_order() {
        let mut body = frame(b"first");
        body.extend_from_slice(&frame(b"second"));
        let frames = unframe(&body);
        assert_eq!(frames, vec![b"first".to_vec(), b"second".to_vec()]);
    }

    #[test]
    fn empty_body_yields_no_frames() {
        assert!(unframe(&[]).is_empty());
    }

    #[test]
    fn short_tail_is_ignored() {
        let mut body = frame(b"complete");
        body.extend_from_slice(&[0, 0, 0]); // fewer than 5 trailing bytes
        let frames = unframe(&body);
        assert_eq!(frames, vec![b"complete".to_vec()]);
    }

    #[test]
    fn truncated_declared_length_is_ignored() {
        let mut body = frame(b"complete");
        body.push(0); // compression byte
        body.extend_from_slice(&100u32.to_be_bytes()); // declares more than remains
        body.extend_from_slice(b"short");
        let frames = unframe(&body);
        assert_eq!(frames, vec![b"complete".to_vec()]);
    }

    #[test]
    fn unknown_compression_byte_treated_as_identity() {
        let mut body = Vec::new();
        body.push(42u8);
        body.extend_from_slice(&3u32.to_be_bytes());
        body.extend_from_slice(b"abc");
        let frames = unframe(&body);
        assert_eq!(frames, vec![b"abc".to_vec()]);
    }
}
