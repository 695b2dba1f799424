//! The network collaborator the request handlers in this crate are
//! generic over, so they can be exercised without a running peer
//! connection.

/// Accepts a framed response destined for whichever peer issued the
/// matching request. `dejavu` is the peer protocol's request/response
/// correlation tag, opaque to this crate.
pub trait ResponseSink {
    fn enqueue_response(&mut self, message_type: u8, dejavu: u32, payload: &[u8]);
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::ResponseSink;

    #[derive(Default)]
    pub struct RecordingSink {
        pub sent: Vec<(u8, u32, Vec<u8>)>,
    }

    impl ResponseSink for RecordingSink {
        fn enqueue_response(&mut self, message_type: u8, dejavu: u32, payload: &[u8]) {
            self.sent.push((message_type, dejavu, payload.to_vec()));
        }
    }
}
