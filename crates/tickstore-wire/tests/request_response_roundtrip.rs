use tickstore_core::log::messages::QuTransfer;
use tickstore_core::{Passcode, TickStore, TickStoreConfig};
use tickstore_wire::sink::ResponseSink;
use tickstore_wire::{
    process_request_log, process_request_tx_log_info, RequestLog, RequestLogIdRangeFromTx,
    RESPOND_LOG, RESPONSE_LOG_ID_RANGE_FROM_TX,
};

#[derive(Default)]
struct RecordingSink {
    sent: Vec<(u8, u32, Vec<u8>)>,
}

impl ResponseSink for RecordingSink {
    fn enqueue_response(&mut self, message_type: u8, dejavu: u32, payload: &[u8]) {
        self.sent.push((message_type, dejavu, payload.to_vec()));
    }
}

#[test]
fn a_transaction_can_be_located_by_hash_and_then_its_logs_fetched_by_id() {
    let passcode = Passcode([11, 22, 33, 44]);
    let store = TickStore::new(TickStoreConfig::small(), passcode).unwrap();
    store.begin_epoch(1, 0);

    let hash = [5u8; 32];
    store.register_new_tx(0, hash);
    let transfer = QuTransfer {
        source_public_key: [1u8; 32],
        destination_public_key: [2u8; 32],
        amount: 250,
    };
    store.log(0, &transfer).unwrap();
    store.log(0, &transfer).unwrap();

    let mut sink = RecordingSink::default();
    let lookup = RequestLogIdRangeFromTx {
        passcode,
        tick: 0,
        tx_hash: hash,
    };
    process_request_tx_log_info(&store, &mut sink, 1, &lookup.to_bytes());
    assert_eq!(sink.sent.len(), 1);
    assert_eq!(sink.sent[0].0, RESPONSE_LOG_ID_RANGE_FROM_TX);
    let payload = &sink.sent[0].2;
    let from_log_id = i64::from_le_bytes(payload[0..8].try_into().unwrap());
    let length = i64::from_le_bytes(payload[8..16].try_into().unwrap());
    assert_eq!((from_log_id, length), (0, 2));

    sink.sent.clear();
    let fetch = RequestLog {
        passcode,
        from_id: from_log_id as u64,
        to_id: (from_log_id + length - 1) as u64,
    };
    process_request_log(&store, &mut sink, 2, &fetch.to_bytes(), 4096);
    assert_eq!(sink.sent.len(), 1);
    assert_eq!(sink.sent[0].0, RESPOND_LOG);
    assert_eq!(sink.sent[0].2.len(), 2 * (24 + 72));
}

#[test]
fn a_wrong_passcode_never_leaks_a_non_empty_frame() {
    let store = TickStore::new(TickStoreConfig::small(), Passcode([1, 2, 3, 4])).unwrap();
    store.begin_epoch(1, 0);
    let transfer = QuTransfer {
        source_public_key: [1u8; 32],
        destination_public_key: [2u8; 32],
        amount: 1,
    };
    store.log(0, &transfer).unwrap();

    let mut sink = RecordingSink::default();
    let request = RequestLog {
        passcode: Passcode([0, 0, 0, 0]),
        from_id: 0,
        to_id: 0,
    };
    process_request_log(&store, &mut sink, 9, &request.to_bytes(), 4096);
    assert_eq!(sink.sent, vec![(RESPOND_LOG, 9, Vec::new())]);
}
