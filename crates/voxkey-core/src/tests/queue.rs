use crate::{AudioChunk, SegmentItem, SegmentQueue};

use std::time::Duration;

const RECV_WAIT: Duration = Duration::from_millis(100);
const EMPTY_WAIT: Duration = Duration::from_millis(20);

/// WHAT: Items come off the queue in the order they were sent
/// WHY: Chunk ordering within a segment must be preserved
#[test]
fn given_sequential_sends_when_receiving_then_order_preserved() {
    // Given: A queue with three differently sized chunks
    let queue = SegmentQueue::new();
    let sender = queue.sender();
    for len in [10, 20, 30] {
        sender.send_chunk(AudioChunk::new(vec![0.0; len]));
    }

    // When/Then: Chunks arrive in send order
    for expected in [10, 20, 30] {
        let item = queue.recv_timeout(RECV_WAIT);
        assert!(matches!(item, Some(SegmentItem::Chunk(c)) if c.len() == expected));
    }
}

/// WHAT: Drain removes every pending item and reports the count
/// WHY: Drain-on-start and cancel both rely on the queue being empty after
#[test]
fn given_pending_items_when_drained_then_queue_empty_and_count_returned() {
    // Given: Two chunks and a marker on the queue
    let queue = SegmentQueue::new();
    let sender = queue.sender();
    sender.send_chunk(AudioChunk::new(vec![0.0; 8]));
    sender.send_chunk(AudioChunk::new(vec![0.0; 8]));
    sender.end_segment();

    // When: Draining
    let removed = queue.drain();

    // Then: Three items removed, nothing left
    assert_eq!(removed, 3);
    assert!(queue.recv_timeout(EMPTY_WAIT).is_none());
}

/// WHAT: recv_timeout returns None on an empty queue
/// WHY: The worker's bounded wait must expire so it can poll shutdown
#[test]
fn given_empty_queue_when_receiving_with_timeout_then_none() {
    // Given: An empty queue
    let queue = SegmentQueue::new();

    // When/Then: The wait expires without an item
    assert!(queue.recv_timeout(EMPTY_WAIT).is_none());
}

/// WHAT: Multiple cloned senders all feed the same queue
/// WHY: The queue is multi-producer (callback and controller both enqueue)
#[test]
fn given_cloned_senders_when_sending_concurrently_then_all_items_arrive() {
    // Given: Two sender clones on different threads
    let queue = SegmentQueue::new();
    let a = queue.sender();
    let b = a.clone();

    // When: Each thread sends 50 chunks
    let ta = std::thread::spawn(move || {
        for _ in 0..50 {
            a.send_chunk(AudioChunk::new(vec![1.0; 4]));
        }
    });
    let tb = std::thread::spawn(move || {
        for _ in 0..50 {
            b.send_chunk(AudioChunk::new(vec![2.0; 4]));
        }
    });
    let _ = ta.join();
    let _ = tb.join();

    // Then: All 100 chunks are on the queue
    let mut received = 0;
    while queue.recv_timeout(EMPTY_WAIT).is_some() {
        received += 1;
    }
    assert_eq!(received, 100);
}

/// WHAT: An end marker sent after chunks is received after them
/// WHY: The marker closes a segment; receiving it early would split audio
/// across segments
#[test]
fn given_chunks_then_marker_when_receiving_then_marker_is_last() {
    // Given: Chunks followed by a marker
    let queue = SegmentQueue::new();
    let sender = queue.sender();
    sender.send_chunk(AudioChunk::new(vec![0.0; 4]));
    sender.send_chunk(AudioChunk::new(vec![0.0; 4]));
    queue.end_segment();

    // When: Receiving everything
    let mut items = Vec::new();
    while let Some(item) = queue.recv_timeout(EMPTY_WAIT) {
        items.push(item);
    }

    // Then: The marker is the final item
    assert_eq!(items.len(), 3);
    assert!(matches!(items[0], SegmentItem::Chunk(_)));
    assert!(matches!(items[1], SegmentItem::Chunk(_)));
    assert!(matches!(items[2], SegmentItem::EndOfSegment));
}
