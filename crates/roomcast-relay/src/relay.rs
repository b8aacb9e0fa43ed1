//! Audio fan-out: multicast to a room minus the sender.
//!
//! No buffering beyond each recipient's outbound queue, no rate limiting and
//! no role check. Whoever sends a frame to a room has it relayed.

use std::collections::HashMap;

use roomcast_common::ConnectionId;
use tokio_tungstenite::tungstenite::Utf8Bytes;

use crate::outbound::{Outbound, OutboundQueue, PushOutcome};

/// Outcome of relaying one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayReport {
    /// Recipients the frame was queued for.
    pub delivered: usize,
    /// Recipients whose queue had to evict an older message to take it.
    pub evicted: usize,
}

/// Queue `text` for every member except `sender`. `members` is the room
/// snapshot taken at send time. Recipients share one buffer.
pub fn fan_out<'a>(
    members: impl IntoIterator<Item = &'a ConnectionId>,
    sender: Option<ConnectionId>,
    queues: &HashMap<ConnectionId, OutboundQueue>,
    text: &Utf8Bytes,
    lossy: bool,
) -> RelayReport {
    let mut report = RelayReport::default();

    for member in members.into_iter().filter(|m| Some(**m) != sender) {
        let Some(queue) = queues.get(member) else {
            continue;
        };
        let outcome = queue.push(Outbound {
            text: text.clone(),
            lossy,
        });
        match outcome {
            PushOutcome::Queued => report.delivered += 1,
            PushOutcome::Evicted => {
                report.delivered += 1;
                report.evicted += 1;
                tracing::trace!(conn = %member, "outbound queue full, dropped oldest");
            }
            PushOutcome::Closed => {}
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(n: u64, capacity: usize) -> (Vec<ConnectionId>, HashMap<ConnectionId, OutboundQueue>) {
        let ids: Vec<_> = (1..=n).map(ConnectionId).collect();
        let queues = ids
            .iter()
            .map(|id| (*id, OutboundQueue::new(capacity)))
            .collect();
        (ids, queues)
    }

    fn text(s: &str) -> Utf8Bytes {
        s.to_string().into()
    }

    #[test]
    fn never_delivers_to_sender() {
        let (ids, queues) = setup(3, 8);
        let report = fan_out(&ids, Some(ids[0]), &queues, &text("frame"), true);

        assert_eq!(report.delivered, 2);
        assert!(queues[&ids[0]].is_empty());
        assert_eq!(queues[&ids[1]].try_recv().unwrap().text.as_str(), "frame");
        assert_eq!(queues[&ids[2]].try_recv().unwrap().text.as_str(), "frame");
    }

    #[test]
    fn sender_outside_room_reaches_everyone() {
        let (ids, queues) = setup(2, 8);
        let report = fan_out(&ids, Some(ConnectionId(99)), &queues, &text("frame"), true);
        assert_eq!(report.delivered, 2);
    }

    #[test]
    fn no_sender_reaches_everyone() {
        let (ids, queues) = setup(3, 8);
        let report = fan_out(&ids, None, &queues, &text("stop"), false);
        assert_eq!(report.delivered, 3);
        assert!(!queues[&ids[0]].try_recv().unwrap().lossy);
    }

    #[test]
    fn closed_queue_is_skipped() {
        let (ids, queues) = setup(3, 8);
        queues[&ids[2]].close();
        let report = fan_out(&ids, Some(ids[0]), &queues, &text("frame"), true);
        assert_eq!(report.delivered, 1);
    }

    #[test]
    fn member_without_queue_is_skipped() {
        let (ids, mut queues) = setup(3, 8);
        queues.remove(&ids[1]);
        let report = fan_out(&ids, Some(ids[0]), &queues, &text("frame"), true);
        assert_eq!(report.delivered, 1);
    }

    #[test]
    fn recipients_share_one_buffer() {
        let (ids, queues) = setup(3, 8);
        let frame = text("frame");
        fan_out(&ids, Some(ids[0]), &queues, &frame, true);

        let a = queues[&ids[1]].try_recv().unwrap().text;
        let b = queues[&ids[2]].try_recv().unwrap().text;
        assert_eq!(a.as_str().as_ptr(), frame.as_str().as_ptr());
        assert_eq!(b.as_str().as_ptr(), frame.as_str().as_ptr());
    }

    #[test]
    fn reports_evictions() {
        let (ids, queues) = setup(2, 1);
        fan_out(&ids, Some(ids[0]), &queues, &text("first"), true);
        let report = fan_out(&ids, Some(ids[0]), &queues, &text("second"), true);
        assert_eq!(report, RelayReport { delivered: 1, evicted: 1 });
        assert_eq!(queues[&ids[1]].try_recv().unwrap().text.as_str(), "second");
    }
}
