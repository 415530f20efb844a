use huddle_core::{ClientMessage, Payload, RoomKind, ServerMessage, SignalKind};
use huddle_server::RoomPolicy;

use crate::integration::{create_test_coordinator, create_test_room, init_tracing, join_attendee};

#[tokio::test]
async fn test_offer_reaches_target_unmodified() {
    init_tracing();

    let (coordinator, signaling) = create_test_coordinator(RoomPolicy::default());
    let (host, room_id) = create_test_room(&coordinator, RoomKind::Chill).await;
    let student = join_attendee(&coordinator, &room_id, "Sam").await;

    // Key order, spacing and non-ASCII text must survive the hop.
    let raw = r#"{"type":"offer", "sdp":"v=0\r\no=- 4611 2 IN IP4 127.0.0.1\r\n","zeta":1,"alpha":"é"}"#;
    coordinator
        .dispatch(
            student,
            ClientMessage::Signal {
                kind: SignalKind::Offer,
                target_connection_id: host,
                payload: Payload::from_json(raw).unwrap(),
            },
        )
        .await;

    let signals: Vec<ServerMessage> = signaling
        .messages_for(&host)
        .await
        .into_iter()
        .filter(|m| matches!(m, ServerMessage::Signal { .. }))
        .collect();
    assert_eq!(signals.len(), 1);

    let ServerMessage::Signal {
        kind,
        from_connection_id,
        payload,
    } = &signals[0]
    else {
        unreachable!();
    };
    assert_eq!(*kind, SignalKind::Offer);
    assert_eq!(*from_connection_id, student);
    assert_eq!(payload.get(), raw);

    assert_eq!(
        signaling
            .count_for(&student, |m| matches!(m, ServerMessage::Signal { .. }))
            .await,
        0
    );
}
