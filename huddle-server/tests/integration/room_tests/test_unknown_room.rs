use huddle_core::{ClientMessage, ConnectionId, ParticipantInfo, RoomId, ServerMessage};
use huddle_server::{CoreError, RoomPolicy};

use crate::integration::{create_test_coordinator, init_tracing};

#[tokio::test]
async fn test_join_unknown_room_reports_not_found() {
    init_tracing();

    let (coordinator, signaling) = create_test_coordinator(RoomPolicy::default());
    let conn = ConnectionId::new();

    coordinator
        .dispatch(
            conn,
            ClientMessage::JoinRoom {
                room_id: RoomId::from("TCH-NOSUCHRM1"),
                participant: ParticipantInfo::attendee("Sam"),
            },
        )
        .await;

    assert_eq!(
        signaling.messages_for(&conn).await,
        vec![ServerMessage::RoomNotFound]
    );
    assert_eq!(coordinator.session_room(&conn), None);
}

#[tokio::test]
async fn test_lookup_of_unknown_room_fails() {
    init_tracing();

    let (coordinator, _signaling) = create_test_coordinator(RoomPolicy::default());
    let id = RoomId::from("GAME-MISSING01");

    let result = coordinator.room(&id).await;
    assert!(matches!(result, Err(CoreError::RoomNotFound(missing)) if missing == id));
}

#[tokio::test]
async fn test_host_only_action_outside_a_room_is_invalid_state() {
    init_tracing();

    let (coordinator, _signaling) = create_test_coordinator(RoomPolicy::default());

    let result = coordinator.end_room(ConnectionId::new()).await;
    assert!(matches!(result, Err(CoreError::InvalidState(_))));
}
