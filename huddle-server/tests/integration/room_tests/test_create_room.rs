use huddle_core::{ConnectionId, JoinPolicy, ParticipantInfo, Role, RoomKind, ServerMessage};
use huddle_server::{CoreError, RoomPolicy};

use crate::integration::{create_test_coordinator, create_test_room, init_tracing};
use crate::utils::{SIGNAL_TIMEOUT_MS, wait_for_message};

#[tokio::test]
async fn test_creator_is_seated_as_host() {
    init_tracing();

    let (coordinator, signaling) = create_test_coordinator(RoomPolicy::default());
    let (host, room_id) = create_test_room(&coordinator, RoomKind::Teaching).await;

    assert!(room_id.as_str().starts_with("TCH-"));
    assert_eq!(room_id.kind(), Some(RoomKind::Teaching));

    let created = wait_for_message(
        &signaling,
        &host,
        |m| matches!(m, ServerMessage::RoomCreated { .. }),
        SIGNAL_TIMEOUT_MS,
    )
    .await
    .expect("Host should receive room-created");
    assert_eq!(
        created,
        ServerMessage::RoomCreated {
            room_id: room_id.clone(),
            kind: RoomKind::Teaching,
            policy: JoinPolicy::Approval,
        }
    );

    let snapshot = coordinator.room(&room_id).await.expect("Room should exist");
    assert_eq!(snapshot.host, Some(host));
    assert_eq!(snapshot.participants.len(), 1);
    assert_eq!(snapshot.participants[0].role, Role::Host);
    assert_eq!(coordinator.session_room(&host), Some(room_id));
}

#[tokio::test]
async fn test_policy_override_and_kind_defaults() {
    init_tracing();

    let (coordinator, _signaling) = create_test_coordinator(RoomPolicy::default());

    let (_, chill) = create_test_room(&coordinator, RoomKind::Chill).await;
    let snapshot = coordinator.room(&chill).await.unwrap();
    assert_eq!(snapshot.policy, JoinPolicy::Open);

    let host = ConnectionId::new();
    let gated = coordinator
        .create_room(host, RoomKind::Gaming, None, Some(JoinPolicy::Approval), None)
        .await
        .unwrap();
    let snapshot = coordinator.room(&gated).await.unwrap();
    assert_eq!(snapshot.policy, JoinPolicy::Approval);
    assert_eq!(snapshot.participants[0].display_name, "Host");
}

#[tokio::test]
async fn test_creating_twice_from_one_connection_fails() {
    init_tracing();

    let (coordinator, _signaling) = create_test_coordinator(RoomPolicy::default());
    let (host, _) = create_test_room(&coordinator, RoomKind::Event).await;

    let result = coordinator
        .create_room(host, RoomKind::Event, None, None, Some(ParticipantInfo::host("Hana")))
        .await;

    assert!(matches!(result, Err(CoreError::InvalidState(_))));
    assert_eq!(coordinator.stats().rooms, 1);
}
