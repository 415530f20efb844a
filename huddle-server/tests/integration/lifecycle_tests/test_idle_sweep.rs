use huddle_core::{ConnectionId, ParticipantInfo, RoomKind, ServerMessage};
use huddle_server::{CoreError, RoomPolicy};
use std::time::Duration;

use crate::integration::{create_test_coordinator, create_test_room, init_tracing, join_attendee};

const IDLE: Duration = Duration::from_secs(600);

#[tokio::test(start_paused = true)]
async fn test_empty_room_expires_after_idle_threshold() {
    init_tracing();

    let (coordinator, _signaling) = create_test_coordinator(RoomPolicy::default());
    let (host, room_id) = create_test_room(&coordinator, RoomKind::Chill).await;
    coordinator.leave(host).await.unwrap();

    assert_eq!(coordinator.sweep_idle_rooms(IDLE).await, 0);

    tokio::time::advance(IDLE - Duration::from_secs(1)).await;
    assert_eq!(coordinator.sweep_idle_rooms(IDLE).await, 0);

    tokio::time::advance(Duration::from_secs(1)).await;
    assert_eq!(coordinator.sweep_idle_rooms(IDLE).await, 1);
    assert!(matches!(
        coordinator.room(&room_id).await,
        Err(CoreError::RoomNotFound(_))
    ));
    assert_eq!(coordinator.stats().rooms, 0);
}

#[tokio::test(start_paused = true)]
async fn test_occupied_room_is_never_swept() {
    init_tracing();

    let (coordinator, _signaling) = create_test_coordinator(RoomPolicy::default());
    let (_, room_id) = create_test_room(&coordinator, RoomKind::Gaming).await;

    tokio::time::advance(IDLE * 3).await;
    assert_eq!(coordinator.sweep_idle_rooms(IDLE).await, 0);
    assert!(coordinator.room(&room_id).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_idle_clock_restarts_when_room_empties() {
    init_tracing();

    let (coordinator, _signaling) = create_test_coordinator(RoomPolicy::default());
    let (host, room_id) = create_test_room(&coordinator, RoomKind::Event).await;
    let attendee = join_attendee(&coordinator, &room_id, "Sam").await;

    tokio::time::advance(IDLE * 2).await;
    coordinator.leave(host).await.unwrap();
    coordinator.leave(attendee).await.unwrap();

    tokio::time::advance(IDLE / 2).await;
    assert_eq!(coordinator.sweep_idle_rooms(IDLE).await, 0);

    tokio::time::advance(IDLE / 2).await;
    assert_eq!(coordinator.sweep_idle_rooms(IDLE).await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_expiry_turns_away_pending_requesters() {
    init_tracing();

    let (coordinator, signaling) = create_test_coordinator(RoomPolicy::default());
    let (host, room_id) = create_test_room(&coordinator, RoomKind::Teaching).await;

    let waiting = ConnectionId::new();
    coordinator
        .request_join(waiting, room_id.clone(), ParticipantInfo::attendee("Wes"))
        .await
        .unwrap();
    coordinator.leave(host).await.unwrap();

    tokio::time::advance(IDLE).await;
    assert_eq!(coordinator.sweep_idle_rooms(IDLE).await, 1);

    assert_eq!(
        signaling.messages_for(&waiting).await.last(),
        Some(&ServerMessage::RoomEnded)
    );
    assert_eq!(coordinator.session_room(&waiting), None);
}
