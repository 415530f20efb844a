use huddle_core::{ClientMessage, ConnectionId, ErrorCode, ParticipantInfo, RoomKind, ServerMessage};
use huddle_server::{CoreError, JoinOutcome, RoomPolicy};

use crate::integration::{create_test_coordinator, create_test_room, init_tracing};

#[tokio::test]
async fn test_attendee_cannot_approve() {
    init_tracing();

    let (coordinator, signaling) = create_test_coordinator(RoomPolicy::default());
    let (host, room_id) = create_test_room(&coordinator, RoomKind::Teaching).await;

    let first = ConnectionId::new();
    let JoinOutcome::Pending(first_request) = coordinator
        .request_join(first, room_id.clone(), ParticipantInfo::attendee("Ana"))
        .await
        .unwrap()
    else {
        panic!("Expected a pending join");
    };
    coordinator.approve_join(host, first_request).await.unwrap();

    let second = ConnectionId::new();
    let JoinOutcome::Pending(second_request) = coordinator
        .request_join(second, room_id.clone(), ParticipantInfo::attendee("Ben"))
        .await
        .unwrap()
    else {
        panic!("Expected a pending join");
    };

    coordinator
        .dispatch(first, ClientMessage::ApproveJoin { request_id: second_request })
        .await;

    let denied = signaling
        .count_for(&first, |m| {
            matches!(m, ServerMessage::Error { code: ErrorCode::NotAuthorized, .. })
        })
        .await;
    assert_eq!(denied, 1);
    assert_eq!(
        signaling.count_for(&host, |m| matches!(m, ServerMessage::Error { .. })).await,
        0,
        "Errors go to the originator only"
    );

    let snapshot = coordinator.room(&room_id).await.unwrap();
    assert_eq!(snapshot.participants.len(), 2);
    assert_eq!(snapshot.pending_requests, 1);

    let rejected = coordinator.reject_join(first, second_request).await;
    assert!(matches!(rejected, Err(CoreError::NotAuthorized(_))));
}

#[tokio::test]
async fn test_hostless_room_accepts_a_host_without_approval() {
    init_tracing();

    let (coordinator, signaling) = create_test_coordinator(RoomPolicy::hostless());
    let (host, room_id) = create_test_room(&coordinator, RoomKind::Teaching).await;

    let student = ConnectionId::new();
    let JoinOutcome::Pending(request_id) = coordinator
        .request_join(student, room_id.clone(), ParticipantInfo::attendee("Sam"))
        .await
        .unwrap()
    else {
        panic!("Expected a pending join");
    };
    coordinator.approve_join(host, request_id).await.unwrap();
    coordinator.disconnect(host).await;
    assert_eq!(coordinator.room(&room_id).await.unwrap().host, None);

    let returning = ConnectionId::new();
    let outcome = coordinator
        .request_join(returning, room_id.clone(), ParticipantInfo::host("Hana"))
        .await
        .unwrap();
    assert_eq!(outcome, JoinOutcome::Active);

    assert_eq!(coordinator.room(&room_id).await.unwrap().host, Some(returning));
    let announced = signaling
        .count_for(&student, |m| {
            matches!(m, ServerMessage::HostChanged { connection_id: Some(c) } if *c == returning)
        })
        .await;
    assert_eq!(announced, 1);
}

#[tokio::test]
async fn test_second_host_is_downgraded() {
    init_tracing();

    let (coordinator, _signaling) = create_test_coordinator(RoomPolicy::default());
    let (host, room_id) = create_test_room(&coordinator, RoomKind::Chill).await;

    let intruder = ConnectionId::new();
    coordinator
        .request_join(intruder, room_id.clone(), ParticipantInfo::host("Ivo"))
        .await
        .unwrap();

    let snapshot = coordinator.room(&room_id).await.unwrap();
    assert_eq!(snapshot.host, Some(host));
    assert_eq!(snapshot.participants[1].role, huddle_core::Role::Attendee);
}
