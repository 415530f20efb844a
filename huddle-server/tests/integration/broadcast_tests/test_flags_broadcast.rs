use huddle_core::{ClientMessage, FlagsPatch, MediaFlags, RoomKind, ServerMessage};
use huddle_server::{CoreError, RoomPolicy};

use crate::integration::{
    admit_attendee, create_test_coordinator, create_test_room, init_tracing, join_attendee,
};

#[tokio::test]
async fn test_flag_changes_reach_everyone_but_the_sender() {
    init_tracing();

    let (coordinator, signaling) = create_test_coordinator(RoomPolicy::default());
    let (host, room_id) = create_test_room(&coordinator, RoomKind::Teaching).await;
    let s = admit_attendee(&coordinator, &room_id, host, "Sam").await;
    signaling.clear().await;

    coordinator
        .dispatch(
            s,
            ClientMessage::UpdateFlags {
                partial: FlagsPatch {
                    audio_enabled: Some(true),
                    screen_sharing: Some(true),
                    hand_raised: Some(true),
                    ..FlagsPatch::default()
                },
            },
        )
        .await;

    let to_host = signaling.messages_for(&host).await;
    assert_eq!(
        to_host,
        vec![
            ServerMessage::MediaFlagsChanged {
                connection_id: s,
                media_flags: MediaFlags {
                    audio_enabled: true,
                    video_enabled: false,
                    screen_sharing: true,
                },
            },
            ServerMessage::ScreenShareChanged {
                connection_id: s,
                screen_sharing: true,
            },
            ServerMessage::HandRaiseChanged {
                connection_id: s,
                hand_raised: true,
            },
        ]
    );
    assert!(signaling.messages_for(&s).await.is_empty());

    // Re-sending the same values changes nothing and announces nothing.
    coordinator
        .update_flags(
            s,
            FlagsPatch {
                hand_raised: Some(true),
                ..FlagsPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(signaling.messages_for(&host).await.len(), 3);

    let snapshot = coordinator.room(&room_id).await.unwrap();
    let me = &snapshot.participants[1];
    assert!(me.hand_raised);
    assert!(me.media_flags.screen_sharing);
}

#[tokio::test]
async fn test_host_lowers_a_raised_hand() {
    init_tracing();

    let (coordinator, signaling) = create_test_coordinator(RoomPolicy::default());
    let (host, room_id) = create_test_room(&coordinator, RoomKind::Event).await;
    let s = join_attendee(&coordinator, &room_id, "Sam").await;
    let t = join_attendee(&coordinator, &room_id, "Tia").await;

    let raise = FlagsPatch {
        hand_raised: Some(true),
        ..FlagsPatch::default()
    };
    coordinator.update_flags(s, raise).await.unwrap();
    coordinator.update_flags(t, raise).await.unwrap();

    let denied = coordinator.lower_hand(t, s).await;
    assert!(matches!(denied, Err(CoreError::NotAuthorized(_))));

    coordinator
        .dispatch(host, ClientMessage::LowerHand { connection_id: s })
        .await;
    coordinator.lower_hand(t, t).await.unwrap();

    let lowered = ServerMessage::HandRaiseChanged {
        connection_id: s,
        hand_raised: false,
    };
    assert_eq!(signaling.count_for(&s, |m| *m == lowered).await, 1);
    assert_eq!(signaling.count_for(&t, |m| *m == lowered).await, 1);

    let snapshot = coordinator.room(&room_id).await.unwrap();
    assert!(snapshot.participants.iter().all(|p| !p.hand_raised));
}

#[tokio::test]
async fn test_flags_for_unknown_participant_fail() {
    init_tracing();

    let (coordinator, _signaling) = create_test_coordinator(RoomPolicy::default());
    let (host, room_id) = create_test_room(&coordinator, RoomKind::Chill).await;
    let s = join_attendee(&coordinator, &room_id, "Sam").await;
    coordinator.leave(s).await.unwrap();

    let result = coordinator.lower_hand(host, s).await;
    assert!(matches!(result, Err(CoreError::ParticipantNotFound(c)) if c == s));
}
