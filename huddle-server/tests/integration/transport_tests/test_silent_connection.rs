use anyhow::{Result, bail};
use huddle_core::{RoomId, ServerMessage};
use huddle_server::TransportConfig;
use std::time::Duration;

use super::test_websocket_session::{connect, get_health, next_frame, send, start_server};
use crate::integration::init_tracing;

#[tokio::test]
async fn test_silent_connection_is_treated_as_leave() -> Result<()> {
    init_tracing();

    let addr = start_server(TransportConfig {
        heartbeat_interval: Duration::from_millis(200),
        missed_heartbeats: 2,
        ..TransportConfig::default()
    })
    .await?;
    let (mut host, _) = connect(addr).await?;
    // Never read again, so pings go unanswered.
    let (mut silent, silent_id) = connect(addr).await?;

    send(&mut host, r#"{"op":"create-room","d":{"kind":"chill","participant":{"displayName":"Hana","role":"host"}}}"#).await?;
    let room_id: RoomId = match next_frame(&mut host).await? {
        ServerMessage::RoomCreated { room_id, .. } => room_id,
        other => bail!("Expected room-created, got {:?}", other),
    };

    send(
        &mut silent,
        &format!(
            r#"{{"op":"join-room","d":{{"roomId":"{}","participant":{{"displayName":"Sam"}}}}}}"#,
            room_id
        ),
    )
    .await?;

    let mut joined = false;
    loop {
        match next_frame(&mut host).await? {
            ServerMessage::ParticipantJoined { participant } => {
                assert_eq!(participant.connection_id, silent_id);
                joined = true;
            }
            ServerMessage::ParticipantLeft { connection_id } if connection_id == silent_id => break,
            other => bail!("Unexpected frame for host: {:?}", other),
        }
    }
    assert!(joined);

    let health = get_health(addr).await?;
    assert_eq!(health["participants"], 1);
    Ok(())
}
