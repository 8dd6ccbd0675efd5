use huddle_core::{CallError, IceCandidate, ParticipantId};

use crate::utils::Harness;

fn candidate() -> IceCandidate {
    IceCandidate::new("candidate:7 1 udp 2122260223 192.168.1.20 54321 typ host")
}

#[tokio::test]
async fn test_candidate_before_registration_fails() {
    let mut harness = Harness::joined(&[]).await;
    let u1 = ParticipantId::from("u1");

    let err = harness
        .client
        .handle_inbound_ice_candidate(&u1, candidate())
        .await
        .unwrap_err();

    assert_eq!(err, CallError::UnknownParticipant(u1.clone()));
    assert!(!harness.client.is_registered(&u1));
}

#[tokio::test]
async fn test_candidate_after_unregister_fails() {
    let mut harness = Harness::joined(&["u1"]).await;
    let u1 = ParticipantId::from("u1");
    harness.client.create_peer_connection(&u1, None).await.unwrap();
    harness.pump().await;

    harness.client.unregister_participant(&u1).await;
    let err = harness
        .client
        .handle_inbound_ice_candidate(&u1, candidate())
        .await
        .unwrap_err();

    assert_eq!(err, CallError::UnknownParticipant(u1));
}
