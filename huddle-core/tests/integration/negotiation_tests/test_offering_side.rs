use huddle_core::{
    NegotiationState, ParticipantId, PeerEvent, PeerRole, SignalMessage, SignalPayload,
};

use crate::utils::{Harness, PeerCall};

#[tokio::test]
async fn test_offer_request_sends_exactly_one_offer() {
    let mut harness = Harness::joined(&["u1"]).await;
    let u1 = ParticipantId::from("u1");

    harness.client.create_peer_connection(&u1, None).await.unwrap();
    assert_eq!(
        harness.relay.count(SignalMessage::OFFER_EVENT, &u1),
        0,
        "offer waits for negotiation-needed"
    );

    harness.pump().await;

    assert_eq!(harness.relay.count(SignalMessage::OFFER_EVENT, &u1), 1);
    assert_eq!(harness.relay.count(SignalMessage::ANSWER_EVENT, &u1), 0);

    let peer = harness.platform.last_peer(&u1).unwrap();
    assert_eq!(peer.role, PeerRole::Offerer);
    assert_eq!(peer.count(|c| *c == PeerCall::CreateOffer), 1);
    assert_eq!(peer.count(|c| *c == PeerCall::CreateAnswer), 0);
    assert_eq!(
        harness.client.negotiation_state(&u1),
        Some(NegotiationState::Negotiating)
    );
}

#[tokio::test]
async fn test_every_local_track_is_attached() {
    let mut harness = Harness::joined(&["u1"]).await;
    let u1 = ParticipantId::from("u1");

    harness.client.create_peer_connection(&u1, None).await.unwrap();

    let peer = harness.platform.last_peer(&u1).unwrap();
    let tracks: Vec<PeerCall> = peer
        .calls()
        .into_iter()
        .filter(|c| matches!(c, PeerCall::AddTrack(_)))
        .collect();
    assert_eq!(
        tracks,
        vec![
            PeerCall::AddTrack("audio".into()),
            PeerCall::AddTrack("video".into())
        ]
    );
}

#[tokio::test]
async fn test_local_candidates_are_forwarded_to_participant() {
    let mut harness = Harness::joined(&["u1"]).await;
    let u1 = ParticipantId::from("u1");
    harness.client.create_peer_connection(&u1, None).await.unwrap();

    harness.pump().await;
    let peer = harness.platform.last_peer(&u1).unwrap();
    for n in 0..3 {
        peer.fire(PeerEvent::IceCandidate(huddle_core::IceCandidate::new(format!(
            "candidate:extra{n} 1 udp 1 10.0.0.9 9 typ host"
        ))));
    }
    harness.pump().await;

    // One from the local description plus the three fired above.
    assert_eq!(harness.relay.count(SignalMessage::ICE_CANDIDATE_EVENT, &u1), 4);
    let ordered: Vec<String> = harness
        .relay
        .messages()
        .into_iter()
        .filter_map(|m| match m.payload {
            SignalPayload::IceCandidate(c) => Some(c.candidate),
            _ => None,
        })
        .collect();
    assert!(ordered[1].starts_with("candidate:extra0"));
    assert!(ordered[3].starts_with("candidate:extra2"));
}

#[tokio::test]
async fn test_answer_completes_offer() {
    let mut harness = Harness::joined(&["u1"]).await;
    let u1 = ParticipantId::from("u1");
    harness.client.create_peer_connection(&u1, None).await.unwrap();
    harness.pump().await;

    harness
        .client
        .handle_inbound_answer(&u1, "v=0 remote answer")
        .await
        .unwrap();
    harness.pump().await;

    let peer = harness.platform.last_peer(&u1).unwrap();
    assert!(peer.calls().iter().any(|c| matches!(
        c,
        PeerCall::SetRemote(desc) if desc.sdp == "v=0 remote answer"
    )));
    assert_eq!(
        harness.client.negotiation_state(&u1),
        Some(NegotiationState::Connected)
    );
}

#[tokio::test]
async fn test_remote_track_is_bound_to_participant_surface() {
    let mut harness = Harness::joined(&["u1"]).await;
    let u1 = ParticipantId::from("u1");
    harness.client.create_peer_connection(&u1, None).await.unwrap();

    harness
        .platform
        .last_peer(&u1)
        .unwrap()
        .fire(PeerEvent::TrackReceived("remote-stream".into()));
    harness.pump().await;

    assert_eq!(
        harness.platform.attached(),
        vec![(u1, "remote-stream".to_string())]
    );
}

#[tokio::test]
async fn test_outbound_messages_carry_local_participant() {
    let config = huddle_core::CallConfig {
        local_participant: Some("me".into()),
        ..Default::default()
    };
    let mut harness = Harness::with_config(config);
    harness.client.acquire_local_media().await.unwrap();
    let u1 = ParticipantId::from("u1");
    harness.client.register_participant(&u1);
    harness.client.create_peer_connection(&u1, None).await.unwrap();
    harness.pump().await;

    let messages = harness.relay.messages();
    assert!(!messages.is_empty());
    assert!(messages
        .iter()
        .all(|m| m.from.as_ref().map(|f| f.as_str()) == Some("me")));
}

#[tokio::test]
async fn test_negotiation_needed_waits_for_outstanding_answer() {
    let mut harness = Harness::joined(&["u1"]).await;
    let u1 = ParticipantId::from("u1");
    harness.client.create_peer_connection(&u1, None).await.unwrap();
    harness.pump().await;

    let peer = harness.platform.last_peer(&u1).unwrap();
    peer.fire(PeerEvent::NegotiationNeeded);
    harness.pump().await;
    assert_eq!(harness.relay.count(SignalMessage::OFFER_EVENT, &u1), 1);

    harness
        .client
        .handle_inbound_answer(&u1, "v=0 remote answer")
        .await
        .unwrap();
    peer.fire(PeerEvent::NegotiationNeeded);
    harness.pump().await;

    assert_eq!(harness.relay.count(SignalMessage::OFFER_EVENT, &u1), 2);
    assert_eq!(peer.count(|c| *c == PeerCall::CreateOffer), 2);
}
