use huddle_core::{CallError, ParticipantId, PeerEvent, PeerRole, SignalMessage, SignalPayload};

use crate::utils::{Harness, PeerCall};

const OFFER_SDP: &str = "v=0\r\no=- 4611731400430051336 2 IN IP4 127.0.0.1\r\n";

#[tokio::test]
async fn test_inbound_offer_sends_one_answer_and_no_offer() {
    let mut harness = Harness::joined(&["u2"]).await;
    let u2 = ParticipantId::from("u2");

    harness
        .client
        .create_peer_connection(&u2, Some(OFFER_SDP))
        .await
        .unwrap();
    harness.pump().await;

    assert_eq!(harness.relay.count(SignalMessage::ANSWER_EVENT, &u2), 1);
    assert_eq!(harness.relay.count(SignalMessage::OFFER_EVENT, &u2), 0);

    let peer = harness.platform.last_peer(&u2).unwrap();
    assert_eq!(peer.role, PeerRole::Answerer);
    assert_eq!(peer.calls()[0], PeerCall::AddTrack("audio".into()));
    assert!(matches!(
        &peer.calls()[2],
        PeerCall::SetRemote(desc) if desc.sdp == OFFER_SDP
    ));
    assert_eq!(peer.count(|c| *c == PeerCall::CreateOffer), 0);

    let answer = harness
        .relay
        .messages()
        .into_iter()
        .find(|m| m.event_name() == SignalMessage::ANSWER_EVENT)
        .unwrap();
    assert!(matches!(answer.payload, SignalPayload::Answer(_)));
}

#[tokio::test]
async fn test_answering_peer_ignores_negotiation_needed() {
    let mut harness = Harness::joined(&["u2"]).await;
    let u2 = ParticipantId::from("u2");
    harness
        .client
        .create_peer_connection(&u2, Some(OFFER_SDP))
        .await
        .unwrap();

    harness
        .platform
        .last_peer(&u2)
        .unwrap()
        .fire(PeerEvent::NegotiationNeeded);
    harness.pump().await;

    assert_eq!(harness.relay.count(SignalMessage::OFFER_EVENT, &u2), 0);
    let peer = harness.platform.last_peer(&u2).unwrap();
    assert_eq!(peer.count(|c| *c == PeerCall::CreateOffer), 0);
}

#[tokio::test]
async fn test_malformed_offer_is_negotiation_error() {
    let mut harness = Harness::joined(&["u2"]).await;
    let u2 = ParticipantId::from("u2");

    let err = harness
        .client
        .create_peer_connection(&u2, Some("garbage"))
        .await
        .unwrap_err();

    assert!(matches!(err, CallError::Negotiation { ref participant, .. } if participant == &u2));
    assert_eq!(harness.relay.count(SignalMessage::ANSWER_EVENT, &u2), 0);
}

#[tokio::test]
async fn test_empty_inbound_offer_is_skipped() {
    let mut harness = Harness::joined(&["u2"]).await;
    let u2 = ParticipantId::from("u2");

    harness.client.handle_inbound_offer(&u2, "").await.unwrap();

    assert_eq!(harness.platform.peer_count(), 0);
    assert!(harness.relay.messages().is_empty());
}

#[tokio::test]
async fn test_empty_answer_is_noop() {
    let mut harness = Harness::joined(&["u1"]).await;
    let u1 = ParticipantId::from("u1");
    harness.client.create_peer_connection(&u1, None).await.unwrap();
    harness.pump().await;

    let before = harness.client.snapshot();
    let calls_before = harness.platform.last_peer(&u1).unwrap().calls().len();

    harness.client.handle_inbound_answer(&u1, "").await.unwrap();
    // Also a no-op for participants nobody has heard of.
    harness
        .client
        .handle_inbound_answer(&"ghost".into(), "")
        .await
        .unwrap();

    assert_eq!(harness.client.snapshot(), before);
    assert_eq!(
        harness.platform.last_peer(&u1).unwrap().calls().len(),
        calls_before
    );
}

#[tokio::test]
async fn test_answer_without_connection_is_unknown_participant() {
    let mut harness = Harness::joined(&["u1"]).await;

    let err = harness
        .client
        .handle_inbound_answer(&"u1".into(), "v=0")
        .await
        .unwrap_err();
    assert_eq!(err, CallError::UnknownParticipant("u1".into()));

    let err = harness
        .client
        .handle_inbound_answer(&"ghost".into(), "v=0")
        .await
        .unwrap_err();
    assert_eq!(err, CallError::UnknownParticipant("ghost".into()));
}

#[tokio::test]
async fn test_answer_on_answering_connection_is_negotiation_error() {
    let mut harness = Harness::joined(&["u2"]).await;
    let u2 = ParticipantId::from("u2");
    harness
        .client
        .handle_inbound_offer(&u2, OFFER_SDP)
        .await
        .unwrap();
    harness.pump().await;
    let before = harness.client.snapshot();

    let err = harness
        .client
        .handle_inbound_answer(&u2, "v=0\r\nunexpected answer\r\n")
        .await
        .unwrap_err();

    assert!(matches!(err, CallError::Negotiation { ref participant, .. } if participant == &u2));
    let peer = harness.platform.last_peer(&u2).unwrap();
    assert_eq!(peer.count(|c| matches!(c, PeerCall::SetRemote(_))), 1);
    assert_eq!(harness.client.snapshot(), before);
}
