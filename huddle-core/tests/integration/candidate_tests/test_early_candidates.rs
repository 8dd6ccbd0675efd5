use huddle_core::{
    CallConfig, CallError, CandidateDisposition, EarlyCandidatePolicy, IceCandidate,
    ParticipantId,
};

use crate::utils::{Harness, MockPlatform, PeerCall};

fn candidate(n: u32) -> IceCandidate {
    IceCandidate::new(format!("candidate:{n} 1 udp 2122260223 10.1.1.{n} 4000{n} typ host"))
}

fn added(calls: &[PeerCall]) -> Vec<String> {
    calls
        .iter()
        .filter_map(|c| match c {
            PeerCall::AddIce(c) => Some(c.candidate.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_candidates_before_connection_are_buffered_then_applied() {
    let mut harness = Harness::joined(&["u2"]).await;
    let u2 = ParticipantId::from("u2");

    for n in 1..=3 {
        let disposition = harness
            .client
            .handle_inbound_ice_candidate(&u2, candidate(n))
            .await
            .unwrap();
        assert_eq!(disposition, CandidateDisposition::Buffered);
    }
    assert_eq!(
        harness.client.snapshot().participant(&u2).unwrap().pending_candidates,
        3
    );

    harness
        .client
        .handle_inbound_offer(&u2, "v=0 offer")
        .await
        .unwrap();

    let calls = harness.platform.last_peer(&u2).unwrap().calls();
    assert_eq!(
        added(&calls),
        vec![
            candidate(1).candidate,
            candidate(2).candidate,
            candidate(3).candidate
        ]
    );
    // Applied after the remote offer and before the answer is created.
    let remote = calls
        .iter()
        .position(|c| matches!(c, PeerCall::SetRemote(_)))
        .unwrap();
    let first_ice = calls
        .iter()
        .position(|c| matches!(c, PeerCall::AddIce(_)))
        .unwrap();
    let answer = calls
        .iter()
        .position(|c| *c == PeerCall::CreateAnswer)
        .unwrap();
    assert!(remote < first_ice && first_ice < answer);
    assert_eq!(
        harness.client.snapshot().participant(&u2).unwrap().pending_candidates,
        0
    );
}

#[tokio::test]
async fn test_offerer_buffers_until_answer() {
    let mut harness = Harness::joined(&["u1"]).await;
    let u1 = ParticipantId::from("u1");
    harness.client.create_peer_connection(&u1, None).await.unwrap();
    harness.pump().await;

    let disposition = harness
        .client
        .handle_inbound_ice_candidate(&u1, candidate(1))
        .await
        .unwrap();
    assert_eq!(disposition, CandidateDisposition::Buffered);

    harness
        .client
        .handle_inbound_answer(&u1, "v=0 answer")
        .await
        .unwrap();
    let disposition = harness
        .client
        .handle_inbound_ice_candidate(&u1, candidate(2))
        .await
        .unwrap();
    assert_eq!(disposition, CandidateDisposition::Applied);

    let calls = harness.platform.last_peer(&u1).unwrap().calls();
    assert_eq!(
        added(&calls),
        vec![candidate(1).candidate, candidate(2).candidate]
    );
}

#[tokio::test]
async fn test_reject_policy_fails_without_connection() {
    let config = CallConfig {
        early_candidates: EarlyCandidatePolicy::Reject,
        ..Default::default()
    };
    let mut harness = Harness::with_platform(MockPlatform::new(), config);
    harness.client.acquire_local_media().await.unwrap();
    let u1 = ParticipantId::from("u1");
    harness.client.register_participant(&u1);

    let err = harness
        .client
        .handle_inbound_ice_candidate(&u1, candidate(1))
        .await
        .unwrap_err();
    assert_eq!(err, CallError::UnknownParticipant(u1.clone()));

    harness.client.create_peer_connection(&u1, None).await.unwrap();
    let disposition = harness
        .client
        .handle_inbound_ice_candidate(&u1, candidate(2))
        .await
        .unwrap();
    assert_eq!(disposition, CandidateDisposition::Applied);
}

#[tokio::test]
async fn test_buffer_overflow_is_reported() {
    let config = CallConfig {
        max_pending_candidates: 2,
        ..Default::default()
    };
    let mut harness = Harness::with_config(config);
    let u1 = ParticipantId::from("u1");
    harness.client.register_participant(&u1);

    for n in 1..=2 {
        harness
            .client
            .handle_inbound_ice_candidate(&u1, candidate(n))
            .await
            .unwrap();
    }
    let err = harness
        .client
        .handle_inbound_ice_candidate(&u1, candidate(3))
        .await
        .unwrap_err();

    assert_eq!(err, CallError::CandidateOverflow(u1.clone()));
    assert_eq!(
        harness.client.snapshot().participant(&u1).unwrap().pending_candidates,
        2
    );
}

#[tokio::test]
async fn test_replacement_connection_does_not_inherit_buffered_candidates() {
    let mut harness = Harness::joined(&["u1"]).await;
    let u1 = ParticipantId::from("u1");
    harness.client.create_peer_connection(&u1, None).await.unwrap();
    harness.pump().await;

    let disposition = harness
        .client
        .handle_inbound_ice_candidate(&u1, IceCandidate::new("candidate:stale-gen1"))
        .await
        .unwrap();
    assert_eq!(disposition, CandidateDisposition::Buffered);

    harness
        .client
        .handle_inbound_offer(&u1, "v=0 fresh offer")
        .await
        .unwrap();

    let peers = harness.platform.peers_for(&u1);
    assert_eq!(peers.len(), 2);
    assert!(added(&peers[1].calls()).is_empty());
    assert!(added(&peers[0].calls()).is_empty());
    assert_eq!(
        harness.client.snapshot().participant(&u1).unwrap().pending_candidates,
        0
    );
}
