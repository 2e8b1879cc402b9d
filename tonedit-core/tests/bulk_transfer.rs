mod common;

use std::time::Duration;

use tonedit_core::sync::ToneEvent;
use tonedit_core::sysex::bulk::{BulkError, SESSION_SEND};
use tonedit_core::sysex::packet::{short_packet, Command};

use common::{describe, wait_for_event, FakeSynth};

fn sample_blob(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 37 % 256) as u8).collect()
}

#[test]
fn test_upload_delivers_blob_in_chunks() {
    let synth = FakeSynth::default();
    let uploaded = synth.uploaded.clone();
    let (sync, transport, _events) = common::with_synth(common::test_options(), synth);
    let blob = sample_blob(300);

    sync.upload_user_tone(4, &blob).unwrap();

    assert_eq!(*uploaded.lock().unwrap(), blob);
    let sent = transport.sent();
    assert_eq!(sent.len(), 6);
    assert_eq!(sent[0][5], Command::StartBulkSession as u8);
    assert_eq!(sent[0][6], SESSION_SEND);
    for data in &sent[1..4] {
        let (command, block, _) = describe(data);
        assert_eq!(command, Command::HostBlockSend as u8);
        assert_eq!(block, Some(4));
    }
    assert_eq!(sent[4], short_packet(Command::EndSendSession));
    assert_eq!(sent[5], short_packet(Command::EndBulkSession));
}

#[test]
fn test_download_reassembles_blob() {
    let blob = sample_blob(300);
    let synth = FakeSynth {
        stored_tone: blob.clone(),
        ..FakeSynth::default()
    };
    let (sync, transport, _events) = common::with_synth(common::test_options(), synth);

    let data = sync.download_user_tone(0).unwrap();

    assert_eq!(data, blob);
    let acks = transport
        .sent()
        .iter()
        .filter(|p| **p == short_packet(Command::Ack))
        .count();
    assert_eq!(acks, 3);
    assert_eq!(transport.sent().last(), Some(&short_packet(Command::EndBulkSession)));
}

#[test]
fn test_download_reports_crc_failures() {
    let synth = FakeSynth {
        stored_tone: sample_blob(300),
        corrupt_chunk: Some(1),
        ..FakeSynth::default()
    };
    let (sync, transport, _events) = common::with_synth(common::test_options(), synth);

    let result = sync.download_user_tone(0);

    assert_eq!(result, Err(BulkError::CrcMismatch { dropped: 1 }));
    assert_eq!(transport.sent().last(), Some(&short_packet(Command::EndBulkSession)));
}

#[test]
fn test_silent_synth_times_out() {
    let synth = FakeSynth {
        bulk_silent: true,
        ..FakeSynth::default()
    };
    let (sync, transport, _events) = common::with_synth(common::test_options(), synth);

    let result = sync.upload_user_tone(0, &sample_blob(10));

    assert_eq!(result, Err(BulkError::Timeout { after: "start session" }));
    assert_eq!(transport.sent().last(), Some(&short_packet(Command::EndBulkSession)));
    // The route is released, so a second attempt is not refused as busy
    assert!(matches!(
        sync.download_user_tone(0),
        Err(BulkError::Timeout { .. })
    ));
}

#[test]
fn test_spawned_download_reports_through_events() {
    let blob = sample_blob(64);
    let synth = FakeSynth {
        stored_tone: blob.clone(),
        ..FakeSynth::default()
    };
    let (sync, _transport, events) = common::with_synth(common::test_options(), synth);

    let worker = sync.spawn_download(7).unwrap();
    worker.join().unwrap();

    let (downloaded, _) = wait_for_event(&events, Duration::from_secs(1), |e| {
        matches!(e, ToneEvent::BulkDownloaded { .. })
    });
    assert_eq!(downloaded, Some(ToneEvent::BulkDownloaded { slot: 7, data: blob }));
}

#[test]
fn test_bulk_packets_without_transfer_are_ignored() {
    let (sync, _transport, events) = common::unanswered(common::test_options());
    sync.handle_packet(&short_packet(Command::Ack));
    assert!(common::drain(&events).is_empty());
}
