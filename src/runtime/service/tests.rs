use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::*;
use crate::audio::fake::FakeControl;
use crate::library::Track;

const WAIT: Duration = Duration::from_secs(2);

/// A host whose services run on fresh fakes. Returns the start counter.
fn host() -> (ServiceHost, Arc<AtomicUsize>) {
    let starts = Arc::new(AtomicUsize::new(0));
    let counter = starts.clone();
    let start: StartFn = Box::new(move |mode, foreground| {
        counter.fetch_add(1, Ordering::SeqCst);
        let backend = FakeControl::default().backend();
        PlayerService::start_with(mode, foreground, move || {
            Ok::<_, crate::error::MediaError>(backend)
        })
    });
    let host = ServiceHost::with_starter(PlayMode::Single, MprisHandle::default(), start);
    (host, starts)
}

fn wait_until(mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if done() {
            return;
        }
        thread::sleep(Duration::from_millis(10));
    }
    panic!("condition not reached in time");
}

#[test]
fn service_starts_lazily_and_is_reused() {
    let (mut host, starts) = host();
    assert!(!host.is_running());
    assert_eq!(starts.load(Ordering::SeqCst), 0);

    host.bind().unbind();
    host.bind().unbind();
    assert!(host.is_running());
    assert_eq!(starts.load(Ordering::SeqCst), 1);
}

#[test]
fn failed_play_restarts_service_on_next_bind() {
    let (mut host, starts) = host();
    let binder = host.bind();
    assert!(binder.play(Track::new("gone", "/music/missing.mp3")).is_err());
    binder.unbind();
    wait_until(|| !host.is_running());

    let binder = host.bind();
    assert!(host.is_running());
    assert_eq!(starts.load(Ordering::SeqCst), 2);
    binder.play(Track::new("song", "/music/song.mp3")).unwrap();
    wait_until(|| binder.status().ok() == Some(PlaybackStatus::Playing));
}

#[test]
fn remote_commands_drive_the_running_service() {
    let (mut host, _) = host();
    // Nothing started yet: remote play is ignored.
    host.handle_remote(&ControlCmd::Play).unwrap();
    assert!(!host.is_running());

    let binder = host.bind();
    binder.play(Track::new("song", "/music/song.mp3")).unwrap();
    wait_until(|| binder.status().ok() == Some(PlaybackStatus::Playing));

    host.handle_remote(&ControlCmd::PlayPause).unwrap();
    wait_until(|| binder.status().ok() == Some(PlaybackStatus::Paused));

    host.handle_remote(&ControlCmd::Play).unwrap();
    wait_until(|| binder.status().ok() == Some(PlaybackStatus::Playing));
    host.sync_mpris();
}

#[test]
fn shutdown_stops_the_service() {
    let (mut host, _) = host();
    let binder = host.bind();
    host.shutdown();
    assert!(!host.is_running());

    assert!(binder.status().is_err());
}
