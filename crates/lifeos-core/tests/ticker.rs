//! Live ticking against tokio's paused clock.

use std::sync::Arc;
use std::time::Duration;

use lifeos_core::timer::{spawn_ticker, TICK_PERIOD};
use lifeos_core::{
    FixedClock, MemoryStore, NewRecord, Organizer, RecordId, LiveSession, TaskDetails,
};
use tokio::sync::Mutex;

fn organizer() -> Organizer<MemoryStore> {
    let clock = Arc::new(FixedClock::at_local("2025-12-14T09:00:00".parse().unwrap()));
    Organizer::load(MemoryStore::new(), clock).unwrap()
}

fn add(org: &mut Organizer<MemoryStore>, text: &str) -> RecordId {
    org.create(NewRecord::task(text, TaskDetails::default()))
        .unwrap()
        .id
}

/// Test: three and a half seconds of ticking credit three seconds.
#[tokio::test(start_paused = true)]
async fn test_ticker_credits_one_second_per_tick() {
    let mut org = organizer();
    let id = add(&mut org, "focus");
    let mut session = LiveSession::start(org);

    session.toggle(&id).await.unwrap();
    assert_eq!(session.ticking(), Some(&id));
    tokio::time::sleep(Duration::from_millis(3500)).await;

    let shared = session.organizer();
    assert_eq!(shared.lock().await.get(&id).unwrap().elapsed_time, 3);

    session.toggle(&id).await.unwrap();
    assert_eq!(session.ticking(), None);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(shared.lock().await.get(&id).unwrap().elapsed_time, 3);
}

/// Test: after switching tasks only the new one accrues.
#[tokio::test(start_paused = true)]
async fn test_ticker_follows_switch() {
    let mut org = organizer();
    let x = add(&mut org, "x");
    let y = add(&mut org, "y");
    let mut session = LiveSession::start(org);

    session.toggle(&x).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    session.toggle(&y).await.unwrap();
    assert_eq!(session.ticking(), Some(&y));
    tokio::time::sleep(Duration::from_millis(4500)).await;

    let shared = session.organizer();
    let org = shared.lock().await;
    assert_eq!(org.get(&x).unwrap().elapsed_time, 2);
    assert_eq!(org.get(&y).unwrap().elapsed_time, 4);
}

/// Test: completing through the session stops the ticker.
#[tokio::test(start_paused = true)]
async fn test_ticker_stops_on_complete() {
    let mut org = organizer();
    let id = add(&mut org, "finish me");
    let mut session = LiveSession::start(org);

    session.toggle(&id).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    session.complete(&id).await.unwrap();
    assert_eq!(session.ticking(), None);
    tokio::time::sleep(Duration::from_secs(3)).await;

    let shared = session.organizer();
    let record = shared.lock().await.get(&id).unwrap();
    assert!(record.is_completed());
    assert_eq!(record.elapsed_time, 1);
    session.shutdown().await.unwrap();
}

/// Test: a ticker bound to a task that is no longer active exits on its first tick.
#[tokio::test(start_paused = true)]
async fn test_stale_ticker_exits() {
    let mut org = organizer();
    let id = add(&mut org, "idle");
    let shared = Arc::new(Mutex::new(org));

    let handle = spawn_ticker(Arc::clone(&shared), id.clone(), TICK_PERIOD);
    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert!(handle.is_finished());
    assert_eq!(shared.lock().await.get(&id).unwrap().elapsed_time, 0);
}

/// Test: dropping the handle stops crediting.
#[tokio::test(start_paused = true)]
async fn test_dropped_ticker_stops() {
    let mut org = organizer();
    let id = add(&mut org, "dropped");
    org.toggle(&id).unwrap();
    let shared = Arc::new(Mutex::new(org));

    let handle = spawn_ticker(Arc::clone(&shared), id.clone(), TICK_PERIOD);
    tokio::time::sleep(Duration::from_millis(2500)).await;
    handle.cancel();
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(shared.lock().await.get(&id).unwrap().elapsed_time, 2);
}

/// Test: a session started over an active timer resumes ticking.
#[tokio::test(start_paused = true)]
async fn test_session_resumes_active_timer() {
    let mut org = organizer();
    let id = add(&mut org, "resume");
    org.toggle(&id).unwrap();

    let session = LiveSession::start(org);
    assert_eq!(session.ticking(), Some(&id));
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(session.shutdown().await.unwrap(), 0);
}
