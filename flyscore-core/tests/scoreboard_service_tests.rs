// tests/scoreboard_service_tests.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use flyscore_common::traits::repository_traits::ScoreboardRepository;
use flyscore_core::clock::ManualClock;
use flyscore_core::models::{ScoreboardState, Side, TimerMode};
use flyscore_core::repositories::JsonScoreboardRepository;
use flyscore_core::services::ScoreboardService;
use flyscore_core::Error;

const T0: i64 = 1_700_000_000_000;

fn service_in(dir: &std::path::Path) -> (Arc<ScoreboardService>, Arc<ManualClock>, Arc<JsonScoreboardRepository>) {
    let repo = Arc::new(JsonScoreboardRepository::new(dir));
    let clock = Arc::new(ManualClock::new(T0));
    let svc = Arc::new(ScoreboardService::new(repo.clone(), clock.clone()));
    (svc, clock, repo)
}

/// Refuses every save and counts the attempts.
#[derive(Default)]
struct ReadOnlyRepository {
    saves: AtomicUsize,
}

impl ScoreboardRepository for ReadOnlyRepository {
    fn load(&self) -> Result<Option<ScoreboardState>, Error> {
        Ok(None)
    }
    fn save(&self, _state: &ScoreboardState) -> Result<(), Error> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        Err(Error::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only")))
    }
    fn reset_defaults(&self) -> Result<ScoreboardState, Error> {
        Err(Error::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only")))
    }
    fn ensure_exists(&self, _seed: Option<&ScoreboardState>) -> Result<(), Error> {
        Ok(())
    }
}

#[test]
fn start_wait_pause_counts_exactly_the_elapsed_time() {
    let dir = tempfile::tempdir().unwrap();
    let (svc, clock, repo) = service_in(dir.path());

    svc.set_timer_display_time(0, "10:00").unwrap();
    svc.start_timer(0).unwrap();
    clock.advance(5_000);
    svc.pause_timer(0).unwrap();

    let t = &svc.snapshot().timers[0];
    assert!(!t.running);
    assert_eq!(t.remaining_ms, 595_000);

    let stored = repo.load().unwrap().unwrap();
    assert_eq!(stored.timers[0].remaining_ms, 595_000);
    assert!(!stored.timers[0].running);
}

#[test]
fn countdown_stops_itself_at_zero_on_tick() {
    let dir = tempfile::tempdir().unwrap();
    let (svc, clock, repo) = service_in(dir.path());

    svc.set_timer_display_time(0, "0:02").unwrap();
    svc.start_timer(0).unwrap();
    clock.advance(1_500);
    assert!(svc.tick());
    assert_eq!(svc.snapshot().timers[0].remaining_ms, 500);

    clock.advance(10_000);
    assert!(svc.tick());
    let t = &svc.snapshot().timers[0];
    assert_eq!(t.remaining_ms, 0);
    assert!(!t.running);

    clock.advance(1_000);
    assert!(!svc.tick(), "nothing running, nothing to save");
    assert_eq!(repo.load().unwrap().unwrap().timers[0].remaining_ms, 0);
}

#[test]
fn countup_only_grows() {
    let dir = tempfile::tempdir().unwrap();
    let (svc, clock, _) = service_in(dir.path());
    let id = svc.add_timer("Stoppage", TimerMode::Countup, 0).unwrap();
    let idx = svc.timer_index(&id).unwrap();

    svc.start_timer(idx).unwrap();
    let mut last = 0;
    for step in [0, 250, 1_000, 0, 3_333] {
        clock.advance(step);
        svc.tick();
        let now = svc.snapshot().timers[idx].remaining_ms;
        assert!(now >= last);
        last = now;
    }
    assert_eq!(last, 4_583);
}

#[test]
fn running_timer_rejects_typed_time() {
    let dir = tempfile::tempdir().unwrap();
    let (svc, _, _) = service_in(dir.path());
    svc.set_timer_display_time(0, "1:00").unwrap();
    svc.start_timer(0).unwrap();

    assert!(matches!(svc.set_timer_display_time(0, "2:00"), Err(Error::TimerRunning(0))));
    assert!(matches!(svc.set_timer_display_time(1, "2:00"), Err(Error::IndexOutOfRange { .. })));
    assert_eq!(svc.snapshot().timers[0].initial_ms, 60_000);
}

#[test]
fn bad_time_text_leaves_timer_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let (svc, _, _) = service_in(dir.path());
    svc.set_timer_display_time(0, "3:30").unwrap();
    let before = svc.snapshot().timers[0].clone();

    for bad in ["12:75", "abc", "", "1:2", ":30"] {
        assert!(matches!(svc.set_timer_display_time(0, bad), Err(Error::InvalidFormat(_))), "{bad}");
    }
    assert_eq!(svc.snapshot().timers[0], before);
}

#[test]
fn field_edits_floor_at_zero_and_persist() {
    let dir = tempfile::tempdir().unwrap();
    let (svc, _, repo) = service_in(dir.path());

    assert_eq!(svc.bump_field(0, Side::Home, 2).unwrap(), 2);
    assert_eq!(svc.bump_field(0, Side::Home, -5).unwrap(), 0);
    svc.set_field_value(1, Side::Away, 7).unwrap();
    let id = svc.add_field("Cards").unwrap();
    svc.set_field_visible(2, false).unwrap();

    let stored = repo.load().unwrap().unwrap();
    assert_eq!(stored.custom_fields[0].home, 0);
    assert_eq!(stored.custom_fields[1].away, 7);
    assert_eq!(stored.custom_fields[2].id, id);
    assert!(!stored.custom_fields[2].visible);
}

#[test]
fn removing_rows_keeps_structural_guarantees() {
    let dir = tempfile::tempdir().unwrap();
    let (svc, _, _) = service_in(dir.path());

    let removed = svc.remove_timer(0).unwrap();
    let st = svc.snapshot();
    assert_eq!(st.timers.len(), 1);
    assert_ne!(st.timers[0].id, removed.id);

    svc.remove_field(1).unwrap();
    let st = svc.snapshot();
    assert_eq!(st.custom_fields.len(), 2);
    assert_eq!(st.custom_fields[1].label, "Score");

    assert!(matches!(svc.remove_field(9), Err(Error::IndexOutOfRange { len: 2, .. })));
}

#[test]
fn removing_a_leading_reserved_row_shifts_the_rest_down() {
    let dir = tempfile::tempdir().unwrap();
    let (svc, _, _) = service_in(dir.path());
    svc.add_field("Fouls").unwrap();

    let removed = svc.remove_field(0).unwrap();
    assert_eq!(removed.label, "Points");
    let labels: Vec<String> = svc.snapshot().custom_fields.into_iter().map(|f| f.label).collect();
    assert_eq!(labels, ["Score", "Fouls"]);
}

#[test]
fn team_edits_and_flags() {
    let dir = tempfile::tempdir().unwrap();
    let (svc, _, repo) = service_in(dir.path());

    let team = svc
        .edit_team(Side::Away, |t| {
            t.title = "Guests".into();
            t.color = 0xAB_CD_EF_01;
        })
        .unwrap();
    assert_eq!(team.color, 0xCD_EF_01);
    assert!(svc.toggle_swap().unwrap());
    assert!(!svc.toggle_show().unwrap());

    let stored = repo.load().unwrap().unwrap();
    assert_eq!(stored.away.title, "Guests");
    assert!(stored.swap_sides);
    assert!(!stored.show_scoreboard);
}

#[test]
fn failed_save_keeps_memory_authoritative() {
    let repo = Arc::new(ReadOnlyRepository::default());
    let clock = Arc::new(ManualClock::new(T0));
    let svc = ScoreboardService::new(repo.clone(), clock);

    svc.bump_field(0, Side::Home, 3).unwrap();
    assert_eq!(svc.snapshot().custom_fields[0].home, 3);
    assert_eq!(repo.saves.load(Ordering::SeqCst), 1);
    assert!(svc.save_now().is_err());

    let previous = svc.reset_defaults();
    assert_eq!(previous.custom_fields[0].home, 3);
    assert_eq!(svc.snapshot().custom_fields[0].home, 0);
}

#[test]
fn reload_picks_up_external_edits_and_survives_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let (svc, _, repo) = service_in(dir.path());
    svc.bump_field(0, Side::Home, 4).unwrap();

    let mut external = repo.load().unwrap().unwrap();
    external.home.title = "Edited".into();
    repo.save(&external).unwrap();
    svc.reload();
    assert_eq!(svc.snapshot().home.title, "Edited");

    repo.write_raw("garbage").unwrap();
    svc.reload();
    assert_eq!(svc.snapshot().home.title, "");
}

#[test]
fn concurrent_writers_do_not_lose_updates() {
    let dir = tempfile::tempdir().unwrap();
    let (svc, _, repo) = service_in(dir.path());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let svc = svc.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    svc.bump_field(0, Side::Home, 1).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(svc.snapshot().custom_fields[0].home, 100);
    assert_eq!(repo.load().unwrap().unwrap().custom_fields[0].home, 100);
}

#[test]
fn mode_switch_keeps_counted_time() {
    let dir = tempfile::tempdir().unwrap();
    let (svc, clock, _) = service_in(dir.path());
    svc.set_timer_display_time(0, "1:00").unwrap();
    svc.start_timer(0).unwrap();
    clock.advance(10_000);
    svc.set_timer_mode(0, TimerMode::Countup).unwrap();
    clock.advance(5_000);
    svc.pause_timer(0).unwrap();

    let t = &svc.snapshot().timers[0];
    assert_eq!(t.mode, TimerMode::Countup);
    assert_eq!(t.remaining_ms, 55_000);
}
