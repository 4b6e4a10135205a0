//! End-to-end tests driving the scheduler through its event queue with
//! scripted collaborators, observing behavior through the notice bus.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::time::timeout;

use workhub::{
    EventQueue, Job, JobId, Notice, NoticeKind, Produce, Scheduler, SchedulerConfig, Status,
    UnitId, UnitSize, WorkUnit, WorkerPool,
};

const WAIT: Duration = Duration::from_secs(2);
const QUIET: Duration = Duration::from_millis(100);

/// Pool that records what it was asked to assign; completions are posted by
/// the tests themselves.
#[derive(Default)]
struct RecordingPool {
    assigned: Mutex<Vec<WorkUnit>>,
}

#[async_trait]
impl WorkerPool for RecordingPool {
    async fn assign(&self, unit: WorkUnit) {
        self.assigned.lock().unwrap().push(unit);
    }
}

/// Pool that completes every assigned unit immediately, echoing the payload.
#[derive(Default)]
struct EchoPool {
    events: OnceLock<EventQueue>,
}

#[async_trait]
impl WorkerPool for EchoPool {
    async fn assign(&self, unit: WorkUnit) {
        let events = self.events.get().expect("pool not connected");
        let _ = events.unit_completed(unit.id, unit.payload);
    }
}

#[derive(Clone, Copy)]
enum Step {
    Give,
    Starve,
}

/// Job driven by a fixed script of produce outcomes; exhausted when the
/// script runs out.
struct ScriptJob {
    id: JobId,
    name: &'static str,
    script: Mutex<VecDeque<Step>>,
    accepted: Mutex<Vec<(UnitId, Vec<u8>)>>,
}

impl ScriptJob {
    fn arc(name: &'static str, script: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            id: JobId::next(),
            name,
            script: Mutex::new(script.into()),
            accepted: Mutex::new(Vec::new()),
        })
    }

    fn giving(name: &'static str, units: usize) -> Arc<Self> {
        Self::arc(name, vec![Step::Give; units])
    }
}

#[async_trait]
impl Job for ScriptJob {
    fn id(&self) -> JobId {
        self.id
    }

    fn name(&self) -> &str {
        self.name
    }

    async fn produce_next_unit(&self, hint: UnitSize) -> Produce {
        let mut script = self.script.lock().unwrap();
        match script.pop_front() {
            Some(Step::Give) => Produce::Unit(WorkUnit::new(self.id, hint, self.id.to_string().into_bytes())),
            Some(Step::Starve) => Produce::Starved,
            None => Produce::Exhausted,
        }
    }

    async fn accept_unit_result(&self, unit: UnitId, payload: Vec<u8>) {
        self.accepted.lock().unwrap().push((unit, payload));
    }

    fn is_exhausted(&self) -> bool {
        self.script.lock().unwrap().is_empty()
    }
}

/// Job that never runs dry.
struct EndlessJob {
    id: JobId,
    name: &'static str,
    produced: AtomicU32,
}

impl EndlessJob {
    fn arc(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            id: JobId::next(),
            name,
            produced: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl Job for EndlessJob {
    fn id(&self) -> JobId {
        self.id
    }

    fn name(&self) -> &str {
        self.name
    }

    async fn produce_next_unit(&self, hint: UnitSize) -> Produce {
        self.produced.fetch_add(1, Ordering::SeqCst);
        Produce::Unit(WorkUnit::new(self.id, hint, Vec::new()))
    }

    async fn accept_unit_result(&self, _unit: UnitId, _payload: Vec<u8>) {}

    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Waits for the next notice of the given kind, skipping others.
async fn next_notice(rx: &mut broadcast::Receiver<Notice>, want: NoticeKind) -> Notice {
    timeout(WAIT, async {
        loop {
            let notice = rx.recv().await.expect("notice bus closed");
            if notice.kind == want {
                return notice;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {want:?}"))
}

/// Asserts that no notice of the given kind shows up within the quiet window.
async fn assert_quiet(rx: &mut broadcast::Receiver<Notice>, kind: NoticeKind) {
    let result = timeout(QUIET, async {
        loop {
            let notice = rx.recv().await.expect("notice bus closed");
            if notice.kind == kind {
                return notice;
            }
        }
    })
    .await;
    if let Ok(notice) = result {
        panic!("unexpected {kind:?}: {notice:?}");
    }
}

fn scheduler_with(capacity: usize, pool: Arc<dyn WorkerPool>) -> Scheduler {
    Scheduler::new(
        SchedulerConfig {
            dispatch_capacity: capacity,
            unit_size: 1,
            ..Default::default()
        },
        pool,
    )
}

#[tokio::test]
async fn test_status_transitions() {
    let scheduler = scheduler_with(2, Arc::new(RecordingPool::default()));
    assert_eq!(scheduler.status(), Status::Stopped);

    scheduler.stop_scheduler();
    assert_eq!(scheduler.status(), Status::Stopped, "stop before start is a no-op");

    scheduler.start_scheduler();
    assert_eq!(scheduler.status(), Status::Running);
    scheduler.start_scheduler();
    assert_eq!(scheduler.status(), Status::Running, "second start is a no-op");

    scheduler.stop_scheduler();
    assert_eq!(scheduler.status(), Status::Paused);
    scheduler.stop_scheduler();
    assert_eq!(scheduler.status(), Status::Paused);

    scheduler.start_scheduler();
    assert_eq!(scheduler.status(), Status::Running);
}

#[tokio::test]
async fn test_fill_then_drain_scenario() {
    // Job with 3 units, capacity 2: the queue fills with two units, the job
    // stays producing, and the third unit only appears once a worker drains
    // a slot.
    let pool = Arc::new(RecordingPool::default());
    let scheduler = scheduler_with(2, pool.clone());
    let mut rx = scheduler.notices();
    let job = ScriptJob::giving("three-units", 3);

    scheduler.start_scheduler();
    scheduler.enqueue(job.clone()).unwrap();

    next_notice(&mut rx, NoticeKind::JobAdmitted).await;
    let q1 = next_notice(&mut rx, NoticeKind::UnitQueued).await;
    let q2 = next_notice(&mut rx, NoticeKind::UnitQueued).await;
    assert_quiet(&mut rx, NoticeKind::UnitQueued).await;
    assert_quiet(&mut rx, NoticeKind::JobParked).await;

    let events = scheduler.events();

    // First free worker: front unit goes out, freed slot pulls in unit #3.
    events.worker_freed().unwrap();
    let d1 = next_notice(&mut rx, NoticeKind::UnitDispatched).await;
    assert_eq!(d1.unit, q1.unit, "dispatch must be FIFO");
    let q3 = next_notice(&mut rx, NoticeKind::UnitQueued).await;

    events.worker_freed().unwrap();
    let d2 = next_notice(&mut rx, NoticeKind::UnitDispatched).await;
    assert_eq!(d2.unit, q2.unit);

    // Script is dry: next refill discovers exhaustion.
    let finished = next_notice(&mut rx, NoticeKind::JobFinished).await;
    assert_eq!(finished.job, Some(job.id()));

    // Complete unit #1: the result payload reaches the job exactly once.
    let u1 = q1.unit.expect("queued notice carries unit id");
    events.unit_completed(u1, b"P".to_vec()).unwrap();
    let r1 = next_notice(&mut rx, NoticeKind::UnitResolved).await;
    assert_eq!(r1.unit, Some(u1));
    {
        let accepted = job.accepted.lock().unwrap();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0], (u1, b"P".to_vec()));
    }

    // A duplicate completion for the same id is discarded.
    events.unit_completed(u1, b"P".to_vec()).unwrap();
    next_notice(&mut rx, NoticeKind::StrayCompletion).await;
    assert_eq!(job.accepted.lock().unwrap().len(), 1);

    // Units #2 and #3 drain normally even though the job already finished.
    let u2 = q2.unit.unwrap();
    let u3 = q3.unit.unwrap();
    assert_eq!(pool.assigned.lock().unwrap().len(), 2);
    events.worker_freed().unwrap();
    next_notice(&mut rx, NoticeKind::UnitDispatched).await;
    events.unit_completed(u2, vec![]).unwrap();
    events.unit_completed(u3, vec![]).unwrap();
    next_notice(&mut rx, NoticeKind::UnitResolved).await;
    next_notice(&mut rx, NoticeKind::UnitResolved).await;
    assert_eq!(job.accepted.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_round_robin_fairness() {
    // Two endless producers, capacity 1: once both are admitted, freed slots
    // alternate between them.
    let pool = Arc::new(RecordingPool::default());
    let scheduler = scheduler_with(1, pool);
    let mut rx = scheduler.notices();
    let (a, b) = (EndlessJob::arc("a"), EndlessJob::arc("b"));

    scheduler.start_scheduler();
    scheduler.enqueue(a.clone()).unwrap();
    scheduler.enqueue(b.clone()).unwrap();

    let events = scheduler.events();
    let mut queued_by: Vec<JobId> = Vec::new();
    queued_by.push(next_notice(&mut rx, NoticeKind::UnitQueued).await.job.unwrap());

    for _ in 0..6 {
        events.worker_freed().unwrap();
        next_notice(&mut rx, NoticeKind::UnitDispatched).await;
        queued_by.push(next_notice(&mut rx, NoticeKind::UnitQueued).await.job.unwrap());
    }

    // After the first two slots both jobs are in rotation: strict alternation.
    for window in queued_by[1..].windows(2) {
        assert_ne!(window[0], window[1], "slots must alternate: {queued_by:?}");
    }
    assert!(queued_by.contains(&a.id()));
    assert!(queued_by.contains(&b.id()));
}

#[tokio::test]
async fn test_pause_defers_dispatch_and_replays_in_order() {
    let pool = Arc::new(RecordingPool::default());
    let scheduler = scheduler_with(4, pool.clone());
    let mut rx = scheduler.notices();
    let job = EndlessJob::arc("endless");

    scheduler.start_scheduler();
    scheduler.enqueue(job.clone()).unwrap();

    let mut queued = Vec::new();
    for _ in 0..4 {
        queued.push(next_notice(&mut rx, NoticeKind::UnitQueued).await.unit.unwrap());
    }

    scheduler.stop_scheduler();
    next_notice(&mut rx, NoticeKind::SchedulerPaused).await;

    // Free workers while paused: accepted, dequeued, but deferred.
    let events = scheduler.events();
    events.worker_freed().unwrap();
    events.worker_freed().unwrap();
    assert_quiet(&mut rx, NoticeKind::UnitDispatched).await;
    assert_quiet(&mut rx, NoticeKind::UnitQueued).await;
    assert!(pool.assigned.lock().unwrap().is_empty());

    // Resume: both deferred events replay, in original order.
    scheduler.start_scheduler();
    let d1 = next_notice(&mut rx, NoticeKind::UnitDispatched).await;
    let d2 = next_notice(&mut rx, NoticeKind::UnitDispatched).await;
    assert_eq!(d1.unit, Some(queued[0]));
    assert_eq!(d2.unit, Some(queued[1]));
    assert!(job.produced.load(Ordering::SeqCst) >= 4);
}

#[tokio::test]
async fn test_stray_completion_mutates_nothing() {
    let pool = Arc::new(RecordingPool::default());
    let scheduler = scheduler_with(2, pool);
    let mut rx = scheduler.notices();

    scheduler.start_scheduler();
    let events = scheduler.events();
    events.unit_completed(UnitId::next(), b"late".to_vec()).unwrap();

    let stray = next_notice(&mut rx, NoticeKind::StrayCompletion).await;
    assert!(stray.unit.is_some());
    assert_quiet(&mut rx, NoticeKind::UnitResolved).await;

    // The loop survived: a fresh job is admitted and produces.
    let job = ScriptJob::giving("after-stray", 1);
    scheduler.enqueue(job).unwrap();
    next_notice(&mut rx, NoticeKind::JobAdmitted).await;
    next_notice(&mut rx, NoticeKind::UnitQueued).await;
}

#[tokio::test]
async fn test_second_job_completion_report_discarded() {
    let pool = Arc::new(RecordingPool::default());
    let scheduler = scheduler_with(2, pool);
    let mut rx = scheduler.notices();
    let job = EndlessJob::arc("self-reporting");

    scheduler.start_scheduler();
    scheduler.enqueue(job.clone()).unwrap();
    next_notice(&mut rx, NoticeKind::JobAdmitted).await;

    let events = scheduler.events();
    events.job_completed(job.id()).unwrap();
    let finished = next_notice(&mut rx, NoticeKind::JobFinished).await;
    assert_eq!(finished.job, Some(job.id()));

    events.job_completed(job.id()).unwrap();
    let stray = next_notice(&mut rx, NoticeKind::StrayJobCompletion).await;
    assert_eq!(stray.job, Some(job.id()));
    assert_quiet(&mut rx, NoticeKind::JobFinished).await;
}

#[tokio::test]
async fn test_starved_job_parks_then_wakes() {
    let pool = Arc::new(EchoPool::default());
    let scheduler = scheduler_with(4, pool.clone());
    pool.events.set(scheduler.events()).ok().unwrap();
    let mut rx = scheduler.notices();

    // One unit now, then starved until its result arrives, then one more.
    let job = ScriptJob::arc("bursty", vec![Step::Give, Step::Starve, Step::Give]);

    scheduler.start_scheduler();
    scheduler.enqueue(job.clone()).unwrap();

    next_notice(&mut rx, NoticeKind::UnitQueued).await;
    next_notice(&mut rx, NoticeKind::JobParked).await;

    // Dispatch the only unit; the echo pool completes it, which wakes the job.
    scheduler.events().worker_freed().unwrap();
    next_notice(&mut rx, NoticeKind::UnitDispatched).await;
    next_notice(&mut rx, NoticeKind::UnitResolved).await;
    next_notice(&mut rx, NoticeKind::JobWoken).await;

    // Woken job produces its last unit, then exhausts.
    next_notice(&mut rx, NoticeKind::UnitQueued).await;
    let finished = next_notice(&mut rx, NoticeKind::JobFinished).await;
    assert_eq!(finished.job, Some(job.id()));
}

#[tokio::test]
async fn test_queue_bound_invariant_under_load() {
    // Reconstruct dispatch-queue occupancy from the notice stream and check
    // it never exceeds capacity.
    let capacity = 3;
    let pool = Arc::new(RecordingPool::default());
    let scheduler = scheduler_with(capacity, pool);
    let mut rx = scheduler.notices();
    let (a, b) = (EndlessJob::arc("a"), EndlessJob::arc("b"));

    scheduler.start_scheduler();
    scheduler.enqueue(a).unwrap();
    scheduler.enqueue(b).unwrap();

    let events = scheduler.events();
    let mut occupancy: i64 = 0;
    let mut dispatched = 0;
    while dispatched < 10 {
        events.worker_freed().unwrap();
        // Read notices up to the dispatch this worker triggered, checking the
        // bound along the way.
        loop {
            let notice = timeout(WAIT, rx.recv()).await.expect("stalled").unwrap();
            match notice.kind {
                NoticeKind::UnitQueued => {
                    occupancy += 1;
                    assert!(
                        occupancy <= capacity as i64,
                        "dispatch queue exceeded capacity: {occupancy}"
                    );
                }
                NoticeKind::UnitDispatched => {
                    occupancy -= 1;
                    dispatched += 1;
                    assert!(occupancy >= 0, "dispatched more than was queued");
                    break;
                }
                _ => {}
            }
        }
    }
}

#[tokio::test]
async fn test_enqueue_while_stopped_takes_effect_on_start() {
    let pool = Arc::new(RecordingPool::default());
    let scheduler = scheduler_with(2, pool);
    let mut rx = scheduler.notices();
    let job = ScriptJob::giving("early", 1);

    scheduler.enqueue(job.clone()).unwrap();
    assert_eq!(scheduler.status(), Status::Stopped);
    assert_quiet(&mut rx, NoticeKind::JobAdmitted).await;

    scheduler.start_scheduler();
    let admitted = next_notice(&mut rx, NoticeKind::JobAdmitted).await;
    assert_eq!(admitted.job, Some(job.id()));
    next_notice(&mut rx, NoticeKind::UnitQueued).await;
}

#[tokio::test]
async fn test_panicking_producer_is_unlinked_not_fatal() {
    struct PanickyJob {
        id: JobId,
    }

    #[async_trait]
    impl Job for PanickyJob {
        fn id(&self) -> JobId {
            self.id
        }

        fn name(&self) -> &str {
            "panicky"
        }

        async fn produce_next_unit(&self, _hint: UnitSize) -> Produce {
            panic!("bad producer");
        }

        async fn accept_unit_result(&self, _unit: UnitId, _payload: Vec<u8>) {}

        fn is_exhausted(&self) -> bool {
            false
        }
    }

    let pool = Arc::new(RecordingPool::default());
    let scheduler = scheduler_with(2, pool);
    let mut rx = scheduler.notices();
    let bad = Arc::new(PanickyJob { id: JobId::next() });

    scheduler.start_scheduler();
    scheduler.enqueue(bad.clone()).unwrap();

    // The fault unlinks the job instead of killing the consumer.
    let finished = next_notice(&mut rx, NoticeKind::JobFinished).await;
    assert_eq!(finished.job, Some(bad.id()));

    let good = ScriptJob::giving("good", 1);
    scheduler.enqueue(good).unwrap();
    next_notice(&mut rx, NoticeKind::UnitQueued).await;
}

#[tokio::test]
async fn test_shutdown_closes_event_queue() {
    let pool = Arc::new(RecordingPool::default());
    let scheduler = scheduler_with(2, pool);
    scheduler.start_scheduler();

    let events = scheduler.events();
    scheduler.shutdown();

    // The consumer exits; posting eventually observes the closed queue.
    timeout(WAIT, async {
        loop {
            if events.worker_freed().is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("queue never closed after shutdown");
}
