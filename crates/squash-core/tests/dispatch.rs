//! End-to-end dispatch scenarios: queue manager, worker pool and pipeline
//! running on real execution units.

use std::sync::Arc;
use std::time::Duration;

use squash_core::encode::encode_png;
use squash_core::pool::{ExecutionUnit, UnitSpawner};
use squash_core::{
    CodecRegistry, DispatchError, FormatTag, PixelBuffer, PoolConfig, QueueManager,
    ResizeConfig, SpawnError, TaskId, TaskSpec, TaskStatus, WorkerPool,
};

const SETTLE: Duration = Duration::from_secs(30);

fn png(width: u32, height: u32) -> Vec<u8> {
    let pixels = (0..width * height)
        .flat_map(|i| [(i % 251) as u8, (i % 13) as u8 * 19, 200, 255])
        .collect();
    encode_png(&PixelBuffer::new(width, height, pixels)).unwrap()
}

fn spec(name: &str, source: Vec<u8>, target: &str) -> TaskSpec {
    TaskSpec {
        name: name.to_string(),
        source,
        source_format: "png".to_string(),
        target_format: target.to_string(),
        quality: 75,
        resize: ResizeConfig::default(),
    }
}

fn queue_with_units(units: usize) -> QueueManager {
    let mut pool = WorkerPool::new(PoolConfig::default(), Arc::new(CodecRegistry::new()));
    let report = pool.configure(12, Some(units));
    assert_eq!(report.spawned, units);
    QueueManager::new(pool)
}

#[test]
fn five_tasks_on_two_units_round_robin_and_isolate_failure() {
    let mut queue = queue_with_units(2);

    let ids: Vec<TaskId> = (0..5)
        .map(|i| {
            // Task 3 carries bytes that are not a PNG
            let source = if i == 3 { vec![0xde, 0xad, 0xbe, 0xef] } else { png(24, 16) };
            queue.add_task(spec(&format!("image-{}.png", i), source, "webp"))
        })
        .collect();

    let outcomes = queue.enqueue_batch(ids.iter().copied());
    let slots: Vec<usize> = outcomes
        .iter()
        .map(|o| *o.result.as_ref().unwrap())
        .collect();
    assert_eq!(slots, vec![0, 1, 0, 1, 0]);

    assert!(queue.wait_until_settled(SETTLE));

    for (i, id) in ids.iter().enumerate() {
        let task = queue.task(*id).unwrap();
        if i == 3 {
            assert_eq!(task.status, TaskStatus::Failed);
            assert!(task.error.is_some());
            assert!(task.result().is_none());
        } else {
            assert_eq!(task.status, TaskStatus::Complete, "task {} did not complete", i);
            assert_eq!(task.progress, 100);
            assert_eq!(task.result_format, Some(FormatTag::Webp));
        }
        assert_eq!(task.slot, Some(i % 2));
    }
}

#[test]
fn completed_result_decodes_to_resized_dimensions() {
    let mut queue = queue_with_units(1);
    let mut task = spec("wide.png", png(120, 60), "png");
    task.resize = ResizeConfig::to(30, 0, true);
    let id = queue.add_task(task);

    queue.enqueue_batch([id]);
    assert!(queue.wait_until_settled(SETTLE));

    let task = queue.task_mut(id).unwrap();
    assert_eq!(task.status, TaskStatus::Complete);
    let bytes = task.take_result().unwrap().into_inner();
    let decoded = squash_core::decode::decode_png(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (30, 15));
}

#[test]
fn resize_disabled_keeps_source_dimensions() {
    let mut queue = queue_with_units(1);
    let id = queue.add_task(spec("photo.png", png(37, 21), "png"));

    queue.enqueue_batch([id]);
    assert!(queue.wait_until_settled(SETTLE));

    let bytes = queue
        .task_mut(id)
        .unwrap()
        .take_result()
        .unwrap()
        .into_inner();
    let decoded = squash_core::decode::decode_png(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (37, 21));
}

#[test]
fn removed_task_ignores_late_messages() {
    let mut queue = queue_with_units(1);
    let keep = queue.add_task(spec("keep.png", png(8, 8), "png"));
    let gone = queue.add_task(spec("gone.png", png(8, 8), "png"));

    queue.enqueue_batch([gone, keep]);
    assert!(queue.remove(gone).is_some());

    assert!(queue.wait_until_settled(SETTLE));
    assert!(queue.task(gone).is_none());
    assert_eq!(queue.task(keep).unwrap().status, TaskStatus::Complete);
}

#[test]
fn unknown_target_fails_only_that_task() {
    let mut queue = queue_with_units(2);
    let bad = queue.add_task(spec("a.png", png(4, 4), "gif"));
    let good = queue.add_task(spec("b.png", png(4, 4), "jpeg"));

    queue.enqueue_batch([bad, good]);
    assert!(queue.wait_until_settled(SETTLE));

    let bad = queue.task(bad).unwrap();
    assert_eq!(bad.status, TaskStatus::Failed);
    assert!(bad.error.as_deref().unwrap_or_default().contains("gif"));
    assert_eq!(queue.task(good).unwrap().status, TaskStatus::Complete);
}

#[test]
fn unavailable_codec_fails_task_each_time() {
    let mut queue = queue_with_units(1);
    let first = queue.add_task(spec("a.png", png(4, 4), "jxl"));
    let second = queue.add_task(spec("b.png", png(4, 4), "jxl"));

    queue.enqueue_batch([first, second]);
    assert!(queue.wait_until_settled(SETTLE));

    for id in [first, second] {
        assert_eq!(queue.task(id).unwrap().status, TaskStatus::Failed);
    }
    assert!(!queue.pool().registry().is_loaded(FormatTag::Jxl));
}

struct RefuseAll;

impl UnitSpawner for RefuseAll {
    fn spawn(&self, unit: ExecutionUnit) -> Result<(), SpawnError> {
        Err(SpawnError {
            index: unit.index(),
            reason: "thread limit reached".to_string(),
        })
    }
}

#[test]
fn no_units_fails_every_dispatch() {
    let mut pool = WorkerPool::with_spawner(
        PoolConfig::default(),
        Arc::new(CodecRegistry::new()),
        RefuseAll,
    );
    let report = pool.configure(12, Some(4));
    assert_eq!(report.spawned, 0);
    assert_eq!(report.failures.len(), 4);

    let mut queue = QueueManager::new(pool);
    let ids: Vec<TaskId> = (0..3)
        .map(|i| queue.add_task(spec(&format!("{}.png", i), png(2, 2), "png")))
        .collect();

    let outcomes = queue.enqueue_batch(ids.iter().copied());
    assert!(outcomes
        .iter()
        .all(|o| matches!(o.result, Err(DispatchError::NoWorkerAvailable))));
    assert!(queue.is_settled());
    assert_eq!(queue.board().count(TaskStatus::Failed), 3);
}

#[test]
fn reconfigure_resets_round_robin() {
    let mut queue = queue_with_units(3);
    let first: Vec<TaskId> = (0..2)
        .map(|i| queue.add_task(spec(&format!("{}.png", i), png(4, 4), "png")))
        .collect();
    queue.enqueue_batch(first);
    assert!(queue.wait_until_settled(SETTLE));
    assert_eq!(queue.pool().cursor(), 2);

    let report = queue.reconfigure(12, Some(2));
    assert_eq!(report.spawned, 2);
    assert_eq!(queue.pool().cursor(), 0);

    let next = queue.add_task(spec("next.png", png(4, 4), "png"));
    let outcomes = queue.enqueue_batch([next]);
    assert_eq!(*outcomes[0].result.as_ref().unwrap(), 0);
    assert!(queue.wait_until_settled(SETTLE));
}

#[test]
fn low_intensity_runs_on_one_unit() {
    let mut pool = WorkerPool::new(PoolConfig::default(), Arc::new(CodecRegistry::new()));
    let report = pool.configure(1, Some(8));
    assert_eq!(report.spawned, 1);

    let mut queue = QueueManager::new(pool);
    let ids: Vec<TaskId> = (0..3)
        .map(|i| queue.add_task(spec(&format!("{}.png", i), png(4, 4), "png")))
        .collect();
    let outcomes = queue.enqueue_batch(ids);
    assert!(outcomes.iter().all(|o| matches!(o.result, Ok(0))));
    assert!(queue.wait_until_settled(SETTLE));
}

#[test]
fn oversized_resize_fails_only_that_task() {
    let mut queue = queue_with_units(2);
    let mut huge = spec("huge.png", png(4, 4), "png");
    huge.resize = ResizeConfig::to(100_000, 100_000, false);
    let huge = queue.add_task(huge);
    let normal = queue.add_task(spec("normal.png", png(4, 4), "png"));

    queue.enqueue_batch([huge, normal]);
    assert!(queue.wait_until_settled(SETTLE));

    let huge = queue.task(huge).unwrap();
    assert_eq!(huge.status, TaskStatus::Failed);
    assert!(huge
        .error
        .as_deref()
        .unwrap_or_default()
        .contains("100000x100000"));
    assert_eq!(queue.task(normal).unwrap().status, TaskStatus::Complete);
}
