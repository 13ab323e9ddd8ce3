//! The liquid timeline.
//!
//! Converts an ordered queue of session lengths into concrete wall-clock
//! intervals. The anchor is the head task's `created_at`, not the current
//! time, so reading the timeline repeatedly yields identical intervals; the
//! active countdown is derived separately from `now - start`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::task::Task;

/// A task with its computed interval.
///
/// Derived from the queue on every computation and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineTask {
    #[serde(flatten)]
    pub task: Task,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl TimelineTask {
    /// Time left until `end_time`, capped to the task's own span.
    ///
    /// Zero once the planned end has passed.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        let from = now.max(self.start_time);
        (self.end_time - from).max(Duration::zero())
    }

    /// Elapsed fraction of the planned span in `[0.0, 1.0]`.
    #[expect(
        clippy::cast_precision_loss,
        reason = "a progress ratio tolerates rounding"
    )]
    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        let span = (self.end_time - self.start_time).num_seconds();
        if span <= 0 {
            return 1.0;
        }
        let elapsed = (now - self.start_time).num_seconds();
        (elapsed as f64 / span as f64).clamp(0.0, 1.0)
    }
}

/// Computes the interval of every queued task.
///
/// The first task starts at its own `created_at`; every following task starts
/// where the previous one ends. Order is preserved and the input is not
/// modified. An empty queue yields an empty timeline.
pub fn compute_timeline(queue: &[Task]) -> Vec<TimelineTask> {
    let Some(head) = queue.first() else {
        return Vec::new();
    };

    let mut cursor = head.created_at;
    queue
        .iter()
        .map(|task| {
            let start_time = cursor;
            let end_time = start_time
                .checked_add_signed(task.duration.to_duration())
                .map_or_else(latest_instant, |end| end.min(latest_instant()));
            cursor = end_time;
            TimelineTask {
                task: task.clone(),
                start_time,
                end_time,
            }
        })
        .collect()
}

/// Latest instant an interval may end at.
///
/// One day short of chrono's maximum, so the instant still converts to any
/// local time. Queues whose total length runs past it end here.
pub fn latest_instant() -> DateTime<Utc> {
    DateTime::<Utc>::MAX_UTC
        .checked_sub_signed(Duration::days(1))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// End of the whole queue, if any.
pub fn queue_end(queue: &[Task]) -> Option<DateTime<Utc>> {
    compute_timeline(queue).last().map(|t| t.end_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Minutes, TaskId};
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0)
            .single()
            .expect("valid test timestamp")
    }

    fn task(id: &str, minutes: u32, created_at: DateTime<Utc>) -> Task {
        Task {
            id: TaskId::new(id).unwrap(),
            name: format!("task {id}"),
            duration: Minutes::new(minutes).unwrap(),
            color: "text-zinc-600".to_string(),
            accent: None,
            icon: None,
            created_at,
        }
    }

    fn sample_queue() -> Vec<Task> {
        // Only the head's created_at matters; the others carry stale join times.
        vec![
            task("a", 30, t0()),
            task("b", 60, t0() - Duration::hours(5)),
            task("c", 15, t0() + Duration::days(2)),
        ]
    }

    #[test]
    fn empty_queue_yields_empty_timeline() {
        assert!(compute_timeline(&[]).is_empty());
        assert_eq!(queue_end(&[]), None);
    }

    #[test]
    fn end_times_accumulate_from_anchor() {
        let timeline = compute_timeline(&sample_queue());

        let ends: Vec<_> = timeline.iter().map(|t| t.end_time).collect();
        assert_eq!(
            ends,
            vec![
                t0() + Duration::minutes(30),
                t0() + Duration::minutes(90),
                t0() + Duration::minutes(105),
            ]
        );
        assert_eq!(queue_end(&sample_queue()), Some(t0() + Duration::minutes(105)));
    }

    #[test]
    fn huge_durations_saturate_instead_of_overflowing() {
        let queue: Vec<Task> = (0..40)
            .map(|i| Task {
                duration: Minutes::clamped(i64::MAX),
                ..task(&format!("long{i}"), 1, t0())
            })
            .collect();

        let timeline = compute_timeline(&queue);

        assert_eq!(timeline.len(), 40);
        assert_eq!(timeline[39].end_time, latest_instant());
        assert!(timeline.windows(2).all(|w| w[0].end_time == w[1].start_time));
        assert!(timeline.iter().all(|t| t.start_time <= t.end_time));
        assert_eq!(queue_end(&queue), Some(latest_instant()));
        // Saturated instants still render in an eastern timezone.
        let tokyo = chrono::FixedOffset::east_opt(9 * 3600).unwrap();
        assert!(timeline[39].end_time.with_timezone(&tokyo).naive_local() > t0().naive_utc());
    }

    #[test]
    fn intervals_are_contiguous() {
        let queue = sample_queue();
        let timeline = compute_timeline(&queue);

        assert_eq!(timeline[0].start_time, queue[0].created_at);
        for pair in timeline.windows(2) {
            assert_eq!(pair[1].start_time, pair[0].end_time);
        }
    }

    #[test]
    fn durations_are_preserved_exactly() {
        let queue = sample_queue();
        let timeline = compute_timeline(&queue);

        for (computed, original) in timeline.iter().zip(&queue) {
            assert_eq!(
                computed.end_time - computed.start_time,
                Duration::minutes(i64::from(original.duration.get()))
            );
        }
    }

    #[test]
    fn order_and_fields_pass_through() {
        let queue = sample_queue();
        let timeline = compute_timeline(&queue);

        let ids: Vec<_> = timeline.iter().map(|t| t.task.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        for (computed, original) in timeline.iter().zip(&queue) {
            assert_eq!(&computed.task, original);
        }
    }

    #[test]
    fn computation_is_deterministic() {
        let queue = sample_queue();
        assert_eq!(compute_timeline(&queue), compute_timeline(&queue));
        // Input untouched
        assert_eq!(queue, sample_queue());
    }

    #[test]
    fn countdown_is_derived_from_now() {
        let timeline = compute_timeline(&sample_queue());
        let head = &timeline[0];

        let now = t0() + Duration::minutes(10);
        assert_eq!(head.remaining(now), Duration::minutes(20));
        assert!((head.progress(now) - 1.0 / 3.0).abs() < 1e-9);

        let overdue = t0() + Duration::minutes(45);
        assert_eq!(head.remaining(overdue), Duration::zero());
        assert!((head.progress(overdue) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn countdown_for_future_task_is_its_full_span() {
        let timeline = compute_timeline(&sample_queue());
        let now = t0() + Duration::minutes(10);

        assert_eq!(timeline[1].remaining(now), Duration::minutes(60));
        assert!(timeline[1].progress(now).abs() < f64::EPSILON);
    }

    #[test]
    fn timeline_task_flattens_task_fields() {
        let timeline = compute_timeline(&sample_queue());
        let json = serde_json::to_value(&timeline[1]).unwrap();
        assert_eq!(json["id"], "b");
        assert_eq!(json["startTime"], "2024-03-10T09:30:00Z");
        assert_eq!(json["endTime"], "2024-03-10T10:30:00Z");
    }
}
