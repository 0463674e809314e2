//! Backtracking enumeration of conflict-free section combinations.
//!
//! Courses are processed in input order. At each depth every candidate of the
//! current course is checked against the sections already committed, and the
//! search only descends when it is compatible with all of them. Completed
//! assignments are collected in discovery order.

use serde::Serialize;
use std::num::NonZeroUsize;
use std::ops::ControlFlow;
use std::time::Instant;
use tracing::debug;

use super::meeting::{sections_conflict, SectionCandidate};
use super::types::Schedule;

/// The candidate sections of one course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseCandidates {
    course_id: String,
    candidates: Vec<SectionCandidate>,
}

impl CourseCandidates {
    pub fn new(course_id: impl Into<String>, candidates: Vec<SectionCandidate>) -> Self {
        Self {
            course_id: course_id.into(),
            candidates,
        }
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn candidates(&self) -> &[SectionCandidate] {
        &self.candidates
    }
}

/// Fully resolved search input: every course with its checked candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleProblem {
    courses: Vec<CourseCandidates>,
}

impl ScheduleProblem {
    pub fn new(courses: Vec<CourseCandidates>) -> Self {
        Self { courses }
    }

    pub fn courses(&self) -> &[CourseCandidates] {
        &self.courses
    }

    /// Size of the unpruned cartesian product, saturating at `u64::MAX`.
    pub fn raw_combinations(&self) -> u64 {
        self.courses.iter().fold(1u64, |acc, course| {
            acc.saturating_mul(course.candidates.len() as u64)
        })
    }
}

/// Tuning knobs for a single search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Stop after this many schedules. The outcome is then marked truncated
    /// and holds exactly the first `max_schedules` of the full result.
    pub max_schedules: Option<usize>,

    /// Fan the first course's candidates out over worker threads when the
    /// raw combination count exceeds this value.
    pub parallel_threshold: Option<u64>,
}

/// Counters collected while searching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Partial assignments entered, including complete ones.
    pub nodes_visited: u64,
    /// Candidates rejected because they conflicted with a committed section.
    pub candidates_pruned: u64,
    /// Number of threads that took part in the search.
    pub workers: usize,
}

impl SearchStats {
    fn absorb(&mut self, other: SearchStats) {
        self.nodes_visited += other.nodes_visited;
        self.candidates_pruned += other.candidates_pruned;
        self.workers += other.workers;
    }
}

/// Result of a search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    pub schedules: Vec<Schedule>,
    /// True if more schedules exist than `max_schedules` allowed.
    pub truncated: bool,
    pub stats: SearchStats,
}

/// Enumerates every conflict-free assignment of one candidate per course.
///
/// Output order is the depth-first discovery order and does not depend on
/// whether the search ran on one thread or several.
pub fn search(problem: &ScheduleProblem, options: &SearchOptions) -> SearchOutcome {
    let start = Instant::now();
    // One extra schedule tells a cut-off search apart from one that ended exactly at the cap.
    let cap = options.max_schedules.map(|max| max.saturating_add(1));

    let (mut schedules, stats) = if should_fan_out(problem, options) {
        search_parallel(problem, cap)
    } else {
        let mut backtracker = Backtracker::new(problem, cap);
        let _ = backtracker.descend(0);
        backtracker.finish()
    };

    let truncated = match options.max_schedules {
        Some(max) if schedules.len() > max => {
            schedules.truncate(max);
            true
        }
        _ => false,
    };

    debug!(
        courses = problem.courses.len(),
        raw_combinations = problem.raw_combinations(),
        schedules = schedules.len(),
        truncated = truncated,
        nodes_visited = stats.nodes_visited,
        candidates_pruned = stats.candidates_pruned,
        workers = stats.workers,
        elapsed_us = start.elapsed().as_micros() as u64,
        "Schedule search finished"
    );

    SearchOutcome {
        schedules,
        truncated,
        stats,
    }
}

fn should_fan_out(problem: &ScheduleProblem, options: &SearchOptions) -> bool {
    let Some(threshold) = options.parallel_threshold else {
        return false;
    };

    problem.courses.len() >= 2
        && problem.courses[0].candidates.len() >= 2
        && problem.raw_combinations() > threshold
}

/// Splits the first course's candidates into contiguous chunks, explores each
/// chunk's subtrees on its own scoped thread, and concatenates the results in
/// chunk order.
fn search_parallel(problem: &ScheduleProblem, cap: Option<usize>) -> (Vec<Schedule>, SearchStats) {
    let first = &problem.courses[0].candidates;
    let workers = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .min(first.len());
    let chunk_size = first.len().div_ceil(workers);

    let partials: Vec<(Vec<Schedule>, SearchStats)> = std::thread::scope(|scope| {
        let handles: Vec<_> = first
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    let mut backtracker = Backtracker::new(problem, cap);
                    backtracker.stats.nodes_visited += 1;
                    for candidate in chunk {
                        if backtracker.try_candidate(0, candidate).is_break() {
                            break;
                        }
                    }
                    backtracker.finish()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
            })
            .collect()
    });

    let mut schedules = Vec::new();
    let mut stats = SearchStats::default();
    for (partial, partial_stats) in partials {
        schedules.extend(partial);
        stats.absorb(partial_stats);
        if cap.is_some_and(|cap| schedules.len() >= cap) {
            break;
        }
    }

    (schedules, stats)
}

/// Depth-first search state for one thread.
struct Backtracker<'a> {
    courses: &'a [CourseCandidates],
    committed: Vec<&'a SectionCandidate>,
    found: Vec<Schedule>,
    cap: Option<usize>,
    stats: SearchStats,
}

impl<'a> Backtracker<'a> {
    fn new(problem: &'a ScheduleProblem, cap: Option<usize>) -> Self {
        Self {
            courses: &problem.courses,
            committed: Vec::with_capacity(problem.courses.len()),
            found: Vec::new(),
            cap,
            stats: SearchStats {
                workers: 1,
                ..SearchStats::default()
            },
        }
    }

    fn descend(&mut self, depth: usize) -> ControlFlow<()> {
        self.stats.nodes_visited += 1;

        if depth == self.courses.len() {
            self.found.push(self.materialize());
            return match self.cap {
                Some(cap) if self.found.len() >= cap => ControlFlow::Break(()),
                _ => ControlFlow::Continue(()),
            };
        }

        let courses = self.courses;
        for candidate in courses[depth].candidates() {
            self.try_candidate(depth, candidate)?;
        }

        ControlFlow::Continue(())
    }

    fn try_candidate(&mut self, depth: usize, candidate: &'a SectionCandidate) -> ControlFlow<()> {
        if self
            .committed
            .iter()
            .any(|chosen| sections_conflict(chosen, candidate))
        {
            self.stats.candidates_pruned += 1;
            return ControlFlow::Continue(());
        }

        self.committed.push(candidate);
        let flow = self.descend(depth + 1);
        self.committed.pop();
        flow
    }

    fn materialize(&self) -> Schedule {
        Schedule::from_choices(
            self.committed
                .iter()
                .map(|section| (section.course_id.clone(), section.section_id.clone()))
                .collect(),
        )
    }

    fn finish(self) -> (Vec<Schedule>, SearchStats) {
        (self.found, self.stats)
    }
}
