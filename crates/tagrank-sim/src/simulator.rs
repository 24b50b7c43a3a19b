//! Seeded synthetic workload
//!
//! Builds a small poll community over the in-memory backend, replays a
//! reproducible stream of behavioral events through the engine with
//! bounded concurrency, then asks the engine for each user's next poll.
//!
//! Event generation is seeded; recommendation sampling is not, so the
//! recommended poll may differ between runs with the same seed.

use anyhow::{ensure, Context};
use futures::stream::{self, StreamExt};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tagrank_core::{
    AffinityEngine, AffinityEvent, EngineConfig, EventOutcome, InMemoryBackend, PollId, UserId,
};
use tagrank_vector::TagId;

const TOPICS: &[&str] = &[
    "sport", "music", "film", "science", "politics", "food", "travel", "gaming", "art", "books",
    "tech", "fashion", "pets", "health", "finance", "space",
];

const TOP_TAGS: usize = 3;

/// Simulator configuration
#[derive(Debug, Clone)]
pub(crate) struct SimulatorConfig {
    /// Random seed for reproducibility
    pub(crate) seed: u64,
    pub(crate) users: usize,
    pub(crate) polls: usize,
    /// Distinct tags in play, capped by the built-in topic list
    pub(crate) tags: usize,
    pub(crate) events: usize,
    /// Events in flight at once
    pub(crate) concurrency: usize,
    /// Users listed in the report
    pub(crate) show: usize,
    /// Artificial backend latency per call
    pub(crate) latency: Option<Duration>,
    pub(crate) engine: EngineConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            users: 20,
            polls: 100,
            tags: 8,
            events: 2000,
            concurrency: 16,
            show: 10,
            latency: None,
            engine: EngineConfig::default(),
        }
    }
}

impl SimulatorConfig {
    fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.users >= 2, "need at least two users, got {}", self.users);
        ensure!(self.polls >= 1, "need at least one poll");
        ensure!(self.tags >= 1, "need at least one tag");
        ensure!(self.concurrency >= 1, "concurrency must be positive");
        self.engine.validate()?;
        Ok(())
    }
}

/// Event tallies
#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct SimulatorStats {
    pub(crate) polls_created: u64,
    pub(crate) tags_bumped: u64,
    pub(crate) events_applied: u64,
    pub(crate) events_ignored: u64,
    pub(crate) events_failed: u64,
    pub(crate) recommendations: u64,
    pub(crate) no_candidates: u64,
}

/// Where one user ended up
#[derive(Debug, Clone, Serialize)]
pub(crate) struct UserSummary {
    pub(crate) user: UserId,
    pub(crate) top_tags: Vec<(String, f64)>,
    pub(crate) recommended: Option<RecommendationSummary>,
}

/// Recommended poll with the score that won it
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RecommendationSummary {
    pub(crate) poll: PollId,
    pub(crate) title: String,
    pub(crate) score: f64,
}

/// Final report from simulator
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SimulatorReport {
    pub(crate) seed: u64,
    pub(crate) elapsed_ms: u128,
    pub(crate) stats: SimulatorStats,
    pub(crate) users: Vec<UserSummary>,
}

impl SimulatorReport {
    /// Check that every event went through
    pub(crate) fn passed(&self) -> bool {
        self.stats.events_failed == 0
    }

    /// Human-readable report
    pub(crate) fn generate_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Tagrank Simulation Report");
        let _ = writeln!(out, "=========================");
        let _ = writeln!(out, "Seed: {}", self.seed);
        let _ = writeln!(out, "Elapsed: {}ms", self.elapsed_ms);
        let _ = writeln!(out);
        let _ = writeln!(out, "Polls created:   {}", self.stats.polls_created);
        let _ = writeln!(out, "Tags bumped:     {}", self.stats.tags_bumped);
        let _ = writeln!(out, "Events applied:  {}", self.stats.events_applied);
        let _ = writeln!(out, "Events ignored:  {}", self.stats.events_ignored);
        let _ = writeln!(out, "Events failed:   {}", self.stats.events_failed);
        let _ = writeln!(out, "Recommendations: {}", self.stats.recommendations);
        let _ = writeln!(out, "No candidates:   {}", self.stats.no_candidates);

        for summary in &self.users {
            let _ = writeln!(out);
            let _ = writeln!(out, "User {}", summary.user);
            if summary.top_tags.is_empty() {
                let _ = writeln!(out, "  top tags: (none)");
            } else {
                let tags: Vec<String> = summary
                    .top_tags
                    .iter()
                    .map(|(name, score)| format!("{name} {score:.3}"))
                    .collect();
                let _ = writeln!(out, "  top tags: {}", tags.join(", "));
            }
            match &summary.recommended {
                Some(rec) => {
                    let _ = writeln!(
                        out,
                        "  next poll: #{} \"{}\" (score {:.3})",
                        rec.poll, rec.title, rec.score
                    );
                }
                None => {
                    let _ = writeln!(out, "  next poll: nothing left to answer");
                }
            }
        }
        out
    }
}

/// Run simulation
///
/// # Errors
/// - invalid configuration
/// - a recommendation failed for any reason other than an empty candidate set
pub(crate) async fn run_simulator(config: SimulatorConfig) -> anyhow::Result<SimulatorReport> {
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut backend = InMemoryBackend::new();
    if let Some(latency) = config.latency {
        backend = backend.with_latency(latency);
    }
    let backend = Arc::new(backend);
    let engine = AffinityEngine::with_backend(config.engine.clone(), Arc::clone(&backend))?;
    let mut stats = SimulatorStats::default();
    let started = Instant::now();

    let users: Vec<UserId> = (0..config.users).map(|_| backend.add_user()).collect();
    let topics: Vec<(TagId, &str)> = TOPICS
        .iter()
        .take(config.tags.min(TOPICS.len()))
        .map(|name| (backend.tag(name), *name))
        .collect();
    let tags: Vec<TagId> = topics.iter().map(|(tag, _)| *tag).collect();
    let names: HashMap<TagId, &str> = topics.into_iter().collect();

    let mut polls = Vec::with_capacity(config.polls);
    for i in 0..config.polls {
        let author = *users.choose(&mut rng).context("no users")?;
        let count = rng.random_range(1..=tags.len().min(3));
        let chosen: Vec<TagId> = tags.choose_multiple(&mut rng, count).copied().collect();
        let topic = chosen.first().and_then(|tag| names.get(tag)).unwrap_or(&"misc");
        let title = format!("{topic} poll #{}", i + 1);
        let poll = backend.add_poll(author, &title, &chosen);

        if let EventOutcome::PopularityBumped { tags } =
            engine.handle(AffinityEvent::PollCreated { poll }).await?
        {
            stats.tags_bumped += tags.len() as u64;
        }
        stats.polls_created += 1;
        polls.push((poll, author));
    }

    let mut events = Vec::with_capacity(config.events);
    for _ in 0..config.events {
        events.push(generate_event(&mut rng, &backend, &users, &polls)?);
    }
    tracing::info!(
        users = users.len(),
        polls = polls.len(),
        events = events.len(),
        "replaying events"
    );

    let outcomes: Vec<_> = stream::iter(events)
        .map(|event| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.handle(event).await })
        })
        .buffer_unordered(config.concurrency)
        .collect()
        .await;

    for outcome in outcomes {
        match outcome? {
            Ok(EventOutcome::Applied { .. }) => stats.events_applied += 1,
            Ok(EventOutcome::Ignored(_)) => stats.events_ignored += 1,
            Ok(EventOutcome::PopularityBumped { tags }) => stats.tags_bumped += tags.len() as u64,
            Err(err) => {
                tracing::warn!(error = %err, "event failed");
                stats.events_failed += 1;
            }
        }
    }

    let mut summaries = Vec::new();
    for &user in users.iter().take(config.show) {
        summaries.push(summarize(&engine, &backend, &names, user, &mut stats).await?);
    }

    Ok(SimulatorReport {
        seed: config.seed,
        elapsed_ms: started.elapsed().as_millis(),
        stats,
        users: summaries,
    })
}

/// Draw one behavioral event
///
/// Answers are recorded as votes up front so later recommendations see them.
fn generate_event(
    rng: &mut StdRng,
    backend: &InMemoryBackend,
    users: &[UserId],
    polls: &[(PollId, UserId)],
) -> anyhow::Result<AffinityEvent> {
    let user = *users.choose(rng).context("no users")?;
    let (poll, author) = *polls.choose(rng).context("no polls")?;

    let event = match rng.random_range(0..100) {
        0..=49 => {
            if let Some(answer) = backend
                .poll(poll)
                .and_then(|detail| detail.answer_ids.choose(rng).copied())
            {
                backend.record_vote(user, poll, answer);
            }
            AffinityEvent::PollAnswered { user, poll }
        }
        50..=74 => AffinityEvent::PollSkipped { user, poll, author },
        75..=89 => AffinityEvent::AccountLooked {
            user,
            poll,
            account: author,
        },
        _ => AffinityEvent::AccountFollowed {
            user,
            account: *users.choose(rng).context("no users")?,
        },
    };
    Ok(event)
}

async fn summarize(
    engine: &AffinityEngine,
    backend: &InMemoryBackend,
    names: &HashMap<TagId, &str>,
    user: UserId,
    stats: &mut SimulatorStats,
) -> anyhow::Result<UserSummary> {
    let top_tags = engine
        .user_vector(user)
        .await?
        .top(TOP_TAGS)
        .into_iter()
        .map(|(tag, score)| {
            let name = names.get(&tag).map_or_else(|| tag.to_string(), |n| (*n).to_string());
            (name, score)
        })
        .collect();

    let recommended = match engine.recommend(user).await {
        Ok(picked) => {
            let score = engine.match_score(user, picked.poll.id).await?;
            backend.record_view(user, picked.poll.id);
            stats.recommendations += 1;
            Some(RecommendationSummary {
                poll: picked.poll.id,
                title: picked.poll.title,
                score,
            })
        }
        Err(err) if err.is_not_found() => {
            stats.no_candidates += 1;
            None
        }
        Err(err) => return Err(err.into()),
    };

    Ok(UserSummary {
        user,
        top_tags,
        recommended,
    })
}
