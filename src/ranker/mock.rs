//! Mock ranking engine for testing purposes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::models::{Paper, RankingMode};
use crate::ranker::{AiRanker, RankedEntry, RankerError};

#[derive(Debug)]
enum MockRankerBehavior {
    Entries(Vec<RankedEntry>),
    /// Echo the candidates back in their input order
    Echo,
    Timeout,
    ApiError,
}

/// A mock ranking engine returning scripted entries or failures.
#[derive(Debug)]
pub struct MockRanker {
    behavior: Mutex<MockRankerBehavior>,
    calls: AtomicUsize,
}

impl MockRanker {
    /// A ranker that returns the given entries
    pub fn returning(entries: Vec<RankedEntry>) -> Self {
        Self {
            behavior: Mutex::new(MockRankerBehavior::Entries(entries)),
            calls: AtomicUsize::new(0),
        }
    }

    /// A ranker that echoes the candidate titles back unchanged
    pub fn echoing() -> Self {
        Self {
            behavior: Mutex::new(MockRankerBehavior::Echo),
            calls: AtomicUsize::new(0),
        }
    }

    /// A ranker that always times out
    pub fn timing_out() -> Self {
        Self {
            behavior: Mutex::new(MockRankerBehavior::Timeout),
            calls: AtomicUsize::new(0),
        }
    }

    /// A ranker that always fails with an API error
    pub fn failing() -> Self {
        Self {
            behavior: Mutex::new(MockRankerBehavior::ApiError),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `rank` has been called, retries included
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AiRanker for MockRanker {
    async fn rank(
        &self,
        _query: &str,
        papers: &[Paper],
        limit: usize,
        _mode: RankingMode,
    ) -> Result<Vec<RankedEntry>, RankerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &*self.behavior.lock().unwrap() {
            MockRankerBehavior::Entries(entries) => {
                Ok(entries.iter().take(limit).cloned().collect())
            }
            MockRankerBehavior::Echo => Ok(papers
                .iter()
                .take(limit)
                .map(|p| RankedEntry {
                    title: p.title.clone(),
                    relevance_score: Some(50),
                    explanation: None,
                })
                .collect()),
            MockRankerBehavior::Timeout => Err(RankerError::Timeout),
            MockRankerBehavior::ApiError => Err(RankerError::Api("mock failure".to_string())),
        }
    }
}
