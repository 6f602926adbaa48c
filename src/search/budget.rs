// Copyright 2026 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

use std::time::{Duration, Instant};

/// How far and for how long the engine may think about one move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    pub max_depth: u8,
    pub movetime: Option<Duration>,
}

impl Budget {
    /// Depth searched when only a time limit is given.
    pub const MAX_DEPTH: u8 = 64;

    /// A fixed depth without a time limit.
    pub fn depth(max_depth: u8) -> Self {
        Self {
            max_depth: max_depth.max(1),
            movetime: None,
        }
    }

    /// A wall-clock limit; depth is bounded only by `MAX_DEPTH`.
    pub fn time(movetime: Duration) -> Self {
        Self {
            max_depth: Self::MAX_DEPTH,
            movetime: Some(movetime),
        }
    }

    pub fn with_movetime(self, movetime: Option<Duration>) -> Self {
        Self { movetime, ..self }
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::depth(3)
    }
}

/// Counts visited nodes and tells the search when its time is up. The
/// clock is only read every `CHECK_INTERVAL` nodes.
#[derive(Debug)]
pub(super) struct Clock {
    start: Instant,
    limit: Option<Duration>,
    nodes: u64,
    stopped: bool,
}

impl Clock {
    const CHECK_INTERVAL: u64 = 1024;

    pub fn start(limit: Option<Duration>) -> Self {
        Self {
            start: Instant::now(),
            limit,
            nodes: 0,
            stopped: false,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    pub fn is_limit_reached(&self) -> bool {
        self.limit.is_some_and(|limit| self.elapsed() >= limit)
    }

    /// Records a node. Returns `None` once the search has to stop.
    pub fn tick(&mut self) -> Option<()> {
        self.nodes += 1;
        if self.nodes % Self::CHECK_INTERVAL == 0 && self.is_limit_reached() {
            self.stopped = true;
        }
        (!self.stopped).then_some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budgets() {
        assert_eq!(Budget::default(), Budget::depth(3));
        assert_eq!(Budget::depth(0).max_depth, 1);
        let budget = Budget::time(Duration::from_millis(250));
        assert_eq!(budget.max_depth, Budget::MAX_DEPTH);
        assert_eq!(budget.movetime, Some(Duration::from_millis(250)));
        let budget = Budget::depth(4).with_movetime(Some(Duration::from_secs(1)));
        assert_eq!(budget.max_depth, 4);
        assert!(budget.movetime.is_some());
    }
    #[test]
    fn test_clock_without_limit_never_stops() {
        let mut clock = Clock::start(None);
        for _ in 0..5000 {
            assert!(clock.tick().is_some());
        }
        assert_eq!(clock.nodes(), 5000);
    }
    #[test]
    fn test_clock_stops_at_check_interval() {
        let mut clock = Clock::start(Some(Duration::ZERO));
        for _ in 1..Clock::CHECK_INTERVAL {
            assert!(clock.tick().is_some());
        }
        assert!(clock.tick().is_none());
        assert!(clock.tick().is_none());
    }
}
