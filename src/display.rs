use std::sync::atomic::{AtomicI64, Ordering};

use crate::exchange::ScoreSink;

/// Console score display. Keeps the current liking total so concurrent
/// evaluations resolve last-write-wins, and prints each update.
pub struct ConsoleScoreDisplay {
    current: AtomicI64,
}

impl ConsoleScoreDisplay {
    pub fn new(initial: i64) -> Self {
        Self {
            current: AtomicI64::new(initial),
        }
    }

    pub fn current(&self) -> i64 {
        self.current.load(Ordering::SeqCst)
    }
}

impl ScoreSink for ConsoleScoreDisplay {
    fn set_score(&self, score: i64) {
        self.current.store(score, Ordering::SeqCst);
        println!("[liking: {}]", score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let display = ConsoleScoreDisplay::new(0);
        display.set_score(3);
        display.set_score(-2);
        assert_eq!(display.current(), -2);
    }
}
