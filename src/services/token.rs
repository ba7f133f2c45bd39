// src/services/token.rs

//! Request generations and cancellation tokens.
//!
//! Every new selection mints a generation. A fetch carries the token of the
//! generation it was started for; once a newer generation exists the token
//! is invalid and `cancelled()` resolves, so transports can abort early and
//! the browser can discard late results.

use tokio::sync::watch;

/// Monotonic generation counter shared with outstanding tokens.
#[derive(Debug)]
pub struct Generations {
    tx: watch::Sender<u64>,
}

impl Generations {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx }
    }

    /// The current generation number.
    pub fn current(&self) -> u64 {
        *self.tx.borrow()
    }

    /// Mint a new generation, invalidating every outstanding token.
    pub fn advance(&self) -> RequestToken {
        let mut next = 0;
        self.tx.send_modify(|generation| {
            *generation += 1;
            next = *generation;
        });
        self.token_for(next)
    }

    /// Token for the current generation (continuations such as "load more").
    pub fn token(&self) -> RequestToken {
        self.token_for(self.current())
    }

    fn token_for(&self, generation: u64) -> RequestToken {
        RequestToken {
            generation,
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for Generations {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancellation token bound to one request generation.
#[derive(Debug, Clone)]
pub struct RequestToken {
    generation: u64,
    rx: watch::Receiver<u64>,
}

impl RequestToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while no newer generation has been minted.
    pub fn is_valid(&self) -> bool {
        *self.rx.borrow() == self.generation
    }

    /// Resolves once this token's generation has been superseded.
    ///
    /// Never resolves if the generation counter is dropped first.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let generation = self.generation;
        if rx.wait_for(|current| *current != generation).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
