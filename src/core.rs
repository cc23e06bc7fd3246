//! Chain abstraction and the driver loops that advance a chain.
//!
//! The core never loops on its own: a driver calls [`MarkovChain::step`] repeatedly,
//! either directly or through one of the `run_chain*` helpers below, and may stop at
//! any iteration. The chain is valid at every index.

use indicatif::ProgressBar;

use crate::error::Result;
use crate::model::Theta;

pub trait MarkovChain {
    /// Does one iteration of the chain, returning the new current state.
    fn step(&mut self) -> Result<&Theta>;

    /// Get the current state without stepping.
    fn current_state(&self) -> &Theta;
}

/// Runs `n_iterations - 1` steps and returns the full chain of length `n_iterations`.
/// Index 0 holds the state the chain was in before the call.
pub fn run_chain<M: MarkovChain>(chain: &mut M, n_iterations: usize) -> Result<Vec<Theta>> {
    run_chain_with_report(chain, n_iterations, usize::MAX, |_, _| {})
}

/// Like [`run_chain`], but calls `report(i, &history[..=i])` every `report_every`
/// iterations and once more on the final iteration. This is where a driver hooks a
/// redraw or a log line.
pub fn run_chain_with_report<M, F>(
    chain: &mut M,
    n_iterations: usize,
    report_every: usize,
    mut report: F,
) -> Result<Vec<Theta>>
where
    M: MarkovChain,
    F: FnMut(usize, &[Theta]),
{
    let mut history = Vec::with_capacity(n_iterations);
    if n_iterations == 0 {
        return Ok(history);
    }
    history.push(*chain.current_state());
    let report_every = report_every.max(1);

    for i in 0..n_iterations {
        if i > 0 {
            let state = chain.step()?;
            history.push(*state);
        }
        if i % report_every == 0 || i == n_iterations - 1 {
            report(i, &history[..]);
        }
    }

    Ok(history)
}

/// Like [`run_chain`], advancing `pb` once per iteration.
pub fn run_chain_with_progress<M: MarkovChain>(
    chain: &mut M,
    n_iterations: usize,
    pb: &ProgressBar,
) -> Result<Vec<Theta>> {
    pb.set_length(n_iterations as u64);
    let history = run_chain_with_report(chain, n_iterations, 1, |_, _| pb.inc(1))?;
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic chain that adds 1 to the slope on every step.
    struct Counter {
        state: Theta,
    }

    impl MarkovChain for Counter {
        fn step(&mut self) -> Result<&Theta> {
            self.state = Theta::new(self.state.a() + 1.0, 0.0, 1.0)?;
            Ok(&self.state)
        }

        fn current_state(&self) -> &Theta {
            &self.state
        }
    }

    fn counter() -> Counter {
        Counter {
            state: Theta::new(0.0, 0.0, 1.0).unwrap(),
        }
    }

    #[test]
    fn run_chain_starts_from_current_state() {
        let chain = run_chain(&mut counter(), 4).unwrap();
        let slopes: Vec<f64> = chain.iter().map(|t| t.a()).collect();
        assert_eq!(slopes, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn zero_iterations_yield_empty_chain() {
        assert!(run_chain(&mut counter(), 0).unwrap().is_empty());
    }

    #[test]
    fn report_fires_on_cadence_and_last_iteration() {
        let mut seen = Vec::new();
        run_chain_with_report(&mut counter(), 45, 20, |i, history| {
            assert_eq!(history.len(), i + 1);
            seen.push(i);
        })
        .unwrap();
        assert_eq!(seen, vec![0, 20, 40, 44]);
    }

    #[test]
    fn progress_bar_counts_iterations() {
        let pb = ProgressBar::hidden();
        let chain = run_chain_with_progress(&mut counter(), 10, &pb).unwrap();
        assert_eq!(chain.len(), 10);
        assert_eq!(pb.position(), 10);
    }
}
