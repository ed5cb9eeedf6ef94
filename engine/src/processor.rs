//! The ply processor chain. A rule module composes its legality policy out
//! of single-responsibility filters; none of them is mandatory, and the
//! chain is rebuilt per call so no state leaks between requests.

use crate::ply::{NoMovesError, Ply};

/// A single filter over candidate plies. A processor may drop candidates,
/// enrich them (promotion choices, double advances) or reject the whole
/// request with a [`NoMovesError`] carrying the reason.
pub trait PlyProcessor {
    fn process(&self, plies: Vec<Ply>) -> Result<Vec<Ply>, NoMovesError>;
}

/// One chain entry. With `stop_on_error` the processor's error aborts the
/// whole chain; without it the error is swallowed and the input passes
/// through unchanged.
pub struct Processor<'a> {
    pub processor: Box<dyn PlyProcessor + 'a>,
    pub stop_on_error: bool,
}

impl<'a> Processor<'a> {
    pub fn new(processor: impl PlyProcessor + 'a, stop_on_error: bool) -> Processor<'a> {
        Processor {
            processor: Box::new(processor),
            stop_on_error,
        }
    }
}

pub struct PlyProcessorChain<'a> {
    processors: Vec<Processor<'a>>,
}

impl<'a> PlyProcessorChain<'a> {
    pub fn new(processors: Vec<Processor<'a>>) -> PlyProcessorChain<'a> {
        PlyProcessorChain { processors }
    }

    pub fn process(&self, mut plies: Vec<Ply>) -> Result<Vec<Ply>, NoMovesError> {
        for entry in &self.processors {
            match entry.processor.process(plies.clone()) {
                Ok(next) => plies = next,
                Err(error) if entry.stop_on_error => return Err(error),
                Err(_) => {}
            }
        }
        Ok(plies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rename(&'static str);

    impl PlyProcessor for Rename {
        fn process(&self, plies: Vec<Ply>) -> Result<Vec<Ply>, NoMovesError> {
            Ok(plies
                .into_iter()
                .map(|ply| Ply::new(self.0, ply.actions))
                .collect())
        }
    }

    struct Fail;

    impl PlyProcessor for Fail {
        fn process(&self, _: Vec<Ply>) -> Result<Vec<Ply>, NoMovesError> {
            Err(NoMovesError::new("nope"))
        }
    }

    #[test]
    fn processors_run_in_order() {
        let chain = PlyProcessorChain::new(vec![
            Processor::new(Rename("first"), true),
            Processor::new(Rename("second"), true),
        ]);
        let result = chain.process(vec![Ply::new("start", vec![])]).unwrap();
        assert_eq!(result[0].name, "second");
    }

    #[test]
    fn stop_on_error_aborts_the_chain() {
        let chain = PlyProcessorChain::new(vec![
            Processor::new(Fail, true),
            Processor::new(Rename("never"), true),
        ]);
        assert_eq!(
            chain.process(vec![Ply::new("start", vec![])]),
            Err(NoMovesError::new("nope"))
        );
    }

    #[test]
    fn silent_errors_pass_the_input_through() {
        let chain = PlyProcessorChain::new(vec![
            Processor::new(Fail, false),
            Processor::new(Rename("after"), true),
        ]);
        let result = chain.process(vec![Ply::new("start", vec![])]).unwrap();
        assert_eq!(result[0].name, "after");
    }
}
