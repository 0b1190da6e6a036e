// Resume refinement engine.
// Normalizer, coverage verifier and compare engine are pure; the orchestrator
// is the only component that calls out, and only through the `Rewriter` trait.

pub mod compare;
pub mod coverage;
pub mod handlers;
pub mod normalizer;
pub mod orchestrator;
pub mod prioritizer;
pub mod prompts;
pub mod rewriter;
pub mod sections;
