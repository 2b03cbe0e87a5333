//! Database repositories.

mod attempt;

pub use attempt::AttemptRepository;
