pub mod policy;

pub use policy::{Discard, FailurePolicy, Phase, Propagate};
