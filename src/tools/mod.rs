//! Interactive front ends, one per subcommand.

pub mod arch;
pub mod convert;
pub mod flatten;
pub mod strip;
