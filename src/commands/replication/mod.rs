mod psync;
mod replconf;

pub use psync::{PsyncArguments, psync};
pub use replconf::replconf;
