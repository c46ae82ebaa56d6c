mod zadd;
mod zcard;
mod zrange;
mod zrank_zscore_zrem;

pub use zadd::{ZaddArguments, zadd};
pub use zcard::{ZcardArguments, zcard};
pub use zrange::{ZrangeArguments, zrange};
pub use zrank_zscore_zrem::{MemberArguments, zrank, zrem, zscore};
