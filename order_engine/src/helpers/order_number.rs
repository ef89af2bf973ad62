use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};

use crate::db_types::OrderNumber;

const SUFFIX_LEN: usize = 6;

/// Generates a display order number: a date prefix plus a random alphanumeric suffix, e.g.
/// `ORD-20260806-X4K9QZ`.
///
/// The suffix space is ~2 billion per day, so collisions are negligible but not impossible; the
/// store enforces uniqueness and `OrderFlowApi::create_order` regenerates on a collision.
pub fn generate_order_number() -> OrderNumber {
    let date = Utc::now().format("%Y%m%d");
    let suffix: String =
        rand::thread_rng().sample_iter(&Alphanumeric).take(SUFFIX_LEN).map(char::from).collect::<String>().to_ascii_uppercase();
    OrderNumber(format!("ORD-{date}-{suffix}"))
}
