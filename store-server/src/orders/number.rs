//! Order number generation
//!
//! Order numbers stay human-recognizable and collision-resistant:
//! a fixed prefix, a second-resolution timestamp token, and a short
//! random suffix. Uniqueness is enforced by the order store; the
//! engine retries with a fresh suffix on the rare collision.

use rand::Rng;

/// Fixed prefix for sales orders
pub const ORDER_NO_PREFIX: &str = "SO";

/// Generate an order number, e.g. `SO-20260830142501-0417`
pub fn generate() -> String {
    let token = chrono::Utc::now().format("%Y%m%d%H%M%S");
    let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("{}-{}-{:04}", ORDER_NO_PREFIX, token, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let no = generate();
        // SO- + 14-digit timestamp + - + 4-digit suffix
        assert!(no.starts_with("SO-"));
        assert_eq!(no.len(), 3 + 14 + 1 + 4);

        let parts: Vec<&str> = no.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }
}
