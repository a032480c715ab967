use serde::Deserialize;

pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl Pagination {
    /// Limit in `1..=MAX_PAGE_SIZE`, offset never negative.
    pub fn clamped(self) -> (i64, i64) {
        (self.limit.clamp(1, MAX_PAGE_SIZE), self.offset.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_is_clamped() {
        let p = |limit, offset| Pagination { limit, offset }.clamped();
        assert_eq!(p(0, -5), (1, 0));
        assert_eq!(p(1000, 40), (100, 40));
        assert_eq!(p(20, 0), (20, 0));
    }
}
