/// Offset-based pagination shared by the list queries.
///
/// Pages are 1-indexed; anything below 1 is treated as the first page so a
/// malformed `?page=0` never produces a negative OFFSET.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub number: i64,
    pub per_page: i64,
}

impl Page {
    pub fn new(number: i64, per_page: i64) -> Self {
        Self {
            number: number.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_starts_at_zero() {
        assert_eq!(Page::new(1, 20).offset(), 0);
    }

    #[test]
    fn later_pages_advance_by_page_size() {
        assert_eq!(Page::new(3, 20).offset(), 40);
    }

    #[test]
    fn page_below_one_is_clamped_to_first() {
        assert_eq!(Page::new(0, 20).offset(), 0);
        assert_eq!(Page::new(-5, 20).offset(), 0);
    }
}
