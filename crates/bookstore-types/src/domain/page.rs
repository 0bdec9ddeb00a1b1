use serde::{Deserialize, Serialize};

/// Zero-based page of results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, page: u32, size: u32, total_elements: u64) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            total_elements.div_ceil(size as u64) as u32
        };
        Self {
            content,
            page,
            size,
            total_elements,
            total_pages,
        }
    }

    /// Slices an already ordered, fully materialised list.
    pub fn from_vec(all: Vec<T>, page: u32, size: u32) -> Self {
        let total = all.len() as u64;
        let start = (page as usize).saturating_mul(size as usize);
        let content = all.into_iter().skip(start).take(size as usize).collect();
        Self::new(content, page, size, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_and_counts_pages() {
        let p = Page::from_vec((1..=5).collect::<Vec<_>>(), 1, 2);
        assert_eq!(p.content, vec![3, 4]);
        assert_eq!(p.total_elements, 5);
        assert_eq!(p.total_pages, 3);

        let past_end = Page::from_vec(vec![1, 2], 4, 2);
        assert!(past_end.content.is_empty());
        assert_eq!(past_end.total_pages, 1);
    }
}
