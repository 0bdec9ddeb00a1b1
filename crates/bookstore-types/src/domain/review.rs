use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: i64,
    pub book_id: i64,
    pub user_id: i64,
    pub rating: u8,
    pub comment: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Approved reviews are public; pending ones are shown to their reviewer and the book owner.
    pub fn visible_to(&self, viewer_id: i64, book_owner: Option<i64>) -> bool {
        self.approved || self.user_id == viewer_id || book_owner == Some(viewer_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub book_id: i64,
    pub user_id: i64,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl NewReview {
    pub fn new(book_id: i64, user_id: i64, rating: i64, comment: String) -> anyhow::Result<Self> {
        if !(1..=5).contains(&rating) {
            anyhow::bail!("rating must be between 1 and 5");
        }
        Ok(Self {
            book_id,
            user_id,
            rating: rating as u8,
            comment,
            created_at: Utc::now(),
        })
    }

    pub fn into_review(self, id: i64) -> Review {
        Review {
            id,
            book_id: self.book_id,
            user_id: self.user_id,
            rating: self.rating,
            comment: self.comment,
            approved: false,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewSort {
    #[default]
    Id,
    RatingDesc,
    NewestFirst,
}

impl ReviewSort {
    /// `rating` and `date` are recognised; anything else keeps insertion order.
    pub fn parse(key: Option<&str>) -> Self {
        match key.map(|k| k.to_ascii_lowercase()) {
            Some(k) if k == "rating" => ReviewSort::RatingDesc,
            Some(k) if k == "date" => ReviewSort::NewestFirst,
            _ => ReviewSort::Id,
        }
    }

    pub fn sort(&self, reviews: &mut [Review]) {
        match self {
            ReviewSort::Id => reviews.sort_by_key(|r| r.id),
            ReviewSort::RatingDesc => {
                reviews.sort_by(|a, b| b.rating.cmp(&a.rating).then(a.id.cmp(&b.id)))
            }
            ReviewSort::NewestFirst => {
                reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(id: i64, user_id: i64, rating: u8, approved: bool) -> Review {
        let mut r = NewReview::new(1, user_id, rating as i64, "ok".into())
            .unwrap()
            .into_review(id);
        r.approved = approved;
        r
    }

    #[test]
    fn rating_bounds() {
        assert!(NewReview::new(1, 1, 0, "x".into()).is_err());
        assert!(NewReview::new(1, 1, 6, "x".into()).is_err());
        let r = NewReview::new(1, 1, 5, "x".into()).unwrap().into_review(9);
        assert!(!r.approved);
    }

    #[test]
    fn visibility_rules() {
        let pending = review(1, 10, 4, false);
        assert!(pending.visible_to(10, Some(20)));
        assert!(pending.visible_to(20, Some(20)));
        assert!(!pending.visible_to(30, Some(20)));
        assert!(!pending.visible_to(30, None));
        assert!(review(2, 10, 4, true).visible_to(30, None));
    }

    #[test]
    fn sort_by_rating_then_id() {
        let mut rs = vec![review(1, 1, 3, true), review(2, 1, 5, true), review(3, 1, 5, true)];
        ReviewSort::parse(Some("RATING")).sort(&mut rs);
        assert_eq!(rs.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 3, 1]);
        assert_eq!(ReviewSort::parse(Some("stars")), ReviewSort::Id);
    }
}
